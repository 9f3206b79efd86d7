//! Owns one verification run: from property text to a report, either on
//! the calling thread or on a tokio blocking worker.

use ltl_domain::*;
use ltl_formal::*;

mod report;
pub use report::*;

mod controller;
pub use controller::*;

mod handle;
pub use handle::*;

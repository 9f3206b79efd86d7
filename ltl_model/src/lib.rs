//! Program automata to check properties against: a guarded transition
//! system of cooperating agents, and an explicit labelled graph.

use ltl_domain::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod value;
pub use value::*;

pub mod variable;
pub use variable::*;

pub mod predicate;
pub use predicate::*;

pub mod predicate_parser;

pub mod transition;
pub use transition::*;

pub mod named_predicate;
pub use named_predicate::*;

pub mod transition_system_model;
pub use transition_system_model::*;

pub mod graph;
pub use graph::*;

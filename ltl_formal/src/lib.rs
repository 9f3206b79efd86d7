//! The checking engine: covers, the property automaton, the program view and
//! the nested depth first search over their product.

pub mod cover;
pub use cover::*;

pub mod property_automaton;
pub use property_automaton::*;

pub mod program_view;
pub use program_view::*;

pub mod explorer;
pub use explorer::*;

pub mod precheck;
pub use precheck::*;

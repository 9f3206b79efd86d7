//! The LTL checker domain: formulas, property states, state hashing and the
//! automaton interfaces shared by the engine and the program models.

#[macro_export]
macro_rules! hashset {
    ($( $val: expr ),* $(,)?) => {{
         let mut set = ::std::collections::BTreeSet::new();
         $( set.insert($val); )*
         set
    }}
}

#[macro_use]
pub mod logging;
pub use logging::*;

pub mod formula;
pub use formula::*;

pub mod formula_parser;

pub mod prop_state;
pub use prop_state::*;

pub mod digest;
pub use digest::*;

pub mod state_table;
pub use state_table::*;

pub mod automaton;
pub use automaton::*;

pub mod directives;
pub use directives::*;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type MCResult<T> = std::result::Result<T, MCError>;

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, thiserror::Error)]
pub enum MCError {
    /// Malformed property text, reported before any automaton is built.
    #[error("syntax error in property: {0}")]
    Syntax(String),
    /// The proposition oracle failed in some state.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    /// The program automaton failed while computing successors.
    #[error("program step failed: {0}")]
    ProgramStep(String),
    #[error("bad directives: {0}")]
    Config(String),
    #[error("the run was cancelled")]
    Cancelled,
    #[error("Oh No: {0}")]
    No(String),
}

impl std::convert::From<serde_json::Error> for MCError {
    fn from(e: serde_json::Error) -> Self {
        MCError::Config(e.to_string())
    }
}

impl MCError {
    pub fn from_any<T: Display>(x: T) -> MCError {
        MCError::No(format!("{}", x))
    }

    /// True for the errors that end a run (as opposed to rejecting it up front).
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, MCError::Evaluation(_) | MCError::ProgramStep(_))
    }
}

#[cfg(test)]
mod tests_domain {
    use super::*;

    #[test]
    fn error_display() {
        let e = MCError::Evaluation("bel(x) in s3".into());
        assert_eq!(e.to_string(), "evaluation failed: bel(x) in s3");
        assert!(e.is_fatal_to_run());
        assert!(!MCError::Syntax("x".into()).is_fatal_to_run());
    }

    #[test]
    fn json_errors_become_config_errors() {
        let e: MCError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(e, MCError::Config(_)));
    }
}

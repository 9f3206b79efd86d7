use super::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<S> {
    Pass,
    Violation(Counterexample<S>),
    /// The search was aborted by the evaluator or the program.
    Error(MCError),
    Cancelled,
}

impl<S> Outcome<S> {
    pub fn from_search(result: MCResult<Verdict<S>>) -> Self {
        match result {
            Ok(Verdict::Pass) => Outcome::Pass,
            Ok(Verdict::Violation(c)) => Outcome::Violation(c),
            Ok(Verdict::Cancelled) | Err(MCError::Cancelled) => Outcome::Cancelled,
            Err(e) => Outcome::Error(e),
        }
    }
}

impl<S> std::fmt::Display for Outcome<S> {
    fn fmt(&self, fmtr: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Pass => write!(fmtr, "pass"),
            Outcome::Violation(c) => write!(
                fmtr,
                "violation ({} prefix states, {} cycle states)",
                c.prefix.len(),
                c.cycle.len()
            ),
            Outcome::Error(e) => write!(fmtr, "error: {e}"),
            Outcome::Cancelled => write!(fmtr, "cancelled"),
        }
    }
}

/// Everything a finished run has to say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport<S> {
    pub run_id: Uuid,
    /// The property as the user wrote it.
    pub property: String,
    pub outcome: Outcome<S>,
    pub advisories: Vec<Advisory>,
    pub stats: ExplorationStats,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

impl<S> RunReport<S> {
    pub fn is_pass(&self) -> bool {
        matches!(self.outcome, Outcome::Pass)
    }

    pub fn is_violation(&self) -> bool {
        matches!(self.outcome, Outcome::Violation(_))
    }

    pub fn counterexample(&self) -> Option<&Counterexample<S>> {
        match &self.outcome {
            Outcome::Violation(c) => Some(c),
            _ => None,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished - self.started
    }
}

//! The automaton interfaces.
//!
//! `Automaton` is what the explorer walks: a lazily expanding graph whose
//! states are handed out as `StateId`s and whose successor lists are
//! memoized. `ProgramAutomaton` and `Evaluator` are what an agent program has
//! to provide: states, successor steps, and an oracle that decides the
//! propositions (mental state conditions) in one state.

use super::*;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A memoized successor list. Asking twice hands out the same allocation.
pub type Successors = Arc<[StateId]>;

pub trait Automaton {
    type State;

    fn initial(&mut self) -> MCResult<StateId>;

    /// Successors of a state, computed on first request and cached.
    fn successors(&mut self, state: StateId) -> MCResult<Successors>;

    fn is_expanded(&self, state: StateId) -> bool;

    fn state(&self, id: StateId) -> &Self::State;

    /// Number of states whose successors have been materialized.
    fn size(&self) -> usize;

    /// Expand every reachable state. Returns the number of reachable states.
    fn generate(&mut self) -> MCResult<usize> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![self.initial()?];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let succ = self.successors(id)?;
            stack.extend(succ.iter().copied().filter(|s| !seen.contains(s)));
        }
        Ok(seen.len())
    }
}

/// What the controller hands to the program automaton before a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOptions {
    pub partial_order_reduction: bool,
    pub slicing: bool,
    /// Upper bound on the number of transitions in an ample set, 0 for none.
    pub ample_set_size: usize,
    /// Propositions mentioned by the property.
    pub visible: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstructKind {
    Communication,
    PerceptRule,
    NestedModule,
}

/// A program construct the evaluator or the reductions do not model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Construct {
    pub kind: ConstructKind,
    pub location: String,
}

impl Construct {
    pub fn new(kind: ConstructKind, location: &str) -> Self {
        Construct {
            kind,
            location: location.to_string(),
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConstructKind::Communication => "communication primitive",
            ConstructKind::PerceptRule => "percept rule",
            ConstructKind::NestedModule => "nested module",
        };
        write!(fmtr, "{kind} at {}", self.location)
    }
}

/// An executable program seen as an automaton.
///
/// Stepping may be expensive or blocking; failures are reported as
/// `MCError::ProgramStep` and end the run.
pub trait ProgramAutomaton {
    type State: Clone + Eq + fmt::Debug + StateDigest;

    fn configure(&mut self, _options: &ProgramOptions) -> MCResult<()> {
        Ok(())
    }

    fn initial(&mut self) -> MCResult<Self::State>;

    fn successors(&mut self, state: &Self::State) -> MCResult<Vec<Self::State>>;

    /// A reduced successor set that is safe to explore instead of all
    /// successors, or `None` when no reduction applies in this state.
    fn ample(&mut self, _state: &Self::State) -> MCResult<Option<Vec<Self::State>>> {
        Ok(None)
    }

    fn unsupported_constructs(&self) -> Vec<Construct> {
        vec![]
    }

    /// Release resources. Called once per run; must tolerate repeated calls.
    fn dispose(&mut self) {}
}

/// The proposition oracle. Answers must be stable for a fixed state, the
/// explorer may ask the same question several times.
pub trait Evaluator<S> {
    fn holds(&mut self, state: &S, proposition: &str) -> MCResult<bool>;

    fn entails(&mut self, state: &S, literal: &Formula) -> MCResult<bool> {
        match literal {
            Formula::Proposition(name) => self.holds(state, name),
            Formula::Negation(arg) => match arg.as_ref() {
                Formula::Proposition(name) => Ok(!self.holds(state, name)?),
                _ => Err(MCError::Evaluation(format!("`{literal}` is not a literal"))),
            },
            Formula::True => Ok(true),
            Formula::False => Ok(false),
            _ => Err(MCError::Evaluation(format!("`{literal}` is not a literal"))),
        }
    }

    fn entails_all(&mut self, state: &S, literals: &[Formula]) -> MCResult<bool> {
        for l in literals {
            if !self.entails(state, l)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<S, F> Evaluator<S> for F
where
    F: FnMut(&S, &str) -> MCResult<bool>,
{
    fn holds(&mut self, state: &S, proposition: &str) -> MCResult<bool> {
        self(state, proposition)
    }
}

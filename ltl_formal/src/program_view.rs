//! Wraps a program automaton and its evaluator so the explorer can treat the
//! program like any other automaton: states are interned once, successor
//! and ample sets are memoized, and a state without successors stutters.

use ltl_domain::*;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ProgramInfo {
    successors: Option<Successors>,
    /// `Some(None)`: asked, no reduction available.
    ample: Option<Option<Successors>>,
    evaluated: bool,
}

pub struct ProgramView<P: ProgramAutomaton, E> {
    program: P,
    evaluator: E,
    table: StateTable<P::State, ProgramInfo>,
    initial: Option<StateId>,
    expanded: usize,
    evaluated: usize,
    disposed: bool,
}

impl<P, E> ProgramView<P, E>
where
    P: ProgramAutomaton,
    E: Evaluator<P::State>,
{
    pub fn new(program: P, evaluator: E) -> Self {
        ProgramView {
            program,
            evaluator,
            table: StateTable::new(),
            initial: None,
            expanded: 0,
            evaluated: 0,
            disposed: false,
        }
    }

    pub fn configure(&mut self, options: &ProgramOptions) -> MCResult<()> {
        self.program.configure(options)
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    fn intern(&mut self, states: Vec<P::State>) -> Successors {
        let ids: Vec<StateId> = states
            .into_iter()
            .map(|s| self.table.insert(s).0)
            .collect();
        Arc::from(ids)
    }

    /// The memoized ample set of a state, `None` when the program offers no
    /// reduction there.
    pub fn ample(&mut self, state: StateId) -> MCResult<Option<Successors>> {
        if let Some(ample) = &self.table.info(state).ample {
            return Ok(ample.clone());
        }
        let reduced = self.program.ample(self.table.get(state))?;
        let ample = match reduced {
            Some(states) if !states.is_empty() => Some(self.intern(states)),
            _ => None,
        };
        self.table.info_mut(state).ample = Some(ample.clone());
        Ok(ample)
    }

    /// Does the state satisfy every literal? Counts the state as evaluated.
    pub fn entails_all(&mut self, state: StateId, literals: &[Formula]) -> MCResult<bool> {
        let info = self.table.info_mut(state);
        if !info.evaluated {
            info.evaluated = true;
            self.evaluated += 1;
        }
        self.evaluator.entails_all(self.table.get(state), literals)
    }

    /// Number of distinct states the evaluator was asked about.
    pub fn evaluated_states(&self) -> usize {
        self.evaluated
    }

    pub fn stored(&self) -> usize {
        self.table.len()
    }

    pub fn collisions(&self) -> usize {
        self.table.collisions()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the program. Later calls do nothing.
    pub fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.program.dispose();
        }
    }
}

impl<P, E> Automaton for ProgramView<P, E>
where
    P: ProgramAutomaton,
    E: Evaluator<P::State>,
{
    type State = P::State;

    fn initial(&mut self) -> MCResult<StateId> {
        if let Some(id) = self.initial {
            return Ok(id);
        }
        let state = self.program.initial()?;
        let (id, _) = self.table.insert(state);
        self.initial = Some(id);
        Ok(id)
    }

    fn successors(&mut self, state: StateId) -> MCResult<Successors> {
        if let Some(succ) = &self.table.info(state).successors {
            return Ok(succ.clone());
        }
        let next = self.program.successors(self.table.get(state))?;
        let succ = if next.is_empty() {
            Arc::from(vec![state])
        } else {
            self.intern(next)
        };
        self.table.info_mut(state).successors = Some(succ.clone());
        self.expanded += 1;
        Ok(succ)
    }

    fn is_expanded(&self, state: StateId) -> bool {
        self.table.info(state).successors.is_some()
    }

    fn state(&self, id: StateId) -> &P::State {
        self.table.get(id)
    }

    fn size(&self) -> usize {
        self.expanded
    }
}

//! Guarded transitions: when they are enabled and what firing them does.
use super::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// What executing a transition means to the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransitionKind {
    /// A step local to the agent.
    #[default]
    Internal,
    Send,
    Receive,
    /// Processing of an incoming percept.
    Percept,
    /// Entering or leaving a nested module.
    Module,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    pub agent: String,
    pub kind: TransitionKind,
    pub guard: Predicate,
    pub actions: Vec<Action>,
}

impl Transition {
    pub fn new(name: &str, guard: Predicate, actions: Vec<Action>) -> Self {
        Transition {
            name: name.to_string(),
            agent: String::new(),
            kind: TransitionKind::Internal,
            guard,
            actions,
        }
    }

    /// Build a transition from text, e.g. `("go", "x == 0", &["x := 1"])`.
    pub fn parse(name: &str, guard: &str, actions: &[&str]) -> MCResult<Self> {
        let actions = actions
            .iter()
            .map(|a| Action::parse(a))
            .collect::<MCResult<Vec<_>>>()?;
        Ok(Transition::new(name, Predicate::parse(guard)?, actions))
    }

    pub fn with_agent(mut self, agent: &str) -> Self {
        self.agent = agent.to_string();
        self
    }

    pub fn with_kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn guard(&self) -> &Predicate {
        &self.guard
    }

    pub fn actions(&self) -> &[Action] {
        self.actions.as_slice()
    }

    pub fn resolve(&mut self, index: &FxHashMap<String, usize>) {
        self.guard.resolve(index);
        self.actions.iter_mut().for_each(|a| a.resolve(index));
    }

    pub fn modifies(&self) -> BTreeSet<String> {
        self.actions().iter().map(|a| a.var.clone()).collect()
    }

    /// Variables read by the guard or by the actions.
    pub fn reads(&self) -> BTreeSet<String> {
        let mut r: BTreeSet<String> = self.guard.support().into_iter().collect();
        r.extend(self.actions().iter().flat_map(|a| a.support()));
        r
    }

    /// Can `other` be executed before or after this transition with the same
    /// result, and without one enabling or disabling the other?
    pub fn independent_of(&self, other: &Transition) -> bool {
        let writes = self.modifies();
        let other_writes = other.modifies();
        writes.is_disjoint(&other_writes)
            && writes.is_disjoint(&other.reads())
            && other_writes.is_disjoint(&self.reads())
    }

    pub fn is_enabled(&self, state: &ModelState) -> MCResult<bool> {
        self.guard
            .eval(state)
            .map_err(|e| MCError::ProgramStep(format!("guard of {}: {e}", self.name)))
    }

    /// Every state the transition may lead to. All values are computed from
    /// `state`; `Compute::Any` branches over the variable's domain.
    pub fn fire(&self, state: &ModelState, vars: &[Variable]) -> MCResult<Vec<ModelState>> {
        let mut next = vec![state.clone()];
        for a in &self.actions {
            let var = a
                .index()
                .and_then(|i| vars.get(i).map(|v| (i, v)))
                .ok_or_else(|| {
                    MCError::ProgramStep(format!("{} assigns unknown variable `{}`", self.name, a.var))
                });
            let (index, var) = var?;
            let values = a
                .next_values(state, var.domain())
                .map_err(|e| MCError::ProgramStep(format!("{}: {e}", self.name)))?;
            if let Some(v) = values.iter().find(|v| !var.domain.contains(v)) {
                return Err(MCError::ProgramStep(format!(
                    "{} assigns {v} outside the domain of `{}`",
                    self.name, var.name
                )));
            }
            next = next
                .iter()
                .flat_map(|s| {
                    values.iter().map(move |v| {
                        let mut s = s.clone();
                        s.0[index] = *v;
                        s
                    })
                })
                .collect();
        }
        Ok(next)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<_> = self.actions.iter().map(|a| a.to_string()).collect();
        write!(fmtr, "{}: {} / [{}]", self.name, self.guard, actions.join(", "))
    }
}

/// This module contains a simple model type of cooperating agents that we
/// can use as a program automaton.
use super::*;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct TransitionSystemModel {
    pub name: String,
    pub vars: Vec<Variable>,
    pub state_predicates: Vec<NamedPredicate>,
    pub transitions: Vec<Transition>,
    /// States violating an invariant are never entered.
    pub invariants: Vec<NamedPredicate>,

    #[serde(skip)]
    runtime: Runtime,
}

#[derive(Debug, PartialEq, Clone, Default)]
struct Runtime {
    prepared: bool,
    options: ProgramOptions,
    /// Transitions left after slicing, as indices into `transitions`.
    active: Vec<usize>,
    /// Variables read by the visible propositions.
    visible_vars: BTreeSet<String>,
    disposed: bool,
}

fn var_index(vars: &[Variable]) -> FxHashMap<String, usize> {
    vars.iter()
        .enumerate()
        .map(|(i, v)| (v.name.clone(), i))
        .collect()
}

impl TransitionSystemModel {
    pub fn new(name: &str) -> Self {
        TransitionSystemModel {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> MCResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn add_variable(&mut self, var: Variable) -> &mut Self {
        self.vars.push(var);
        self.runtime.prepared = false;
        self
    }

    pub fn add_transition(&mut self, t: Transition) -> &mut Self {
        self.transitions.push(t);
        self.runtime.prepared = false;
        self
    }

    pub fn add_predicate(&mut self, name: &str, predicate: Predicate) -> &mut Self {
        self.state_predicates.push(NamedPredicate::new(name, predicate));
        self.runtime.prepared = false;
        self
    }

    pub fn add_invariant(&mut self, name: &str, predicate: Predicate) -> &mut Self {
        self.invariants.push(NamedPredicate::new(name, predicate));
        self.runtime.prepared = false;
        self
    }

    pub fn is_disposed(&self) -> bool {
        self.runtime.disposed
    }

    /// Transitions that survived slicing.
    pub fn active_transitions(&self) -> impl Iterator<Item = &Transition> {
        self.runtime.active.iter().map(|i| &self.transitions[*i])
    }

    pub fn value(&self, state: &ModelState, var: &str) -> Option<Value> {
        let i = self.vars.iter().position(|v| v.name == var)?;
        state.get(i)
    }

    /// An evaluator deciding the propositions of this model: named state
    /// predicates first, then boolean variables.
    pub fn evaluator(&self) -> PredicateEvaluator {
        let index = var_index(&self.vars);
        let predicates = self
            .state_predicates
            .iter()
            .map(|np| {
                let mut p = np.predicate.clone();
                p.resolve(&index);
                (np.name.clone(), p)
            })
            .collect();
        PredicateEvaluator { predicates, index }
    }

    /// Resolve variable references and apply the slicing options.
    fn prepare(&mut self) {
        if self.runtime.prepared {
            return;
        }
        let index = var_index(&self.vars);
        self.transitions.iter_mut().for_each(|t| t.resolve(&index));
        self.invariants.iter_mut().for_each(|i| i.predicate.resolve(&index));
        self.state_predicates.iter_mut().for_each(|p| p.predicate.resolve(&index));

        let visible_vars = self.visible_vars(&self.runtime.options.visible);
        self.runtime.active = if self.runtime.options.slicing {
            self.cone_of_influence(&visible_vars)
        } else {
            (0..self.transitions.len()).collect()
        };
        if self.runtime.active.len() < self.transitions.len() {
            log_info!(
                "{}: slicing kept {} of {} transitions",
                self.name,
                self.runtime.active.len(),
                self.transitions.len()
            );
        }
        self.runtime.visible_vars = visible_vars;
        self.runtime.prepared = true;
    }

    fn visible_vars(&self, visible: &BTreeSet<String>) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        for name in visible {
            match self.state_predicates.iter().find(|p| &p.name == name) {
                Some(p) => vars.extend(p.predicate.support()),
                None => {
                    vars.insert(name.clone());
                }
            }
        }
        vars
    }

    /// The transitions that may influence the given variables, directly or
    /// through the variables their guards and actions read.
    fn cone_of_influence(&self, vars: &BTreeSet<String>) -> Vec<usize> {
        let mut relevant = vars.clone();
        for inv in &self.invariants {
            relevant.extend(inv.predicate.support());
        }
        let mut kept = BTreeSet::new();
        loop {
            let before = kept.len();
            for (i, t) in self.transitions.iter().enumerate() {
                if !kept.contains(&i) && !t.modifies().is_disjoint(&relevant) {
                    kept.insert(i);
                    relevant.extend(t.reads());
                }
            }
            if kept.len() == before {
                break;
            }
        }
        kept.into_iter().collect()
    }

    fn initial_state(&self) -> ModelState {
        ModelState(self.vars.iter().map(|v| v.initial).collect())
    }

    fn satisfies_invariants(&self, state: &ModelState) -> MCResult<bool> {
        for inv in &self.invariants {
            let ok = inv
                .predicate
                .eval(state)
                .map_err(|e| MCError::ProgramStep(format!("invariant {}: {e}", inv.name)))?;
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn enabled(&self, state: &ModelState) -> MCResult<Vec<usize>> {
        let mut enabled = vec![];
        for &i in &self.runtime.active {
            if self.transitions[i].is_enabled(state)? {
                enabled.push(i);
            }
        }
        Ok(enabled)
    }

    fn fire_all(&self, state: &ModelState, transitions: &[usize]) -> MCResult<Vec<ModelState>> {
        let mut next: Vec<ModelState> = vec![];
        for &i in transitions {
            for s in self.transitions[i].fire(state, &self.vars)? {
                if !next.contains(&s) && self.satisfies_invariants(&s)? {
                    next.push(s);
                }
            }
        }
        Ok(next)
    }

    /// The enabled transitions of the first agent that only steps locally
    /// and never touches what another agent or the property looks at,
    /// provided they are fewer than all enabled transitions.
    fn ample_transitions(&self, state: &ModelState) -> MCResult<Option<Vec<usize>>> {
        let enabled = self.enabled(state)?;
        let mut by_agent: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for &i in &self.runtime.active {
            by_agent.entry(self.transitions[i].agent.as_str()).or_default().push(i);
        }

        let bound = self.runtime.options.ample_set_size;
        for (agent, own) in &by_agent {
            let candidate: Vec<usize> = own.iter().copied().filter(|i| enabled.contains(i)).collect();
            if candidate.is_empty() || candidate.len() == enabled.len() {
                continue;
            }
            if bound > 0 && candidate.len() > bound {
                continue;
            }
            let local = own.iter().all(|&i| {
                let t = &self.transitions[i];
                t.kind == TransitionKind::Internal
                    && t.modifies().is_disjoint(&self.runtime.visible_vars)
            });
            if !local {
                continue;
            }
            let independent = own.iter().all(|&i| {
                by_agent
                    .iter()
                    .filter(|(other, _)| *other != agent)
                    .flat_map(|(_, ts)| ts.iter())
                    .all(|&j| self.transitions[i].independent_of(&self.transitions[j]))
            });
            if independent {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

impl ProgramAutomaton for TransitionSystemModel {
    type State = ModelState;

    fn configure(&mut self, options: &ProgramOptions) -> MCResult<()> {
        self.runtime.options = options.clone();
        self.runtime.prepared = false;
        self.runtime.disposed = false;
        self.prepare();
        Ok(())
    }

    fn initial(&mut self) -> MCResult<ModelState> {
        self.prepare();
        let state = self.initial_state();
        if !self.satisfies_invariants(&state)? {
            return Err(MCError::ProgramStep(format!(
                "the initial state of {} violates an invariant",
                self.name
            )));
        }
        Ok(state)
    }

    fn successors(&mut self, state: &ModelState) -> MCResult<Vec<ModelState>> {
        self.prepare();
        let enabled = self.enabled(state)?;
        self.fire_all(state, &enabled)
    }

    fn ample(&mut self, state: &ModelState) -> MCResult<Option<Vec<ModelState>>> {
        self.prepare();
        if !self.runtime.options.partial_order_reduction {
            return Ok(None);
        }
        match self.ample_transitions(state)? {
            Some(ts) => {
                let next = self.fire_all(state, &ts)?;
                Ok(if next.is_empty() { None } else { Some(next) })
            }
            None => Ok(None),
        }
    }

    fn unsupported_constructs(&self) -> Vec<Construct> {
        self.transitions
            .iter()
            .filter_map(|t| {
                let kind = match t.kind {
                    TransitionKind::Internal => return None,
                    TransitionKind::Send | TransitionKind::Receive => ConstructKind::Communication,
                    TransitionKind::Percept => ConstructKind::PerceptRule,
                    TransitionKind::Module => ConstructKind::NestedModule,
                };
                let location = format!("agent `{}`, transition `{}`", t.agent, t.name);
                Some(Construct::new(kind, &location))
            })
            .collect()
    }

    fn dispose(&mut self) {
        if !self.runtime.disposed {
            log_debug!("disposing {}", self.name);
            self.runtime.disposed = true;
        }
    }
}

/// Decides propositions on model states.
#[derive(Debug, Clone, Default)]
pub struct PredicateEvaluator {
    predicates: FxHashMap<String, Predicate>,
    index: FxHashMap<String, usize>,
}

impl Evaluator<ModelState> for PredicateEvaluator {
    fn holds(&mut self, state: &ModelState, proposition: &str) -> MCResult<bool> {
        if let Some(p) = self.predicates.get(proposition) {
            return p.eval(state);
        }
        match self.index.get(proposition).and_then(|i| state.get(*i)) {
            Some(Value::Bool(b)) => Ok(b),
            Some(v) => Err(MCError::Evaluation(format!(
                "`{proposition}` is {v}, not a boolean"
            ))),
            None => Err(MCError::Evaluation(format!(
                "unknown proposition `{proposition}`"
            ))),
        }
    }
}

#[cfg(test)]
mod transition_system_model_test {
    use super::*;

    /// Two agents counting independently, one of them raising `done`.
    fn counters() -> TransitionSystemModel {
        let mut m = TransitionSystemModel::new("counters");
        m.add_variable(Variable::new_int("a", 0, 2, 0))
            .add_variable(Variable::new_int("b", 0, 2, 0))
            .add_variable(Variable::new_boolean("done", false));
        m.add_transition(
            Transition::parse("inc_a", "a != 2", &["a := ?"]).unwrap().with_agent("alice"),
        )
        .add_transition(Transition::parse("inc_b", "b == 0", &["b := 1"]).unwrap().with_agent("bob"))
        .add_transition(Transition::parse("finish", "b == 1", &["done := true"]).unwrap().with_agent("bob"));
        m.add_predicate("finished", Predicate::parse("done").unwrap());
        m
    }

    #[test]
    fn successors_fire_every_enabled_transition() {
        let mut m = counters();
        let s0 = m.initial().unwrap();
        assert_eq!(s0, ModelState(vec![Value::Int(0), Value::Int(0), Value::Bool(false)]));
        let next = m.successors(&s0).unwrap();
        // a := ? gives three states (one of them s0 again), b := 1 one more
        assert_eq!(next.len(), 4);
        assert!(next.contains(&s0));
    }

    #[test]
    fn invariants_prune_states() {
        let mut m = counters();
        m.add_invariant("a_small", Predicate::parse("a != 2").unwrap());
        let s0 = m.initial().unwrap();
        let next = m.successors(&s0).unwrap();
        assert_eq!(next.len(), 3);
        assert!(next.iter().all(|s| m.value(s, "a") != Some(Value::Int(2))));
    }

    #[test]
    fn evaluator_reads_predicates_and_booleans() {
        let m = counters();
        let mut e = m.evaluator();
        let s = ModelState(vec![Value::Int(1), Value::Int(0), Value::Bool(true)]);
        assert!(e.holds(&s, "finished").unwrap());
        assert!(e.holds(&s, "done").unwrap());
        assert!(matches!(e.holds(&s, "a"), Err(MCError::Evaluation(_))));
        assert!(matches!(e.holds(&s, "nope"), Err(MCError::Evaluation(_))));
    }

    #[test]
    fn ample_sets_follow_the_options() {
        let mut m = counters();
        let s0 = m.initial().unwrap();
        assert_eq!(m.ample(&s0).unwrap(), None);

        m.configure(&ProgramOptions {
            partial_order_reduction: true,
            visible: hashset!["finished".to_string()],
            ..Default::default()
        })
        .unwrap();
        // alice never touches what bob or the property reads
        let ample = m.ample(&s0).unwrap().unwrap();
        assert_eq!(ample.len(), 3);
        assert!(ample.iter().all(|s| m.value(s, "b") == Some(Value::Int(0))));

        // a bound of 1 still admits alice's single transition
        m.configure(&ProgramOptions {
            partial_order_reduction: true,
            ample_set_size: 1,
            visible: hashset!["finished".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert!(m.ample(&s0).unwrap().is_some());
    }

    #[test]
    fn visible_or_communicating_agents_get_no_ample_set() {
        let mut m = counters();
        m.configure(&ProgramOptions {
            partial_order_reduction: true,
            visible: hashset!["a".to_string()],
            ..Default::default()
        })
        .unwrap();
        let s0 = m.initial().unwrap();
        // alice writes a visible variable; bob's inc_b is the only other candidate
        let ample = m.ample(&s0).unwrap().unwrap();
        assert_eq!(ample, vec![ModelState(vec![Value::Int(0), Value::Int(1), Value::Bool(false)])]);

        let mut m = counters();
        m.transitions[0].kind = TransitionKind::Send;
        m.transitions[1].kind = TransitionKind::Receive;
        m.configure(&ProgramOptions {
            partial_order_reduction: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(m.ample(&s0).unwrap(), None);
        assert_eq!(m.unsupported_constructs().len(), 2);
        assert!(m
            .unsupported_constructs()
            .iter()
            .all(|c| c.kind == ConstructKind::Communication));
    }

    #[test]
    fn slicing_drops_irrelevant_transitions() {
        let mut m = counters();
        m.configure(&ProgramOptions {
            slicing: true,
            visible: hashset!["finished".to_string()],
            ..Default::default()
        })
        .unwrap();
        let kept: Vec<_> = m.active_transitions().map(|t| t.name.clone()).collect();
        assert_eq!(kept, vec!["inc_b", "finish"]);
    }

    #[test]
    fn dispose_twice() {
        let mut m = counters();
        m.dispose();
        m.dispose();
        assert!(m.is_disposed());
    }

    #[test]
    fn models_load_from_json() {
        let m = counters();
        let json = serde_json::to_string(&m).unwrap();
        let mut back = TransitionSystemModel::from_json(&json).unwrap();
        assert_eq!(back.transitions, m.transitions);
        let s0 = back.initial().unwrap();
        assert_eq!(back.successors(&s0).unwrap().len(), 4);
    }
}

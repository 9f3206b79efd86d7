//! The automaton of a property, expanded on the fly from cover sets.

use crate::cover::{cover, derivable};
use ltl_domain::*;
use std::sync::Arc;

pub struct PropertyAutomaton {
    table: StateTable<PropState, Option<Successors>>,
    initial: StateId,
    formula: Formula,
    /// `X u` and the right argument of `u` for every until sub-formula `u`,
    /// one per acceptance set.
    promises: Vec<(Formula, Formula)>,
    expanded: usize,
    cover_calls: usize,
}

impl PropertyAutomaton {
    /// Automaton for an NNF formula. Its initial state is the dummy
    /// `{X formula}`, whose successors are the cover of `{formula}`.
    pub fn new(formula: Formula) -> Self {
        let mut table = StateTable::new();
        let (initial, _) = table.insert(PropState::new(hashset![Formula::next(formula.clone())]));
        let promises = formula
            .untils()
            .into_iter()
            .filter_map(|u| match &u {
                Formula::Until(_, r) => Some((Formula::next(u.clone()), r.as_ref().clone())),
                _ => None,
            })
            .collect();
        PropertyAutomaton {
            table,
            initial,
            formula,
            promises,
            expanded: 0,
            cover_calls: 0,
        }
    }

    /// Automaton accepting the runs that violate `property`.
    pub fn for_property(property: &Formula) -> Self {
        Self::new(property.negate())
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn is_initial(&self, id: StateId) -> bool {
        id == self.initial
    }

    /// Number of generalized acceptance sets, zero when every state accepts.
    pub fn acceptance_count(&self) -> usize {
        self.promises.len()
    }

    /// Is `state` in acceptance set `set`? A state is in the set of an
    /// until formula `l U r` when it does not carry `X (l U r)` into the next
    /// step, or when `r` already holds in it.
    pub fn accepts(&self, state: StateId, set: usize) -> bool {
        match self.promises.get(set) {
            Some((promise, right)) => {
                let formulas = self.table.get(state).formulas();
                if !formulas.contains(promise) {
                    return true;
                }
                let mut context = formulas.clone();
                context.insert(Formula::True);
                derivable(right, &context)
            }
            None => true,
        }
    }

    pub fn cover_calls(&self) -> usize {
        self.cover_calls
    }

    pub fn stored(&self) -> usize {
        self.table.len()
    }

    pub fn collisions(&self) -> usize {
        self.table.collisions()
    }
}

impl Automaton for PropertyAutomaton {
    type State = PropState;

    fn initial(&mut self) -> MCResult<StateId> {
        Ok(self.initial)
    }

    fn successors(&mut self, state: StateId) -> MCResult<Successors> {
        if let Some(succ) = self.table.info(state) {
            return Ok(succ.clone());
        }
        self.cover_calls += 1;
        let next = cover(&self.table.get(state).next_args());
        let ids: Vec<StateId> = next.into_iter().map(|s| self.table.insert(s).0).collect();
        let succ: Successors = Arc::from(ids);
        *self.table.info_mut(state) = Some(succ.clone());
        self.expanded += 1;
        Ok(succ)
    }

    fn is_expanded(&self, state: StateId) -> bool {
        self.table.info(state).is_some()
    }

    fn state(&self, id: StateId) -> &PropState {
        self.table.get(id)
    }

    fn size(&self) -> usize {
        self.expanded
    }
}

#[cfg(test)]
mod property_automaton_test {
    use super::*;

    fn p() -> Formula {
        Formula::prop("p")
    }

    #[test]
    fn dummy_leads_to_cover_of_source() {
        let f = Formula::until(p(), Formula::prop("q"));
        let mut a = PropertyAutomaton::new(f.clone());
        let init = a.initial().unwrap();
        assert!(a.is_initial(init));
        assert_eq!(a.state(init).formulas(), &hashset![Formula::next(f.clone())]);
        assert!(a.state(init).literals().is_empty());

        let succ = a.successors(init).unwrap();
        let states: Vec<_> = succ.iter().map(|s| a.state(*s).clone()).collect();
        assert_eq!(states.len(), 2);
        assert!(states.contains(&PropState::new(hashset![Formula::prop("q")])));
    }

    #[test]
    fn successors_are_memoized() {
        let mut a = PropertyAutomaton::for_property(&Formula::eventually(p()));
        let init = a.initial().unwrap();
        let s1 = a.successors(init).unwrap();
        let s2 = a.successors(init).unwrap();
        assert!(Arc::ptr_eq(&s1, &s2));
        assert_eq!(a.cover_calls(), 1);
        assert_eq!(a.size(), 1);
        assert!(a.is_expanded(init));

        let child = s1[0];
        assert!(!a.is_expanded(child));
        a.successors(child).unwrap();
        a.successors(child).unwrap();
        assert_eq!(a.cover_calls(), 2);
    }

    #[test]
    fn generate_expands_everything() {
        // !G p is F !p: the dummy {X F !p}, {!p} and {}
        let mut a = PropertyAutomaton::for_property(&Formula::always(p()));
        let reachable = a.generate().unwrap();
        assert_eq!(reachable, a.stored());
        assert_eq!(a.size(), reachable);
        assert_eq!(a.cover_calls(), reachable);
        assert!(a.stored() >= 3);
        let again = a.generate().unwrap();
        assert_eq!(again, reachable);
        assert_eq!(a.cover_calls(), reachable);
    }

    #[test]
    fn acceptance_follows_until_promises() {
        let f = Formula::eventually(p());
        let mut a = PropertyAutomaton::new(f.clone());
        assert_eq!(a.acceptance_count(), 1);
        let init = a.initial().unwrap();
        let succ = a.successors(init).unwrap();
        for s in succ.iter() {
            let pending = a.state(*s).contains(&Formula::next(f.clone()));
            assert_eq!(a.accepts(*s, 0), !pending);
        }

        // the promise of F q is also carried when q holds, the step that
        // fulfils it must still accept
        let gxf = Formula::always(Formula::next(Formula::eventually(Formula::prop("q"))));
        let mut a = PropertyAutomaton::new(gxf);
        let init = a.initial().unwrap();
        let first = a.successors(init).unwrap()[0];
        let next = a.successors(first).unwrap();
        let fulfilled: Vec<_> = next
            .iter()
            .filter(|s| a.state(**s).literals().contains(&Formula::prop("q")))
            .collect();
        assert!(!fulfilled.is_empty());
        for s in next.iter() {
            let q_holds = fulfilled.contains(&s);
            assert_eq!(a.accepts(*s, 0), q_holds);
        }

        let g = PropertyAutomaton::new(Formula::always(p()));
        assert_eq!(g.acceptance_count(), 0);
        assert!(g.accepts(StateId(0), 0));
    }
}

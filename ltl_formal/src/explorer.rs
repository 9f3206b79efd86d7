//! Nested depth first search for accepting cycles in the product of a
//! program and a property automaton.
//!
//! The outer search is a plain DFS; when it leaves an accepting node it
//! starts an inner search from it, which succeeds as soon as it reaches a
//! node that is still on the outer stack. Both searches are iterative and
//! expand automata states only when a product node is first entered.
//!
//! Acceptance is generalized Büchi (one set per until formula) and is
//! degeneralized with a phase counter stored in the product node.

use crate::program_view::ProgramView;
use crate::property_automaton::PropertyAutomaton;
use ltl_domain::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductNode {
    pub program: StateId,
    pub property: StateId,
    pub phase: u32,
    /// The search root takes no program step.
    pub root: bool,
}

impl StateDigest for ProductNode {
    fn digest(&self) -> Digest {
        let mut key = Vec::with_capacity(13);
        key.extend_from_slice(&self.program.0.to_le_bytes());
        key.extend_from_slice(&self.property.0.to_le_bytes());
        key.extend_from_slice(&self.phase.to_le_bytes());
        key.push(self.root as u8);
        Digest::from_key(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    outer: bool,
    inner: bool,
    on_stack: bool,
    /// `Some(true)` when the outer search expanded the node with an ample set.
    reduced: Option<bool>,
    successors: Option<Successors>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductState<S> {
    pub program: S,
    pub property: PropState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample<S> {
    /// From the root to the accepting node that seeded the cycle search.
    pub prefix: Vec<ProductState<S>>,
    /// From the seed to the node of `prefix` that closes the cycle.
    pub cycle: Vec<ProductState<S>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict<S> {
    Pass,
    Violation(Counterexample<S>),
    Cancelled,
}

impl<S> Verdict<S> {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Verdict::Violation(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationStats {
    /// Product nodes stored.
    pub product_nodes: usize,
    /// Product nodes entered by the outer search.
    pub visited_nodes: usize,
    /// Expanded states of the program and property automata.
    pub program_states: usize,
    pub property_states: usize,
    pub evaluated_states: usize,
    pub transitions: usize,
    pub inner_searches: usize,
    /// Nodes expanded with an ample set.
    pub reduced_nodes: usize,
    pub collisions: usize,
    pub max_depth: usize,
}

struct Frame {
    node: StateId,
    succ: Successors,
    next: usize,
}

pub struct Explorer<P: ProgramAutomaton, E> {
    program: ProgramView<P, E>,
    property: PropertyAutomaton,
    nodes: StateTable<ProductNode, NodeInfo>,
    /// The outer stack, i.e. the first search path.
    stack: Vec<StateId>,
    por: bool,
    print_search_tree: bool,
    counters: ExplorationStats,
}

impl<P, E> Explorer<P, E>
where
    P: ProgramAutomaton,
    E: Evaluator<P::State>,
{
    pub fn new(program: ProgramView<P, E>, property: PropertyAutomaton) -> Self {
        Explorer {
            program,
            property,
            nodes: StateTable::new(),
            stack: vec![],
            por: false,
            print_search_tree: false,
            counters: ExplorationStats::default(),
        }
    }

    pub fn with_por(mut self, on: bool) -> Self {
        self.por = on;
        self
    }

    pub fn with_search_tree(mut self, on: bool) -> Self {
        self.print_search_tree = on;
        self
    }

    pub fn program(&self) -> &ProgramView<P, E> {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut ProgramView<P, E> {
        &mut self.program
    }

    pub fn property(&self) -> &PropertyAutomaton {
        &self.property
    }

    /// Expand the automata up front instead of during the search.
    pub fn generate(&mut self, program: bool, property: bool) -> MCResult<()> {
        self.generate_with(program, property, |_| true).map(|_| ())
    }

    /// Like `generate`, calling `tick` before every expansion. Returns false
    /// when `tick` stopped the generation.
    pub fn generate_with<F>(&mut self, program: bool, property: bool, mut tick: F) -> MCResult<bool>
    where
        F: FnMut(&Self) -> bool,
    {
        if program {
            match self.expand_all(true, &mut tick)? {
                Some(n) => log_debug!("generated {n} program states"),
                None => return Ok(false),
            }
        }
        if property {
            match self.expand_all(false, &mut tick)? {
                Some(n) => log_debug!("generated {n} property states"),
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Expand every reachable state of one automaton, `None` if cancelled.
    fn expand_all<F>(&mut self, program: bool, tick: &mut F) -> MCResult<Option<usize>>
    where
        F: FnMut(&Self) -> bool,
    {
        let initial = if program {
            self.program.initial()?
        } else {
            self.property.initial()?
        };
        let mut seen = FxHashSet::default();
        let mut stack = vec![initial];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if !tick(&*self) {
                return Ok(None);
            }
            let succ = if program {
                self.program.successors(id)?
            } else {
                self.property.successors(id)?
            };
            stack.extend(succ.iter().copied().filter(|s| !seen.contains(s)));
        }
        Ok(Some(seen.len()))
    }

    pub fn explore(&mut self) -> MCResult<Verdict<P::State>> {
        self.explore_with(|_| true)
    }

    /// Search for an accepting cycle. `tick` is called before every search
    /// step; returning false stops the search with `Verdict::Cancelled`.
    pub fn explore_with<F>(&mut self, mut tick: F) -> MCResult<Verdict<P::State>>
    where
        F: FnMut(&Self) -> bool,
    {
        self.nodes.clear();
        self.stack.clear();
        self.counters = ExplorationStats::default();

        let root = self.root()?;
        let mut frames = vec![self.enter(root)?];
        while let Some(top) = frames.last_mut() {
            if !tick(&*self) {
                return Ok(Verdict::Cancelled);
            }
            if top.next < top.succ.len() {
                let n = top.succ[top.next];
                top.next += 1;
                self.counters.transitions += 1;
                if !self.nodes.info(n).outer {
                    let frame = self.enter(n)?;
                    frames.push(frame);
                }
            } else {
                let node = top.node;
                frames.pop();
                if self.is_accepting(node) {
                    if let Some(verdict) = self.inner(node, &mut tick)? {
                        return Ok(verdict);
                    }
                }
                self.nodes.info_mut(node).on_stack = false;
                self.stack.pop();
            }
        }
        Ok(Verdict::Pass)
    }

    fn inner<F>(&mut self, seed: StateId, tick: &mut F) -> MCResult<Option<Verdict<P::State>>>
    where
        F: FnMut(&Self) -> bool,
    {
        self.counters.inner_searches += 1;
        self.nodes.info_mut(seed).inner = true;
        let succ = self.expand(seed)?;
        let mut frames = vec![Frame {
            node: seed,
            succ,
            next: 0,
        }];
        while let Some(top) = frames.last_mut() {
            if !tick(&*self) {
                return Ok(Some(Verdict::Cancelled));
            }
            if top.next < top.succ.len() {
                let n = top.succ[top.next];
                top.next += 1;
                self.counters.transitions += 1;
                if self.nodes.info(n).on_stack {
                    let mut cycle: Vec<StateId> = frames.iter().map(|f| f.node).collect();
                    cycle.push(n);
                    let cex = self.counterexample(&cycle);
                    return Ok(Some(Verdict::Violation(cex)));
                }
                if !self.nodes.info(n).inner {
                    self.nodes.info_mut(n).inner = true;
                    let succ = self.expand(n)?;
                    frames.push(Frame {
                        node: n,
                        succ,
                        next: 0,
                    });
                }
            } else {
                frames.pop();
            }
        }
        Ok(None)
    }

    fn root(&mut self) -> MCResult<StateId> {
        let program = self.program.initial()?;
        let property = self.property.initial()?;
        let (id, _) = self.nodes.insert(ProductNode {
            program,
            property,
            phase: 0,
            root: true,
        });
        Ok(id)
    }

    fn enter(&mut self, node: StateId) -> MCResult<Frame> {
        let info = self.nodes.info_mut(node);
        info.outer = true;
        info.on_stack = true;
        self.stack.push(node);
        self.counters.visited_nodes += 1;
        self.counters.max_depth = self.counters.max_depth.max(self.stack.len());
        if self.print_search_tree {
            self.log_node(node);
        }
        let succ = self.expand(node)?;
        Ok(Frame { node, succ, next: 0 })
    }

    /// Product successors of a node, computed once. With POR the program's
    /// ample set is used when it yields successors and none of them is on
    /// the outer stack.
    fn expand(&mut self, id: StateId) -> MCResult<Successors> {
        if let Some(succ) = &self.nodes.info(id).successors {
            return Ok(succ.clone());
        }
        let node = *self.nodes.get(id);

        let mut reduced = None;
        if self.por && !node.root {
            if let Some(ample) = self.program.ample(node.program)? {
                let next = self.product_successors(&node, &ample)?;
                let closes_cycle = next.iter().any(|n| {
                    self.nodes
                        .lookup(n)
                        .map_or(false, |id| self.nodes.info(id).on_stack)
                });
                if !next.is_empty() && !closes_cycle {
                    reduced = Some(next);
                }
            }
        }

        let was_reduced = reduced.is_some();
        let next = match reduced {
            Some(next) => {
                self.counters.reduced_nodes += 1;
                next
            }
            None => {
                let program_succ = if node.root {
                    Arc::from(vec![node.program])
                } else {
                    self.program.successors(node.program)?
                };
                self.product_successors(&node, &program_succ)?
            }
        };

        let ids: Vec<StateId> = next.into_iter().map(|n| self.nodes.insert(n).0).collect();
        let succ: Successors = Arc::from(ids);
        let info = self.nodes.info_mut(id);
        info.reduced = Some(was_reduced);
        info.successors = Some(succ.clone());
        Ok(succ)
    }

    fn product_successors(
        &mut self,
        node: &ProductNode,
        program_succ: &[StateId],
    ) -> MCResult<Vec<ProductNode>> {
        let phase = self.next_phase(node);
        let property_succ = self.property.successors(node.property)?;
        let mut next = vec![];
        for &q in property_succ.iter() {
            let literals = self.property.state(q).literals();
            for &s in program_succ {
                if self.program.entails_all(s, &literals)? {
                    next.push(ProductNode {
                        program: s,
                        property: q,
                        phase,
                        root: false,
                    });
                }
            }
        }
        Ok(next)
    }

    fn next_phase(&self, node: &ProductNode) -> u32 {
        let k = self.property.acceptance_count() as u32;
        if node.root || k == 0 {
            0
        } else if self.property.accepts(node.property, node.phase as usize) {
            (node.phase + 1) % k
        } else {
            node.phase
        }
    }

    fn is_accepting(&self, id: StateId) -> bool {
        let node = self.nodes.get(id);
        !node.root
            && (self.property.acceptance_count() == 0
                || (node.phase == 0 && self.property.accepts(node.property, 0)))
    }

    fn product_state(&self, id: StateId) -> ProductState<P::State> {
        let node = self.nodes.get(id);
        ProductState {
            program: self.program.state(node.program).clone(),
            property: self.property.state(node.property).clone(),
        }
    }

    fn counterexample(&self, cycle: &[StateId]) -> Counterexample<P::State> {
        Counterexample {
            prefix: self.stack.iter().map(|id| self.product_state(*id)).collect(),
            cycle: cycle.iter().map(|id| self.product_state(*id)).collect(),
        }
    }

    /// The current outer stack, root first.
    pub fn first_search_path(&self) -> Vec<ProductState<P::State>> {
        self.stack.iter().map(|id| self.product_state(*id)).collect()
    }

    /// Was the node expanded with an ample set? `None` for nodes the outer
    /// search has not expanded.
    pub fn was_reduced(&self, node: &ProductNode) -> Option<bool> {
        self.nodes.lookup(node).and_then(|id| self.nodes.info(id).reduced)
    }

    pub fn stats(&self) -> ExplorationStats {
        ExplorationStats {
            product_nodes: self.nodes.len(),
            program_states: self.program.size(),
            property_states: self.property.size(),
            evaluated_states: self.program.evaluated_states(),
            collisions: self.nodes.collisions()
                + self.program.collisions()
                + self.property.collisions(),
            ..self.counters
        }
    }

    fn log_node(&self, id: StateId) {
        let node = self.nodes.get(id);
        let indent = 2 * self.stack.len().saturating_sub(1);
        log_debug!(
            "{:indent$}{:?} {} [{}]",
            "",
            self.program.state(node.program),
            self.property.state(node.property),
            node.phase,
            indent = indent
        );
    }
}

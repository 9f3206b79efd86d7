//! An explicit program automaton: numbered nodes, edges and a set of true
//! propositions per node. Handy for planting exactly the runs a check
//! should or should not find.

use super::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node(pub u32);

impl StateDigest for Node {
    fn digest(&self) -> Digest {
        Digest::from_key(self.0.to_le_bytes().to_vec())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphProgram {
    initial: u32,
    edges: BTreeMap<u32, Vec<u32>>,
    ample: BTreeMap<u32, Vec<u32>>,
    labels: BTreeMap<u32, BTreeSet<String>>,
    constructs: Vec<Construct>,
    options: ProgramOptions,
    disposals: usize,
}

impl GraphProgram {
    pub fn new(initial: u32) -> Self {
        GraphProgram {
            initial,
            ..Default::default()
        }
    }

    pub fn edge(&mut self, from: u32, to: u32) -> &mut Self {
        self.edges.entry(from).or_default().push(to);
        self
    }

    pub fn label(&mut self, node: u32, proposition: &str) -> &mut Self {
        self.labels
            .entry(node)
            .or_default()
            .insert(proposition.to_string());
        self
    }

    /// Offer `to` as the reduced successors of `from`.
    pub fn ample_set(&mut self, from: u32, to: &[u32]) -> &mut Self {
        self.ample.insert(from, to.to_vec());
        self
    }

    pub fn construct(&mut self, construct: Construct) -> &mut Self {
        self.constructs.push(construct);
        self
    }

    pub fn labels(&self) -> LabelEvaluator {
        LabelEvaluator {
            labels: self.labels.clone(),
        }
    }

    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    /// How many times `dispose` released the program.
    pub fn disposals(&self) -> usize {
        self.disposals
    }
}

impl ProgramAutomaton for GraphProgram {
    type State = Node;

    fn configure(&mut self, options: &ProgramOptions) -> MCResult<()> {
        self.options = options.clone();
        Ok(())
    }

    fn initial(&mut self) -> MCResult<Node> {
        Ok(Node(self.initial))
    }

    fn successors(&mut self, state: &Node) -> MCResult<Vec<Node>> {
        Ok(self
            .edges
            .get(&state.0)
            .map(|to| to.iter().map(|n| Node(*n)).collect())
            .unwrap_or_default())
    }

    fn ample(&mut self, state: &Node) -> MCResult<Option<Vec<Node>>> {
        Ok(self
            .ample
            .get(&state.0)
            .map(|to| to.iter().map(|n| Node(*n)).collect()))
    }

    fn unsupported_constructs(&self) -> Vec<Construct> {
        self.constructs.clone()
    }

    fn dispose(&mut self) {
        self.disposals += 1;
    }
}

/// Propositions are the labels of a node; unlabelled nodes satisfy none.
#[derive(Debug, Clone, Default)]
pub struct LabelEvaluator {
    labels: BTreeMap<u32, BTreeSet<String>>,
}

impl Evaluator<Node> for LabelEvaluator {
    fn holds(&mut self, state: &Node, proposition: &str) -> MCResult<bool> {
        Ok(self
            .labels
            .get(&state.0)
            .map_or(false, |l| l.contains(proposition)))
    }
}

use super::*;
use std::collections::BTreeSet;
use std::fmt;

/// A state of the property automaton: a set of elementary formulas, the
/// literals that must hold now and the `Next` obligations for the step
/// after.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PropState {
    formulas: BTreeSet<Formula>,
}

impl PropState {
    pub fn new(formulas: BTreeSet<Formula>) -> Self {
        PropState { formulas }
    }

    pub fn formulas(&self) -> &BTreeSet<Formula> {
        &self.formulas
    }

    pub fn contains(&self, f: &Formula) -> bool {
        self.formulas.contains(f)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// The literals of this state, in set order.
    pub fn literals(&self) -> Vec<Formula> {
        self.formulas
            .iter()
            .filter(|f| f.is_literal())
            .cloned()
            .collect()
    }

    /// Arguments of the `Next` terms, the obligations of the successors.
    pub fn next_args(&self) -> BTreeSet<Formula> {
        self.formulas
            .iter()
            .filter_map(|f| match f {
                Formula::Next(arg) => Some(arg.as_ref().clone()),
                _ => None,
            })
            .collect()
    }
}

impl From<BTreeSet<Formula>> for PropState {
    fn from(formulas: BTreeSet<Formula>) -> Self {
        PropState::new(formulas)
    }
}

impl StateDigest for PropState {
    fn digest(&self) -> Digest {
        let sum = self
            .formulas
            .iter()
            .fold(0u32, |acc, f| acc.wrapping_add(f.fx_hash()));
        Digest::from_seeds(sum, self.formulas.len() as u32)
    }
}

impl fmt::Display for PropState {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<_> = self.formulas.iter().map(|f| format!("{f}")).collect();
        write!(fmtr, "{{{}}}", children.join(", "))
    }
}

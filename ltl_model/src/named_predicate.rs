use super::*;

/// Simply a predicate with a name attached. Named state predicates are the
/// propositions of a transition system model.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct NamedPredicate {
    pub name: String,
    pub predicate: Predicate,
}

impl NamedPredicate {
    pub fn new(name: &str, predicate: Predicate) -> Self {
        Self {
            name: name.to_string(),
            predicate,
        }
    }
}

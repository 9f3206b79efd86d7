//! A hash indexed state table.
//!
//! Every state is stored exactly once in an arena and from then on referred
//! to by a `StateId`. The index is keyed by the packed Jenkins hash codes of
//! the state's digest, so a lookup costs one digest, one map probe and one
//! structural comparison. States whose digests land in an occupied bucket go
//! to an overflow list and are counted as collisions; they are still told
//! apart by `Eq`.
//!
//! Each id also owns an auxiliary value `V` for whatever bookkeeping the
//! owner needs (memoized successors, search flags, ...).

use super::*;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmtr, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct StateTable<S, V = ()> {
    states: Vec<S>,
    info: Vec<V>,
    index: FxHashMap<u64, StateId>,
    overflow: FxHashMap<u64, Vec<StateId>>,
    collisions: usize,
}

impl<S, V> Default for StateTable<S, V> {
    fn default() -> Self {
        StateTable {
            states: vec![],
            info: vec![],
            index: FxHashMap::default(),
            overflow: FxHashMap::default(),
            collisions: 0,
        }
    }
}

impl<S: StateDigest + Eq, V: Default> StateTable<S, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, bucket: u64, state: &S) -> Option<StateId> {
        let first = *self.index.get(&bucket)?;
        if self.states[first.index()] == *state {
            return Some(first);
        }
        self.overflow
            .get(&bucket)?
            .iter()
            .copied()
            .find(|id| self.states[id.index()] == *state)
    }

    pub fn lookup(&self, state: &S) -> Option<StateId> {
        self.find(state.digest().bucket(), state)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.lookup(state).is_some()
    }

    /// Insert a state unless an equal one is already stored. Returns the id
    /// and whether the state was new.
    pub fn insert(&mut self, state: S) -> (StateId, bool) {
        let bucket = state.digest().bucket();
        if let Some(id) = self.find(bucket, &state) {
            return (id, false);
        }

        let id = StateId(self.states.len() as u32);
        self.states.push(state);
        self.info.push(V::default());
        match self.index.entry(bucket) {
            Entry::Vacant(e) => {
                e.insert(id);
            }
            Entry::Occupied(_) => {
                self.collisions += 1;
                self.overflow.entry(bucket).or_default().push(id);
            }
        }
        (id, true)
    }
}

impl<S, V> StateTable<S, V> {
    pub fn get(&self, id: StateId) -> &S {
        &self.states[id.index()]
    }

    pub fn info(&self, id: StateId) -> &V {
        &self.info[id.index()]
    }

    pub fn info_mut(&mut self, id: StateId) -> &mut V {
        &mut self.info[id.index()]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of stored states that share a bucket with an earlier,
    /// structurally different state.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len() as u32).map(StateId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &S, &V)> {
        self.states
            .iter()
            .zip(self.info.iter())
            .enumerate()
            .map(|(i, (s, v))| (StateId(i as u32), s, v))
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.info.clear();
        self.index.clear();
        self.overflow.clear();
        self.collisions = 0;
    }
}

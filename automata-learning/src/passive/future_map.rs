use std::{
    collections::{btree_map, BTreeMap, BTreeSet},
    fmt::Display,
};

use automata::prelude::*;
use tracing::debug;

use super::future::{Future, KFutures};
use crate::KTailError;

/// Maps the k-future of every state that has a successor to the set of k-futures of its
/// successors. Reading every future as a state, this is the adjacency structure of the
/// automaton in which all k-tail equivalent states are merged, just without transition labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FutureMap<S> {
    k: usize,
    map: BTreeMap<Future<S>, BTreeSet<Future<S>>>,
}

impl<S: Symbol> FutureMap<S> {
    /// Wraps an existing mapping, computed with bound `k`.
    pub fn from_map(k: usize, map: BTreeMap<Future<S>, BTreeSet<Future<S>>>) -> Self {
        Self { k, map }
    }

    /// The bound with which the futures were computed.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Iterates over the entries, ordered by source signature.
    pub fn iter(&self) -> btree_map::Iter<'_, Future<S>, BTreeSet<Future<S>>> {
        self.map.iter()
    }

    /// The number of source signatures.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no state has a successor.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All signatures that occur as a source or as a successor. These are the states of the
    /// merged automaton.
    pub fn signatures(&self) -> BTreeSet<&Future<S>> {
        self.map
            .iter()
            .flat_map(|(source, targets)| std::iter::once(source).chain(targets))
            .collect()
    }

    /// Gives back the underlying mapping.
    pub fn into_inner(self) -> BTreeMap<Future<S>, BTreeSet<Future<S>>> {
        self.map
    }
}

impl<'a, S> IntoIterator for &'a FutureMap<S> {
    type Item = (&'a Future<S>, &'a BTreeSet<Future<S>>);
    type IntoIter = btree_map::Iter<'a, Future<S>, BTreeSet<Future<S>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl<S: Symbol> Display for FutureMap<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (source, targets) in &self.map {
            writeln!(f, "{} -> {}", source.show(), targets.show())?;
        }
        Ok(())
    }
}

/// Computes the [`FutureMap`] of `automaton` for bound `k`: for every state `q` and every
/// successor `p` of `q`, the k-future of `p` is added to the entry of the k-future of `q`.
/// States with equal futures thereby share one entry. Fails if `k` is zero.
pub fn future_map<S: Symbol, Q: StateId>(
    automaton: &Automaton<S, Q>,
    k: usize,
) -> Result<FutureMap<S>, KTailError> {
    let futures = KFutures::new(automaton, k)?;
    let mut map: BTreeMap<Future<S>, BTreeSet<Future<S>>> = BTreeMap::new();

    for state in automaton.states() {
        let successors = automaton.next_states(state);
        if successors.is_empty() {
            continue;
        }
        let source = futures.of(state);
        let targets = map.entry(source).or_default();
        for next in &successors {
            targets.insert(futures.of(next));
        }
    }

    debug!(
        "future map for k = {k} has {} entries over {} states",
        map.len(),
        automaton.size()
    );
    Ok(FutureMap { k, map })
}

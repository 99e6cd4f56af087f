use std::collections::{BTreeMap, BTreeSet};

use automata::{math::Partition, prelude::*};
use tracing::{debug, trace};

use crate::KTailError;

/// The k-future of a state: all symbol sequences of length `1..=k` that label a path
/// starting in the state. Sequences shorter than `k` appear when a path ends early, and
/// every prefix of a contained sequence is contained as well.
///
/// Being an ordered set, a future can be compared, hashed and used as a key, which is
/// how it serves as the identity (signature) of a merged state.
pub type Future<S> = BTreeSet<Vec<S>>;

/// Computes the k-futures of all states at once. Starting from the 1-futures, the futures of
/// length `j` are obtained from those of length `j - 1`. Once no future changes from one
/// length to the next, none changes for any larger length either, so the iteration stops
/// there. On acyclic automata this happens after the length of the longest path.
fn futures_of_all_states<S: Symbol, Q: StateId>(
    automaton: &Automaton<S, Q>,
    k: usize,
) -> math::Map<Q, Future<S>> {
    debug_assert!(k > 0);
    let mut futures: math::Map<Q, Future<S>> = automaton
        .states()
        .iter()
        .map(|state| {
            let future = automaton
                .edges_from(state)
                .map(|(symbol, _)| vec![symbol.clone()])
                .collect();
            (state.clone(), future)
        })
        .collect();

    for length in 2..=k {
        let extended: math::Map<Q, Future<S>> = futures
            .iter()
            .map(|(state, shorter)| {
                let mut future = shorter.clone();
                for (symbol, targets) in automaton.edges_from(state) {
                    let suffixes = targets
                        .iter()
                        .filter_map(|target| futures.get(target))
                        .flatten();
                    for suffix in suffixes {
                        let mut sequence = Vec::with_capacity(suffix.len() + 1);
                        sequence.push(symbol.clone());
                        sequence.extend(suffix.iter().cloned());
                        future.insert(sequence);
                    }
                }
                (state.clone(), future)
            })
            .collect();
        if extended == futures {
            debug!("futures are saturated at length {}, bound is {k}", length - 1);
            break;
        }
        futures = extended;
    }
    futures
}

/// Computes the k-future of `state` in `automaton`, see [`Future`]. For `k = 1` these are the
/// symbols on which `state` has a transition; for larger `k`, the (k-1)-future of `state` is
/// extended by every transition `state -a-> p` followed by a sequence of the (k-1)-future of `p`.
/// States without outgoing transitions have an empty future for every `k`.
///
/// The number of sequences, and therefore the cost, can grow with the branching factor of the
/// automaton raised to the power `k`, so `k` should be chosen conservatively for automata with
/// many branches or loops. On acyclic automata, bounds beyond the longest path cost nothing
/// extra. Fails if `k` is zero.
pub fn k_future<S: Symbol, Q: StateId>(
    automaton: &Automaton<S, Q>,
    k: usize,
    state: &Q,
) -> Result<Future<S>, KTailError> {
    if k == 0 {
        return Err(KTailError::ZeroBound);
    }
    Ok(futures_of_all_states(automaton, k)
        .remove(state)
        .unwrap_or_default())
}

/// The k-futures of all states of a fixed automaton, computed once for a given bound.
#[derive(Debug, Clone)]
pub struct KFutures<S: Symbol, Q: StateId> {
    k: usize,
    futures: math::Map<Q, Future<S>>,
}

impl<S: Symbol, Q: StateId> KFutures<S, Q> {
    /// Computes the futures of all states, fails if `k` is zero.
    pub fn new(automaton: &Automaton<S, Q>, k: usize) -> Result<Self, KTailError> {
        if k == 0 {
            return Err(KTailError::ZeroBound);
        }
        Ok(Self {
            k,
            futures: futures_of_all_states(automaton, k),
        })
    }

    /// The bound.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the k-future of `state`, which is empty for states of other automata.
    pub fn of(&self, state: &Q) -> Future<S> {
        let future = self.futures.get(state).cloned().unwrap_or_default();
        trace!("future_{}({}) = {}", self.k, state.show(), future.show());
        future
    }
}

/// Groups the states of `automaton` by their k-future. Two states end up in the same class
/// precisely if they are k-tail equivalent. Classes are ordered by their future.
pub fn equivalence_classes<S: Symbol, Q: StateId>(
    automaton: &Automaton<S, Q>,
    k: usize,
) -> Result<Partition<Q>, KTailError> {
    let futures = KFutures::new(automaton, k)?;
    let mut classes: BTreeMap<Future<S>, BTreeSet<Q>> = BTreeMap::new();
    for state in automaton.states() {
        classes
            .entry(futures.of(state))
            .or_default()
            .insert(state.clone());
    }
    Ok(Partition::from(classes.into_values().collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
    use automata::prelude::*;

    use super::{equivalence_classes, k_future, Future, KFutures};
    use crate::KTailError;

    fn future(sequences: &[&str]) -> Future<String> {
        sequences
            .iter()
            .map(|s| s.split(' ').map(str::to_string).collect())
            .collect()
    }

    fn branching() -> Automaton {
        Automaton::new("s1")
            .with_transitions([
                ("s1", "a", "s2"),
                ("s1", "a", "s5"),
                ("s2", "b", "s3"),
                ("s3", "c", "s4"),
                ("s5", "d", "s5"),
                ("s5", "e", "s6"),
            ])
            .with_final_states(["s4", "s6"])
    }

    #[test]
    fn futures_of_branching_automaton() {
        let nfa = branching();
        let of = |k: usize, state: &str| k_future(&nfa, k, &state.to_string()).unwrap();

        assert_eq!(of(1, "s1"), future(&["a"]));
        assert_eq!(of(2, "s1"), future(&["a", "a b", "a d", "a e"]));
        assert_eq!(
            of(3, "s1"),
            future(&["a", "a b", "a d", "a e", "a b c", "a d d", "a d e"])
        );
        assert_eq!(
            of(4, "s1"),
            future(&[
                "a", "a b", "a d", "a e", "a b c", "a d d", "a d e", "a d d e", "a d d d"
            ])
        );
        assert_eq!(
            of(3, "s5"),
            future(&["d", "e", "d d", "d e", "d d d", "d d e"])
        );
        assert_eq!(of(1, "s3"), future(&["c"]));
        assert_eq!(of(2, "s3"), future(&["c"]));
        assert_eq!(of(1, "s4"), future(&[]));
    }

    #[test]
    fn futures_grow_with_k() {
        let nfa = branching();
        for state in nfa.states() {
            let mut previous = k_future(&nfa, 1, state).unwrap();
            for k in 2..6 {
                let current = k_future(&nfa, k, state).unwrap();
                assert!(current.is_superset(&previous), "{state} at k = {k}");
                assert!(current.iter().all(|seq| !seq.is_empty() && seq.len() <= k));
                previous = current;
            }
        }
    }

    #[test]
    fn states_without_transitions_have_no_future() {
        let nfa = branching();
        for k in 1..5 {
            assert!(k_future(&nfa, k, &"s6".to_string()).unwrap().is_empty());
            assert!(k_future(&nfa, k, &"unknown".to_string()).unwrap().is_empty());
        }
    }

    #[test]
    fn zero_bound_is_rejected() {
        let nfa = branching();
        assert_eq!(
            k_future(&nfa, 0, &"s1".to_string()),
            Err(KTailError::ZeroBound)
        );
        assert!(KFutures::new(&nfa, 0).is_err());
    }

    #[test]
    fn precomputed_futures_agree() {
        let nfa = branching();
        let futures = KFutures::new(&nfa, 3).unwrap();
        for state in nfa.states() {
            assert_eq!(futures.of(state), k_future(&nfa, 3, state).unwrap());
            assert_eq!(futures.of(state), k_future(&nfa, 3, state).unwrap());
        }
        assert_eq!(futures.k(), 3);
    }

    #[test_log::test]
    fn huge_bounds_saturate_on_acyclic_automata() {
        let chain: Automaton = Automaton::new("c0").with_transitions([
            ("c0", "x", "c1"),
            ("c1", "y", "c2"),
            ("c1", "z", "c3"),
            ("c2", "y", "c3"),
        ]);
        let saturated = k_future(&chain, 3, &"c0".to_string()).unwrap();
        assert_eq!(saturated, future(&["x", "x y", "x z", "x y y"]));
        for k in [4, 1_000, 100_000] {
            assert_eq!(k_future(&chain, k, &"c0".to_string()).unwrap(), saturated);
        }
        let futures = KFutures::new(&chain, 100_000).unwrap();
        assert_eq!(futures.of(&"c2".to_string()), future(&["y"]));
        assert_eq!(futures.k(), 100_000);
    }

    #[test_log::test]
    fn classes_of_equal_futures() {
        let nfa = branching();
        let classes = equivalence_classes(&nfa, 1).unwrap();
        let class = |state: &str| {
            classes
                .class_of(&state.to_string())
                .unwrap()
                .iter()
                .cloned()
                .collect::<Vec<_>>()
        };
        assert_eq!(class("s4"), vec!["s4", "s6"]);
        assert_eq!(class("s1"), vec!["s1"]);
        assert_eq!(classes.size(), 5);
    }
}

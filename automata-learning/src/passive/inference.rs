use automata::{math::Bijection, prelude::*};
use itertools::Itertools;
use tracing::{debug, trace};

use super::{future::Future, future_map::FutureMap};
use crate::{KTailError, Sentinels};

/// Returns the symbol with which every sequence of `signature` begins. In a future map built
/// from a prefix tree, every state with a successor has transitions on exactly one symbol,
/// so its future has a unique first symbol. Anything else indicates that the map was not
/// built that way and is reported as an error.
pub fn signature_label<S: Symbol>(signature: &Future<S>) -> Result<&S, KTailError> {
    let label = signature
        .first()
        .and_then(|sequence| sequence.first())
        .ok_or(KTailError::UnlabeledSignature)?;
    if signature
        .iter()
        .any(|sequence| sequence.first() != Some(label))
    {
        return Err(KTailError::InconsistentLabel(signature.show()));
    }
    Ok(label)
}

/// Hands out a fresh handle the first time a signature is seen.
#[derive(Debug, Clone)]
struct Interner<S: Symbol> {
    handles: Bijection<usize, Future<S>>,
}

impl<S: Symbol> Interner<S> {
    fn new() -> Self {
        Self {
            handles: Bijection::new(),
        }
    }

    fn intern(&mut self, signature: &Future<S>) -> usize {
        if let Some(handle) = self.handles.get_by_right(signature) {
            return *handle;
        }
        let handle = self.handles.len();
        trace!("signature {} gets handle {handle}", signature.show());
        self.handles.insert(handle, signature.clone());
        handle
    }
}

/// Like [`infer_model`], but also returns which signature each state of the model stands for.
pub fn infer_model_with_signatures<S: Symbol>(
    future_map: &FutureMap<S>,
    sentinels: &Sentinels<S>,
) -> Result<(Automaton<S, usize>, Bijection<usize, Future<S>>), KTailError> {
    let labels = future_map
        .iter()
        .map(|(source, _)| signature_label(source))
        .collect::<Result<Vec<_>, _>>()?;

    let initial = match future_map
        .iter()
        .zip(&labels)
        .filter(|(_, label)| **label == sentinels.start())
        .map(|((source, _), _)| source)
        .collect_vec()
        .as_slice()
    {
        [initial] => *initial,
        [] => return Err(KTailError::MissingInitial(sentinels.start().show())),
        more => {
            return Err(KTailError::AmbiguousInitial {
                sentinel: sentinels.start().show(),
                count: more.len(),
            })
        }
    };

    let mut interner = Interner::new();
    let mut model = Automaton::new(interner.intern(initial));

    for ((source, targets), label) in future_map.iter().zip(labels) {
        let from = interner.intern(source);
        model.add_state(from);
        model.add_symbol(label.clone());
        for target in targets {
            let to = interner.intern(target);
            model.add_transition(from, label.clone(), to);
            if label == sentinels.end() {
                model.add_final(to);
            }
        }
    }

    debug!(
        "inferred model with {} states and {} transitions from {} signatures",
        model.size(),
        model.transition_count(),
        future_map.len()
    );
    Ok((model, interner.handles))
}

/// Reconstructs an automaton from a [`FutureMap`], where every distinct signature becomes one
/// state. States are numbered in the order in which their signatures are first seen, starting
/// with the initial state at `0` and then following the source signatures in their order.
/// - every transition out of a signature is labeled with the first symbol of its sequences
///   (see [`signature_label`]),
/// - the initial state is the unique signature labeled with the start sentinel,
/// - successors of signatures labeled with the end sentinel are final.
pub fn infer_model<S: Symbol>(
    future_map: &FutureMap<S>,
    sentinels: &Sentinels<S>,
) -> Result<Automaton<S, usize>, KTailError> {
    infer_model_with_signatures(future_map, sentinels).map(|(model, _)| model)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::{infer_model, infer_model_with_signatures, signature_label};
    use crate::{
        passive::{future_map, Future, FutureMap},
        prefix_tree, KTailError, Sentinels, TraceSample,
    };

    fn future(sequences: &[&str]) -> Future<String> {
        sequences
            .iter()
            .map(|s| s.split(' ').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn labels_of_signatures() {
        assert_eq!(signature_label(&future(&["a", "a b", "a c"])), Ok(&"a".to_string()));
        assert_eq!(
            signature_label(&future(&["a", "b c"])),
            Err(KTailError::InconsistentLabel("{(a), (b, c)}".to_string()))
        );
        assert_eq!(
            signature_label(&future(&[])),
            Err(KTailError::UnlabeledSignature)
        );
    }

    #[test_log::test]
    fn model_from_hand_written_map() {
        let entries = [
            (future(&["$"]), vec![future(&["1"]), future(&["0"])]),
            (future(&["0"]), vec![future(&["1"]), future(&["0"])]),
            (future(&["1"]), vec![future(&["#"])]),
            (future(&["#"]), vec![future(&[])]),
        ];
        let map = FutureMap::from_map(
            1,
            entries
                .into_iter()
                .map(|(source, targets)| (source, targets.into_iter().collect::<BTreeSet<_>>()))
                .collect::<BTreeMap<_, _>>(),
        );
        let (model, signatures) =
            infer_model_with_signatures(&map, &Sentinels::default()).unwrap();

        assert_eq!(model.size(), 5);
        assert_eq!(*model.initial(), 0);
        assert_eq!(signatures.get_by_left(&0), Some(&future(&["$"])));
        assert_eq!(model.final_states().len(), 1);
        let last = signatures.get_by_right(&future(&[])).unwrap();
        assert!(model.is_final(last));

        for word in ["$ 1 #", "$ 0 1 #", "$ 0 0 0 0 1 #"] {
            assert!(model.accepts_str(word, " "), "{word} should be accepted");
        }
        for word in ["$ 0 #", "$ 1 1 #", "1 #", "$ 1"] {
            assert!(!model.accepts_str(word, " "), "{word} should be rejected");
        }
    }

    #[test]
    fn equivalent_states_are_merged() {
        let sample = TraceSample::from_strs(["x y z", "w y z", "x y"], " ").unwrap();
        let sentinels = Sentinels::default();
        let pta = prefix_tree(&sample, &sentinels).unwrap();
        for k in 1..4 {
            let map = future_map(&pta, k).unwrap();
            let model = infer_model(&map, &sentinels).unwrap();
            let mut distinct: BTreeSet<Future<String>> = BTreeSet::new();
            for state in pta.states() {
                distinct.insert(crate::passive::k_future(&pta, k, state).unwrap());
            }
            assert_eq!(model.size(), distinct.len(), "k = {k}");
            assert_eq!(model.validate(), Ok(()));
        }
    }

    #[test]
    fn missing_or_ambiguous_initial() {
        let sentinels = Sentinels::default();
        let no_start = FutureMap::from_map(
            1,
            BTreeMap::from([(future(&["a"]), BTreeSet::from([future(&[])]))]),
        );
        assert_eq!(
            infer_model(&no_start, &sentinels),
            Err(KTailError::MissingInitial("$".to_string()))
        );

        let two_starts = FutureMap::from_map(
            2,
            BTreeMap::from([
                (future(&["$", "$ a"]), BTreeSet::from([future(&["a"])])),
                (future(&["$", "$ b"]), BTreeSet::from([future(&["b"])])),
            ]),
        );
        assert_eq!(
            infer_model(&two_starts, &sentinels),
            Err(KTailError::AmbiguousInitial {
                sentinel: "$".to_string(),
                count: 2
            })
        );

        let mixed = FutureMap::from_map(
            2,
            BTreeMap::from([(future(&["$", "a"]), BTreeSet::from([future(&[])]))]),
        );
        assert!(matches!(
            infer_model(&mixed, &sentinels),
            Err(KTailError::InconsistentLabel(_))
        ));
    }
}

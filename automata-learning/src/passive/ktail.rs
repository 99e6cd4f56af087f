use std::collections::BTreeMap;

use automata::{math::natural_cmp, prelude::*};
use itertools::Itertools;
use tracing::{debug, info};

use super::{equivalence_classes, future_map, infer_model, Future, FutureMap, KFutures};
use crate::{prefix_tree, KTailError, Sentinels, TraceSample};

/// The prefix used for state names when renaming is not configured otherwise.
pub const DEFAULT_PREFIX: &str = "q";

/// The k-tail learner. It infers a nondeterministic automaton from positive traces by
/// building their prefix tree acceptor and merging all states that have the same k-future.
/// Larger values of `k` distinguish more states and thereby generalize less.
///
/// By default the states of the result are renamed to `q0`, `q1`, ... in breadth-first order,
/// see [`rename_states`]. Without renaming they are named after the internal handles of their
/// future signatures.
///
/// # Example
/// ```
/// use automata::prelude::*;
/// use automata_learning::{KTail, TraceSample};
///
/// let sample = TraceSample::from_strs(["a b", "a b b", "a b b b"], " ").unwrap();
/// let learner: KTail = KTail::new(2);
/// let model = learner.infer(&sample).unwrap();
/// assert_eq!(model.initial(), "q0");
/// assert!(learner.accepts(&model, &["a".to_string(), "b".to_string()]));
/// assert!(model.accepts_str("$ a b b b b b #", " "));
/// assert!(!model.accepts_str("$ a #", " "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KTail<S = String> {
    k: usize,
    sentinels: Sentinels<S>,
    prefix: Option<String>,
}

impl<S: Symbol> KTail<S> {
    /// Creates a learner with bound `k`, default sentinels and renaming with prefix `q`.
    pub fn new(k: usize) -> Self
    where
        Sentinels<S>: Default,
    {
        Self {
            k,
            sentinels: Sentinels::default(),
            prefix: Some(DEFAULT_PREFIX.to_string()),
        }
    }

    /// Uses the given sentinels to delimit traces.
    pub fn with_sentinels(self, sentinels: Sentinels<S>) -> Self {
        Self { sentinels, ..self }
    }

    /// Renames the states of inferred models to `{prefix}0`, `{prefix}1`, ...
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..self
        }
    }

    /// Keeps the states of inferred models named after their signature handles.
    pub fn without_renaming(self) -> Self {
        Self {
            prefix: None,
            ..self
        }
    }

    /// The bound.
    pub fn k(&self) -> usize {
        self.k
    }

    fn check_bound(&self) -> Result<(), KTailError> {
        if self.k == 0 {
            return Err(KTailError::ZeroBound);
        }
        Ok(())
    }

    /// Infers a model from `traces`. The traces must be non-empty, there must be at least one
    /// of them, and none may contain a sentinel. The model accepts every trace surrounded by
    /// the sentinels (see [`KTail::accepts`]).
    pub fn infer<T, I>(&self, traces: I) -> Result<Automaton<S, String>, KTailError>
    where
        T: AsRef<[S]>,
        I: IntoIterator<Item = T>,
    {
        self.check_bound()?;
        let pta = prefix_tree(traces, &self.sentinels)?;
        let map = future_map(&pta, self.k)?;
        let model = infer_model(&map, &self.sentinels)?;

        let model = match &self.prefix {
            Some(prefix) => model.renamed(prefix),
            None => {
                debug!("keeping signature handles as state names");
                model.map_states(|handle| handle.to_string())
            }
        };
        info!(
            "k-tail with k = {} reduced {} prefix tree states to {}",
            self.k,
            pta.size(),
            model.size()
        );
        Ok(model)
    }

    /// Decides whether `model` accepts `trace` once it is surrounded by the sentinels.
    pub fn accepts<Q: StateId>(&self, model: &Automaton<S, Q>, trace: &[S]) -> bool {
        model.accepts(self.sentinels.wrap(trace))
    }

    /// Computes the intermediate results of an inference run on `traces`, see [`Internals`].
    pub fn internals<T, I>(&self, traces: I) -> Result<Internals<S>, KTailError>
    where
        T: AsRef<[S]>,
        I: IntoIterator<Item = T>,
    {
        self.check_bound()?;
        let pta = prefix_tree(traces, &self.sentinels)?;

        let futures = KFutures::new(&pta, self.k)?;
        let state_futures = pta
            .states()
            .iter()
            .sorted_by(|p, q| natural_cmp(p, q))
            .map(|state| (state.clone(), futures.of(state)))
            .collect_vec();

        let classes = equivalence_classes(&pta, self.k)?
            .iter()
            .filter_map(|class| {
                let representative = class.first()?;
                let members = class.iter().cloned().sorted_by(|p, q| natural_cmp(p, q));
                Some((futures.of(representative), members.collect_vec()))
            })
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect_vec();

        let future_map = future_map(&pta, self.k)?;
        Ok(Internals {
            pta,
            futures: state_futures,
            classes,
            future_map,
        })
    }
}

/// The intermediate results of a k-tail run, useful for understanding why states were merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Internals<S> {
    /// The prefix tree acceptor of the traces.
    pub pta: Automaton<S, String>,
    /// The k-future of every state of the prefix tree, in natural order of the state names.
    pub futures: Vec<(String, Future<S>)>,
    /// The k-equivalence classes of the prefix tree states, ordered by their common future.
    pub classes: Vec<(Future<S>, Vec<String>)>,
    /// The future map from which the model is inferred.
    pub future_map: FutureMap<S>,
}

/// Runs k-tail with default settings on traces given as strings of symbols separated by single
/// spaces. The states of the result are named `q0`, `q1`, ...
pub fn ktail<I, W>(words: I, k: usize) -> Result<Automaton, KTailError>
where
    I: IntoIterator<Item = W>,
    W: AsRef<str>,
{
    let sample = TraceSample::from_strs(words, " ")?;
    KTail::new(k).infer(&sample)
}

use automata::prelude::*;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::KTailError;

/// Name of the shared initial state of a prefix tree.
pub const INITIAL_STATE: &str = "_INIT_";
/// Name of the shared final state of a prefix tree.
pub const FINAL_STATE: &str = "_FINAL_";

/// The default start sentinel.
pub const START_SYMBOL: &str = "$";
/// The default end sentinel.
pub const END_SYMBOL: &str = "#";

/// Two reserved symbols that delimit traces inside an automaton: every trace is entered via
/// `start` and left via `end`. They must not occur in any trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels<S = String> {
    start: S,
    end: S,
}

impl<S: Symbol> Sentinels<S> {
    /// Creates a new pair of sentinels, which must be distinct.
    pub fn new(start: S, end: S) -> Result<Self, KTailError> {
        if start == end {
            return Err(KTailError::IndistinctSentinels(start.show()));
        }
        Ok(Self { start, end })
    }

    /// The symbol that leads from the initial state into a trace.
    pub fn start(&self) -> &S {
        &self.start
    }

    /// The symbol that leads from the end of a trace to the final state.
    pub fn end(&self) -> &S {
        &self.end
    }

    /// Returns `true` if `symbol` is one of the two sentinels.
    pub fn is_sentinel(&self, symbol: &S) -> bool {
        symbol == &self.start || symbol == &self.end
    }

    /// Surrounds `trace` with the sentinels, which gives the word that a model inferred
    /// from traces should accept for `trace`.
    pub fn wrap(&self, trace: &[S]) -> Vec<S> {
        std::iter::once(self.start.clone())
            .chain(trace.iter().cloned())
            .chain(std::iter::once(self.end.clone()))
            .collect()
    }
}

impl Default for Sentinels<String> {
    fn default() -> Self {
        Self {
            start: START_SYMBOL.to_string(),
            end: END_SYMBOL.to_string(),
        }
    }
}

/// Builds a prefix tree acceptor trace by trace. It owns the automaton under construction and
/// the counter from which fresh state names `s1`, `s2`, ... are drawn, so names are never
/// reused within one build.
///
/// Traces are not merged even if they share a prefix, each one gets its own chain of states:
/// `_INIT_` reads the start sentinel into a fresh entry state, from which one fresh state per
/// symbol follows, and the last of them reads the end sentinel into `_FINAL_`.
#[derive(Debug, Clone)]
pub struct PtaBuilder<S: Symbol> {
    automaton: Automaton<S, String>,
    sentinels: Sentinels<S>,
    counter: usize,
    traces: usize,
}

impl<S: Symbol> PtaBuilder<S> {
    /// Creates a builder whose automaton consists of the initial state only, over an alphabet
    /// that contains just the two sentinels.
    pub fn new(sentinels: Sentinels<S>) -> Self {
        let automaton = Automaton::new(INITIAL_STATE)
            .with_symbols([sentinels.start().clone(), sentinels.end().clone()]);
        Self {
            automaton,
            sentinels,
            counter: 1,
            traces: 0,
        }
    }

    fn fresh_state(&mut self) -> String {
        let state = format!("s{}", self.counter);
        self.counter += 1;
        self.automaton.add_state(state.clone());
        state
    }

    /// Checks that `trace` may be added as the trace at position `index`, i.e. that it is
    /// not empty and does not contain a sentinel.
    pub fn check(&self, index: usize, trace: &[S]) -> Result<(), KTailError> {
        if trace.is_empty() {
            return Err(KTailError::EmptyTrace(index));
        }
        if let Some(symbol) = trace.iter().find(|s| self.sentinels.is_sentinel(s)) {
            return Err(KTailError::SentinelCollision {
                index,
                symbol: symbol.show(),
            });
        }
        Ok(())
    }

    /// Adds the chain of states for one trace. Nothing is added if the trace is rejected.
    pub fn add_trace(&mut self, trace: &[S]) -> Result<(), KTailError> {
        self.check(self.traces, trace)?;

        let entry = self.fresh_state();
        self.automaton
            .add_transition(INITIAL_STATE, self.sentinels.start().clone(), entry.clone());

        let mut current = entry;
        for symbol in trace {
            let next = self.fresh_state();
            trace!("adding chain state {next} on {}", symbol.show());
            self.automaton
                .add_transition(current, symbol.clone(), next.clone());
            current = next;
        }

        self.automaton
            .add_transition(current, self.sentinels.end().clone(), FINAL_STATE);
        self.automaton.add_final(FINAL_STATE);
        self.traces += 1;
        Ok(())
    }

    /// The number of traces added so far.
    pub fn trace_count(&self) -> usize {
        self.traces
    }

    /// Finishes construction and hands out the prefix tree.
    pub fn build(self) -> Automaton<S, String> {
        debug!(
            "built prefix tree with {} states for {} traces",
            self.automaton.size(),
            self.traces
        );
        self.automaton
    }
}

/// Builds the prefix tree acceptor for `traces`, see [`PtaBuilder`]. All traces are checked
/// before the first state is created, so the whole collection is rejected if it is empty,
/// or if any trace is empty or contains a sentinel.
///
/// # Example
/// ```
/// use automata::prelude::*;
/// use automata_learning::{prefix_tree, Sentinels, TraceSample};
///
/// let sample = TraceSample::from_strs(["a b", "a c"], " ").unwrap();
/// let pta = prefix_tree(&sample, &Sentinels::default()).unwrap();
/// assert_eq!(pta.size(), 8);
/// assert!(pta.accepts_str("$ a c #", " "));
/// assert!(!pta.accepts_str("a c", " "));
/// ```
pub fn prefix_tree<S, T, I>(
    traces: I,
    sentinels: &Sentinels<S>,
) -> Result<Automaton<S, String>, KTailError>
where
    S: Symbol,
    T: AsRef<[S]>,
    I: IntoIterator<Item = T>,
{
    let traces = traces.into_iter().collect_vec();
    if traces.is_empty() {
        return Err(KTailError::EmptySample);
    }

    let mut builder = PtaBuilder::new(sentinels.clone());
    for (index, trace) in traces.iter().enumerate() {
        builder.check(index, trace.as_ref())?;
    }
    for trace in &traces {
        builder.add_trace(trace.as_ref())?;
    }
    Ok(builder.build())
}

//! A library for learning automata from observed traces.
//!
//! The main entry point is [`passive::KTail`], which infers a nondeterministic automaton from
//! a collection of traces with the k-tail algorithm:
//! 1. all traces are arranged in a prefix tree acceptor (see [`prefixtree`]), where every trace
//!    forms its own chain of states between a shared initial and a shared final state,
//! 2. for every state the set of symbol sequences of length at most `k` that can be read from
//!    it, its *k-future*, is computed,
//! 3. states with the same k-future are merged and the resulting quotient is built, which is
//!    the inferred model.
//!
//! Traces are delimited by two reserved [`Sentinels`] inside the automata, so the inferred
//! model accepts the sentinel-wrapped versions of the input traces (and whatever else the
//! merging generalizes to).
#![deny(missing_docs)]

use thiserror::Error;

/// Collections of traces that serve as input for learning.
pub mod sample;
pub use sample::{SampleParseError, TraceSample};

/// Construction of prefix tree acceptors from traces.
pub mod prefixtree;
pub use prefixtree::{prefix_tree, PtaBuilder, Sentinels};

/// Contains the passive learner k-tail and its building blocks.
pub mod passive;
pub use passive::{ktail, KTail};

/// Errors that can occur while inferring a model.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum KTailError {
    /// The bound `k` has to be positive.
    #[error("the bound k must be at least 1")]
    ZeroBound,
    /// There are no traces to learn from.
    #[error("cannot build a prefix tree from an empty collection of traces")]
    EmptySample,
    /// The trace at the given position has no symbols.
    #[error("trace {0} contains no symbols")]
    EmptyTrace(usize),
    /// The trace at position `index` contains one of the sentinels.
    #[error("trace {index} contains the reserved sentinel symbol `{symbol}`")]
    SentinelCollision {
        /// Position of the offending trace.
        index: usize,
        /// The sentinel that occurs in the trace.
        symbol: String,
    },
    /// Start and end sentinel have to be different symbols.
    #[error("start and end sentinel must differ, but both are `{0}`")]
    IndistinctSentinels(String),
    /// A future signature has no sequences, so no transition label can be derived from it.
    #[error("encountered a future signature without sequences")]
    UnlabeledSignature,
    /// The sequences of a future signature do not agree on their first symbol.
    #[error("sequences of future signature {0} start with different symbols")]
    InconsistentLabel(String),
    /// No future signature is labeled with the start sentinel.
    #[error("no future signature is labeled with the start sentinel `{0}`")]
    MissingInitial(String),
    /// More than one future signature is labeled with the start sentinel.
    #[error("{count} future signatures are labeled with the start sentinel `{sentinel}`")]
    AmbiguousInitial {
        /// The start sentinel.
        sentinel: String,
        /// How many signatures carry it as their label.
        count: usize,
    },
    /// The traces could not be read.
    #[error(transparent)]
    Sample(#[from] SampleParseError),
}

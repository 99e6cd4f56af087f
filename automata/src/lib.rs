//! Nondeterministic finite automata over observed event traces.
//!
//! The central type is [`Automaton`], an explicit NFA consisting of an alphabet, a set of states,
//! one designated initial state, a set of final states and a transition relation which maps a
//! pair of state and symbol to a *set* of successor states. Automata are grown transition by
//! transition (see [`Automaton::add_transition`]) and are afterwards queried through
//! [`Automaton::next_states`] and [`Automaton::accepts`]. Looking up a transition that does not
//! exist is never an error, it simply leads nowhere.
//!
//! Both symbols and state identifiers are generic, anything that implements [`Symbol`] or
//! [`StateId`] respectively can be used. The defaults are [`String`] for both, which is what
//! traces parsed from text produce.
//!
//! Further building blocks are
//! - [`word::Trace`], a non-empty sequence of symbols,
//! - [`automaton::rename_states`], which produces a canonically named copy of an automaton,
//! - [`dot::Dottable`], which turns an automaton into its graphviz representation.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::{fmt::Debug, hash::Hash};

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::{rename_states, Automaton, AutomatonError, Renamed},
        dot::Dottable,
        math,
        show::Show,
        word::{Trace, TraceError},
        StateId, Symbol,
    };
}

/// Defines some mathematical objects that are used such as bijections,
/// sets, mappings and the natural ordering of identifiers.
pub mod math;

mod show;
pub use show::{show_duration, Show};

/// Traces, i.e. finite non-empty sequences of symbols.
pub mod word;

/// The nondeterministic finite automaton and operations on it.
pub mod automaton;
pub use automaton::Automaton;

/// Graphviz output for automata.
pub mod dot;

/// A symbol is an opaque, comparable token that labels transitions.
pub trait Symbol: Clone + Eq + Ord + Hash + Debug + Show {}

impl<T: Clone + Eq + Ord + Hash + Debug + Show> Symbol for T {}

/// Identifies a state of an [`Automaton`]. Identifiers are compared for equality and ordered,
/// the order is only used to make iteration deterministic.
pub trait StateId: Clone + Eq + Ord + Hash + Debug + Show {}

impl<T: Clone + Eq + Ord + Hash + Debug + Show> StateId for T {}

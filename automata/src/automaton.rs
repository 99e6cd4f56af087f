use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::Display,
};

use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::{math, Show, StateId, Symbol};

mod rename;
pub use rename::{rename_states, Renamed};

/// Violations of the structural invariants of an [`Automaton`], reported by
/// [`Automaton::validate`] and [`Automaton::from_parts`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// The initial state is not contained in the set of states.
    #[error("initial state `{0}` is not a state of the automaton")]
    UnknownInitial(String),
    /// A final state is not contained in the set of states.
    #[error("final state `{0}` is not a state of the automaton")]
    UnknownFinal(String),
    /// A transition starts or ends in a state that is not contained in the set of states.
    #[error("transition refers to unknown state `{0}`")]
    UnknownState(String),
    /// A transition is labeled with a symbol that is not part of the alphabet.
    #[error("transition is labeled with `{0}`, which is not part of the alphabet")]
    UnknownSymbol(String),
}

/// A nondeterministic finite automaton. It consists of
/// - an alphabet of symbols of type `S`,
/// - a set of states, identified by values of type `Q`,
/// - precisely one initial state,
/// - a set of final states, and
/// - a transition relation, which maps a pair of state and symbol to a set of states.
///
/// All collections are ordered, so iterating over states or transitions always happens in
/// the same order, independent of the order of insertion.
///
/// The methods which grow the automaton maintain its invariants: adding a transition also
/// adds its endpoints to the states and its label to the alphabet.
///
/// # Example
/// ```
/// use automata::prelude::*;
///
/// let nfa: Automaton = Automaton::new("A")
///     .with_transitions([("A", "0", "A"), ("A", "0", "B"), ("B", "1", "C")])
///     .with_final_states(["C"]);
/// assert!(nfa.accepts_str("0 0 1", " "));
/// assert!(!nfa.accepts_str("1", " "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton<S = String, Q = String> {
    alphabet: BTreeSet<S>,
    states: BTreeSet<Q>,
    initial: Q,
    finals: BTreeSet<Q>,
    transitions: BTreeMap<Q, BTreeMap<S, BTreeSet<Q>>>,
}

impl<S: Symbol, Q: StateId> Automaton<S, Q> {
    /// Creates an automaton with the given initial state as its only state. The alphabet, the
    /// set of final states and the transition relation are empty.
    pub fn new(initial: impl Into<Q>) -> Self {
        let initial = initial.into();
        Self {
            alphabet: BTreeSet::new(),
            states: BTreeSet::from([initial.clone()]),
            initial,
            finals: BTreeSet::new(),
            transitions: BTreeMap::new(),
        }
    }

    /// Assembles an automaton from its constituent parts and checks that the result is
    /// well-formed, see [`Automaton::validate`]. Unlike the incremental methods, this does
    /// not add missing states or symbols.
    pub fn from_parts<A, St, F, T>(
        alphabet: A,
        states: St,
        initial: Q,
        finals: F,
        transitions: T,
    ) -> Result<Self, AutomatonError>
    where
        A: IntoIterator<Item = S>,
        St: IntoIterator<Item = Q>,
        F: IntoIterator<Item = Q>,
        T: IntoIterator<Item = (Q, S, Q)>,
    {
        let mut relation: BTreeMap<Q, BTreeMap<S, BTreeSet<Q>>> = BTreeMap::new();
        for (from, on, to) in transitions {
            relation
                .entry(from)
                .or_default()
                .entry(on)
                .or_default()
                .insert(to);
        }
        let automaton = Self {
            alphabet: alphabet.into_iter().collect(),
            states: states.into_iter().collect(),
            initial,
            finals: finals.into_iter().collect(),
            transitions: relation,
        };
        automaton.validate()?;
        Ok(automaton)
    }

    /// Consumes `self` and adds the given symbols to the alphabet.
    pub fn with_symbols<I: IntoIterator<Item = X>, X: Into<S>>(mut self, symbols: I) -> Self {
        for symbol in symbols {
            self.add_symbol(symbol);
        }
        self
    }

    /// Consumes `self` and adds all given `(source, symbol, target)` triples as transitions.
    pub fn with_transitions<I, X, Y, Z>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (X, Y, Z)>,
        X: Into<Q>,
        Y: Into<S>,
        Z: Into<Q>,
    {
        for (from, on, to) in transitions {
            self.add_transition(from, on, to);
        }
        self
    }

    /// Consumes `self` and marks the given states as final.
    pub fn with_final_states<I: IntoIterator<Item = X>, X: Into<Q>>(mut self, finals: I) -> Self {
        for state in finals {
            self.add_final(state);
        }
        self
    }

    /// Adds a symbol to the alphabet, returns `true` if it was not present before.
    pub fn add_symbol(&mut self, symbol: impl Into<S>) -> bool {
        self.alphabet.insert(symbol.into())
    }

    /// Adds a state, returns `true` if it was not present before.
    pub fn add_state(&mut self, state: impl Into<Q>) -> bool {
        self.states.insert(state.into())
    }

    /// Marks the given state as final, adding it to the states if necessary.
    pub fn add_final(&mut self, state: impl Into<Q>) -> bool {
        let state = state.into();
        self.states.insert(state.clone());
        self.finals.insert(state)
    }

    /// Adds a transition from `from` on `on` to `to`. Both states and the symbol are added
    /// as well if they are not yet known. Returns `true` if the transition is new.
    pub fn add_transition(
        &mut self,
        from: impl Into<Q>,
        on: impl Into<S>,
        to: impl Into<Q>,
    ) -> bool {
        let (from, on, to) = (from.into(), on.into(), to.into());
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.alphabet.insert(on.clone());
        self.transitions
            .entry(from)
            .or_default()
            .entry(on)
            .or_default()
            .insert(to)
    }

    /// Gives a reference to the alphabet.
    pub fn alphabet(&self) -> &BTreeSet<S> {
        &self.alphabet
    }

    /// Gives a reference to the set of states.
    pub fn states(&self) -> &BTreeSet<Q> {
        &self.states
    }

    /// Returns the initial state.
    pub fn initial(&self) -> &Q {
        &self.initial
    }

    /// Gives a reference to the set of final states.
    pub fn final_states(&self) -> &BTreeSet<Q> {
        &self.finals
    }

    /// Returns `true` if the given state is final.
    pub fn is_final(&self, state: &Q) -> bool {
        self.finals.contains(state)
    }

    /// Returns `true` if the given state belongs to the automaton.
    pub fn contains_state(&self, state: &Q) -> bool {
        self.states.contains(state)
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// The number of `(source, symbol, target)` triples in the transition relation.
    pub fn transition_count(&self) -> usize {
        self.edges().count()
    }

    /// Returns the set of states reached from `state` on `symbol`, or `None` if there is
    /// no such transition.
    pub fn successors(&self, state: &Q, symbol: &S) -> Option<&BTreeSet<Q>> {
        self.transitions.get(state)?.get(symbol)
    }

    /// Iterates over the symbols on which `state` has an outgoing transition, together
    /// with the respective targets. Unknown states simply have no edges.
    pub fn edges_from<'a>(
        &'a self,
        state: &Q,
    ) -> impl Iterator<Item = (&'a S, &'a BTreeSet<Q>)> + 'a {
        self.transitions
            .get(state)
            .into_iter()
            .flat_map(|edges| edges.iter())
    }

    /// Iterates over the transition relation, one entry per pair of source state and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&Q, &S, &BTreeSet<Q>)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(from, edges)| edges.iter().map(move |(on, to)| (from, on, to)))
    }

    /// Iterates over all `(source, symbol, target)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (&Q, &S, &Q)> + '_ {
        self.transitions()
            .flat_map(|(from, on, targets)| targets.iter().map(move |to| (from, on, to)))
    }

    /// Returns all states that can be reached from `state` with a single transition,
    /// regardless of its label. This is empty for states without outgoing transitions.
    pub fn next_states(&self, state: &Q) -> BTreeSet<Q> {
        self.edges_from(state)
            .flat_map(|(_, targets)| targets.iter().cloned())
            .collect()
    }

    /// Computes the set of states that is reached from any state in `current` on `symbol`.
    /// States without a matching transition contribute nothing.
    pub fn step(&self, current: &BTreeSet<Q>, symbol: &S) -> BTreeSet<Q> {
        current
            .iter()
            .filter_map(|state| self.successors(state, symbol))
            .flatten()
            .cloned()
            .collect()
    }

    /// Simulates the automaton on `word`, starting in the initial state and tracking the set
    /// of all states that can be reached so far. The word is accepted if this set contains a
    /// final state once the word is consumed. Symbols for which no transition exists make
    /// the run die, which means the word is rejected.
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator,
        W::Item: Borrow<S>,
    {
        let mut current = BTreeSet::from([self.initial.clone()]);
        for item in word {
            let symbol: &S = item.borrow();
            current = self.step(&current, symbol);
            if current.is_empty() {
                trace!("run died on symbol {}", symbol.show());
                return false;
            }
        }
        current.iter().any(|state| self.finals.contains(state))
    }

    /// Returns the states which are reachable from the initial state, in the order in which
    /// a breadth-first search discovers them.
    pub fn reachable_states(&self) -> Vec<Q> {
        let mut seen = math::Set::default();
        seen.insert(self.initial.clone());
        let mut queue = VecDeque::from([self.initial.clone()]);
        let mut reachable = Vec::new();
        while let Some(state) = queue.pop_front() {
            for next in self.next_states(&state) {
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
            reachable.push(state);
        }
        reachable
    }

    /// Relabels every state through `f`, keeping the alphabet and the structure. The function
    /// should be injective on the states, otherwise distinct states are merged.
    pub fn map_states<R: StateId, F: Fn(&Q) -> R>(&self, f: F) -> Automaton<S, R> {
        let mut mapped = Automaton::new(f(&self.initial));
        mapped.alphabet = self.alphabet.clone();
        for state in &self.states {
            mapped.add_state(f(state));
        }
        for state in &self.finals {
            mapped.add_final(f(state));
        }
        for (from, on, to) in self.edges() {
            mapped.add_transition(f(from), on.clone(), f(to));
        }
        mapped
    }

    /// Checks the structural invariants: the initial and all final states as well as all
    /// endpoints of transitions are states, and every label belongs to the alphabet.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        if !self.states.contains(&self.initial) {
            return Err(AutomatonError::UnknownInitial(self.initial.show()));
        }
        if let Some(state) = self.finals.iter().find(|q| !self.states.contains(*q)) {
            return Err(AutomatonError::UnknownFinal(state.show()));
        }
        for (from, on, to) in self.edges() {
            if !self.alphabet.contains(on) {
                return Err(AutomatonError::UnknownSymbol(on.show()));
            }
            if let Some(state) = [from, to].into_iter().find(|q| !self.states.contains(*q)) {
                return Err(AutomatonError::UnknownState(state.show()));
            }
        }
        Ok(())
    }
}

impl<Q: StateId> Automaton<String, Q> {
    /// Splits `word` at `separator` (dropping empty pieces) and checks whether the resulting
    /// sequence of symbols is accepted.
    pub fn accepts_str(&self, word: &str, separator: &str) -> bool {
        self.accepts(
            word.split(separator)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string),
        )
    }
}

fn naturally_sorted<'a, T: Show + 'a, I: IntoIterator<Item = &'a T>>(items: I) -> Vec<String> {
    items
        .into_iter()
        .map(Show::show)
        .sorted_by(|a, b| math::natural_cmp(a, b))
        .collect()
}

impl<S: Symbol, Q: StateId> Display for Automaton<S, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Alphabet: {{{}}}",
            naturally_sorted(&self.alphabet).join(", ")
        )?;
        writeln!(f, "States: {{{}}}", naturally_sorted(&self.states).join(", "))?;
        writeln!(f, "Initial state: {}", self.initial.show())?;
        writeln!(
            f,
            "Final states: {{{}}}",
            naturally_sorted(&self.finals).join(", ")
        )?;
        let transitions = self
            .transitions()
            .map(|(from, on, to)| {
                (
                    from.show(),
                    format!(
                        "({}, {}) -> {{{}}}",
                        from.show(),
                        on.show(),
                        naturally_sorted(to).join(", ")
                    ),
                )
            })
            .sorted_by(|(a, x), (b, y)| math::natural_cmp(a, b).then_with(|| x.cmp(y)))
            .map(|(_, line)| line)
            .join(", ");
        write!(f, "Transitions: {{{transitions}}}")
    }
}

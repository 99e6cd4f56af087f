use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    math::{natural_cmp, Bijection},
    Automaton, StateId, Symbol,
};

/// The outcome of [`rename_states`]: the renamed automaton together with the renaming
/// dictionary, which relates every reachable state of the original automaton to its new name.
#[derive(Debug, Clone)]
pub struct Renamed<S, Q: Ord> {
    /// The automaton with canonical state names.
    pub automaton: Automaton<S, String>,
    /// Maps each reachable original state to its new name.
    pub renaming: Bijection<Q, String>,
}

/// Produces a copy of `automaton` in which the states are named `{prefix}0`, `{prefix}1`, ...
///
/// The initial state becomes `{prefix}0`. The remaining states receive consecutive numbers in
/// the order in which they are discovered: states are taken from a first-in-first-out worklist,
/// and the successors of each state are visited in the natural order of their names (so `s2`
/// comes before `s10`). The result is therefore independent of how the states are stored.
///
/// States that cannot be reached from the initial state are dropped, together with their
/// transitions and final marks. The alphabet is copied unchanged.
///
/// # Example
/// ```
/// use automata::prelude::*;
///
/// let nfa: Automaton = Automaton::new("init")
///     .with_transitions([("init", "a", "s10"), ("init", "a", "s9"), ("x", "b", "init")])
///     .with_final_states(["s10"]);
/// let renamed = rename_states(&nfa, "q");
/// assert_eq!(renamed.renaming.get_by_left("s9").map(String::as_str), Some("q1"));
/// assert_eq!(renamed.renaming.get_by_left("s10").map(String::as_str), Some("q2"));
/// assert_eq!(renamed.automaton.size(), 3);
/// assert!(renamed.automaton.is_final(&"q2".to_string()));
/// ```
pub fn rename_states<S: Symbol, Q: StateId>(
    automaton: &Automaton<S, Q>,
    prefix: &str,
) -> Renamed<S, Q> {
    let mut renaming: Bijection<Q, String> = Bijection::new();
    renaming.insert(automaton.initial().clone(), format!("{prefix}0"));

    let mut queue = VecDeque::from([automaton.initial().clone()]);
    while let Some(state) = queue.pop_front() {
        let successors = automaton
            .next_states(&state)
            .into_iter()
            .sorted_by(|p, q| natural_cmp(&p.show(), &q.show()).then_with(|| p.cmp(q)));
        for next in successors {
            if !renaming.contains_left(&next) {
                let name = format!("{prefix}{}", renaming.len());
                trace!("renaming {} to {name}", next.show());
                renaming.insert(next.clone(), name);
                queue.push_back(next);
            }
        }
    }

    let mut renamed = Automaton::new(format!("{prefix}0"));
    for symbol in automaton.alphabet() {
        renamed.add_symbol(symbol.clone());
    }
    for name in renaming.right_values() {
        renamed.add_state(name.clone());
    }
    for (from, on, to) in automaton.edges() {
        if let (Some(from), Some(to)) = (renaming.get_by_left(from), renaming.get_by_left(to)) {
            renamed.add_transition(from.clone(), on.clone(), to.clone());
        }
    }
    for state in automaton.final_states() {
        if let Some(name) = renaming.get_by_left(state) {
            renamed.add_final(name.clone());
        }
    }

    let dropped = automaton.size() - renaming.len();
    if dropped > 0 {
        debug!("dropped {dropped} states that are unreachable from the initial state");
    }
    debug!(
        "renaming dictionary: {}",
        renaming
            .iter()
            .sorted_by(|(_, a), (_, b)| natural_cmp(a, b))
            .map(|(old, new)| format!("{} -> {new}", old.show()))
            .join(", ")
    );

    Renamed {
        automaton: renamed,
        renaming,
    }
}

impl<S: Symbol, Q: StateId> Automaton<S, Q> {
    /// Returns a copy of `self` with canonical state names, see [`rename_states`].
    pub fn renamed(&self, prefix: &str) -> Automaton<S, String> {
        rename_states(self, prefix).automaton
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::rename_states;
    use crate::Automaton;

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn three_branches() -> Automaton {
        Automaton::new("s0")
            .with_symbols(["e", "0", "1"])
            .with_transitions([
                ("s0", "e", "s1"),
                ("s0", "e", "s3"),
                ("s0", "e", "s6"),
                ("s1", "1", "s2"),
                ("s3", "0", "s4"),
                ("s4", "1", "s5"),
                ("s6", "0", "s7"),
                ("s7", "0", "s8"),
                ("s8", "1", "s9"),
            ])
            .with_final_states(["s2", "s5", "s9"])
    }

    #[test_log::test]
    fn rename_three_branches() {
        let original = three_branches();
        let renamed = rename_states(&original, "q").automaton;

        assert_eq!(renamed.alphabet(), original.alphabet());
        assert_eq!(renamed.initial(), "q0");
        assert_eq!(renamed.final_states(), &strings(&["q4", "q7", "q9"]));
        assert_eq!(
            renamed.states(),
            &strings(&["q0", "q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9"])
        );

        let expected: Automaton = Automaton::new("q0")
            .with_symbols(["e", "0", "1"])
            .with_transitions([
                ("q0", "e", "q1"),
                ("q0", "e", "q2"),
                ("q0", "e", "q3"),
                ("q1", "1", "q4"),
                ("q2", "0", "q5"),
                ("q3", "0", "q6"),
                ("q5", "1", "q7"),
                ("q6", "0", "q8"),
                ("q8", "1", "q9"),
            ])
            .with_final_states(["q4", "q7", "q9"]);
        assert_eq!(renamed, expected);
    }

    #[test]
    fn natural_order_of_successors() {
        let nfa: Automaton = Automaton::new("root")
            .with_transitions([("root", "x", "s10"), ("root", "x", "s2"), ("root", "y", "s1")]);
        let renamed = rename_states(&nfa, "n");
        let name = |q: &str| renamed.renaming.get_by_left(q).cloned();
        assert_eq!(name("s1"), Some("n1".to_string()));
        assert_eq!(name("s2"), Some("n2".to_string()));
        assert_eq!(name("s10"), Some("n3".to_string()));
    }

    #[test]
    fn renaming_outcome_is_cloneable() {
        let nfa: Automaton<char, u32> =
            Automaton::new(7u32).with_transitions([(7u32, 'a', 3u32), (3, 'b', 7)]);
        let renamed = rename_states(&nfa, "p");
        let copy = renamed.clone();
        assert_eq!(copy.automaton, renamed.automaton);
        assert_eq!(copy.renaming, renamed.renaming);
        assert_eq!(copy.renaming.get_by_left(&3), Some(&"p1".to_string()));
    }

    #[test]
    fn unreachable_states_are_dropped() {
        let mut nfa = three_branches();
        nfa.add_transition("island", "1", "s2");
        nfa.add_final("island");
        let renamed = nfa.renamed("q");
        assert_eq!(renamed.size(), 10);
        assert_eq!(renamed.final_states().len(), 3);
        assert_eq!(renamed.transition_count(), 9);
        assert_eq!(renamed.validate(), Ok(()));
    }

    #[test]
    fn renaming_twice_changes_nothing() {
        let nfa: Automaton = Automaton::new("a")
            .with_transitions([
                ("a", "x", "c"),
                ("a", "x", "b"),
                ("b", "y", "b"),
                ("c", "y", "a"),
                ("c", "z", "d"),
            ])
            .with_final_states(["d"]);
        let once = nfa.renamed("q");
        let twice = once.renamed("q");
        assert_eq!(once, twice);

        let names: BTreeSet<String> = (0..once.size()).map(|i| format!("q{i}")).collect();
        assert_eq!(once.states(), &names);
        for word in ["x y", "x z", "x y a", "x y y y"] {
            assert_eq!(nfa.accepts_str(word, " "), once.accepts_str(word, " "));
        }
    }
}

use itertools::Itertools;

use crate::{math::natural_cmp, Automaton, Show, StateId, Symbol};

/// Quotes an identifier for use in DOT, escaping backslashes and double quotes. State names
/// of inferred models can contain arbitrary characters, so everything is quoted.
fn quote_dot_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Types which have a graphviz representation.
pub trait Dottable {
    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        let header = std::iter::once(format!(
            "digraph {} {{",
            quote_dot_ident(&self.dot_name().unwrap_or("A".to_string()))
        ))
        .chain(self.dot_header_statements());

        header
            .chain(self.dot_body_statements())
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }

    /// The name of the digraph.
    fn dot_name(&self) -> Option<String> {
        None
    }

    /// Statements that are emitted right after the opening of the graph.
    fn dot_header_statements(&self) -> Vec<String> {
        vec![]
    }

    /// Node and edge statements.
    fn dot_body_statements(&self) -> Vec<String>;

    /// Renders the object to a PNG file with the given filename by running the `dot`
    /// executable on a temporary file containing the DOT representation. This method is
    /// only available on the `graphviz` crate feature.
    #[cfg(feature = "graphviz")]
    fn render_to_file_name(&self, filename: &str) -> Result<(), std::io::Error> {
        use std::io::Write;
        use tracing::trace;

        trace!("Outputting dot and rendering to png");
        let dot = self.dot_representation();
        let mut tempfile = tempfile::NamedTempFile::new()?;

        tempfile.write_all(dot.as_bytes())?;
        let tempfile_name = tempfile.path();

        let status = std::process::Command::new("dot")
            .arg("-Tpng")
            .arg("-o")
            .arg(filename)
            .arg(tempfile_name)
            .status()?;
        if !status.success() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("dot process exited with status: {}", status),
            ));
        }
        Ok(())
    }
}

/// Name of the invisible node pointing at the initial state. Underscores are prepended until
/// the name differs from every state name.
fn start_node<S: Symbol, Q: StateId>(automaton: &Automaton<S, Q>) -> String {
    let names = automaton.states().iter().map(Show::show).collect::<Vec<_>>();
    let mut name = "__start".to_string();
    while names.contains(&name) {
        name.insert(0, '_');
    }
    quote_dot_ident(&name)
}

impl<S: Symbol, Q: StateId> Dottable for Automaton<S, Q> {
    fn dot_header_statements(&self) -> Vec<String> {
        let start = start_node(self);
        vec![
            "rankdir=LR".to_string(),
            "size=\"8,5\"".to_string(),
            format!("{start} [shape=point]"),
            format!("{start} -> {}", quote_dot_ident(&self.initial().show())),
        ]
    }

    fn dot_body_statements(&self) -> Vec<String> {
        let states = self
            .states()
            .iter()
            .sorted_by(|p, q| natural_cmp(&p.show(), &q.show()))
            .map(|q| {
                let shape = if self.is_final(q) {
                    "doublecircle"
                } else {
                    "circle"
                };
                format!("{} [shape={shape}]", quote_dot_ident(&q.show()))
            });
        let edges = self.edges().map(|(from, on, to)| {
            format!(
                "{} -> {} [label={}]",
                quote_dot_ident(&from.show()),
                quote_dot_ident(&to.show()),
                quote_dot_ident(&on.show())
            )
        });
        states.chain(edges).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Dottable;
    use crate::Automaton;

    #[test_log::test]
    fn dot_of_small_automaton() {
        let nfa: Automaton = Automaton::new("q0")
            .with_transitions([("q0", "a", "q1"), ("q1", "\"b\"", "q0")])
            .with_final_states(["q1"]);
        assert_eq!(
            nfa.dot_representation(),
            [
                "digraph \"A\" {",
                "rankdir=LR",
                "size=\"8,5\"",
                "\"__start\" [shape=point]",
                "\"__start\" -> \"q0\"",
                "\"q0\" [shape=circle]",
                "\"q1\" [shape=doublecircle]",
                "\"q0\" -> \"q1\" [label=\"a\"]",
                "\"q1\" -> \"q0\" [label=\"\\\"b\\\"\"]",
                "}",
            ]
            .join("\n")
        );
    }

    #[test]
    fn start_node_differs_from_states() {
        let nfa: Automaton = Automaton::new("start")
            .with_transitions([("start", "a", "__start"), ("__start", "b", "___start")]);
        let dot = nfa.dot_representation();
        assert!(dot.contains("\"____start\" [shape=point]"));
        assert!(dot.contains("\"____start\" -> \"start\""));
        assert!(dot.contains("\"start\" [shape=circle]"));
    }
}

use itertools::Itertools;
use thiserror::Error;

use crate::{Show, Symbol};

/// Errors that can occur when creating a [`Trace`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum TraceError {
    /// A trace must consist of at least one symbol.
    #[error("a trace must contain at least one symbol")]
    Empty,
}

/// A trace is a finite, non-empty sequence of observed events (symbols). Traces are
/// the input from which models are inferred, and they are what an [`crate::Automaton`]
/// accepts or rejects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Trace<S = String>(Vec<S>);

impl<S: Symbol> Trace<S> {
    /// Creates a trace from the given symbols, fails if there are none.
    pub fn new<I: IntoIterator<Item = S>>(symbols: I) -> Result<Self, TraceError> {
        let symbols = symbols.into_iter().collect_vec();
        if symbols.is_empty() {
            return Err(TraceError::Empty);
        }
        Ok(Self(symbols))
    }

    /// Gives the symbols of the trace in order.
    pub fn symbols(&self) -> &[S] {
        &self.0
    }

    /// Returns the number of symbols in the trace, which is always positive.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Traces are never empty, this exists for symmetry with [`Trace::len`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the symbols.
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.0.iter()
    }
}

impl Trace<String> {
    /// Splits `word` at every occurrence of `separator`. Empty pieces, which arise from
    /// repeated or surrounding separators, are dropped.
    ///
    /// # Example
    /// ```
    /// use automata::word::Trace;
    /// let trace = Trace::parse("open  read close", " ").unwrap();
    /// assert_eq!(trace.symbols(), &["open", "read", "close"]);
    /// assert!(Trace::parse("   ", " ").is_err());
    /// ```
    pub fn parse(word: &str, separator: &str) -> Result<Self, TraceError> {
        Self::new(
            word.split(separator)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string),
        )
    }
}

impl<S> AsRef<[S]> for Trace<S> {
    fn as_ref(&self) -> &[S] {
        &self.0
    }
}

impl<'a, S> IntoIterator for &'a Trace<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Show> Show for Trace<S> {
    fn show(&self) -> String {
        self.0.iter().map(Show::show).join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::{Trace, TraceError};
    use crate::Show;

    #[test]
    fn parse_with_separators() {
        let trace = Trace::parse("a,b,,c", ",").unwrap();
        assert_eq!(trace.symbols(), &["a", "b", "c"]);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.show(), "a b c");

        assert_eq!(Trace::parse("", " "), Err(TraceError::Empty));
        assert_eq!(Trace::<char>::new([]), Err(TraceError::Empty));
        assert_eq!(Trace::new(['x']).unwrap().symbols(), &['x']);
    }
}

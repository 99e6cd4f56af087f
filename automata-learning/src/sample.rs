use std::{collections::BTreeSet, io::BufRead};

use automata::prelude::*;
use thiserror::Error;
use tracing::{debug, trace};

/// Abstracts the types of errors that can occur when reading a [`TraceSample`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SampleParseError {
    /// The trace at the given position (index for strings, line number for lines) has no
    /// symbols once it is split.
    #[error("trace at position {0} contains no symbols")]
    EmptyTrace(usize),
    /// Reading from the underlying source failed.
    #[error("could not read traces: {0}")]
    Io(String),
}

/// An ordered collection of traces. The order matters, since the prefix tree allocates
/// its states trace by trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSample<S = String> {
    traces: Vec<Trace<S>>,
}

impl<S> Default for TraceSample<S> {
    fn default() -> Self {
        Self { traces: vec![] }
    }
}

impl<S: Symbol> TraceSample<S> {
    /// Appends a trace.
    pub fn push(&mut self, trace: Trace<S>) {
        self.traces.push(trace);
    }

    /// Gives the traces in order.
    pub fn traces(&self) -> &[Trace<S>] {
        &self.traces
    }

    /// Returns an iterator over the traces.
    pub fn iter(&self) -> std::slice::Iter<'_, Trace<S>> {
        self.traces.iter()
    }

    /// The number of traces.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Returns `true` if there are no traces.
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Returns the set of all symbols which occur in some trace.
    pub fn alphabet(&self) -> BTreeSet<&S> {
        self.traces.iter().flat_map(|trace| trace.iter()).collect()
    }

    /// Returns the maximum length of any trace in the sample. Gives back `0` if there are none.
    pub fn max_trace_len(&self) -> usize {
        self.traces.iter().map(Trace::len).max().unwrap_or(0)
    }
}

impl TraceSample<String> {
    /// Builds a sample from flat strings, each of which is split at `separator`. Errors
    /// report the position of the offending string.
    pub fn from_strs<I, W>(words: I, separator: &str) -> Result<Self, SampleParseError>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let traces = words
            .into_iter()
            .enumerate()
            .map(|(index, word)| {
                Trace::parse(word.as_ref(), separator)
                    .map_err(|_| SampleParseError::EmptyTrace(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { traces })
    }

    /// Reads one trace per line. Lines that are blank or start with `#` are skipped.
    /// Errors report the (1-based) line number.
    pub fn try_from_lines<I: Iterator<Item = String>>(
        lines: I,
        separator: &str,
    ) -> Result<Self, SampleParseError> {
        let mut sample = Self::default();
        for (number, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            trace!("parsing trace \"{line}\"");
            let parsed = Trace::parse(line, separator)
                .map_err(|_| SampleParseError::EmptyTrace(number + 1))?;
            sample.push(parsed);
        }
        debug!("read sample with {} traces", sample.len());
        Ok(sample)
    }

    /// Reads traces from `reader` as in [`TraceSample::try_from_lines`].
    pub fn from_reader<R: BufRead>(reader: R, separator: &str) -> Result<Self, SampleParseError> {
        let lines = reader
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SampleParseError::Io(e.to_string()))?;
        Self::try_from_lines(lines.into_iter(), separator)
    }
}

impl<'a, S> IntoIterator for &'a TraceSample<S> {
    type Item = &'a Trace<S>;
    type IntoIter = std::slice::Iter<'a, Trace<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{SampleParseError, TraceSample};

    #[test]
    fn sample_from_strings() {
        let sample = TraceSample::from_strs(["a b", "a b b", "c"], " ").unwrap();
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.max_trace_len(), 3);
        assert_eq!(
            sample.alphabet().into_iter().cloned().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            TraceSample::from_strs(["a", " "], " "),
            Err(SampleParseError::EmptyTrace(1))
        );
    }

    #[test_log::test]
    fn sample_from_reader() {
        let input = "# observed sessions\nlogin;read;logout\n\n  login;logout  \n";
        let sample = TraceSample::from_reader(input.as_bytes(), ";").unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.traces()[1].symbols(), &["login", "logout"]);

        assert_eq!(
            TraceSample::from_reader("a\n;;\n".as_bytes(), ";"),
            Err(SampleParseError::EmptyTrace(2))
        );
    }
}

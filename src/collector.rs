use crate::error::ParseError;
use std::collections::BTreeSet;

/// Collects every [`ParseError`] registered during a single parse so the
/// furthest-progress failure can be reported even when it was ultimately
/// swallowed by a `Choice`, `Optional`, or `Repeat`.
///
/// Scoped to one call to [`parse`](crate::parser::GrammarParser::parse) —
/// unlike the source this engine grew out of, which attached a single
/// collector to the combinator graph itself at load time, a collector here
/// is created fresh per parse and threaded through every `advance` call.
/// That is what lets the same compiled grammar be used for multiple
/// concurrent parses.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<ParseError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn register(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Partition the collected errors by offset, take the maximum, and
    /// union the `expected` sets of every error at that offset.
    pub fn furthest_error(&self) -> Option<ParseError> {
        let max_offset = self.errors.iter().map(|e| e.offset).max()?;

        let mut expected = BTreeSet::new();
        let mut found = None;
        for error in &self.errors {
            if error.offset == max_offset {
                expected.extend(error.expected.iter().cloned());
                if found.is_none() {
                    found = Some(error.found.clone());
                }
            }
        }

        Some(ParseError::new(max_offset, found.unwrap(), expected))
    }
}

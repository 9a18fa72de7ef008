use crate::error::TokenizerError;
use crate::log::Log;
use crate::position::Code;
use crate::token::{Token, TokenType};
use regex::Regex;
use std::collections::HashSet;
use std::rc::Rc;

/// An ordered `(token type, compiled regex)` table plus the subset of
/// token types considered filtered (whitespace, comments, ...).
///
/// Order is the only thing that decides priority when two patterns match
/// at the same offset: the first entry that matches wins, regardless of
/// which match is longer.
pub struct TokenTable {
    entries: Vec<(TokenType, Regex)>,
    filtered: HashSet<TokenType>,
    debug: Log<&'static str>,
}

impl TokenTable {
    pub fn new(entries: Vec<(TokenType, Regex)>, filtered: HashSet<TokenType>) -> Self {
        Self {
            entries,
            filtered,
            debug: Log::None,
        }
    }

    pub fn set_log(&mut self, log: Log<&'static str>) {
        self.debug = log;
    }

    pub fn token_types(&self) -> impl Iterator<Item = &TokenType> {
        self.entries.iter().map(|(t, _)| t)
    }

    /// Split `code` into a token stream. When `filter` is true, tokens
    /// whose type is in the filtered set are produced during scanning (so
    /// offsets always advance correctly) but dropped from the returned
    /// stream.
    pub fn tokenize(&self, code: &Code) -> Result<Vec<Token>, TokenizerError> {
        self.tokenize_with_filter(code, true)
    }

    pub fn tokenize_with_filter(
        &self,
        code: &Code,
        filter: bool,
    ) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        let mut offset = 0usize;
        let len = code.text.len();

        while offset < len {
            let position = code.position_at(offset);
            let matched = self
                .entries
                .iter()
                .find_map(|(token_type, regex)| match regex.find(&code.text[offset..]) {
                    Some(m) if m.start() == 0 => Some((token_type, m.end())),
                    _ => None,
                });

            let (token_type, matched_len) = match matched {
                Some(found) => found,
                None => {
                    #[cfg(debug_assertions)]
                    if self.debug.order() >= Log::Default(()).order() {
                        println!("{}: tokenization failed at {}", self.debug, position);
                    }
                    return Err(TokenizerError::new(position));
                }
            };

            let value: Rc<str> = Rc::from(&code.text[offset..offset + matched_len]);
            let token = Token::new(value, token_type.clone(), position.clone());

            #[cfg(debug_assertions)]
            if self.debug.order() >= Log::Success(()).order() {
                println!("{}: matched {} {:?}", self.debug, token_type, token.value);
            }

            if !(filter && self.filtered.contains(token_type)) {
                tokens.push(token);
            }

            offset += matched_len;
        }

        Ok(tokens)
    }
}

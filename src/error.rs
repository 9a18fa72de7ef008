use crate::position::Position;
use crate::token::{Found, TokenType};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Failure while compiling a JSON grammar document into a parser graph.
/// Fatal: no parse is attempted once this is returned.
#[derive(Debug, Clone)]
pub struct GrammarLoadError {
    message: String,
}

impl GrammarLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for GrammarLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not load grammar: {}", self.message)
    }
}

impl std::error::Error for GrammarLoadError {}

/// No token pattern in the table matched at `position`.
#[derive(Debug, Clone)]
pub struct TokenizerError {
    pub position: Position,
}

impl TokenizerError {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl Display for TokenizerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: Tokenization failed.", self.position)
    }
}

impl std::error::Error for TokenizerError {}

/// A single combinator failure: what was found at `offset`, and what token
/// types would have been accepted there instead.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub offset: usize,
    pub found: Found,
    pub expected: BTreeSet<TokenType>,
}

impl ParseError {
    pub fn new(offset: usize, found: Found, expected: BTreeSet<TokenType>) -> Self {
        Self {
            offset,
            found,
            expected,
        }
    }

    fn expected_list(&self) -> String {
        self.expected
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.found {
            Found::EndOfFile(eof) => write!(
                f,
                "{}: Unexpected end of file\nExpected one of: {}",
                eof.file,
                self.expected_list()
            ),
            Found::Token(token) => write!(
                f,
                "{}: Unexpected token type\nExpected one of: {}\n          Found: {}",
                token.position,
                self.expected_list(),
                token.token_type
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// The caller asked to parse as a node type that is not declared in the
/// grammar.
#[derive(Debug, Clone)]
pub struct UnknownNodeType {
    pub node_type: String,
}

impl UnknownNodeType {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
        }
    }
}

impl Display for UnknownNodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown node type {}", self.node_type)
    }
}

impl std::error::Error for UnknownNodeType {}

use crate::position::Position;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// A declared token type name (`[a-z][a-z_]*`).
///
/// Wrapping the interned name rather than using a bare `Rc<str>` keeps a
/// token type from being accidentally compared against a [`NodeType`] even
/// though both are just strings under the hood.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenType(pub Rc<str>);

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenType {
    fn from(s: &str) -> Self {
        TokenType(Rc::from(s))
    }
}

/// A declared node type name (`[A-Z][A-Z_]*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeType(pub Rc<str>);

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        NodeType(Rc::from(s))
    }
}

/// A single lexical token: the matched text, its declared type, and the
/// position of its first byte.
///
/// `value` is never empty — the tokenizer advances by `value.len()` bytes
/// after emitting a token, so a zero-length token would stall tokenization
/// forever. The grammar loader refuses to compile a token regex that can
/// match the empty string, which is what keeps this invariant intact at
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: Rc<str>,
    pub token_type: TokenType,
    pub position: Position,
}

impl Token {
    pub fn new(value: Rc<str>, token_type: TokenType, position: Position) -> Self {
        debug_assert!(!value.is_empty(), "emitted token must not be empty");
        Self {
            value,
            token_type,
            position,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": self.token_type.0, "value": self.value })
    }
}

/// A sentinel produced when a parser looks past the last emitted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfFile {
    pub file: Rc<str>,
}

impl EndOfFile {
    pub fn new(file: Rc<str>) -> Self {
        Self { file }
    }
}

/// Whatever a combinator found at a failing offset: a concrete token, or
/// end of file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token(Token),
    EndOfFile(EndOfFile),
}

impl Display for Found {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Found::Token(t) => write!(f, "{}", t.token_type),
            Found::EndOfFile(_) => write!(f, "end of file"),
        }
    }
}

//! gramwright is a library to compile a JSON grammar document into a
//! recursive-descent parser, rather than generating or hand-writing one.
//!
//! # Overview
//!
//! Parsers for a new little language are usually either hand-written or
//! produced by a generator that reads a grammar file in its own DSL and
//! emits target-language source. This crate takes a third path: the
//! grammar is data (a JSON document naming tokens and node rules), and
//! that data is compiled directly into an in-memory network of
//! [`Combinator`](combinator::Combinator)s which [`GrammarParser`] drives
//! against a token stream. There is no generated code and no DSL beyond
//! the rule-string syntax described below.
//!
//! # Design
//!
//! A grammar document has three parts: `keyword_tokens` and
//! `regular_tokens` (each a map from token type name to a regular
//! expression), `filtered_tokens` (token types dropped from the stream
//! after tokenizing, e.g. whitespace), and `nodes` (a map from node type
//! name to a rule string). A rule string is built from token and node
//! type references, concatenation (space-separated), alternation (`|`),
//! grouping (`(...)`), and the postfix operators `?`, `*`, `+`.
//!
//! [`Grammar::load`] compiles this document: it tokenizes nothing itself,
//! but checks the document's own shape, lexes and parses every rule
//! string, and wires node references together into a
//! [`CombinatorArena`](combinator::CombinatorArena). [`GrammarParser`]
//! then tokenizes an input string against the grammar's token table and
//! drives the combinator graph from the declared root node type,
//! producing a typed [`Node`] tree once the whole input has been
//! consumed.
//!
//! # Example
//!
//! A minimal grammar for a run of integers separated by `+`:
//!
//! ```
//! use gramwright::GrammarParser;
//!
//! let grammar = r#"
//! {
//!     "keyword_tokens": {},
//!     "regular_tokens": { "int": "[0-9]+", "plus": "\\+", "ws": "\\s+" },
//!     "filtered_tokens": ["ws"],
//!     "nodes": { "EXPR": "int (plus int)*" },
//!     "root_node": "EXPR"
//! }
//! "#;
//!
//! let parser = GrammarParser::from_json(grammar).unwrap();
//! let tree = parser.parse("1 + 2 + 3", "<input>").unwrap();
//! assert_eq!(tree.tokens().len(), 5);
//! ```
//!
//! # License
//! [gramwright](crate) is provided under the MIT license.

mod collector;
pub mod combinator;
pub mod error;
pub mod firstset;
pub mod flatten;
pub mod grammar;
pub mod log;
mod parser;
pub mod position;
pub mod token;
pub mod tree;

pub use error::{GrammarLoadError, ParseError, TokenizerError, UnknownNodeType};
pub use grammar::Grammar;
pub use log::Log;
pub use parser::{GrammarParser, ParseFailure};
pub use position::{Code, Position};
pub use token::{EndOfFile, Found, NodeType, Token, TokenType};
pub use tree::{InnerTree, Node, NodeChild, TreeChild};

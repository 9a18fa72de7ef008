use crate::collector::ErrorCollector;
use crate::combinator::{advance, NodeTable};
use crate::error::{ParseError, TokenizerError, UnknownNodeType};
use crate::flatten::flatten;
use crate::grammar::Grammar;
use crate::log::Log;
use crate::position::Code;
use crate::token::{EndOfFile, Found, NodeType, Token};
use crate::tree::Node;
use std::rc::Rc;

/// Every way a call to [`GrammarParser::parse`]/[`parse_as`](GrammarParser::parse_as)
/// can fail: the requested entry node isn't declared, tokenization never
/// reached the end of the input, or no combinator sequence matched the
/// token stream.
#[derive(Debug, Clone)]
pub enum ParseFailure {
    UnknownNodeType(UnknownNodeType),
    Tokenizer(TokenizerError),
    Parse(ParseError),
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailure::UnknownNodeType(e) => write!(f, "{}", e),
            ParseFailure::Tokenizer(e) => write!(f, "{}", e),
            ParseFailure::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseFailure {}

impl From<UnknownNodeType> for ParseFailure {
    fn from(e: UnknownNodeType) -> Self {
        ParseFailure::UnknownNodeType(e)
    }
}

impl From<TokenizerError> for ParseFailure {
    fn from(e: TokenizerError) -> Self {
        ParseFailure::Tokenizer(e)
    }
}

impl From<ParseError> for ParseFailure {
    fn from(e: ParseError) -> Self {
        ParseFailure::Parse(e)
    }
}

/// The façade over a compiled [`Grammar`]: tokenize, parse from a chosen
/// node type, and flatten the result into a typed [`Node`] tree.
///
/// Holds no per-parse state itself — every call to [`parse`](Self::parse)
/// or [`parse_as`](Self::parse_as) builds a fresh [`ErrorCollector`], so
/// the same `GrammarParser` can drive any number of independent parses,
/// sequentially, over the same compiled grammar.
pub struct GrammarParser {
    grammar: Grammar,
}

impl GrammarParser {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    /// Compile a grammar from its JSON text and wrap it in a parser.
    pub fn from_json(json_text: &str) -> Result<Self, crate::error::GrammarLoadError> {
        Ok(Self::new(Grammar::load(json_text)?))
    }

    /// Route tokenizer and combinator dispatch trace output through `log`.
    pub fn with_log(mut self, log: Log<&'static str>) -> Self {
        self.grammar.set_log(log);
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse `text` starting from the grammar's declared root node.
    pub fn parse(&self, text: &str, file: impl Into<Rc<str>>) -> Result<Node, ParseFailure> {
        let root = self.grammar.root_node_type.clone();
        self.parse_as(text, file, &root)
    }

    /// Parse `text` as an instance of `node_type` rather than the
    /// grammar's declared root. Useful for grammars that describe several
    /// independently-entry-able node types (e.g. parsing a single
    /// expression rather than a whole program).
    pub fn parse_as(
        &self,
        text: &str,
        file: impl Into<Rc<str>>,
        node_type: &NodeType,
    ) -> Result<Node, ParseFailure> {
        let file: Rc<str> = file.into();
        if !self.grammar.has_node_type(node_type) {
            return Err(UnknownNodeType::new(node_type.0.to_string()).into());
        }

        let code = Code::new(text, file.clone());
        let tokens = self.grammar.token_table.tokenize(&code)?;

        let mut collector = ErrorCollector::new();
        let root_idx = self.grammar.root_of(node_type);

        match advance(&self.grammar, root_idx, &tokens, 0, &file, &mut collector) {
            Ok((tree, consumed)) => {
                if consumed == tokens.len() {
                    let inner = tree
                        .into_inner()
                        .expect("a node's root combinator always produces an InnerTree");
                    Ok(flatten(inner))
                } else {
                    Err(ParseFailure::Parse(leftover_input_error(
                        &self.grammar,
                        node_type,
                        &tokens,
                        consumed,
                        &file,
                    )))
                }
            }
            Err(_) => {
                let furthest = collector
                    .furthest_error()
                    .expect("a failed advance() always registers at least one error");
                Err(ParseFailure::Parse(furthest))
            }
        }
    }
}

fn leftover_input_error(
    grammar: &Grammar,
    node_type: &NodeType,
    tokens: &[Token],
    consumed: usize,
    file: &Rc<str>,
) -> ParseError {
    let expected = grammar
        .top_level_tokens(node_type)
        .cloned()
        .unwrap_or_default();

    let found = match tokens.get(consumed) {
        Some(token) => Found::Token(token.clone()),
        None => Found::EndOfFile(EndOfFile::new(file.clone())),
    };

    ParseError::new(consumed, found, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const ARITHMETIC_GRAMMAR: &str = indoc! {r#"
        {
            "keyword_tokens": {},
            "regular_tokens": { "int": "[0-9]+", "plus": "\\+", "ws": "\\s+" },
            "filtered_tokens": ["ws"],
            "nodes": {
                "EXPR": "int (plus int)*"
            },
            "root_node": "EXPR"
        }
    "#};

    fn parser() -> GrammarParser {
        GrammarParser::from_json(ARITHMETIC_GRAMMAR).unwrap()
    }

    #[test]
    fn parses_a_full_expression() {
        let node = parser().parse("1 + 2 + 3", "<test>").unwrap();
        assert_eq!(node.node_type, NodeType::from("EXPR"));
        assert_eq!(node.tokens().len(), 5);
    }

    #[test]
    fn empty_input_fails_at_offset_zero() {
        let err = parser().parse("", "<test>").unwrap_err();
        match err {
            ParseFailure::Parse(e) => assert_eq!(e.offset, 0),
            other => panic!("expected a parse failure, got {:?}", other),
        }
    }

    #[test]
    fn trailing_operator_fails_at_end_of_file() {
        let err = parser().parse("1 +", "<test>").unwrap_err();
        match err {
            ParseFailure::Parse(e) => {
                assert!(matches!(e.found, Found::EndOfFile(_)));
                assert!(e.expected.contains(&crate::token::TokenType::from("int")));
            }
            other => panic!("expected a parse failure, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_trailing_input_is_reported_as_leftover() {
        let err = parser().parse("1 + 2 3", "<test>").unwrap_err();
        match err {
            ParseFailure::Parse(e) => {
                assert_eq!(e.offset, 3);
                assert!(matches!(e.found, Found::Token(_)));
                assert!(e.expected.contains(&crate::token::TokenType::from("plus")));
            }
            other => panic!("expected a parse failure, got {:?}", other),
        }
    }

    #[test]
    fn tokenizer_error_on_unknown_character() {
        let err = parser().parse("1 @ 2", "<test>").unwrap_err();
        assert!(matches!(err, ParseFailure::Tokenizer(_)));
    }

    #[test]
    fn unknown_requested_node_type_is_rejected() {
        let err = parser()
            .parse_as("1", "<test>", &NodeType::from("NOT_A_NODE"))
            .unwrap_err();
        assert!(matches!(err, ParseFailure::UnknownNodeType(_)));
    }
}

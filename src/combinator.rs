use crate::collector::ErrorCollector;
use crate::error::ParseError;
use crate::log::Log;
use crate::token::{EndOfFile, Found, NodeType, Token, TokenType};
use crate::tree::{InnerTree, TreeChild};
use std::collections::BTreeSet;
use std::rc::Rc;

/// A stable handle into a [`CombinatorArena`]. `NodeRef` resolves by name
/// through [`NodeTable::root_of`] rather than holding one of these
/// directly, which is what lets mutually recursive node types reference
/// each other without a two-pass mutation step over the arena itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombIdx(pub usize);

/// One of the five primitive parsers plus the non-owning node reference,
/// as a tagged variant rather than a trait-object hierarchy. Matching
/// on a closed enum keeps every combinator's match arms exhaustive and
/// lets the arena store them by value instead of behind `Rc<dyn Trait>`.
#[derive(Debug, Clone)]
pub enum Combinator {
    Token(TokenType),
    NodeRef(NodeType),
    /// `None` label marks scaffolding produced by a parenthesized group;
    /// `Some` marks the root combinator of a declared node's rule.
    Concat(Vec<CombIdx>, Option<NodeType>),
    Choice(Vec<CombIdx>),
    Optional(CombIdx),
    /// `min` is `0` for `*`, `1` for `+`.
    Repeat(CombIdx, u8),
}

/// Owns every combinator compiled from every node's rule string, across
/// the whole grammar. Combinators are immutable once pushed.
#[derive(Debug, Default)]
pub struct CombinatorArena {
    nodes: Vec<Combinator>,
}

impl CombinatorArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, combinator: Combinator) -> CombIdx {
        self.nodes.push(combinator);
        CombIdx(self.nodes.len() - 1)
    }

    pub fn get(&self, idx: CombIdx) -> &Combinator {
        &self.nodes[idx.0]
    }
}

/// The table of compiled node roots a `NodeRef` resolves against, and the
/// arena those roots live in. A trait rather than a concrete struct so the
/// combinator engine doesn't need to know about JSON loading.
pub trait NodeTable {
    fn arena(&self) -> &CombinatorArena;
    fn root_of(&self, node_type: &NodeType) -> CombIdx;

    /// Debug verbosity for combinator dispatch tracing. Defaults to
    /// silent; [`Grammar`](crate::grammar::Grammar) is the only
    /// implementation that overrides it, via `set_log`.
    fn log(&self) -> Log<&'static str> {
        Log::None
    }
}

/// Try to match `comb` against `tokens` starting at `offset`.
///
/// Every failure is registered with `collector` before being returned —
/// `Choice`, `Optional`, and `Repeat` catch the `Result` locally but never
/// swallow the registration, so the furthest-progress failure across the
/// whole parse stays discoverable even when a later alternative succeeds.
pub fn advance<G: NodeTable>(
    grammar: &G,
    comb: CombIdx,
    tokens: &[Token],
    offset: usize,
    file: &Rc<str>,
    collector: &mut ErrorCollector,
) -> Result<(TreeChild, usize), ParseError> {
    #[cfg(debug_assertions)]
    if grammar.log().order() >= Log::Verbose(()).order() {
        println!("{}: dispatch {:?} at offset {}", grammar.log(), grammar.arena().get(comb), offset);
    }

    match grammar.arena().get(comb).clone() {
        Combinator::Token(token_type) => match tokens.get(offset) {
            None => {
                let mut expected = BTreeSet::new();
                expected.insert(token_type);
                let error = ParseError::new(
                    offset,
                    Found::EndOfFile(EndOfFile::new(file.clone())),
                    expected,
                );
                collector.register(error.clone());
                Err(error)
            }
            Some(token) if token.token_type != token_type => {
                let mut expected = BTreeSet::new();
                expected.insert(token_type);
                let error = ParseError::new(offset, Found::Token(token.clone()), expected);
                collector.register(error.clone());
                Err(error)
            }
            Some(token) => {
                #[cfg(debug_assertions)]
                if grammar.log().order() >= Log::Success(()).order() {
                    println!("{}: matched {} {:?} at offset {}", grammar.log(), token_type, token.value, offset);
                }
                Ok((TreeChild::Token(token.clone()), offset + 1))
            }
        },

        Combinator::NodeRef(node_type) => {
            let root = grammar.root_of(&node_type);
            advance(grammar, root, tokens, offset, file, collector)
        }

        Combinator::Concat(children, label) => {
            let mut collected = Vec::with_capacity(children.len());
            let mut cursor = offset;
            for child in children {
                let (tree, next) = advance(grammar, child, tokens, cursor, file, collector)?;
                collected.push(tree);
                cursor = next;
            }
            let inner = match label {
                Some(node_type) => InnerTree::typed(node_type, collected),
                None => InnerTree::anonymous(collected),
            };
            Ok((TreeChild::Inner(inner), cursor))
        }

        Combinator::Choice(children) => {
            let mut last_error = None;
            for child in children {
                match advance(grammar, child, tokens, offset, file, collector) {
                    Ok(result) => return Ok(result),
                    Err(error) => last_error = Some(error),
                }
            }
            Err(last_error.expect("Choice combinator must have at least one alternative"))
        }

        Combinator::Optional(inner) => {
            match advance(grammar, inner, tokens, offset, file, collector) {
                Ok(result) => Ok(result),
                Err(_) => Ok((TreeChild::Inner(InnerTree::anonymous(Vec::new())), offset)),
            }
        }

        Combinator::Repeat(inner, min) => {
            let mut collected = Vec::new();
            let mut cursor = offset;
            loop {
                match advance(grammar, inner, tokens, cursor, file, collector) {
                    Ok((tree, next)) => {
                        debug_assert!(
                            next > cursor,
                            "repeated combinator must consume at least one token per iteration"
                        );
                        collected.push(tree);
                        cursor = next;
                    }
                    Err(error) => {
                        if collected.len() < min as usize {
                            return Err(error);
                        }
                        break;
                    }
                }
            }
            Ok((
                TreeChild::Inner(InnerTree::anonymous(collected)),
                cursor,
            ))
        }
    }
}

//! Nullability and FIRST-set computation over a compiled combinator graph.
//!
//! Used for two things: validating, at load time, that a `Repeat`'s inner
//! combinator cannot match the empty input (§4.C); and precomputing, per
//! node type, the set of token types that may legally open a parse of
//! that node, consumed by the façade to populate `expected` when leftover
//! input remains after an otherwise successful parse (§4.E step 4).

use crate::combinator::{CombIdx, Combinator, NodeTable};
use crate::token::TokenType;
use std::collections::{BTreeSet, HashSet};

/// Whether `comb` can successfully match the empty input.
///
/// Cyclic references (a node type reachable from itself without
/// consuming a token) are broken by treating a revisited combinator as
/// non-nullable — sound for every grammar this engine supports, since
/// left-recursive rules are never compiled by the loader in the first
/// place.
pub fn is_nullable<G: NodeTable>(grammar: &G, comb: CombIdx) -> bool {
    is_nullable_inner(grammar, comb, &mut HashSet::new())
}

fn is_nullable_inner<G: NodeTable>(grammar: &G, comb: CombIdx, visited: &mut HashSet<CombIdx>) -> bool {
    if !visited.insert(comb) {
        return false;
    }
    let result = match grammar.arena().get(comb) {
        Combinator::Token(_) => false,
        Combinator::NodeRef(node_type) => {
            is_nullable_inner(grammar, grammar.root_of(node_type), visited)
        }
        Combinator::Concat(children, _) => children
            .iter()
            .all(|c| is_nullable_inner(grammar, *c, visited)),
        Combinator::Choice(children) => children
            .iter()
            .any(|c| is_nullable_inner(grammar, *c, visited)),
        Combinator::Optional(_) => true,
        Combinator::Repeat(inner, min) => {
            *min == 0 || is_nullable_inner(grammar, *inner, visited)
        }
    };
    visited.remove(&comb);
    result
}

/// The set of token types that may begin a legal match of `comb`.
pub fn first_set<G: NodeTable>(grammar: &G, comb: CombIdx) -> BTreeSet<TokenType> {
    let mut acc = BTreeSet::new();
    collect_first_set(grammar, comb, &mut acc, &mut HashSet::new());
    acc
}

fn collect_first_set<G: NodeTable>(
    grammar: &G,
    comb: CombIdx,
    acc: &mut BTreeSet<TokenType>,
    visited: &mut HashSet<CombIdx>,
) {
    if !visited.insert(comb) {
        return;
    }
    match grammar.arena().get(comb) {
        Combinator::Token(token_type) => {
            acc.insert(token_type.clone());
        }
        Combinator::NodeRef(node_type) => {
            collect_first_set(grammar, grammar.root_of(node_type), acc, visited);
        }
        Combinator::Concat(children, _) => {
            for child in children {
                collect_first_set(grammar, *child, acc, visited);
                if !is_nullable(grammar, *child) {
                    break;
                }
            }
        }
        Combinator::Choice(children) => {
            for child in children {
                collect_first_set(grammar, *child, acc, visited);
            }
        }
        Combinator::Optional(inner) | Combinator::Repeat(inner, _) => {
            collect_first_set(grammar, *inner, acc, visited);
        }
    }
}

/// Whether `comb`, taken as a node's whole rule, could match empty
/// input. Called by `Grammar::load` for every declared node root; a
/// `true` result is a load error, since an empty node body carries no
/// information and is almost certainly a mistake.
pub fn matches_empty_body<G: NodeTable>(grammar: &G, comb: CombIdx) -> bool {
    is_nullable(grammar, comb)
}

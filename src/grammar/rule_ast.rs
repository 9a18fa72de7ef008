use super::rule_lexer::Segment;
use crate::error::GrammarLoadError;
use std::collections::HashSet;

/// The parsed shape of a node's rule string, before it is wired into a
/// [`Combinator`](crate::combinator::Combinator) graph.
///
/// Postfix operators (`?`, `*`, `+`) bind tighter than `|`: the rule-string
/// two-pass parser below builds postfix wrapping in its first pass and
/// only resolves `|` in a second pass over the resulting sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpr {
    TokenRef(String),
    NodeRef(String),
    Concat(Vec<RuleExpr>),
    Choice(Vec<RuleExpr>),
    Optional(Box<RuleExpr>),
    /// `min` is `0` for `*` and `1` for `+`.
    Repeat(Box<RuleExpr>, u8),
}

enum Item {
    Elem(RuleExpr),
    ChoiceMarker,
}

/// Lex and parse a node's rule string into a [`RuleExpr::Concat`].
pub fn parse_rule(node_type: &str, rule: &str) -> Result<RuleExpr, GrammarLoadError> {
    let segments = super::rule_lexer::lex_rule(node_type, rule)?;
    parse_segments(node_type, &segments)
}

/// Check that every `token_ref`/`node_ref` segment names a declared token
/// or node type, before any combinator construction is attempted.
pub fn validate_references(
    node_type: &str,
    segments: &[Segment],
    token_types: &HashSet<String>,
    node_types: &HashSet<String>,
) -> Result<(), GrammarLoadError> {
    for segment in segments {
        match segment {
            Segment::TokenRef(name) if !token_types.contains(name) => {
                return Err(GrammarLoadError::new(format!(
                    "In rule for node {}: unknown token type {}",
                    node_type, name
                )));
            }
            Segment::NodeRef(name) if !node_types.contains(name) => {
                return Err(GrammarLoadError::new(format!(
                    "In rule for node {}: unknown node type {}",
                    node_type, name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_segments(node_type: &str, segments: &[Segment]) -> Result<RuleExpr, GrammarLoadError> {
    let mut items: Vec<Item> = Vec::new();
    let mut i = 0usize;

    while i < segments.len() {
        match &segments[i] {
            Segment::TokenRef(name) => {
                items.push(Item::Elem(RuleExpr::TokenRef(name.clone())));
                i += 1;
            }
            Segment::NodeRef(name) => {
                items.push(Item::Elem(RuleExpr::NodeRef(name.clone())));
                i += 1;
            }
            Segment::GroupStart => {
                let end = find_group_end(node_type, segments, i)?;
                let inner = parse_segments(node_type, &segments[i + 1..end])?;
                items.push(Item::Elem(inner));
                i = end + 1;
            }
            Segment::GroupEnd => {
                return Err(invalid_syntax(node_type));
            }
            Segment::Or => {
                items.push(Item::ChoiceMarker);
                i += 1;
            }
            Segment::Optional | Segment::Repeat | Segment::RepeatAtLeastOnce => {
                let wrapped = match items.pop() {
                    Some(Item::Elem(inner)) => match &segments[i] {
                        Segment::Optional => RuleExpr::Optional(Box::new(inner)),
                        Segment::Repeat => RuleExpr::Repeat(Box::new(inner), 0),
                        Segment::RepeatAtLeastOnce => RuleExpr::Repeat(Box::new(inner), 1),
                        _ => unreachable!(),
                    },
                    _ => return Err(invalid_syntax(node_type)),
                };
                items.push(Item::Elem(wrapped));
                i += 1;
            }
        }
    }

    resolve_choices(node_type, items)
}

/// A Choice marker binds the whole sequence before it to the whole
/// sequence after it, not just the single adjacent element — `A B | A C`
/// is `Concat(A,B) | Concat(A,C)`, not `A | Choice(B,A) | C`. So this
/// first splits `items` into sequences at each marker (rejecting a marker
/// at either end or two markers in a row, which both produce an empty
/// sequence), concatenates each sequence, and only then builds the
/// `Choice` across sequences — a single sequence with no marker at all
/// skips the `Choice` wrapping entirely.
fn resolve_choices(node_type: &str, items: Vec<Item>) -> Result<RuleExpr, GrammarLoadError> {
    let mut sequences: Vec<Vec<RuleExpr>> = vec![Vec::new()];
    for item in items {
        match item {
            Item::Elem(expr) => sequences.last_mut().unwrap().push(expr),
            Item::ChoiceMarker => sequences.push(Vec::new()),
        }
    }

    if sequences.len() == 1 {
        let sequence = sequences.pop().unwrap();
        if sequence.is_empty() {
            return Err(GrammarLoadError::new(format!(
                "In rule for node {}: empty group is not allowed",
                node_type
            )));
        }
        return Ok(make_concat(sequence));
    }

    if sequences.iter().any(Vec::is_empty) {
        return Err(invalid_syntax(node_type));
    }

    let alternatives = sequences.into_iter().map(make_concat).collect();
    Ok(RuleExpr::Concat(vec![RuleExpr::Choice(alternatives)]))
}

/// Splice a nested `Concat` into its parent rather than nesting it — an
/// unlabeled parenthesized group concatenated with its siblings has no
/// structural meaning of its own once the rule is fully parsed.
fn make_concat(items: Vec<RuleExpr>) -> RuleExpr {
    let mut flat = Vec::new();
    for item in items {
        match item {
            RuleExpr::Concat(children) => flat.extend(children),
            other => flat.push(other),
        }
    }
    RuleExpr::Concat(flat)
}

fn find_group_end(
    node_type: &str,
    segments: &[Segment],
    start: usize,
) -> Result<usize, GrammarLoadError> {
    let mut depth = 1i32;
    let mut i = start + 1;
    while i < segments.len() {
        match segments[i] {
            Segment::GroupStart => depth += 1,
            Segment::GroupEnd => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(GrammarLoadError::new(format!(
        "In rule for node {}: unmatched '('",
        node_type
    )))
}

fn invalid_syntax(node_type: &str) -> GrammarLoadError {
    GrammarLoadError::new(format!("In rule for node {}: invalid syntax", node_type))
}

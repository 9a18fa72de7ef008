use crate::error::GrammarLoadError;
use once_cell::sync::Lazy;
use regex::Regex;

/// A lexical segment of a rule string, before it is assembled into a
/// [`RuleExpr`](super::rule_ast::RuleExpr).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    TokenRef(String),
    NodeRef(String),
    GroupStart,
    GroupEnd,
    Or,
    Optional,
    Repeat,
    RepeatAtLeastOnce,
}

/// `build` returns `None` for whitespace, which is matched like any other
/// segment but dropped rather than kept in the output. Order is
/// significant — earliest match wins, same rule as the token table.
static SEGMENT_PATTERNS: Lazy<Vec<(Regex, fn(&str) -> Option<Segment>)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^[a-z][a-z_]*").unwrap(),
            (|s| Some(Segment::TokenRef(s.to_string()))) as fn(&str) -> Option<Segment>,
        ),
        (
            Regex::new(r"^[A-Z][A-Z_]*").unwrap(),
            (|s| Some(Segment::NodeRef(s.to_string()))) as fn(&str) -> Option<Segment>,
        ),
        (Regex::new(r"^\s+").unwrap(), |_| None),
        (Regex::new(r"^\(").unwrap(), |_| Some(Segment::GroupStart)),
        (Regex::new(r"^\)").unwrap(), |_| Some(Segment::GroupEnd)),
        (Regex::new(r"^\|").unwrap(), |_| Some(Segment::Or)),
        (Regex::new(r"^\?").unwrap(), |_| Some(Segment::Optional)),
        (Regex::new(r"^\*").unwrap(), |_| Some(Segment::Repeat)),
        (Regex::new(r"^\+").unwrap(), |_| {
            Some(Segment::RepeatAtLeastOnce)
        }),
    ]
});

/// Tokenize a single node's rule string into a flat list of [`Segment`]s,
/// with whitespace segments already dropped.
pub fn lex_rule(node_type: &str, rule: &str) -> Result<Vec<Segment>, GrammarLoadError> {
    let mut segments = Vec::new();
    let mut offset = 0usize;

    'outer: while offset < rule.len() {
        for (regex, build) in SEGMENT_PATTERNS.iter() {
            if let Some(m) = regex.find(&rule[offset..]) {
                if m.start() != 0 {
                    continue;
                }
                if let Some(segment) = build(m.as_str()) {
                    segments.push(segment);
                }
                offset += m.end();
                continue 'outer;
            }
        }

        return Err(GrammarLoadError::new(format!(
            "In rule for node {}: could not lex segment at offset {}",
            node_type, offset
        )));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_concatenation_and_repetition() {
        let segments = lex_rule("EXPR", "int (plus int)*").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::TokenRef("int".into()),
                Segment::GroupStart,
                Segment::TokenRef("plus".into()),
                Segment::TokenRef("int".into()),
                Segment::GroupEnd,
                Segment::Repeat,
            ]
        );
    }

    #[test]
    fn lexes_choice_and_optional() {
        let segments = lex_rule("X", "A B? | A C").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::NodeRef("A".into()),
                Segment::NodeRef("B".into()),
                Segment::Optional,
                Segment::Or,
                Segment::NodeRef("A".into()),
                Segment::NodeRef("C".into()),
            ]
        );
    }

    #[test]
    fn rejects_unlexable_character() {
        let err = lex_rule("X", "a @ b").unwrap_err();
        assert!(err.to_string().contains("offset 2"));
    }
}

//! Compiles a JSON grammar document into an in-memory network of parser
//! combinators.
//!
//! The pipeline, in order: JSON decode, schema check, type check, token
//! table assembly, cross-reference validation, per-node rule lexing and
//! two-pass parsing, combinator construction, and FIRST-set
//! precomputation. Each stage can only fail with a [`GrammarLoadError`];
//! nothing downstream of a successful [`Grammar::load`] call can fail to
//! compile (outside of genuinely malformed input text, which is the
//! tokenizer's and parser's concern, not the loader's).

mod rule_ast;
mod rule_lexer;

use crate::combinator::{CombIdx, Combinator, CombinatorArena, NodeTable};
use crate::error::GrammarLoadError;
use crate::firstset;
use crate::log::Log;
use crate::token::{NodeType, TokenType};
use crate::tokenizer::TokenTable;
use once_cell::sync::Lazy;
use regex::Regex;
use rule_ast::RuleExpr;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};

static NODE_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z_]*$").unwrap());
static TOKEN_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z_]*$").unwrap());

const EXPECTED_FIELDS: &[&str] = &[
    "filtered_tokens",
    "keyword_tokens",
    "nodes",
    "regular_tokens",
    "root_node",
];

/// A compiled grammar: a token table, a combinator arena, and the map from
/// each declared node type to the root combinator of its rule.
pub struct Grammar {
    pub token_table: TokenTable,
    pub root_node_type: NodeType,
    arena: CombinatorArena,
    roots: HashMap<NodeType, CombIdx>,
    first_sets: HashMap<NodeType, BTreeSet<TokenType>>,
    debug: Log<&'static str>,
}

impl NodeTable for Grammar {
    fn arena(&self) -> &CombinatorArena {
        &self.arena
    }
    fn root_of(&self, node_type: &NodeType) -> CombIdx {
        self.roots[node_type]
    }
    fn log(&self) -> Log<&'static str> {
        self.debug
    }
}

impl Grammar {
    pub fn node_types(&self) -> impl Iterator<Item = &NodeType> {
        self.roots.keys()
    }

    pub fn has_node_type(&self, node_type: &NodeType) -> bool {
        self.roots.contains_key(node_type)
    }

    /// FIRST-set of `node_type` — the token types that may legally open a
    /// parse of that node. Used by the façade to populate `expected` when
    /// leftover input remains after an otherwise-successful parse.
    pub fn top_level_tokens(&self, node_type: &NodeType) -> Option<&BTreeSet<TokenType>> {
        self.first_sets.get(node_type)
    }

    pub fn set_log(&mut self, log: Log<&'static str>) {
        self.token_table.set_log(log);
        self.debug = log;
    }

    /// Compile a grammar from its JSON text.
    pub fn load(json_text: &str) -> Result<Self, GrammarLoadError> {
        let root: Value = serde_json::from_str(json_text)
            .map_err(|e| GrammarLoadError::new(format!("parse error: {}", e)))?;

        let root = root
            .as_object()
            .ok_or_else(|| GrammarLoadError::new("expected root to be a JSON object"))?;

        check_field_presence(root)?;

        let keyword_tokens = as_string_map(root, "keyword_tokens")?;
        let regular_tokens = as_string_map(root, "regular_tokens")?;
        let filtered_tokens = as_string_list(root, "filtered_tokens")?;
        let nodes = as_string_map(root, "nodes")?;
        let root_node = root
            .get("root_node")
            .and_then(Value::as_str)
            .ok_or_else(|| GrammarLoadError::new("JSON root_node is not a string"))?
            .to_string();

        let token_entries = build_token_entries(&keyword_tokens, &regular_tokens)?;
        let token_types: HashSet<String> =
            token_entries.iter().map(|(t, _)| t.0.to_string()).collect();
        let node_types: HashSet<String> = nodes.keys().cloned().collect();

        validate_declarations(
            &token_entries,
            &filtered_tokens,
            &nodes,
            &root_node,
            &token_types,
        )?;

        let mut arena = CombinatorArena::new();
        let mut roots = HashMap::new();

        // Lex and parse every rule before building any combinator, so a
        // syntax error anywhere in the grammar is reported before we
        // commit to an arena layout.
        let mut parsed_rules = Vec::with_capacity(nodes.len());
        for (node_type, rule) in &nodes {
            let segments = rule_lexer::lex_rule(node_type, rule)?;
            rule_ast::validate_references(node_type, &segments, &token_types, &node_types)?;
            let expr = rule_ast::parse_rule(node_type, rule)?;
            parsed_rules.push((node_type.clone(), expr));
        }

        for (node_type, expr) in parsed_rules {
            let label = NodeType::from(node_type.as_str());
            let root_idx = build_combinator(&mut arena, &expr, Some(label.clone()));
            roots.insert(label, root_idx);
        }

        for (node_type, root_idx) in &roots {
            reject_nullable_repeats(&arena, &roots, *root_idx, node_type)?;
        }

        {
            let partial = PartialGrammar { arena: &arena, roots: &roots };
            for (node_type, root_idx) in &roots {
                if firstset::matches_empty_body(&partial, *root_idx) {
                    return Err(GrammarLoadError::new(format!(
                        "In rule for node {}: rule may match the empty input",
                        node_type
                    )));
                }
            }
        }

        let mut filtered = HashSet::new();
        for t in &filtered_tokens {
            filtered.insert(TokenType::from(t.as_str()));
        }
        let token_table = TokenTable::new(token_entries, filtered);

        let grammar = {
            let mut first_sets = HashMap::new();
            let partial = PartialGrammar { arena: &arena, roots: &roots };
            for (node_type, root_idx) in &roots {
                first_sets.insert(node_type.clone(), firstset::first_set(&partial, *root_idx));
            }
            Grammar {
                token_table,
                root_node_type: NodeType::from(root_node.as_str()),
                arena,
                roots,
                first_sets,
                debug: Log::None,
            }
        };

        Ok(grammar)
    }
}

/// A borrowing view used only to run FIRST-set computation before the
/// owning `Grammar` is fully assembled.
struct PartialGrammar<'a> {
    arena: &'a CombinatorArena,
    roots: &'a HashMap<NodeType, CombIdx>,
}

impl<'a> NodeTable for PartialGrammar<'a> {
    fn arena(&self) -> &CombinatorArena {
        self.arena
    }
    fn root_of(&self, node_type: &NodeType) -> CombIdx {
        self.roots[node_type]
    }
}

fn reject_nullable_repeats(
    arena: &CombinatorArena,
    roots: &HashMap<NodeType, CombIdx>,
    comb: CombIdx,
    node_type: &NodeType,
) -> Result<(), GrammarLoadError> {
    let partial = PartialGrammar { arena, roots };
    walk_for_repeats(&partial, comb, node_type)
}

fn walk_for_repeats(
    grammar: &PartialGrammar,
    comb: CombIdx,
    node_type: &NodeType,
) -> Result<(), GrammarLoadError> {
    match grammar.arena.get(comb) {
        Combinator::Token(_) | Combinator::NodeRef(_) => Ok(()),
        Combinator::Concat(children, _) => {
            for child in children {
                walk_for_repeats(grammar, *child, node_type)?;
            }
            Ok(())
        }
        Combinator::Choice(children) => {
            for child in children {
                walk_for_repeats(grammar, *child, node_type)?;
            }
            Ok(())
        }
        Combinator::Optional(inner) => walk_for_repeats(grammar, *inner, node_type),
        Combinator::Repeat(inner, _) => {
            if firstset::is_nullable(grammar, *inner) {
                return Err(GrammarLoadError::new(format!(
                    "In rule for node {}: a repeated sub-rule must not match the empty input",
                    node_type
                )));
            }
            walk_for_repeats(grammar, *inner, node_type)
        }
    }
}

fn build_combinator(arena: &mut CombinatorArena, expr: &RuleExpr, label: Option<NodeType>) -> CombIdx {
    match expr {
        RuleExpr::TokenRef(name) => arena.push(Combinator::Token(TokenType::from(name.as_str()))),
        RuleExpr::NodeRef(name) => arena.push(Combinator::NodeRef(NodeType::from(name.as_str()))),
        RuleExpr::Concat(children) => {
            let child_idx = children
                .iter()
                .map(|c| build_combinator(arena, c, None))
                .collect();
            arena.push(Combinator::Concat(child_idx, label))
        }
        RuleExpr::Choice(children) => {
            let child_idx = children
                .iter()
                .map(|c| build_combinator(arena, c, None))
                .collect();
            arena.push(Combinator::Choice(child_idx))
        }
        RuleExpr::Optional(inner) => {
            let inner_idx = build_combinator(arena, inner, None);
            arena.push(Combinator::Optional(inner_idx))
        }
        RuleExpr::Repeat(inner, min) => {
            let inner_idx = build_combinator(arena, inner, None);
            arena.push(Combinator::Repeat(inner_idx, *min))
        }
    }
}

fn check_field_presence(root: &serde_json::Map<String, Value>) -> Result<(), GrammarLoadError> {
    let found: HashSet<&str> = root.keys().map(String::as_str).collect();
    let expected: HashSet<&str> = EXPECTED_FIELDS.iter().copied().collect();

    let mut missing: Vec<&str> = expected.difference(&found).copied().collect();
    let mut unexpected: Vec<&str> = found.difference(&expected).copied().collect();
    missing.sort_unstable();
    unexpected.sort_unstable();

    if !unexpected.is_empty() {
        return Err(GrammarLoadError::new(format!(
            "Unexpected fields in JSON root: {}",
            unexpected.join(", ")
        )));
    }
    if !missing.is_empty() {
        return Err(GrammarLoadError::new(format!(
            "Missing fields in JSON root: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

fn as_string_map(
    root: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<Vec<(String, String)>, GrammarLoadError> {
    let object = root
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| GrammarLoadError::new(format!("JSON {} is not an object", field)))?;

    object
        .iter()
        .map(|(k, v)| {
            let value = v
                .as_str()
                .ok_or_else(|| GrammarLoadError::new(format!("JSON {} {} is not a string", field, k)))?;
            Ok((k.clone(), value.to_string()))
        })
        .collect()
}

fn as_string_list(
    root: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<Vec<String>, GrammarLoadError> {
    let array = root
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| GrammarLoadError::new(format!("JSON {} is not a list", field)))?;

    array
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| GrammarLoadError::new(format!("each item in JSON {} should be a string", field)))
        })
        .collect()
}

fn build_token_entries(
    keyword_tokens: &[(String, String)],
    regular_tokens: &[(String, String)],
) -> Result<Vec<(TokenType, Regex)>, GrammarLoadError> {
    let mut entries = Vec::with_capacity(keyword_tokens.len() + regular_tokens.len());
    let mut seen = HashSet::new();

    for (token_type, pattern) in keyword_tokens.iter().chain(regular_tokens.iter()) {
        if !seen.insert(token_type.clone()) {
            return Err(GrammarLoadError::new(format!(
                "Duplicate token type {}",
                token_type
            )));
        }

        let regex = Regex::new(pattern)
            .map_err(|_| GrammarLoadError::new(format!("Failed to compile regex for token type {}", token_type)))?;

        if regex.is_match("") {
            return Err(GrammarLoadError::new(format!(
                "Token type {} has a regex that matches the empty string",
                token_type
            )));
        }

        entries.push((TokenType::from(token_type.as_str()), regex));
    }

    Ok(entries)
}

fn validate_declarations(
    token_entries: &[(TokenType, Regex)],
    filtered_tokens: &[String],
    nodes: &[(String, String)],
    root_node: &str,
    token_types: &HashSet<String>,
) -> Result<(), GrammarLoadError> {
    let mut missing_filtered: Vec<&String> = filtered_tokens
        .iter()
        .filter(|t| !token_types.contains(*t))
        .collect();
    if !missing_filtered.is_empty() {
        missing_filtered.sort_unstable();
        return Err(GrammarLoadError::new(format!(
            "Unknown filtered token type(s): {}",
            missing_filtered
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    if !nodes.iter().any(|(n, _)| n == root_node) {
        return Err(GrammarLoadError::new("Root node was not found in nodes."));
    }

    for (token_type, _) in token_entries {
        if !TOKEN_TYPE_REGEX.is_match(&token_type.0) {
            return Err(GrammarLoadError::new(format!(
                "Token {} has wrong formatting",
                token_type
            )));
        }
    }

    for (node_type, _) in nodes {
        if !NODE_TYPE_REGEX.is_match(node_type) {
            return Err(GrammarLoadError::new(format!(
                "Node {} has wrong formatting",
                node_type
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARITHMETIC_GRAMMAR: &str = r#"
    {
        "keyword_tokens": {},
        "regular_tokens": { "int": "[0-9]+", "plus": "\\+", "ws": "\\s+" },
        "filtered_tokens": ["ws"],
        "nodes": {
            "EXPR": "int (plus int)*",
            "ROOT": "EXPR"
        },
        "root_node": "ROOT"
    }
    "#;

    #[test]
    fn loads_a_minimal_grammar() {
        let grammar = Grammar::load(ARITHMETIC_GRAMMAR).unwrap();
        assert_eq!(grammar.root_node_type, NodeType::from("ROOT"));
        assert!(grammar.has_node_type(&NodeType::from("EXPR")));
    }

    #[test]
    fn missing_root_node_field_is_reported() {
        let json = r#"{
            "keyword_tokens": {}, "regular_tokens": {}, "filtered_tokens": [],
            "nodes": {}
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("root_node"));
    }

    #[test]
    fn unexpected_field_is_reported() {
        let json = r#"{
            "keyword_tokens": {}, "regular_tokens": {}, "filtered_tokens": [],
            "nodes": {"A": "a"}, "root_node": "A", "extra_field": 1
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("extra_field"));
    }

    #[test]
    fn duplicate_token_type_across_tables_is_rejected() {
        let json = r#"{
            "keyword_tokens": {"a": "a"}, "regular_tokens": {"a": "b"}, "filtered_tokens": [],
            "nodes": {"A": "a"}, "root_node": "A"
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate token type"));
    }

    #[test]
    fn empty_matching_regex_is_rejected() {
        let json = r#"{
            "keyword_tokens": {}, "regular_tokens": {"a": "x*"}, "filtered_tokens": [],
            "nodes": {"A": "a"}, "root_node": "A"
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("empty string"));
    }

    #[test]
    fn unknown_token_reference_is_rejected() {
        let json = r#"{
            "keyword_tokens": {}, "regular_tokens": {"a": "a"}, "filtered_tokens": [],
            "nodes": {"A": "b"}, "root_node": "A"
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("unknown token type"));
    }

    #[test]
    fn nullable_repeat_body_is_rejected() {
        let json = r#"{
            "keyword_tokens": {}, "regular_tokens": {"a": "a"}, "filtered_tokens": [],
            "nodes": {"A": "a? *"}, "root_node": "A"
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("must not match the empty input"));
    }

    #[test]
    fn nullable_node_body_is_rejected() {
        let json = r#"{
            "keyword_tokens": {}, "regular_tokens": {"a": "a"}, "filtered_tokens": [],
            "nodes": {"A": "a?"}, "root_node": "A"
        }"#;
        let err = Grammar::load(json).unwrap_err();
        assert!(err.to_string().contains("may match the empty input"));
    }

    #[test]
    fn root_node_first_set_matches_expectations() {
        let grammar = Grammar::load(ARITHMETIC_GRAMMAR).unwrap();
        let first = grammar.top_level_tokens(&NodeType::from("ROOT")).unwrap();
        assert!(first.contains(&TokenType::from("int")));
        assert_eq!(first.len(), 1);
    }
}

use gramwright::{Found, GrammarParser, NodeChild, ParseFailure, TokenType};
use indoc::indoc;

const ARITHMETIC_GRAMMAR: &str = indoc! {r#"
    {
        "keyword_tokens": {},
        "regular_tokens": { "int": "[0-9]+", "plus": "\\+", "ws": "\\s+" },
        "filtered_tokens": ["ws"],
        "nodes": { "EXPR": "int (plus int)*", "ROOT": "EXPR" },
        "root_node": "ROOT"
    }
"#};

fn arithmetic_parser() -> GrammarParser {
    GrammarParser::from_json(ARITHMETIC_GRAMMAR).unwrap()
}

#[test]
fn full_expression_produces_root_wrapping_expr() {
    let tree = arithmetic_parser().parse("1 + 2 + 3", "<input>").unwrap();
    assert_eq!(tree.node_type, "ROOT".into());
    assert_eq!(tree.children.len(), 1);

    let expr = match &tree.children[0] {
        NodeChild::Node(n) => n,
        other => panic!("expected a node, got {:?}", other),
    };
    assert_eq!(expr.node_type, "EXPR".into());
    assert_eq!(expr.tokens().len(), 5);
    assert_eq!(expr.tokens()[0].value.as_ref(), "1");
    assert_eq!(expr.tokens()[4].value.as_ref(), "3");
}

#[test]
fn empty_input_expects_int_at_offset_zero() {
    let err = arithmetic_parser().parse("", "<input>").unwrap_err();
    let ParseFailure::Parse(e) = err else {
        panic!("expected a parse failure");
    };
    assert_eq!(e.offset, 0);
    assert!(matches!(e.found, Found::EndOfFile(_)));
    assert_eq!(e.expected, [TokenType::from("int")].into_iter().collect());
}

#[test]
fn trailing_plus_expects_int_at_end_of_file() {
    let err = arithmetic_parser().parse("1 +", "<input>").unwrap_err();
    let ParseFailure::Parse(e) = err else {
        panic!("expected a parse failure");
    };
    assert!(matches!(e.found, Found::EndOfFile(_)));
    assert_eq!(e.expected, [TokenType::from("int")].into_iter().collect());
}

#[test]
fn leftover_trailing_int_expects_plus() {
    let err = arithmetic_parser().parse("1 + 2 3", "<input>").unwrap_err();
    let ParseFailure::Parse(e) = err else {
        panic!("expected a parse failure");
    };
    assert_eq!(e.offset, 3);
    match &e.found {
        Found::Token(t) => assert_eq!(t.value.as_ref(), "3"),
        other => panic!("expected a token, got {:?}", other),
    }
    assert_eq!(e.expected, [TokenType::from("plus")].into_iter().collect());
}

#[test]
fn unknown_character_is_a_tokenizer_error_at_one_one() {
    let err = arithmetic_parser().parse("@", "<input>").unwrap_err();
    let ParseFailure::Tokenizer(e) = err else {
        panic!("expected a tokenizer failure");
    };
    assert_eq!((e.position.line, e.position.column), (1, 1));
}

#[test]
fn missing_root_node_key_is_reported_by_name() {
    let json = indoc! {r#"
        {
            "keyword_tokens": {},
            "regular_tokens": { "int": "[0-9]+" },
            "filtered_tokens": [],
            "nodes": { "EXPR": "int" }
        }
    "#};
    let err = GrammarParser::from_json(json).unwrap_err();
    assert!(err.to_string().contains("root_node"));
}

const OPTIONAL_GRAMMAR: &str = indoc! {r#"
    {
        "keyword_tokens": {},
        "regular_tokens": { "a": "a", "b": "b" },
        "filtered_tokens": [],
        "nodes": { "RULE": "a b?" },
        "root_node": "RULE"
    }
"#};

#[test]
fn unmatched_optional_does_not_change_offset() {
    let parser = GrammarParser::from_json(OPTIONAL_GRAMMAR).unwrap();
    let tree = parser.parse("a", "<input>").unwrap();
    assert_eq!(tree.tokens().len(), 1);
}

const REPEAT_GRAMMAR: &str = indoc! {r#"
    {
        "keyword_tokens": {},
        "regular_tokens": { "a": "a", "b": "b" },
        "filtered_tokens": [],
        "nodes": { "RULE": "b a*" },
        "root_node": "RULE"
    }
"#};

#[test]
fn repeat_over_a_never_matching_atom_is_empty() {
    let parser = GrammarParser::from_json(REPEAT_GRAMMAR).unwrap();
    let tree = parser.parse("b", "<input>").unwrap();
    assert_eq!(tree.tokens().len(), 1);
}

const CHOICE_GRAMMAR: &str = indoc! {r#"
    {
        "keyword_tokens": {},
        "regular_tokens": { "a": "a", "b": "b", "c": "c", "d": "d", "ws": "\\s+" },
        "filtered_tokens": ["ws"],
        "nodes": { "RULE": "a b | a c" },
        "root_node": "RULE"
    }
"#};

#[test]
fn choice_reports_union_of_alternatives_at_furthest_offset() {
    let parser = GrammarParser::from_json(CHOICE_GRAMMAR).unwrap();
    let err = parser.parse("a d", "<input>").unwrap_err();
    let ParseFailure::Parse(e) = err else {
        panic!("expected a parse failure");
    };
    assert_eq!(e.offset, 1);
    assert_eq!(
        e.expected,
        [TokenType::from("b"), TokenType::from("c")]
            .into_iter()
            .collect()
    );
}

// A JSON-shaped grammar, adapted as a rule-string grammar from the shape of
// the teacher's own `json_lexerless_grammar` example (string/number/const
// terminals, an object of comma-separated members, an array of
// comma-separated values) — exercised here as a deeper mutually-recursive
// fixture than the arithmetic grammar above.
const JSON_GRAMMAR: &str = indoc! {r#"
    {
        "keyword_tokens": {
            "kw_true": "true", "kw_false": "false", "kw_null": "null"
        },
        "regular_tokens": {
            "lbrace": "\\{", "rbrace": "\\}", "lbracket": "\\[", "rbracket": "\\]",
            "colon": ":", "comma": ",",
            "string": "\"([^\"\\\\]|\\\\.)*\"",
            "number": "-?[0-9]+(\\.[0-9]+)?",
            "ws": "\\s+"
        },
        "filtered_tokens": ["ws"],
        "nodes": {
            "VALUE": "string | number | kw_true | kw_false | kw_null | OBJECT | ARRAY",
            "MEMBER": "string colon VALUE",
            "OBJECT": "lbrace (MEMBER (comma MEMBER)*)? rbrace",
            "ARRAY": "lbracket (VALUE (comma VALUE)*)? rbracket"
        },
        "root_node": "VALUE"
    }
"#};

fn json_parser() -> GrammarParser {
    GrammarParser::from_json(JSON_GRAMMAR).unwrap()
}

#[test]
fn json_grammar_parses_nested_object_and_array() {
    let tree = json_parser()
        .parse(r#"{"a": 1, "b": [true, false, null], "c": {}}"#, "<input>")
        .unwrap();
    assert_eq!(tree.node_type, "VALUE".into());

    let object = match &tree.children[0] {
        NodeChild::Node(n) => n,
        other => panic!("expected a node, got {:?}", other),
    };
    assert_eq!(object.node_type, "OBJECT".into());

    let members: Vec<_> = object
        .children
        .iter()
        .filter_map(|c| match c {
            NodeChild::Node(n) if n.node_type == "MEMBER".into() => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(members.len(), 3);
}

#[test]
fn json_grammar_empty_object_and_array_round_trip() {
    let tree = json_parser().parse("{}", "<input>").unwrap();
    let object = match &tree.children[0] {
        NodeChild::Node(n) => n,
        other => panic!("expected a node, got {:?}", other),
    };
    assert_eq!(object.node_type, "OBJECT".into());
    assert_eq!(object.tokens().len(), 2);

    let tree = json_parser().parse("[]", "<input>").unwrap();
    let array = match &tree.children[0] {
        NodeChild::Node(n) => n,
        other => panic!("expected a node, got {:?}", other),
    };
    assert_eq!(array.node_type, "ARRAY".into());
    assert_eq!(array.tokens().len(), 2);
}

#[test]
fn json_grammar_trailing_comma_is_a_parse_error() {
    let err = json_parser().parse(r#"{"a": 1,}"#, "<input>").unwrap_err();
    let ParseFailure::Parse(e) = err else {
        panic!("expected a parse failure");
    };
    assert!(matches!(e.found, Found::Token(_)));
    assert!(e.expected.contains(&TokenType::from("string")));
}

//! Integration tests for the generator pipeline
//!
//! These tests run grammar text through every stage:
//! - Grammar notation parsing (text and token streams)
//! - Parser-spec compilation and execution
//! - Type synthesis, dynamic AST building and Rust rendering

use gllgen::gll::{parse_tokens, Token};
use gllgen::synth::TypeShape;
use gllgen::{
    compile_parser_spec, parse_grammar_text, synthesize_types, GenerateError, Generator,
    GrammarError, Node, ParseError, Repetition, RuleNode,
};

const ITEMS: &str = r#"
    File = items:Item*;
    Item = | Fn: FnDecl | Use: UseDecl;
    UseDecl = "use" path:Path ";";
    FnDecl = vis:"pub"? "fn" name:IDENT "(" params:Param* %% "," ")" body:TOKEN_TREE;
    Param = name:IDENT ":" ty:Path;
    Path = segments:IDENT+ % "::";
"#;

fn ident(text: &str) -> Node {
    Node::Struct {
        ty: "Ident".to_string(),
        fields: vec![("ident".to_string(), Node::Text(text.to_string()))],
    }
}

// ============================================================================
// Grammar Notation
// ============================================================================

#[test]
fn test_bar_prefixed_variant_tokens() {
    let grammar = parse_tokens(vec![
        Token::Name("Value".to_string()),
        Token::Equal,
        Token::Pipe,
        Token::Name("Foo".to_string()),
        Token::Colon,
        Token::String("foo".to_string()),
        Token::Semicolon,
    ])
    .expect("Should parse tokens");
    assert_eq!(
        grammar.get("Value"),
        Some(&RuleNode::labeled("Foo", RuleNode::string("foo")))
    );
}

#[test]
fn test_option_and_separator_tokens() {
    let grammar = parse_tokens(vec![
        Token::Name("Value".to_string()),
        Token::Equal,
        Token::String("foo".to_string()),
        Token::QuestionMark,
        Token::Semicolon,
    ])
    .expect("Should parse tokens");
    assert_eq!(
        grammar.get("Value"),
        Some(&RuleNode::optional(RuleNode::string("foo")))
    );

    let grammar = parse_tokens(vec![
        Token::Name("Value".to_string()),
        Token::Equal,
        Token::String("foo".to_string()),
        Token::Star,
        Token::Percent,
        Token::String("bar".to_string()),
        Token::Semicolon,
    ])
    .expect("Should parse tokens");
    assert_eq!(
        grammar.get("Value"),
        Some(&RuleNode::Repeated {
            positive: false,
            node: Box::new(RuleNode::string("foo")),
            separator: Some("bar".to_string()),
            allow_trailing: false,
        })
    );
}

#[test]
fn test_duplicate_rule_message() {
    let err = parse_grammar_text(r#"Value = "a"; Value = "b";"#).unwrap_err();
    assert!(matches!(err, GrammarError::DuplicateRule { .. }));
    assert!(err.to_string().contains("Duplicate rule: Value"));
}

#[test]
fn test_comments_are_ignored() {
    let grammar = parse_grammar_text(
        r#"
        // line comment
        Main = /* inline */ "x";
        /* unterminated at end of input"#,
    )
    .expect("Should parse");
    assert_eq!(grammar.len(), 1);
}

// ============================================================================
// Separators
// ============================================================================

#[test]
fn test_trailing_separator_rejected_without_double_percent() {
    let grammar = parse_grammar_text(r#"Main = "foo"* % ",";"#).expect("Should parse");
    let spec = compile_parser_spec(&grammar).expect("Should compile");

    assert!(spec.parse("Main", "foo, foo").is_ok());
    let err = spec.parse("Main", "foo, foo,").unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_trailing_separator_accepted_with_double_percent() {
    let grammar = parse_grammar_text(r#"Main = "foo"* %% ",";"#).expect("Should parse");
    let spec = compile_parser_spec(&grammar).expect("Should compile");

    for input in ["foo, foo,", "foo, foo"] {
        let value = spec.parse("Main", input).expect("Should parse");
        let items = value
            .repeated(Repetition::Trailing)
            .expect("Should have trailing layout");
        assert_eq!(items.len(), 2, "input {:?}", input);
    }
    assert!(spec.parse("Main", "").is_ok());
}

#[test]
fn test_positive_trailing_separator() {
    let grammar = parse_grammar_text(r#"Main = items:IDENT+ %% ",";"#).expect("Should parse");
    let generated = Generator::default()
        .generate_grammar(grammar)
        .expect("Should generate");

    let ast = generated
        .parse_ast("Main", "a, b,")
        .expect("Should build");
    assert_eq!(
        ast.field("items"),
        Some(&Node::List(vec![ident("a"), ident("b")]))
    );
    assert!(generated.parse("Main", "").is_err());
}

// ============================================================================
// Enumerations
// ============================================================================

#[test]
fn test_marker_alternation_becomes_enum() {
    let text = r#"Op = | Add: "+" | Sub: "-" | Mul: "*";"#;
    let grammar = parse_grammar_text(text).expect("Should parse");
    let synthesis = synthesize_types(&grammar).expect("Should synthesize");
    let (decl, _) = synthesis.get("Op").expect("Should declare Op");
    assert_eq!(
        decl.shape,
        TypeShape::Enum {
            tags: vec!["Add".to_string(), "Sub".to_string(), "Mul".to_string()],
        }
    );

    let generated = Generator::default().generate(text).expect("Should generate");
    for (input, tag) in [("+", "Add"), ("-", "Sub"), ("*", "Mul")] {
        assert_eq!(
            generated.parse_ast("Op", input).expect("Should build"),
            Node::Tag {
                ty: "Op".to_string(),
                tag: tag.to_string(),
            }
        );
    }
}

#[test]
fn test_unlabeled_branches_build_their_own_variant() {
    let generated = Generator::default()
        .generate(r#"X = | "a" | "b"; Y = | "self" | Path; Path = IDENT;"#)
        .expect("Should generate");

    let variant = |rule: &str, input: &str| match generated.parse_ast(rule, input) {
        Ok(Node::Variant {
            variant, payload, ..
        }) => (variant, payload.map(|payload| *payload)),
        other => panic!("unexpected result for {:?}: {:?}", input, other),
    };
    assert_eq!(variant("X", "a"), ("Variant0".to_string(), None));
    assert_eq!(variant("X", "b"), ("Variant1".to_string(), None));
    assert_eq!(variant("Y", "self"), ("Variant0".to_string(), None));
    assert_eq!(
        variant("Y", "path"),
        ("Variant1".to_string(), Some(ident("path")))
    );
}

#[test]
fn test_items_with_empty_values_are_kept() {
    let generated = Generator::default()
        .generate(r#"L = items:Item* %% ","; Item = "x" IDENT?;"#)
        .expect("Should generate");

    for (input, count) in [("x, x", 2), ("x, x,", 2), ("x, x a, x", 3), ("x", 1)] {
        let ast = generated.parse_ast("L", input).expect("Should build");
        let Some(Node::List(items)) = ast.field("items") else {
            panic!("items should be a list: {:?}", ast);
        };
        assert_eq!(items.len(), count, "input {:?}", input);
        assert!(items
            .iter()
            .all(|item| matches!(item, Node::Struct { ty, .. } if ty == "Item")));
    }
}

// ============================================================================
// End to End
// ============================================================================

#[test]
fn test_items_grammar() {
    let generated = Generator::default().generate(ITEMS).expect("Should generate");
    let input = r#"
        use std::fmt;
        pub fn main(a: u8, b: std::string::String,) { println!("hi"); }
    "#;
    let ast = generated.parse_ast("File", input).expect("Should build");

    let Some(Node::List(items)) = ast.field("items") else {
        panic!("items should be a list: {:?}", ast);
    };
    assert_eq!(items.len(), 2);

    let Node::Variant {
        variant,
        payload: Some(use_decl),
        ..
    } = &items[0]
    else {
        panic!("unexpected item: {:?}", items[0]);
    };
    assert_eq!(variant, "Use");
    let path = use_decl.field("path").expect("UseDecl has a path");
    assert_eq!(
        path.field("segments"),
        Some(&Node::List(vec![ident("std"), ident("fmt")]))
    );

    let Node::Variant {
        variant,
        payload: Some(fn_decl),
        ..
    } = &items[1]
    else {
        panic!("unexpected item: {:?}", items[1]);
    };
    assert_eq!(variant, "Fn");
    assert_eq!(fn_decl.field("vis"), Some(&Node::Bool(true)));
    assert_eq!(fn_decl.field("name"), Some(&ident("main")));
    let Some(Node::List(params)) = fn_decl.field("params") else {
        panic!("params should be a list: {:?}", fn_decl);
    };
    assert_eq!(params.len(), 2);
    assert_eq!(params[1].field("name"), Some(&ident("b")));
    assert!(matches!(
        fn_decl.field("body"),
        Some(Node::Variant { variant, .. }) if variant == "Group"
    ));
}

#[test]
fn test_items_grammar_rejects_bad_input() {
    let generated = Generator::default().generate(ITEMS).expect("Should generate");
    let err = generated.parse("File", "fn main(a: u8,, ) {}").unwrap_err();
    assert!(!matches!(err, ParseError::UnknownRule { .. }));
    assert!(generated.parse("File", "use std::;").is_err());
}

#[test]
fn test_rendered_source_is_valid_and_stable() {
    let first = Generator::default().generate(ITEMS).expect("Should generate");
    let second = Generator::default().generate(ITEMS).expect("Should generate");
    let source = first.rust_source();
    assert_eq!(source, second.rust_source());

    let file = syn::parse_file(&source).expect("Should be valid Rust");
    let types: Vec<String> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Struct(item) => Some(item.ident.to_string()),
            syn::Item::Enum(item) => Some(item.ident.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        types,
        vec!["File", "Item", "UseDecl", "FnDecl", "Param", "Path"]
    );
}

#[test]
fn test_unsupported_constructs_are_errors() {
    let generator = Generator::default();
    assert!(matches!(
        generator.generate("Main = Other;"),
        Err(GenerateError::Compile(_))
    ));
    assert!(matches!(
        generator.generate("Main = 'a'..'z';"),
        Err(GenerateError::Compile(_))
    ));
    assert!(matches!(
        generator.generate("Main = { IDENT? }*;"),
        Err(GenerateError::Synth(_))
    ));
}

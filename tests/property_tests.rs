//! Property-based tests using proptest
//!
//! These tests check pipeline invariants over generated grammars and
//! arbitrary notation text.

use gllgen::gll::{branch_key, parse_tokens, tokenize, Token};
use gllgen::{
    compile_parser_spec, render_rust, simplify, synthesize_types, Generator, Grammar,
    GeneratorConfig, Node, RuleNode,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn rule_node() -> impl Strategy<Value = RuleNode> {
    let leaf = prop_oneof![
        Just(RuleNode::Empty),
        "[a-z]{1,3}".prop_map(RuleNode::StringLiteral),
        prop_oneof![Just("IDENT"), Just("LITERAL"), Just("R0"), Just("R1")]
            .prop_map(|name| RuleNode::symbol(name)),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            ("[a-z]{1,4}", inner.clone()).prop_map(|(label, node)| RuleNode::labeled(label, node)),
            prop::collection::vec(inner.clone(), 2..4).prop_map(RuleNode::Concatenation),
            prop::collection::vec(inner.clone(), 2..4).prop_map(RuleNode::Alternation),
            inner.clone().prop_map(RuleNode::optional),
            (any::<bool>(), inner, any::<bool>(), any::<bool>()).prop_map(
                |(positive, node, separated, allow_trailing)| RuleNode::Repeated {
                    positive,
                    node: Box::new(node),
                    separator: separated.then(|| ",".to_string()),
                    allow_trailing: separated && allow_trailing,
                }
            ),
        ]
    })
}

fn grammar() -> impl Strategy<Value = Grammar> {
    (rule_node(), rule_node()).prop_map(|(first, second)| {
        let mut grammar = Grammar::new();
        grammar.insert("R0", first);
        grammar.insert("R1", second);
        grammar
    })
}

/// Alternation branches: distinct keywords, each optionally labeled, and
/// optionally a trailing identifier branch
fn branches() -> impl Strategy<Value = (Vec<(String, bool)>, bool)> {
    const KEYWORDS: [&str; 8] = ["self", "super", "crate", "pub", "mut", "ref", "move", "dyn"];
    (2usize..6)
        .prop_flat_map(|count| {
            (
                prop::sample::subsequence(KEYWORDS.to_vec(), count),
                prop::collection::vec(any::<bool>(), count),
            )
        })
        .prop_map(|(words, labels)| {
            words
                .into_iter()
                .map(str::to_string)
                .zip(labels)
                .collect::<Vec<_>>()
        })
        .prop_flat_map(|keywords| (Just(keywords), any::<bool>()))
}

fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        "[A-Za-z]{1,3}".prop_map(Token::Name),
        "[a-z,]{0,2}".prop_map(Token::String),
        Just(Token::LeftBrace),
        Just(Token::RightBrace),
        Just(Token::Pipe),
        Just(Token::QuestionMark),
        Just(Token::Star),
        Just(Token::Plus),
        Just(Token::Percent),
        Just(Token::DoublePercent),
        Just(Token::Semicolon),
        Just(Token::Colon),
        Just(Token::Equal),
    ]
}

// =============================================================================
// Simplifier
// =============================================================================

proptest! {
    /// Simplifying twice changes nothing
    #[test]
    fn test_simplify_idempotent(node in rule_node()) {
        let once = simplify(&node);
        prop_assert_eq!(simplify(&once), once);
    }

    /// Canonical trees hold no literals and no single-item containers
    #[test]
    fn test_simplify_canonical(node in rule_node()) {
        fn check(node: &RuleNode) -> bool {
            match node {
                RuleNode::StringLiteral(_) => false,
                RuleNode::Concatenation(items) => {
                    items.len() > 1
                        && items.iter().all(|item| *item != RuleNode::Empty && check(item))
                }
                RuleNode::Alternation(items) => items.len() > 1 && items.iter().all(check),
                RuleNode::Labeled { node, .. } => check(node),
                RuleNode::Optional(inner) => {
                    !matches!(**inner, RuleNode::Labeled { .. }) && check(inner)
                }
                RuleNode::Repeated { node, .. } => check(node),
                RuleNode::Empty | RuleNode::SymbolName(_) | RuleNode::CharacterRange(..) => true,
            }
        }
        prop_assert!(check(&simplify(&node)));
    }
}

// =============================================================================
// Notation
// =============================================================================

proptest! {
    /// Text without quotes or comment markers always tokenizes
    #[test]
    fn test_lexer_total(text in "[A-Za-z0-9_ \n=;|{}?*+%:]{0,40}") {
        prop_assert!(tokenize(&text).is_ok());
    }

    /// Arbitrary text never panics the lexer
    #[test]
    fn test_lexer_never_panics(text in "\\PC{0,40}") {
        let _ = tokenize(&text);
    }

    /// Arbitrary token streams end in a grammar or an error
    #[test]
    fn test_grammar_parser_terminates(tokens in prop::collection::vec(token(), 0..24)) {
        let _ = parse_tokens(tokens);
    }

    /// Grammars survive printing and re-parsing
    #[test]
    fn test_display_round_trip(grammar in grammar()) {
        let text = grammar.to_string();
        if let Ok(again) = gllgen::parse_grammar_text(&text) {
            prop_assert_eq!(again.len(), grammar.len());
        }
    }
}

// =============================================================================
// Generation
// =============================================================================

proptest! {
    /// Every generated grammar compiles; the only references are to rules that exist
    #[test]
    fn test_compile_total(grammar in grammar()) {
        prop_assert!(compile_parser_spec(&grammar).is_ok());
    }

    /// Synthesis and rendering are deterministic
    #[test]
    fn test_generation_deterministic(grammar in grammar()) {
        let first = synthesize_types(&grammar);
        let second = synthesize_types(&grammar);
        prop_assert_eq!(&first, &second);

        if let (Ok(first), Ok(second)) = (first, second) {
            let config = GeneratorConfig::default();
            prop_assert_eq!(render_rust(&first, &config), render_rust(&second, &config));
        }
    }

    /// Rendered output is syntactically valid Rust
    #[test]
    fn test_rendered_source_parses(grammar in grammar()) {
        if let Ok(synthesis) = synthesize_types(&grammar) {
            let source = render_rust(&synthesis, &GeneratorConfig::default());
            prop_assert!(syn::parse_file(&source).is_ok(), "invalid source:\n{}", source);
        }
    }
}

proptest! {
    /// The built variant is always the one for the branch that matched
    #[test]
    fn test_variant_matches_parsed_branch(
        (keywords, with_ident) in branches(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut text = String::from("X =");
        let mut cases = Vec::new();
        for (i, (word, labeled)) in keywords.iter().enumerate() {
            let (key, name) = if *labeled {
                (format!("Tag{}", i), format!("Tag{}", i))
            } else {
                (branch_key(i), format!("Variant{}", i))
            };
            if *labeled {
                text.push_str(&format!(" | {}: \"{}\"", key, word));
            } else {
                text.push_str(&format!(" | \"{}\"", word));
            }
            cases.push((word.clone(), key, name, false));
        }
        if with_ident {
            let i = keywords.len();
            text.push_str(" | Path; Path = IDENT");
            cases.push(("other".to_string(), branch_key(i), format!("Variant{}", i), true));
        }
        text.push(';');

        let generated = Generator::default().generate(&text).expect("Should generate");
        let (input, key, name, has_payload) = &cases[pick.index(cases.len())];

        let value = generated.parse("X", input).expect("Should parse");
        let matched = value.variant().map(|(found, _)| found.to_string());
        prop_assert_eq!(matched.as_ref(), Some(key), "grammar {}", text);

        match generated.parse_ast("X", input).expect("Should build") {
            Node::Variant { variant, payload, .. } => {
                prop_assert_eq!(&variant, name, "grammar {}", text);
                prop_assert_eq!(payload.is_some(), *has_payload);
            }
            // Labels over bare keywords only make a plain enum
            Node::Tag { tag, .. } => {
                prop_assert_eq!(&tag, name, "grammar {}", text);
                prop_assert!(!*has_payload);
            }
            other => prop_assert!(false, "unexpected node {:?} for grammar {}", other, text),
        }
    }
}

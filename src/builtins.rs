//! Built-in leaf rules
//!
//! Every compiled grammar can refer to five primitive rules that tokenize
//! Rust-like source text: `IDENT`, `LIFETIME`, `PUNCT`, `LITERAL` and
//! `TOKEN_TREE`. Each pairs a matching pattern with a small AST type that
//! generated code refers to by path.
//!
//! # Example
//!
//! ```rust
//! use gllgen::builtins::{builtin_spec, TokenTree, Ident};
//! use gllgen::runtime::FromValue;
//!
//! let spec = builtin_spec();
//! let value = spec.parse("TOKEN_TREE", "foo").unwrap();
//! let tree = TokenTree::from_value(&value).unwrap();
//! assert_eq!(tree, TokenTree::Ident(Ident { ident: "foo".into() }));
//! ```

use crate::engine::spec::{Atom, ParserSpec, RuleEntry};
use crate::runtime::{BuildError, FromValue, Repetition, Value};
use crate::synth::build::Node;
use serde::{Deserialize, Serialize};

// ============================================================================
// Patterns
// ============================================================================

/// Identifier, raw identifiers first
pub const IDENT_PATTERN: &str =
    r"r#(?:[A-Za-z][A-Za-z0-9_]*|_[A-Za-z0-9_]+)|[A-Za-z][A-Za-z0-9_]*|_[A-Za-z0-9_]+";

/// Quote followed by an identifier
pub const LIFETIME_PATTERN: &str =
    r"'\s*(?:r#(?:[A-Za-z][A-Za-z0-9_]*|_[A-Za-z0-9_]+)|[A-Za-z][A-Za-z0-9_]*|_[A-Za-z0-9_]+)";

/// Single punctuation character; delimiters belong to token trees
pub const PUNCT_PATTERN: &str = r"[;,.@#~?:$=!<>\-&+*/^%]";

/// Numeric, character and string literals
pub const LITERAL_PATTERN: &str = concat!(
    r"0b(?:[01_]+\.?[01_]*|[01_]*\.[01_]+)(?:[fui][0-9]+)?",
    "|",
    r"0x(?:[0-9a-f_]+\.?[0-9a-f_]*|[0-9a-f_]*\.[0-9a-f_]+)(?:[fui][0-9]+)?",
    "|",
    r"(?:[0-9][0-9_]*\.?[0-9_]*|(?:[0-9][0-9_]*)?\.[0-9_]+)(?:[fui][0-9]+)?",
    "|",
    r"b?'(?:\\.|[^\\'])'",
    "|",
    r#"b?"(?:\\.|[^\\"])*""#,
);

// ============================================================================
// Registry
// ============================================================================

/// A built-in rule
pub struct Builtin {
    /// Rule name as written in grammars
    pub name: &'static str,
    /// Type name inside this module
    pub type_name: &'static str,
    install: fn(&mut ParserSpec, usize) -> usize,
    build: fn(&Value) -> Result<Node, BuildError>,
}

impl Builtin {
    /// Add the rule body to `spec` and return its atom
    ///
    /// `rule_index` is the index the rule will have in the rule table.
    pub fn install(&self, spec: &mut ParserSpec, rule_index: usize) -> usize {
        (self.install)(spec, rule_index)
    }

    /// Build the dynamic AST node for a parse value of this rule
    pub fn build(&self, value: &Value) -> Result<Node, BuildError> {
        (self.build)(value)
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// All built-in rules, in installation order
pub static BUILTINS: [Builtin; 5] = [
    Builtin {
        name: "IDENT",
        type_name: "Ident",
        install: install_ident,
        build: build_node::<Ident>,
    },
    Builtin {
        name: "LIFETIME",
        type_name: "Lifetime",
        install: install_lifetime,
        build: build_node::<Lifetime>,
    },
    Builtin {
        name: "PUNCT",
        type_name: "Punct",
        install: install_punct,
        build: build_node::<Punct>,
    },
    Builtin {
        name: "LITERAL",
        type_name: "Literal",
        install: install_literal,
        build: build_node::<Literal>,
    },
    Builtin {
        name: "TOKEN_TREE",
        type_name: "TokenTree",
        install: install_token_tree,
        build: build_node::<TokenTree>,
    },
];

/// Look up a built-in rule by name
pub fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Whether `name` is a built-in rule
pub fn is_builtin(name: &str) -> bool {
    builtin(name).is_some()
}

/// A spec holding only the built-in rules, starting at `TOKEN_TREE`
pub fn builtin_spec() -> ParserSpec {
    let mut spec = ParserSpec::new();
    for (index, builtin) in BUILTINS.iter().enumerate() {
        let atom = builtin.install(&mut spec, index);
        spec.rules.push(RuleEntry {
            name: builtin.name.to_string(),
            atom,
        });
    }
    spec.start = BUILTINS.len() - 1;
    spec
}

fn pattern(spec: &mut ParserSpec, pattern: &str) -> usize {
    spec.add_atom(Atom::Pattern {
        pattern: pattern.to_string(),
    })
}

fn install_ident(spec: &mut ParserSpec, _rule: usize) -> usize {
    pattern(spec, IDENT_PATTERN)
}

fn install_lifetime(spec: &mut ParserSpec, _rule: usize) -> usize {
    pattern(spec, LIFETIME_PATTERN)
}

fn install_punct(spec: &mut ParserSpec, _rule: usize) -> usize {
    pattern(spec, PUNCT_PATTERN)
}

fn install_literal(spec: &mut ParserSpec, _rule: usize) -> usize {
    pattern(spec, LITERAL_PATTERN)
}

/// Leaves match their patterns directly so that a grammar overriding one
/// of the leaf rules does not change what a token tree accepts.
fn install_token_tree(spec: &mut ParserSpec, rule: usize) -> usize {
    let mut branches = Vec::with_capacity(7);

    for (name, leaf) in [
        ("literal", LITERAL_PATTERN),
        ("ident", IDENT_PATTERN),
        ("lifetime", LIFETIME_PATTERN),
        ("punct", PUNCT_PATTERN),
    ] {
        let atom = pattern(spec, leaf);
        branches.push(spec.add_atom(Atom::Named {
            name: name.to_string(),
            atom,
        }));
    }

    let tree = spec.add_atom(Atom::Rule { rule });
    let trees = spec.add_atom(Atom::Repetition { atom: tree, min: 0 });
    for delimiter in [Delimiter::Paren, Delimiter::Brace, Delimiter::Bracket] {
        let (open, close) = delimiter.chars();
        let open = spec.add_atom(Atom::Token {
            text: open.to_string(),
        });
        let open = spec.add_atom(Atom::Ignore { atom: open });
        let close = spec.add_atom(Atom::Token {
            text: close.to_string(),
        });
        let close = spec.add_atom(Atom::Ignore { atom: close });
        let group = spec.add_atom(Atom::Sequence {
            atoms: vec![open, trees, close],
        });
        branches.push(spec.add_atom(Atom::Named {
            name: delimiter.label().to_string(),
            atom: group,
        }));
    }

    spec.add_atom(Atom::Choice { atoms: branches })
}

fn build_node<T: FromValue + Into<Node>>(value: &Value) -> Result<Node, BuildError> {
    T::from_value(value).map(Into::into)
}

fn leaf_text(kind: &'static str, value: &Value) -> Result<String, BuildError> {
    let text = value.text()?;
    if text.is_empty() {
        return Err(BuildError::Builtin { kind, text });
    }
    Ok(text)
}

// ============================================================================
// Leaf Types
// ============================================================================

/// An identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident {
    /// Identifier text, `r#` prefix included
    pub ident: String,
}

impl FromValue for Ident {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        Ok(Ident {
            ident: leaf_text("IDENT", value)?,
        })
    }
}

/// A lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lifetime {
    /// Name without the quote
    pub ident: String,
}

impl FromValue for Lifetime {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        let text = leaf_text("LIFETIME", value)?;
        match text.strip_prefix('\'') {
            Some(ident) => Ok(Lifetime {
                ident: ident.trim_start().to_string(),
            }),
            None => Err(BuildError::Builtin {
                kind: "LIFETIME",
                text,
            }),
        }
    }
}

/// A punctuation character
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Punct {
    /// The character
    pub punct: String,
}

impl FromValue for Punct {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        Ok(Punct {
            punct: leaf_text("PUNCT", value)?,
        })
    }
}

/// A numeric, character or string literal, verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    /// Source text
    pub literal: String,
}

impl FromValue for Literal {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        Ok(Literal {
            literal: leaf_text("LITERAL", value)?,
        })
    }
}

/// Group delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Delimiter {
    /// `( ... )`
    Paren,
    /// `{ ... }`
    Brace,
    /// `[ ... ]`
    Bracket,
}

impl Delimiter {
    /// Opening and closing characters
    pub fn chars(self) -> (char, char) {
        match self {
            Delimiter::Paren => ('(', ')'),
            Delimiter::Brace => ('{', '}'),
            Delimiter::Bracket => ('[', ']'),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Delimiter::Paren => "paren",
            Delimiter::Brace => "brace",
            Delimiter::Bracket => "bracket",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "paren" => Some(Delimiter::Paren),
            "brace" => Some(Delimiter::Brace),
            "bracket" => Some(Delimiter::Bracket),
            _ => None,
        }
    }
}

/// A leaf token or a delimited group of token trees
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenTree {
    /// Literal
    Literal(Literal),
    /// Identifier
    Ident(Ident),
    /// Lifetime
    Lifetime(Lifetime),
    /// Punctuation
    Punct(Punct),
    /// Delimited group
    Group {
        /// Delimiter kind
        delimiter: Delimiter,
        /// Trees inside the delimiters
        tokens: Vec<TokenTree>,
    },
}

impl FromValue for TokenTree {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        let no_variant = || BuildError::NoVariant {
            ty: "TokenTree".to_string(),
        };
        let (label, inner) = value.variant().ok_or_else(no_variant)?;
        match label {
            "literal" => Literal::from_value(inner).map(TokenTree::Literal),
            "ident" => Ident::from_value(inner).map(TokenTree::Ident),
            "lifetime" => Lifetime::from_value(inner).map(TokenTree::Lifetime),
            "punct" => Punct::from_value(inner).map(TokenTree::Punct),
            other => {
                let delimiter = Delimiter::from_label(other).ok_or_else(no_variant)?;
                let tokens = inner
                    .repeated(Repetition::Plain)?
                    .into_iter()
                    .map(TokenTree::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TokenTree::Group { delimiter, tokens })
            }
        }
    }
}

// ============================================================================
// Dynamic Nodes
// ============================================================================

fn leaf_node(ty: &str, field: &str, text: String) -> Node {
    Node::Struct {
        ty: ty.to_string(),
        fields: vec![(field.to_string(), Node::Text(text))],
    }
}

impl From<Ident> for Node {
    fn from(ident: Ident) -> Self {
        leaf_node("Ident", "ident", ident.ident)
    }
}

impl From<Lifetime> for Node {
    fn from(lifetime: Lifetime) -> Self {
        leaf_node("Lifetime", "ident", lifetime.ident)
    }
}

impl From<Punct> for Node {
    fn from(punct: Punct) -> Self {
        leaf_node("Punct", "punct", punct.punct)
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        leaf_node("Literal", "literal", literal.literal)
    }
}

impl From<TokenTree> for Node {
    fn from(tree: TokenTree) -> Self {
        let (variant, payload) = match tree {
            TokenTree::Literal(leaf) => ("Literal", Node::from(leaf)),
            TokenTree::Ident(leaf) => ("Ident", Node::from(leaf)),
            TokenTree::Lifetime(leaf) => ("Lifetime", Node::from(leaf)),
            TokenTree::Punct(leaf) => ("Punct", Node::from(leaf)),
            TokenTree::Group { delimiter, tokens } => {
                let delimiter = Node::Tag {
                    ty: "Delimiter".to_string(),
                    tag: format!("{:?}", delimiter),
                };
                let tokens = Node::List(tokens.into_iter().map(Node::from).collect());
                (
                    "Group",
                    Node::Struct {
                        ty: "TokenTree::Group".to_string(),
                        fields: vec![
                            ("delimiter".to_string(), delimiter),
                            ("tokens".to_string(), tokens),
                        ],
                    },
                )
            }
        };
        Node::Variant {
            ty: "TokenTree".to_string(),
            variant: variant.to_string(),
            payload: Some(Box::new(payload)),
        }
    }
}

//! Rule trees and grammars
//!
//! A [`Grammar`] maps rule names, in declaration order, to the [`RuleNode`]
//! tree that forms each rule's body. Trees are plain owned values: parents
//! own their children and nothing is shared.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of a rule body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleNode {
    /// Matches nothing and carries no value
    Empty,

    /// Matches exact text
    StringLiteral(String),

    /// Matches one character in an inclusive range
    CharacterRange(char, char),

    /// Reference to another rule by name
    SymbolName(String),

    /// Attaches a field or variant name to the inner node
    Labeled {
        /// Field or variant name
        label: String,
        /// Labeled node
        node: Box<RuleNode>,
    },

    /// Ordered sequence
    Concatenation(Vec<RuleNode>),

    /// Ordered choice; the first matching branch wins
    Alternation(Vec<RuleNode>),

    /// Zero or one occurrence
    Optional(Box<RuleNode>),

    /// Zero-or-more (`positive == false`) or one-or-more occurrences
    Repeated {
        /// One-or-more when true
        positive: bool,
        /// Repeated node
        node: Box<RuleNode>,
        /// Literal separator between occurrences
        separator: Option<String>,
        /// Whether one trailing separator is accepted
        allow_trailing: bool,
    },
}

impl RuleNode {
    /// `"text"`
    pub fn string(text: impl Into<String>) -> Self {
        RuleNode::StringLiteral(text.into())
    }

    /// Reference to rule `name`
    pub fn symbol(name: impl Into<String>) -> Self {
        RuleNode::SymbolName(name.into())
    }

    /// `label:node`
    pub fn labeled(label: impl Into<String>, node: RuleNode) -> Self {
        RuleNode::Labeled {
            label: label.into(),
            node: Box::new(node),
        }
    }

    /// `node?`
    pub fn optional(node: RuleNode) -> Self {
        RuleNode::Optional(Box::new(node))
    }

    /// `node*` or `node+`, without separator
    pub fn repeated(positive: bool, node: RuleNode) -> Self {
        RuleNode::Repeated {
            positive,
            node: Box::new(node),
            separator: None,
            allow_trailing: false,
        }
    }

    /// `node* % "sep"` style repetitions
    pub fn separated(
        positive: bool,
        node: RuleNode,
        separator: impl Into<String>,
        allow_trailing: bool,
    ) -> Self {
        RuleNode::Repeated {
            positive,
            node: Box::new(node),
            separator: Some(separator.into()),
            allow_trailing,
        }
    }

    /// Label of a [`RuleNode::Labeled`] node
    pub fn label(&self) -> Option<&str> {
        match self {
            RuleNode::Labeled { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Whether the node can match without consuming input
    pub fn is_nullable(&self) -> bool {
        match self {
            RuleNode::Empty | RuleNode::Optional(_) => true,
            RuleNode::StringLiteral(text) => text.is_empty(),
            RuleNode::CharacterRange(..) | RuleNode::SymbolName(_) => false,
            RuleNode::Labeled { node, .. } => node.is_nullable(),
            RuleNode::Concatenation(items) => items.iter().all(RuleNode::is_nullable),
            RuleNode::Alternation(items) => items.iter().any(RuleNode::is_nullable),
            RuleNode::Repeated { positive, node, .. } => !positive || node.is_nullable(),
        }
    }

    /// Names of all referenced rules, in first-occurrence order
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RuleNode::SymbolName(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            RuleNode::Labeled { node, .. }
            | RuleNode::Optional(node)
            | RuleNode::Repeated { node, .. } => node.collect_symbols(out),
            RuleNode::Concatenation(items) | RuleNode::Alternation(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            RuleNode::Empty | RuleNode::StringLiteral(_) | RuleNode::CharacterRange(..) => {}
        }
    }

    /// Whether the node needs braces when quantified or used as an item
    fn is_compound(&self) -> bool {
        matches!(
            self,
            RuleNode::Concatenation(_) | RuleNode::Alternation(_) | RuleNode::Empty
        )
    }

    fn fmt_item(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "{{ {} }}", self)
        } else {
            write!(f, "{}", self)
        }
    }

    fn fmt_quantified(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Labeled { .. }
            | RuleNode::Optional(_)
            | RuleNode::Repeated { .. } => write!(f, "{{ {} }}", self),
            _ => self.fmt_item(f),
        }
    }
}

/// Capture key of the unlabeled branch `index` of an alternation
///
/// Keys start with `|`, which the lexer never puts in a name, so they cannot
/// collide with a label.
pub fn branch_key(index: usize) -> String {
    format!("|{}", index)
}

/// GLL notation for a rule body
impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Empty => Ok(()),
            RuleNode::StringLiteral(text) => write!(f, "\"{}\"", text),
            RuleNode::CharacterRange(from, to) => write!(f, "'{}'..='{}'", from, to),
            RuleNode::SymbolName(name) => f.write_str(name),
            RuleNode::Labeled { label, node } => {
                write!(f, "{}:", label)?;
                node.fmt_item(f)
            }
            RuleNode::Concatenation(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    item.fmt_item(f)?;
                }
                Ok(())
            }
            RuleNode::Alternation(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str("| ")?;
                    match item {
                        RuleNode::Alternation(_) => item.fmt_item(f)?,
                        _ => write!(f, "{}", item)?,
                    }
                }
                Ok(())
            }
            RuleNode::Optional(node) => {
                node.fmt_quantified(f)?;
                f.write_str("?")
            }
            RuleNode::Repeated {
                positive,
                node,
                separator,
                allow_trailing,
            } => {
                node.fmt_quantified(f)?;
                f.write_str(if *positive { "+" } else { "*" })?;
                if let Some(sep) = separator {
                    let op = if *allow_trailing { "%%" } else { "%" };
                    write!(f, " {} \"{}\"", op, sep)?;
                }
                Ok(())
            }
        }
    }
}

/// Named rules in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    rules: Vec<(String, RuleNode)>,
}

impl Grammar {
    /// Create an empty grammar
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grammar from `(name, body)` pairs
    ///
    /// Returns the first duplicated name on failure.
    pub fn from_rules<I, S>(rules: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, RuleNode)>,
        S: Into<String>,
    {
        let mut grammar = Grammar::new();
        for (name, body) in rules {
            let name = name.into();
            if grammar.contains(&name) {
                return Err(name);
            }
            grammar.rules.push((name, body));
        }
        Ok(grammar)
    }

    /// Add a rule; returns `false` and leaves the grammar untouched if the
    /// name is already taken
    pub fn insert(&mut self, name: impl Into<String>, body: RuleNode) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.rules.push((name, body));
        true
    }

    /// Body of rule `name`
    pub fn get(&self, name: &str) -> Option<&RuleNode> {
        self.rules
            .iter()
            .find(|(rule, _)| rule == name)
            .map(|(_, body)| body)
    }

    /// Whether rule `name` is defined
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|(rule, _)| rule == name)
    }

    /// Position of rule `name` in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|(rule, _)| rule == name)
    }

    /// Rules in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleNode)> {
        self.rules.iter().map(|(name, body)| (name.as_str(), body))
    }

    /// Rule names in declaration order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    /// First declared rule
    pub fn first_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the grammar has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply `f` to every rule body, keeping names and order
    pub fn map_bodies(&self, mut f: impl FnMut(&RuleNode) -> RuleNode) -> Grammar {
        Grammar {
            rules: self
                .rules
                .iter()
                .map(|(name, body)| (name.clone(), f(body)))
                .collect(),
        }
    }

    /// `(rule, symbol)` pairs for references that neither name a rule of
    /// this grammar nor satisfy `is_external`
    pub fn unresolved_symbols(&self, is_external: impl Fn(&str) -> bool) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (name, body) in self.iter() {
            for symbol in body.symbols() {
                if !self.contains(symbol) && !is_external(symbol) {
                    out.push((name, symbol));
                }
            }
        }
        out
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One `Name = body;` line per rule
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, body) in self.iter() {
            writeln!(f, "{} = {};", name, body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gll::lexer::{tokenize, Token};

    #[test]
    fn test_branch_key_is_never_a_name() {
        let key = branch_key(3);
        assert_eq!(key, "|3");
        assert_eq!(
            tokenize(&key),
            Ok(vec![Token::Pipe, Token::Name("3".to_string())])
        );
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut grammar = Grammar::new();
        assert!(grammar.insert("A", RuleNode::symbol("B")));
        assert!(!grammar.insert("A", RuleNode::Empty));
        assert_eq!(grammar.len(), 1);
        assert_eq!(grammar.get("A"), Some(&RuleNode::symbol("B")));
    }

    #[test]
    fn test_from_rules_reports_duplicate() {
        let err = Grammar::from_rules(vec![("A", RuleNode::Empty), ("A", RuleNode::Empty)])
            .unwrap_err();
        assert_eq!(err, "A");
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let grammar = Grammar::from_rules(vec![
            ("Zeta", RuleNode::Empty),
            ("Alpha", RuleNode::Empty),
            ("Mid", RuleNode::Empty),
        ])
        .unwrap();
        let names: Vec<_> = grammar.rule_names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(grammar.first_rule(), Some("Zeta"));
        assert_eq!(grammar.position("Mid"), Some(2));
    }

    #[test]
    fn test_symbols_in_first_occurrence_order() {
        let node = RuleNode::Concatenation(vec![
            RuleNode::symbol("B"),
            RuleNode::labeled("x", RuleNode::optional(RuleNode::symbol("A"))),
            RuleNode::symbol("B"),
        ]);
        assert_eq!(node.symbols(), vec!["B", "A"]);
    }

    #[test]
    fn test_unresolved_symbols() {
        let grammar = Grammar::from_rules(vec![
            ("A", RuleNode::Concatenation(vec![RuleNode::symbol("B"), RuleNode::symbol("IDENT")])),
            ("B", RuleNode::symbol("Missing")),
        ])
        .unwrap();
        let unresolved = grammar.unresolved_symbols(|name| name == "IDENT");
        assert_eq!(unresolved, vec![("B", "Missing")]);
    }

    #[test]
    fn test_nullable() {
        assert!(RuleNode::optional(RuleNode::symbol("A")).is_nullable());
        assert!(RuleNode::repeated(false, RuleNode::symbol("A")).is_nullable());
        assert!(!RuleNode::repeated(true, RuleNode::symbol("A")).is_nullable());
        assert!(RuleNode::Alternation(vec![RuleNode::Empty, RuleNode::symbol("A")]).is_nullable());
    }

    #[test]
    fn test_display_gll_notation() {
        let node = RuleNode::Concatenation(vec![
            RuleNode::string("("),
            RuleNode::labeled(
                "args",
                RuleNode::separated(false, RuleNode::symbol("Arg"), ",", true),
            ),
            RuleNode::string(")"),
        ]);
        assert_eq!(node.to_string(), "\"(\" args:Arg* %% \",\" \")\"");

        let alt = RuleNode::Alternation(vec![
            RuleNode::labeled("Add", RuleNode::string("+")),
            RuleNode::labeled("Sub", RuleNode::string("-")),
        ]);
        assert_eq!(alt.to_string(), "| Add:\"+\" | Sub:\"-\"");
    }

    #[test]
    fn test_json_roundtrip() {
        let grammar = Grammar::from_rules(vec![(
            "Value",
            RuleNode::optional(RuleNode::string("foo")),
        )])
        .unwrap();
        let json = grammar.to_json().unwrap();
        assert_eq!(Grammar::from_json(&json).unwrap(), grammar);
    }
}

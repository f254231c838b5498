//! Tree simplifier
//!
//! Rewrites rule trees into canonical form: literal text becomes
//! [`RuleNode::Empty`] (it anchors the grammar but carries no data),
//! concatenations drop empty items and unwrap when a single item is left,
//! single-branch alternations collapse, and labels under `?` are hoisted
//! outward. The rewrite is bottom-up and idempotent.

use super::grammar::{Grammar, RuleNode};

/// Canonical form of `node`
pub fn simplify(node: &RuleNode) -> RuleNode {
    match node {
        RuleNode::Empty | RuleNode::StringLiteral(_) => RuleNode::Empty,
        RuleNode::CharacterRange(..) | RuleNode::SymbolName(_) => node.clone(),
        RuleNode::Labeled { label, node } => RuleNode::labeled(label.clone(), simplify(node)),
        RuleNode::Concatenation(items) => {
            let mut kept: Vec<RuleNode> = items
                .iter()
                .map(simplify)
                .filter(|item| *item != RuleNode::Empty)
                .collect();
            match kept.len() {
                0 => RuleNode::Empty,
                1 => kept.pop().unwrap_or(RuleNode::Empty),
                _ => RuleNode::Concatenation(kept),
            }
        }
        RuleNode::Alternation(items) => {
            let mut branches: Vec<RuleNode> = items.iter().map(simplify).collect();
            if branches.len() == 1 {
                branches.pop().unwrap_or(RuleNode::Empty)
            } else {
                RuleNode::Alternation(branches)
            }
        }
        RuleNode::Optional(inner) => hoist_labels(simplify(inner)),
        RuleNode::Repeated {
            positive,
            node,
            separator,
            allow_trailing,
        } => RuleNode::Repeated {
            positive: *positive,
            node: Box::new(simplify(node)),
            separator: separator.clone(),
            allow_trailing: *allow_trailing,
        },
    }
}

/// `?` applied under any labels of `node`
fn hoist_labels(node: RuleNode) -> RuleNode {
    match node {
        RuleNode::Labeled { label, node } => RuleNode::labeled(label, hoist_labels(*node)),
        other => RuleNode::optional(other),
    }
}

/// Whether `node` simplifies to [`RuleNode::Empty`], i.e. carries no data
pub fn is_vacuous(node: &RuleNode) -> bool {
    simplify(node) == RuleNode::Empty
}

/// Canonical form of every rule of `grammar`
pub fn simplify_grammar(grammar: &Grammar) -> Grammar {
    grammar.map_bodies(simplify)
}

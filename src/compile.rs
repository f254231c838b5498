//! Parser-spec compiler
//!
//! Lowers a [`Grammar`] into a [`ParserSpec`] the engine can execute. The
//! input is the grammar as parsed: its string literals are the tokens the
//! engine has to match. Concatenation items that carry no data are compiled
//! under [`Atom::Ignore`], so the value of every sequence lines up with the
//! canonical tree the synthesizer sees.
//!
//! Separated repetitions without a trailing separator become
//! [`Atom::Join`]; with a trailing separator allowed they are spelled out:
//!
//! - `X+ %% s` compiles to `X {~s X}* ~s?`
//! - `X* %% s` compiles to `{X {~s X}* ~s?} | {}`
//!
//! Values record structure, never guess it. Unlabeled alternation branches
//! are captured under their [`branch_key`], and an optional whose label the
//! simplifier hoists (`{x:X}?` becomes `x:{X?}`) is compiled in the hoisted
//! form, so the capture exists whether or not `X` matched.

use crate::builtins::{self, Builtin};
use crate::config::GeneratorConfig;
use crate::engine::spec::{Atom, ParserSpec, RuleEntry};
use crate::gll::{branch_key, is_vacuous, simplify, Grammar, RuleNode};
use crate::logging::{log_debug, log_trace};
use ahash::RandomState;
use hashbrown::HashMap;
use thiserror::Error;

/// Error raised while compiling a grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A rule refers to a rule that does not exist
    #[error("Rule {rule} refers to undefined rule {symbol}")]
    UnresolvedSymbol {
        /// Referring rule
        rule: String,
        /// Missing rule
        symbol: String,
    },

    /// Character ranges have no engine support
    #[error("Rule {rule}: character range {from:?}..{to:?} is not implemented")]
    CharacterRangeNotImplemented {
        /// Rule containing the range
        rule: String,
        /// Range start
        from: char,
        /// Range end
        to: char,
    },

    /// The configured start rule does not exist
    #[error("Unknown start rule: {rule}")]
    UnknownStartRule {
        /// Requested rule
        rule: String,
    },
}

/// Compile `grammar` with the built-in rules available
///
/// # Example
///
/// ```rust
/// use gllgen::{compile_parser_spec, parse_grammar_text};
///
/// let grammar = parse_grammar_text(r#"Main = "foo"* % ",";"#).unwrap();
/// let spec = compile_parser_spec(&grammar).unwrap();
/// assert!(spec.parse("Main", "foo, foo").is_ok());
/// assert!(spec.parse("Main", "foo, foo,").is_err());
/// ```
pub fn compile_parser_spec(grammar: &Grammar) -> Result<ParserSpec, CompileError> {
    compile_parser_spec_with(grammar, &GeneratorConfig::default())
}

/// Compile `grammar` according to `config`
///
/// Grammar rules come first in the rule table, in declaration order,
/// followed by the built-in rules the grammar does not define itself.
pub fn compile_parser_spec_with(
    grammar: &Grammar,
    config: &GeneratorConfig,
) -> Result<ParserSpec, CompileError> {
    let builtins: Vec<&Builtin> = if config.builtin_rules {
        builtins::BUILTINS
            .iter()
            .filter(|builtin| !grammar.contains(builtin.name))
            .collect()
    } else {
        Vec::new()
    };

    let mut compiler = Compiler::new();
    for name in grammar
        .rule_names()
        .chain(builtins.iter().map(|builtin| builtin.name))
    {
        let index = compiler.spec.rules.len();
        compiler.indices.insert(name.to_string(), index);
        compiler.spec.rules.push(RuleEntry {
            name: name.to_string(),
            atom: 0,
        });
    }

    for (index, (name, body)) in grammar.iter().enumerate() {
        compiler.rule = name.to_string();
        let atom = compiler.compile(body)?;
        compiler.spec.rules[index].atom = atom;
        log_debug!("Compiled rule {} -> atom {}", name, atom);
    }

    for (offset, builtin) in builtins.iter().enumerate() {
        let index = grammar.len() + offset;
        let atom = builtin.install(&mut compiler.spec, index);
        compiler.spec.rules[index].atom = atom;
        log_trace!("Installed built-in rule {} -> atom {}", builtin.name, atom);
    }

    let mut spec = compiler.spec;
    if let Some(start) = &config.start_rule {
        spec.start = spec
            .rule_index(start)
            .ok_or_else(|| CompileError::UnknownStartRule {
                rule: start.clone(),
            })?;
    }

    log_debug!(
        "Compiled {} rules into {} atoms",
        spec.rules.len(),
        spec.atom_count()
    );
    Ok(spec)
}

struct Compiler {
    spec: ParserSpec,
    indices: HashMap<String, usize, RandomState>,
    /// Rule being compiled, for error messages
    rule: String,
}

impl Compiler {
    fn new() -> Self {
        Self {
            spec: ParserSpec::new(),
            indices: HashMap::with_hasher(RandomState::new()),
            rule: String::new(),
        }
    }

    fn token(&mut self, text: &str) -> usize {
        self.spec.add_atom(Atom::Token {
            text: text.to_string(),
        })
    }

    fn ignore(&mut self, atom: usize) -> usize {
        self.spec.add_atom(Atom::Ignore { atom })
    }

    fn compile(&mut self, node: &RuleNode) -> Result<usize, CompileError> {
        let atom = match node {
            RuleNode::Empty => Atom::Empty,
            RuleNode::StringLiteral(text) => Atom::Token { text: text.clone() },
            RuleNode::CharacterRange(from, to) => {
                return Err(CompileError::CharacterRangeNotImplemented {
                    rule: self.rule.clone(),
                    from: *from,
                    to: *to,
                })
            }
            RuleNode::SymbolName(name) => {
                let rule =
                    *self
                        .indices
                        .get(name)
                        .ok_or_else(|| CompileError::UnresolvedSymbol {
                            rule: self.rule.clone(),
                            symbol: name.clone(),
                        })?;
                Atom::Rule { rule }
            }
            RuleNode::Labeled { label, node } => Atom::Named {
                name: label.clone(),
                atom: self.compile(node)?,
            },
            RuleNode::Concatenation(items) => {
                // A concatenation of data-less items keeps all its values so
                // that its presence stays observable
                let drop_vacuous = !items.iter().all(is_vacuous);
                let mut atoms = Vec::with_capacity(items.len());
                for item in items {
                    let atom = self.compile(item)?;
                    atoms.push(if drop_vacuous && is_vacuous(item) {
                        self.ignore(atom)
                    } else {
                        atom
                    });
                }
                Atom::Sequence { atoms }
            }
            RuleNode::Alternation(items) if items.len() > 1 => {
                let mut atoms = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let atom = self.compile(item)?;
                    atoms.push(match simplify(item) {
                        RuleNode::Labeled { .. } => atom,
                        _ => self.spec.add_atom(Atom::Named {
                            name: branch_key(i),
                            atom,
                        }),
                    });
                }
                Atom::Choice { atoms }
            }
            RuleNode::Alternation(items) => Atom::Choice {
                atoms: items
                    .iter()
                    .map(|item| self.compile(item))
                    .collect::<Result<_, _>>()?,
            },
            RuleNode::Optional(inner) => match simplify(inner) {
                RuleNode::Labeled { label, .. } => Atom::Named {
                    name: label,
                    atom: self.compile(&RuleNode::optional(strip_label(inner)))?,
                },
                _ => Atom::Optional {
                    atom: self.compile(inner)?,
                },
            },
            RuleNode::Repeated {
                positive,
                node,
                separator,
                allow_trailing,
            } => {
                let item = self.compile(node)?;
                let min = usize::from(*positive);
                match separator {
                    None => Atom::Repetition { atom: item, min },
                    Some(separator) if !allow_trailing => Atom::Join {
                        atom: item,
                        separator: self.token(separator),
                        min,
                    },
                    Some(separator) => self.trailing(item, separator, *positive),
                }
            }
        };
        Ok(self.spec.add_atom(atom))
    }

    /// Separated repetition accepting one trailing separator
    ///
    /// The value is `[first, [item, ...]]`, or `[]` when a zero-or-more
    /// repetition matches nothing.
    fn trailing(&mut self, item: usize, separator: &str, positive: bool) -> Atom {
        // X {~s X}* ~s?
        let sep = self.token(separator);
        let sep = self.ignore(sep);
        let pair = self.spec.add_atom(Atom::Sequence {
            atoms: vec![sep, item],
        });
        let rest = self.spec.add_atom(Atom::Repetition { atom: pair, min: 0 });
        let last = self.token(separator);
        let last = self.spec.add_atom(Atom::Optional { atom: last });
        let last = self.ignore(last);
        let items = Atom::Sequence {
            atoms: vec![item, rest, last],
        };
        if positive {
            return items;
        }

        let items = self.spec.add_atom(items);
        let none = self.spec.add_atom(Atom::Sequence { atoms: Vec::new() });
        Atom::Choice {
            atoms: vec![items, none],
        }
    }
}

/// `node` without the label its canonical form starts with
///
/// Only called on nodes whose canonical form is labeled; the label sits on
/// the single item that carries data.
fn strip_label(node: &RuleNode) -> RuleNode {
    match node {
        RuleNode::Labeled { node, .. } => (**node).clone(),
        RuleNode::Concatenation(items) => RuleNode::Concatenation(
            items
                .iter()
                .map(|item| {
                    if is_vacuous(item) {
                        item.clone()
                    } else {
                        strip_label(item)
                    }
                })
                .collect(),
        ),
        RuleNode::Alternation(items) => match items.as_slice() {
            [only] => RuleNode::Alternation(vec![strip_label(only)]),
            _ => node.clone(),
        },
        RuleNode::Optional(inner) => RuleNode::optional(strip_label(inner)),
        other => other.clone(),
    }
}

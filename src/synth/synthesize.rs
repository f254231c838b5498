//! AST type synthesizer
//!
//! Walks the canonical form of every rule and derives a type declaration
//! plus a constructor for it:
//!
//! | rule body                         | type                               |
//! |-----------------------------------|------------------------------------|
//! | empty                             | unit struct                        |
//! | concatenation                     | struct, one field per item         |
//! | alternation of labeled empties    | enum of bare tags                  |
//! | other alternation                 | enum with payloads                 |
//! | `X?`, `X*`, literal               | single-field struct                |
//! | reference to an earlier rule      | type alias                         |
//! | reference to a later rule         | struct boxing the referenced type  |
//!
//! Concatenations and alternations nested inside fields, variants, options
//! and lists become auxiliary types named after their parent.

use super::model::{
    Build, Constructor, Expr, Field, RustType, Synthesis, TypeDecl, TypeRef, TypeShape, Variant,
    VariantBuild,
};
use super::naming::{to_field_case, to_type_case, NameAllocator};
use crate::builtins::BUILTINS;
use crate::config::GeneratorConfig;
use crate::gll::{branch_key, simplify_grammar, Grammar, RuleNode};
use crate::logging::log_debug;
use crate::runtime::Repetition;
use ahash::RandomState;
use hashbrown::{HashMap, HashSet};
use thiserror::Error;

/// Error raised while synthesizing types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// A rule refers to a rule that does not exist
    #[error("Rule {rule} refers to undefined rule {symbol}")]
    UnresolvedSymbol {
        /// Referring rule
        rule: String,
        /// Missing rule
        symbol: String,
    },

    /// Character ranges have no type mapping
    #[error("Rule {rule}: character ranges are not implemented")]
    CharacterRangeNotImplemented {
        /// Rule containing the range
        rule: String,
    },

    /// The rule uses a construct without a type mapping
    #[error("Rule {rule}: {reason}")]
    Unsupported {
        /// Offending rule
        rule: String,
        /// What is not supported
        reason: String,
    },
}

/// Synthesize types for `grammar` with the built-in rules available
///
/// The grammar may be raw or already simplified.
///
/// # Example
///
/// ```rust
/// use gllgen::{parse_grammar_text, synthesize_types};
/// use gllgen::synth::TypeShape;
///
/// let grammar = parse_grammar_text(r#"Op = | Add: "+" | Sub: "-";"#).unwrap();
/// let synthesis = synthesize_types(&grammar).unwrap();
/// let (decl, _) = synthesis.get("Op").unwrap();
/// assert_eq!(decl.shape, TypeShape::Enum { tags: vec!["Add".into(), "Sub".into()] });
/// ```
pub fn synthesize_types(grammar: &Grammar) -> Result<Synthesis, SynthError> {
    synthesize_types_with(grammar, &GeneratorConfig::default())
}

/// Synthesize types for `grammar` according to `config`
pub fn synthesize_types_with(
    grammar: &Grammar,
    config: &GeneratorConfig,
) -> Result<Synthesis, SynthError> {
    let grammar = simplify_grammar(grammar);
    let mut synth = Synthesizer::new(&grammar);

    // Rule types claim their names before any auxiliary type
    let type_names: Vec<String> = grammar
        .rule_names()
        .map(|name| synth.names.reserve(&to_type_case(name)))
        .collect();
    for (name, ty) in grammar.rule_names().zip(&type_names) {
        synth.types.insert(name.to_string(), TypeRef::Local(ty.clone()));
    }
    if config.builtin_rules {
        for builtin in BUILTINS.iter().filter(|b| !grammar.contains(b.name)) {
            synth.types.insert(
                builtin.name.to_string(),
                TypeRef::Builtin(builtin.type_name.to_string()),
            );
        }
    }

    let mut rules = Vec::with_capacity(grammar.len());
    for ((name, body), ty) in grammar.iter().zip(type_names) {
        synth.rule = name.to_string();
        let mut decl = synth.rule_decl(&ty, body)?;
        decl.rule = Some(name.to_string());
        log_debug!("Rule {} -> {} ({})", name, ty, decl.shape.kind());
        synth.emit(decl);
        rules.push((name.to_string(), ty));
    }

    Ok(Synthesis {
        decls: synth.decls,
        rules,
    })
}

/// Single-use synthesis state
struct Synthesizer<'g> {
    /// Canonical grammar being synthesized
    grammar: &'g Grammar,
    names: NameAllocator,
    /// Rule name to type
    types: HashMap<String, TypeRef, RandomState>,
    /// Local types emitted so far
    declared: HashSet<String, RandomState>,
    decls: Vec<TypeDecl>,
    /// Rule being synthesized, for error messages
    rule: String,
}

impl<'g> Synthesizer<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            names: NameAllocator::global(),
            types: HashMap::with_hasher(RandomState::new()),
            declared: HashSet::with_hasher(RandomState::new()),
            decls: Vec::new(),
            rule: String::new(),
        }
    }

    fn emit(&mut self, decl: TypeDecl) {
        self.declared.insert(decl.name.clone());
        self.decls.push(decl);
    }

    fn resolve(&self, symbol: &str) -> Result<TypeRef, SynthError> {
        self.types
            .get(symbol)
            .cloned()
            .ok_or_else(|| SynthError::UnresolvedSymbol {
                rule: self.rule.clone(),
                symbol: symbol.to_string(),
            })
    }

    fn is_declared(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Builtin(_) => true,
            TypeRef::Local(name) => self.declared.contains(name),
        }
    }

    /// Whether the value of `node` can be Nil after a successful match
    ///
    /// Follows references to rules with an unlabeled body.
    fn may_be_absent(&self, node: &RuleNode) -> bool {
        let mut node = node;
        for _ in 0..=self.grammar.len() {
            match node {
                RuleNode::Optional(_) => return true,
                RuleNode::SymbolName(symbol) => match self.grammar.get(symbol) {
                    Some(body) => node = body,
                    None => return false,
                },
                _ => return false,
            }
        }
        false
    }

    fn unsupported(&self, reason: &str) -> SynthError {
        SynthError::Unsupported {
            rule: self.rule.clone(),
            reason: reason.to_string(),
        }
    }

    /// Declaration of a rule's own type
    fn rule_decl(&mut self, name: &str, node: &RuleNode) -> Result<TypeDecl, SynthError> {
        let (capture, body) = match node {
            RuleNode::Labeled { label, node } => (Some(label.clone()), node.as_ref()),
            other => (None, other),
        };
        let field = capture.as_deref().map(|label| {
            let mut locals = NameAllocator::local();
            locals.reserve(&to_field_case(label))
        });

        let (shape, build) = match body {
            RuleNode::Empty => (TypeShape::Unit, Build::Unit),
            RuleNode::SymbolName(symbol) => {
                let target = self.resolve(symbol)?;
                if capture.is_none() && self.is_declared(&target) {
                    (
                        TypeShape::Alias {
                            target: target.clone(),
                        },
                        Build::Alias(target),
                    )
                } else {
                    let expr = Expr::Call {
                        ty: target.clone(),
                        boxed: true,
                    };
                    (TypeShape::Wrapper { field, target }, Build::Field(expr))
                }
            }
            RuleNode::Concatenation(items) => self.record(name, items)?,
            RuleNode::Alternation(items) if is_marker_only(items) => marker_enum(items),
            RuleNode::Alternation(items) => self.union(name, items)?,
            other => {
                let expr = self.expr(name, "Inner", other, true)?;
                single_value(field, expr)
            }
        };

        Ok(TypeDecl {
            name: name.to_string(),
            rule: None,
            shape,
            constructor: Constructor { capture, build },
        })
    }

    fn record(
        &mut self,
        name: &str,
        items: &[RuleNode],
    ) -> Result<(TypeShape, Build), SynthError> {
        let mut locals = NameAllocator::local();
        let mut fields = Vec::with_capacity(items.len());
        let mut exprs = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            let base = match item.label() {
                Some(label) => to_field_case(label),
                None => format!("field_{}", i),
            };
            let field = locals.reserve(&base);
            let expr = self.expr(name, &field, item, true)?;
            fields.push(Field {
                name: field,
                ty: expr.rust_type(),
            });
            exprs.push(expr);
        }

        Ok((TypeShape::Record { fields }, Build::Fields(exprs)))
    }

    fn union(
        &mut self,
        name: &str,
        items: &[RuleNode],
    ) -> Result<(TypeShape, Build), SynthError> {
        let mut locals = NameAllocator::local();
        let mut variants = Vec::with_capacity(items.len());
        let mut builds = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            let (label, inner) = match item {
                RuleNode::Labeled { label, node } => (Some(label.clone()), node.as_ref()),
                other => (None, other),
            };
            let variant = match &label {
                Some(label) => locals.reserve(&to_type_case(label)),
                None => locals.reserve(&format!("Variant{}", i)),
            };
            let key = label.unwrap_or_else(|| branch_key(i));
            let payload = match inner {
                RuleNode::Empty => None,
                inner => Some(self.expr(name, &variant, inner, true)?),
            };
            variants.push(Variant {
                name: variant,
                payload: payload.as_ref().map(Expr::rust_type),
            });
            builds.push(VariantBuild { key, payload });
        }

        Ok((TypeShape::Union { variants }, Build::Variants(builds)))
    }

    /// Auxiliary type for a nested concatenation or alternation
    fn auxiliary(&mut self, parent: &str, hint: &str, node: &RuleNode) -> Result<Expr, SynthError> {
        let name = self
            .names
            .reserve(&format!("{}{}", parent, to_type_case(hint)));
        let (shape, build) = match node {
            RuleNode::Concatenation(items) => self.record(&name, items)?,
            RuleNode::Alternation(items) => self.union(&name, items)?,
            _ => return Err(self.unsupported("auxiliary type for a leaf node")),
        };
        self.emit(TypeDecl {
            name: name.clone(),
            rule: None,
            shape,
            constructor: Constructor {
                capture: None,
                build,
            },
        });
        Ok(Expr::Call {
            ty: TypeRef::Local(name),
            boxed: false,
        })
    }

    /// Expression building a field, payload, option or list element
    fn expr(
        &mut self,
        parent: &str,
        hint: &str,
        node: &RuleNode,
        boxed: bool,
    ) -> Result<Expr, SynthError> {
        match node {
            RuleNode::Empty => Ok(Expr::Unit),
            RuleNode::StringLiteral(_) => Ok(Expr::Text),
            RuleNode::CharacterRange(..) => Err(SynthError::CharacterRangeNotImplemented {
                rule: self.rule.clone(),
            }),
            RuleNode::SymbolName(symbol) => Ok(Expr::Call {
                ty: self.resolve(symbol)?,
                boxed,
            }),
            RuleNode::Labeled { label, node } => Ok(Expr::Capture {
                label: label.clone(),
                inner: Box::new(self.expr(parent, hint, node, boxed)?),
            }),
            RuleNode::Concatenation(_) | RuleNode::Alternation(_) => {
                self.auxiliary(parent, hint, node)
            }
            RuleNode::Optional(inner) => match inner.as_ref() {
                RuleNode::Empty => Ok(Expr::Presence),
                inner if self.may_be_absent(inner) => Err(self.unsupported("nested optional")),
                inner => Ok(Expr::Optional(Box::new(self.expr(parent, hint, inner, true)?))),
            },
            RuleNode::Repeated {
                positive,
                node,
                separator,
                allow_trailing,
            } => {
                if is_nullable_item(node) {
                    return Err(self.unsupported("repetition of an item that can match nothing"));
                }
                let layout = match (separator, allow_trailing, positive) {
                    (None, _, _) => Repetition::Plain,
                    (Some(_), false, _) => Repetition::Joined,
                    (Some(_), true, false) => Repetition::Trailing,
                    (Some(_), true, true) => Repetition::TrailingPositive,
                };
                Ok(Expr::List {
                    item: Box::new(self.expr(parent, hint, node, false)?),
                    layout,
                })
            }
        }
    }
}

/// Every branch is a label over nothing
fn is_marker_only(items: &[RuleNode]) -> bool {
    items.iter().all(|item| {
        matches!(item, RuleNode::Labeled { node, .. } if **node == RuleNode::Empty)
    })
}

/// Enum of bare tags, one per branch label
fn marker_enum(items: &[RuleNode]) -> (TypeShape, Build) {
    let mut locals = NameAllocator::local();
    let labels: Vec<String> = items
        .iter()
        .filter_map(|item| item.label().map(str::to_string))
        .collect();
    let tags = labels
        .iter()
        .map(|label| locals.reserve(&to_type_case(label)))
        .collect();
    (TypeShape::Enum { tags }, Build::Tags(labels))
}

/// `X?` and `X*` items, under any labels
fn is_nullable_item(node: &RuleNode) -> bool {
    match node {
        RuleNode::Labeled { node, .. } => is_nullable_item(node),
        RuleNode::Optional(_) => true,
        RuleNode::Repeated { positive, .. } => !positive,
        _ => false,
    }
}

/// Shape of a single-value type built by `expr`
fn single_value(field: Option<String>, expr: Expr) -> (TypeShape, Build) {
    let shape = match expr.rust_type() {
        RustType::Unit => return (TypeShape::Unit, Build::Unit),
        RustType::String => TypeShape::Text { field },
        RustType::Bool => TypeShape::Flag { field },
        RustType::Option(inner) => TypeShape::Optional {
            field,
            inner: *inner,
        },
        RustType::Vec(item) => TypeShape::List { field, item: *item },
        RustType::Named { ty, .. } => TypeShape::Wrapper { field, target: ty },
    };
    (shape, Build::Field(expr))
}

//! Dynamic AST construction
//!
//! Interprets the constructors of a [`Synthesis`] directly on parse values,
//! producing [`Node`] trees with the same structure as instances of the
//! generated types. Useful for tests and tooling that cannot compile the
//! generated code.

use super::model::{Build, Expr, Synthesis, TypeDecl, TypeRef, TypeShape};
use crate::builtins::BUILTINS;
use crate::engine::{ParseError, Value};
use crate::runtime::BuildError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dynamically built AST node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// `()`
    Unit,
    /// Presence flag
    Bool(bool),
    /// Matched text
    Text(String),
    /// Struct instance; tuple fields are named `"0"`
    Struct {
        /// Type name
        ty: String,
        /// Fields in declaration order
        fields: Vec<(String, Node)>,
    },
    /// Enum variant with an optional payload
    Variant {
        /// Type name
        ty: String,
        /// Variant name
        variant: String,
        /// Payload
        payload: Option<Box<Node>>,
    },
    /// Bare enum tag
    Tag {
        /// Type name
        ty: String,
        /// Tag name
        tag: String,
    },
    /// Optional value
    Option(Option<Box<Node>>),
    /// List of values
    List(Vec<Node>),
}

impl Node {
    /// Field `name` of a struct node
    pub fn field(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Struct { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    /// Type name of struct, variant and tag nodes
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Node::Struct { ty, .. } | Node::Variant { ty, .. } | Node::Tag { ty, .. } => Some(ty),
            _ => None,
        }
    }

    /// Text of a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Error from parsing input straight into an AST
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AstError {
    /// The input does not match the grammar
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The parse value does not fit the rule's type
    #[error(transparent)]
    Build(#[from] BuildError),

    /// No type was synthesized for the rule
    #[error("Unknown rule: {rule}")]
    UnknownRule {
        /// Requested rule
        rule: String,
    },
}

impl Synthesis {
    /// Build the AST of `rule` from its parse value
    pub fn build(&self, rule: &str, value: &Value) -> Result<Node, AstError> {
        let ty = self
            .type_name(rule)
            .ok_or_else(|| AstError::UnknownRule {
                rule: rule.to_string(),
            })?;
        Ok(self.build_type(&TypeRef::Local(ty.to_string()), value)?)
    }

    /// Build an instance of `ty` from `value`
    pub fn build_type(&self, ty: &TypeRef, value: &Value) -> Result<Node, BuildError> {
        match ty {
            TypeRef::Local(name) => self
                .decl(name)
                .ok_or_else(|| BuildError::UnknownType { name: name.clone() })?
                .build(value, self),
            TypeRef::Builtin(name) => BUILTINS
                .iter()
                .find(|builtin| builtin.type_name == name)
                .ok_or_else(|| BuildError::UnknownType { name: name.clone() })?
                .build(value),
        }
    }
}

impl TypeDecl {
    /// Run this declaration's constructor on `value`
    pub fn build(&self, value: &Value, synthesis: &Synthesis) -> Result<Node, BuildError> {
        let value = match &self.constructor.capture {
            Some(label) => value.capture(label)?,
            None => value,
        };
        let ty = self.name.clone();

        match (&self.constructor.build, &self.shape) {
            (Build::Alias(target), _) => synthesis.build_type(target, value),
            (Build::Unit, _) => Ok(Node::Struct {
                ty,
                fields: Vec::new(),
            }),
            (Build::Field(expr), shape) => {
                let name = shape
                    .single_field()
                    .and_then(|(field, _)| field)
                    .unwrap_or("0");
                Ok(Node::Struct {
                    ty,
                    fields: vec![(name.to_string(), eval(expr, value, synthesis)?)],
                })
            }
            (Build::Fields(exprs), TypeShape::Record { fields }) => {
                let values = value.fields(exprs.len())?;
                let fields = fields
                    .iter()
                    .zip(exprs)
                    .zip(values)
                    .map(|((field, expr), value)| {
                        Ok((field.name.clone(), eval(expr, value, synthesis)?))
                    })
                    .collect::<Result<_, BuildError>>()?;
                Ok(Node::Struct { ty, fields })
            }
            (Build::Variants(builds), TypeShape::Union { variants }) => {
                let selected = value.variant().and_then(|(found, inner)| {
                    variants
                        .iter()
                        .zip(builds)
                        .find(|(_, build)| build.key == found)
                        .map(|(variant, build)| (variant, build, inner))
                });
                let Some((variant, build, inner)) = selected else {
                    return Err(BuildError::NoVariant { ty });
                };
                let payload = match &build.payload {
                    Some(expr) => Some(Box::new(eval(expr, inner, synthesis)?)),
                    None => None,
                };
                Ok(Node::Variant {
                    ty,
                    variant: variant.name.clone(),
                    payload,
                })
            }
            (Build::Tags(labels), TypeShape::Enum { tags }) => {
                let tag = value.variant().and_then(|(found, _)| {
                    labels
                        .iter()
                        .zip(tags)
                        .find(|(label, _)| *label == found)
                        .map(|(_, tag)| tag.clone())
                });
                match tag {
                    Some(tag) => Ok(Node::Tag { ty, tag }),
                    None => Err(BuildError::NoVariant { ty }),
                }
            }
            _ => Err(BuildError::UnknownType { name: ty }),
        }
    }
}

fn eval(expr: &Expr, value: &Value, synthesis: &Synthesis) -> Result<Node, BuildError> {
    match expr {
        Expr::Unit => Ok(Node::Unit),
        Expr::Text => Ok(Node::Text(value.text()?)),
        Expr::Presence => Ok(Node::Bool(value.present())),
        Expr::Call { ty, .. } => synthesis.build_type(ty, value),
        Expr::Capture { label, inner } => eval(inner, value.capture(label)?, synthesis),
        Expr::Optional(inner) => match value.optional() {
            Some(value) => Ok(Node::Option(Some(Box::new(eval(inner, value, synthesis)?)))),
            None => Ok(Node::Option(None)),
        },
        Expr::List { item, layout } => value
            .repeated(*layout)?
            .into_iter()
            .map(|value| eval(item, value, synthesis))
            .collect::<Result<_, _>>()
            .map(Node::List),
    }
}

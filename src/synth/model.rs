//! Type declarations and constructors
//!
//! A [`Synthesis`] lists the [`TypeDecl`]s derived from a grammar in
//! emission order. Each declaration pairs a [`TypeShape`] (what the Rust
//! type looks like) with a [`Constructor`] (how a parse value becomes an
//! instance of it). Constructors are built from [`Expr`]s, which both the
//! renderer and the interpreter walk.

use crate::runtime::Repetition;
use serde::{Deserialize, Serialize};

/// Reference to a generated or built-in type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// Type declared by the synthesis
    Local(String),
    /// Type from the built-ins module
    Builtin(String),
}

impl TypeRef {
    /// Bare type name
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Local(name) | TypeRef::Builtin(name) => name,
        }
    }
}

/// Rust type of a field or variant payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RustType {
    /// `()`
    Unit,
    /// `bool`
    Bool,
    /// `String`
    String,
    /// A named type, boxed or not
    Named {
        /// Referenced type
        ty: TypeRef,
        /// Stored as `Box<ty>`
        boxed: bool,
    },
    /// `Option<T>`
    Option(Box<RustType>),
    /// `Vec<T>`
    Vec(Box<RustType>),
}

/// How to build one value from the parse value at hand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// `()`, nothing to read
    Unit,
    /// The matched text
    Text,
    /// Whether anything matched
    Presence,
    /// Build a named type
    Call {
        /// Type to build
        ty: TypeRef,
        /// Wrap the result in a `Box`
        boxed: bool,
    },
    /// Read the capture `label`, then build `inner` from it
    Capture {
        /// Capture label
        label: String,
        /// Expression applied to the captured value
        inner: Box<Expr>,
    },
    /// `Some(inner)` when something matched, `None` otherwise
    Optional(Box<Expr>),
    /// Build `item` from every element of a repetition
    List {
        /// Expression applied to each element
        item: Box<Expr>,
        /// Element layout of the repetition value
        layout: Repetition,
    },
}

impl Expr {
    /// Type of the values this expression builds
    pub fn rust_type(&self) -> RustType {
        match self {
            Expr::Unit => RustType::Unit,
            Expr::Text => RustType::String,
            Expr::Presence => RustType::Bool,
            Expr::Call { ty, boxed } => RustType::Named {
                ty: ty.clone(),
                boxed: *boxed,
            },
            Expr::Capture { inner, .. } => inner.rust_type(),
            Expr::Optional(inner) => RustType::Option(Box::new(inner.rust_type())),
            Expr::List { item, .. } => RustType::Vec(Box::new(item.rust_type())),
        }
    }
}

/// Named field of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: RustType,
}

/// Variant of a tagged union
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    /// Variant name
    pub name: String,
    /// Payload type; `None` for a unit variant
    pub payload: Option<RustType>,
}

/// Shape of a generated type
///
/// Shapes with a `field` hold a single value: a named field when the rule
/// body carries a top-level label, a tuple field otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeShape {
    /// Unit struct
    Unit,
    /// Matched text
    Text {
        /// Field name
        field: Option<String>,
    },
    /// Presence flag
    Flag {
        /// Field name
        field: Option<String>,
    },
    /// Struct with one field per concatenation item
    Record {
        /// Fields in order
        fields: Vec<Field>,
    },
    /// Enum with payload-carrying variants
    Union {
        /// Variants in order
        variants: Vec<Variant>,
    },
    /// Enum of bare tags
    Enum {
        /// Tag names in order
        tags: Vec<String>,
    },
    /// Optional value
    Optional {
        /// Field name
        field: Option<String>,
        /// Type of the value when present
        inner: RustType,
    },
    /// List of values
    List {
        /// Field name
        field: Option<String>,
        /// Element type
        item: RustType,
    },
    /// `type Name = Target;`
    Alias {
        /// Aliased type
        target: TypeRef,
    },
    /// Struct holding a boxed value of a type declared later
    Wrapper {
        /// Field name
        field: Option<String>,
        /// Wrapped type
        target: TypeRef,
    },
}

impl TypeShape {
    /// Field name and type of a single-value shape
    pub fn single_field(&self) -> Option<(Option<&str>, RustType)> {
        match self {
            TypeShape::Text { field } => Some((field.as_deref(), RustType::String)),
            TypeShape::Flag { field } => Some((field.as_deref(), RustType::Bool)),
            TypeShape::Optional { field, inner } => Some((
                field.as_deref(),
                RustType::Option(Box::new(inner.clone())),
            )),
            TypeShape::List { field, item } => {
                Some((field.as_deref(), RustType::Vec(Box::new(item.clone()))))
            }
            TypeShape::Wrapper { field, target } => Some((
                field.as_deref(),
                RustType::Named {
                    ty: target.clone(),
                    boxed: true,
                },
            )),
            TypeShape::Unit
            | TypeShape::Record { .. }
            | TypeShape::Union { .. }
            | TypeShape::Enum { .. }
            | TypeShape::Alias { .. } => None,
        }
    }

    /// Short kind name
    pub fn kind(&self) -> &'static str {
        match self {
            TypeShape::Unit => "unit",
            TypeShape::Text { .. } => "text",
            TypeShape::Flag { .. } => "flag",
            TypeShape::Record { .. } => "record",
            TypeShape::Union { .. } => "union",
            TypeShape::Enum { .. } => "enum",
            TypeShape::Optional { .. } => "optional",
            TypeShape::List { .. } => "list",
            TypeShape::Alias { .. } => "alias",
            TypeShape::Wrapper { .. } => "wrapper",
        }
    }
}

/// How one union variant is recognized and built
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantBuild {
    /// Capture key selecting the variant: the branch label, or the
    /// [`branch_key`](crate::gll::branch_key) of an unlabeled branch
    pub key: String,
    /// Payload expression, applied to the captured value
    pub payload: Option<Expr>,
}

/// Constructor body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Build {
    /// Unit struct
    Unit,
    /// Single-value shapes
    Field(Expr),
    /// Record fields, one per element of the sequence value
    Fields(Vec<Expr>),
    /// Union variants, in declaration order, selected by capture key
    Variants(Vec<VariantBuild>),
    /// Enum tags, selected by capture label
    Tags(Vec<String>),
    /// Delegate to the aliased type
    Alias(TypeRef),
}

/// Converts a parse value into an instance of a declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constructor {
    /// Top-level label of the rule body, unwrapped before building
    pub capture: Option<String>,
    /// Constructor body
    pub build: Build,
}

/// A generated type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Type name
    pub name: String,
    /// Grammar rule the type belongs to; `None` for auxiliary types
    pub rule: Option<String>,
    /// Type shape
    pub shape: TypeShape,
    /// Constructor
    pub constructor: Constructor,
}

/// Result of type synthesis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    /// Declarations in emission order
    pub decls: Vec<TypeDecl>,
    /// `(rule name, type name)` in rule order
    pub rules: Vec<(String, String)>,
}

impl Synthesis {
    /// Type name of `rule`
    pub fn type_name(&self, rule: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(name, _)| name == rule)
            .map(|(_, ty)| ty.as_str())
    }

    /// Declaration named `name`
    pub fn decl(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.iter().find(|decl| decl.name == name)
    }

    /// Declaration and constructor of `rule`
    pub fn get(&self, rule: &str) -> Option<(&TypeDecl, &Constructor)> {
        let decl = self.decl(self.type_name(rule)?)?;
        Some((decl, &decl.constructor))
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether nothing was declared
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

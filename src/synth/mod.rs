//! AST type synthesis
//!
//! Derives Rust types from a grammar ([`synthesize_types`]), renders them
//! as source ([`render_rust`]) and builds dynamic trees of the same shape
//! straight from parse values ([`Synthesis::build`]).

pub mod build;
pub mod model;
pub mod naming;
pub mod render;
pub mod synthesize;

pub use build::{AstError, Node};
pub use model::{
    Build, Constructor, Expr, Field, RustType, Synthesis, TypeDecl, TypeRef, TypeShape, Variant,
    VariantBuild,
};
pub use naming::{to_field_case, to_type_case, NameAllocator};
pub use render::{render_rust, GENERATED_HEADER};
pub use synthesize::{synthesize_types, synthesize_types_with, SynthError};

//! Prelude module for convenient imports
//!
//! Re-exports the types most programs touch when running the generator or
//! working with its output:
//!
//! ```
//! use gllgen::prelude::*;
//!
//! let generated = Generator::new(GeneratorConfig::default())
//!     .generate("Name = IDENT;")
//!     .unwrap();
//! assert!(generated.parse("Name", "foo").is_ok());
//! ```
//!
//! # Re-exported Items
//!
//! ## Pipeline
//! - [`Generator`] - Runs every stage over grammar text
//! - [`Generated`] - Parser spec, types and renderer output
//! - [`GeneratorConfig`] - Generator settings
//!
//! ## Grammars and Parsing
//! - [`Grammar`] / [`RuleNode`] - Parsed grammar notation
//! - [`ParserSpec`] - Compiled parser
//! - [`ParserConfig`] - Engine limits and behaviour
//! - [`Value`] - Parse value tree
//!
//! ## AST
//! - [`Synthesis`] - Synthesized type declarations
//! - [`Node`] - Dynamically built AST
//! - [`FromValue`] - Trait implemented by generated types
//!
//! ## Errors
//! - [`GenerateError`], [`ParseError`], [`BuildError`], [`AstError`]

// ============================================================================
// Pipeline
// ============================================================================

pub use crate::config::GeneratorConfig;
pub use crate::generator::{GenerateError, Generated, Generator};

// ============================================================================
// Grammars and Parsing
// ============================================================================

pub use crate::engine::{ParseError, ParserConfig, ParserSpec, Value};
pub use crate::gll::{Grammar, RuleNode};

// ============================================================================
// AST
// ============================================================================

pub use crate::runtime::{BuildError, FromValue, Repetition};
pub use crate::synth::{AstError, Node, Synthesis};

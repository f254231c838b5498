//! gllgen - Parser and AST Type Generator for GLL Grammars
//!
//! Reads grammars written in GLL notation and produces:
//! - A parser spec, executed by a packrat engine with memoization
//! - Rust AST types with constructors from parse values
//! - Dynamic AST trees of the same shape, without compiling generated code
//! - Built-in leaf rules for Rust-like token streams (`IDENT`, `LIFETIME`,
//!   `PUNCT`, `LITERAL`, `TOKEN_TREE`)
//!
//! ## Quick Start
//!
//! ```rust
//! use gllgen::{Generator, Node};
//!
//! let generated = Generator::default()
//!     .generate(r#"
//!         Binding = "let" m:"mut"? name:IDENT "=" value:LITERAL ";";
//!     "#)
//!     .unwrap();
//!
//! let ast = generated.parse_ast("Binding", "let mut x = 1;").unwrap();
//! assert_eq!(ast.field("m"), Some(&Node::Bool(true)));
//!
//! let source = generated.rust_source();
//! assert!(source.contains("pub struct Binding"));
//! ```
//!
//! ## Pipeline Stages
//!
//! ```rust
//! use gllgen::{compile_parser_spec, parse_grammar_text, render_rust, synthesize_types};
//! use gllgen::GeneratorConfig;
//!
//! let grammar = parse_grammar_text(r#"Path = segments:IDENT+ % "::";"#).unwrap();
//! let spec = compile_parser_spec(&grammar).unwrap();
//! let synthesis = synthesize_types(&grammar).unwrap();
//!
//! let value = spec.parse("Path", "std::fmt").unwrap();
//! assert!(synthesis.build("Path", &value).is_ok());
//! assert!(render_rust(&synthesis, &GeneratorConfig::default()).contains("Vec"));
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

// Prelude module for convenient imports
pub mod prelude;

mod logging;

pub mod builtins;
pub mod compile;
pub mod config;
pub mod engine;
pub mod generator;
pub mod gll;
pub mod runtime;
pub mod synth;

/// Re-export commonly used types for convenience
pub use compile::{compile_parser_spec, compile_parser_spec_with, CompileError};
pub use config::GeneratorConfig;
pub use engine::{ParseError, Parser, ParserConfig, ParserSpec, Value};
pub use generator::{GenerateError, Generated, Generator};
pub use gll::{parse_grammar_text, simplify, simplify_grammar, Grammar, GrammarError, RuleNode};
pub use runtime::{BuildError, FromValue, Repetition};
pub use synth::{
    render_rust, synthesize_types, synthesize_types_with, AstError, Node, SynthError, Synthesis,
};

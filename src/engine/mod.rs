//! Parsing engine
//!
//! A [`ParserSpec`] is a table of parsing expressions; the packrat
//! [`Parser`] runs it over an input string and produces a [`Value`] tree.

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cache;
pub mod debug;
pub mod error;
pub mod parser;
pub mod regex_cache;
pub mod spec;
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use cache::{MemoEntry, MemoTable};
pub use debug::GrammarVisualizer;
pub use error::ParseError;
pub use parser::{
    ParseResult, Parser, ParserConfig, DEFAULT_MAX_INPUT_SIZE, DEFAULT_MAX_RECURSION_DEPTH,
};
pub use spec::{Atom, ParserSpec, RuleEntry};
pub use value::Value;

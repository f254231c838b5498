//! GLL grammar notation
//!
//! Front end of the generator: source text is scanned by the [`lexer`],
//! turned into a [`Grammar`] by the [`parser`] state machine, and brought
//! into canonical form by the [`simplify`] pass.

// ============================================================================
// Module Declarations
// ============================================================================

pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod simplify;

// ============================================================================
// Re-exports
// ============================================================================

pub use grammar::{branch_key, Grammar, RuleNode};
pub use lexer::{tokenize, LexError, Lexer, Token};
pub use parser::{parse_grammar_text, parse_tokens, GrammarError, GrammarParser, ParserState};
pub use simplify::{is_vacuous, simplify, simplify_grammar};

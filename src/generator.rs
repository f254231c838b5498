//! End-to-end generator
//!
//! Runs the whole pipeline over grammar source text: parse the notation,
//! compile the parser spec, synthesize the AST types. The [`Generated`]
//! result can render Rust source or parse input directly.

use crate::compile::{compile_parser_spec_with, CompileError};
use crate::config::GeneratorConfig;
use crate::engine::{ParseError, ParserSpec, Value};
use crate::gll::{parse_grammar_text, Grammar, GrammarError};
use crate::logging::log_debug;
use crate::synth::{render_rust, synthesize_types_with, AstError, Node, SynthError, Synthesis};
use thiserror::Error;

/// Error from any stage of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The grammar source is malformed
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The grammar cannot be compiled
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// No types can be derived for the grammar
    #[error(transparent)]
    Synth(#[from] SynthError),
}

/// Pipeline driver
///
/// # Example
///
/// ```rust
/// use gllgen::Generator;
///
/// let generated = Generator::default()
///     .generate(r#"Pair = key:IDENT "=" value:LITERAL;"#)
///     .unwrap();
/// assert!(generated.rust_source().contains("pub struct Pair"));
/// assert!(generated.parse("Pair", "x = 1").is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator with the given configuration
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the pipeline over grammar source text
    pub fn generate(&self, text: &str) -> Result<Generated, GenerateError> {
        let grammar = parse_grammar_text(text)?;
        self.generate_grammar(grammar)
    }

    /// Run the pipeline over an already parsed grammar
    pub fn generate_grammar(&self, grammar: Grammar) -> Result<Generated, GenerateError> {
        let parser = compile_parser_spec_with(&grammar, &self.config)?;
        let synthesis = synthesize_types_with(&grammar, &self.config)?;
        log_debug!(
            "Generated {} rules, {} atoms, {} types",
            grammar.len(),
            parser.atom_count(),
            synthesis.len()
        );
        Ok(Generated {
            grammar,
            parser,
            synthesis,
            config: self.config.clone(),
        })
    }
}

/// Output of the pipeline
#[derive(Debug, Clone)]
pub struct Generated {
    /// The grammar as parsed
    pub grammar: Grammar,
    /// Compiled parser spec
    pub parser: ParserSpec,
    /// Synthesized AST types
    pub synthesis: Synthesis,
    config: GeneratorConfig,
}

impl Generated {
    /// Rust source of the AST types and their constructors
    pub fn rust_source(&self) -> String {
        render_rust(&self.synthesis, &self.config)
    }

    /// Parse `input` starting from `rule`
    pub fn parse(&self, rule: &str, input: &str) -> Result<Value, ParseError> {
        self.parser.parse_with_config(rule, input, self.config.parser)
    }

    /// Parse `input` starting from `rule` and build its AST
    pub fn parse_ast(&self, rule: &str, input: &str) -> Result<Node, AstError> {
        if self.synthesis.type_name(rule).is_none() {
            return Err(AstError::UnknownRule {
                rule: rule.to_string(),
            });
        }
        let value = self.parse(rule, input)?;
        self.synthesis.build(rule, &value)
    }

    /// Rule parsing starts from by default
    pub fn start_rule(&self) -> Option<&str> {
        self.parser.start_rule()
    }
}

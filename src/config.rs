//! Generator configuration

use crate::engine::ParserConfig;
use serde::{Deserialize, Serialize};

/// Default module path generated code imports its support API from
pub const DEFAULT_RUNTIME_PATH: &str = "::gllgen::runtime";

/// Default module path of the built-in leaf types
pub const DEFAULT_BUILTINS_PATH: &str = "::gllgen::builtins";

/// Default derives of generated types
pub const DEFAULT_DERIVES: [&str; 3] = ["Debug", "Clone", "PartialEq"];

/// Configuration of the generator pipeline
///
/// # Example
///
/// ```rust
/// use gllgen::GeneratorConfig;
///
/// let config = GeneratorConfig::new()
///     .with_start_rule("File")
///     .with_derive("Eq");
/// assert!(config.builtin_rules);
/// assert_eq!(config.derives.last().map(String::as_str), Some("Eq"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Add the built-in leaf rules to compiled specs and let grammars refer to them
    pub builtin_rules: bool,

    /// Start rule of the compiled spec (first rule when unset)
    pub start_rule: Option<String>,

    /// Path generated code imports `FromValue`, `BuildError`, `Repetition`
    /// and `Value` from
    pub runtime_path: String,

    /// Path generated code refers to built-in leaf types through
    pub builtins_path: String,

    /// Derives on every generated type
    pub derives: Vec<String>,

    /// Engine configuration used by [`crate::Generated::parse`]
    pub parser: ParserConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            builtin_rules: true,
            start_rule: None,
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            builtins_path: DEFAULT_BUILTINS_PATH.to_string(),
            derives: DEFAULT_DERIVES.iter().map(|d| d.to_string()).collect(),
            parser: ParserConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the built-in leaf rules
    pub fn with_builtin_rules(mut self, enabled: bool) -> Self {
        self.builtin_rules = enabled;
        self
    }

    /// Set the start rule
    pub fn with_start_rule(mut self, rule: impl Into<String>) -> Self {
        self.start_rule = Some(rule.into());
        self
    }

    /// Set the runtime module path
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Set the built-in types module path
    pub fn with_builtins_path(mut self, path: impl Into<String>) -> Self {
        self.builtins_path = path.into();
        self
    }

    /// Add a derive to generated types
    pub fn with_derive(mut self, derive: impl Into<String>) -> Self {
        let derive = derive.into();
        if !self.derives.contains(&derive) {
            self.derives.push(derive);
        }
        self
    }

    /// Set the engine configuration
    pub fn with_parser_config(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

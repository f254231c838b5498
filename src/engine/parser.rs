//! Packrat parsing engine
//!
//! Executes a [`ParserSpec`] against an input string. Matching is ordered
//! choice with backtracking and per-position memoization; tokens and
//! patterns skip leading whitespace. A [`Atom::Join`] whose separator
//! matched but whose next item did not raises [`ParseError::Cut`], which no
//! enclosing atom backtracks over.

use super::{
    cache::{MemoEntry, MemoTable},
    error::ParseError,
    regex_cache,
    spec::{Atom, ParserSpec},
    value::Value,
};
use crate::logging::{log_debug, log_trace};
use serde::{Deserialize, Serialize};

/// Default maximum input size: 100 MB
pub const DEFAULT_MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Default maximum rule nesting depth
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Configuration options for the engine
///
/// # Example
///
/// ```rust
/// use gllgen::engine::ParserConfig;
///
/// let config = ParserConfig::new()
///     .with_max_recursion_depth(200)
///     .with_nameguard(false);
/// assert!(config.skip_whitespace);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum allowed input size in bytes (0 = no limit)
    pub max_input_size: usize,

    /// Maximum rule nesting depth (0 = no limit)
    pub max_recursion_depth: usize,

    /// Skip whitespace before tokens and patterns, and at end of input
    pub skip_whitespace: bool,

    /// Refuse a token that ends inside a longer identifier
    pub nameguard: bool,

    /// Memoize atom results per position
    pub memoize: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            skip_whitespace: true,
            nameguard: true,
            memoize: true,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Set the maximum recursion depth
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Enable or disable whitespace skipping
    pub fn with_skip_whitespace(mut self, skip: bool) -> Self {
        self.skip_whitespace = skip;
        self
    }

    /// Enable or disable the token name guard
    pub fn with_nameguard(mut self, nameguard: bool) -> Self {
        self.nameguard = nameguard;
        self
    }

    /// Enable or disable memoization
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}

/// Result of a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Parse value
    pub value: Value,
    /// Position after the matched content
    pub end_pos: usize,
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The parsing engine
pub struct Parser<'a> {
    spec: &'a ParserSpec,
    input: &'a str,
    config: ParserConfig,
    memo: MemoTable,
    depth: usize,
    /// Furthest position where a token or pattern failed
    furthest: usize,
    /// What was expected at `furthest`
    expected: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Create a parser with default configuration
    pub fn new(spec: &'a ParserSpec, input: &'a str) -> Self {
        Self::with_config(spec, input, ParserConfig::default())
    }

    /// Create a parser with custom configuration
    pub fn with_config(spec: &'a ParserSpec, input: &'a str, config: ParserConfig) -> Self {
        Self {
            spec,
            input,
            config,
            memo: MemoTable::for_input(input.len(), spec.atom_count()),
            depth: 0,
            furthest: 0,
            expected: Vec::new(),
        }
    }

    /// Memo table `(hits, misses)`
    pub fn cache_stats(&self) -> (u64, u64) {
        self.memo.stats()
    }

    /// Parse the whole input starting at rule `rule`
    ///
    /// # Errors
    /// Returns an error if:
    /// - Input exceeds the maximum size limit
    /// - The rule does not exist
    /// - Recursion depth exceeds the limit
    /// - Parsing fails or leaves input unconsumed
    pub fn parse_rule(&mut self, rule: &str) -> Result<Value, ParseError> {
        if self.config.max_input_size > 0 && self.input.len() > self.config.max_input_size {
            return Err(ParseError::InputTooLarge {
                input_size: self.input.len(),
                max_size: self.config.max_input_size,
            });
        }
        let index = self
            .spec
            .rule_index(rule)
            .ok_or_else(|| ParseError::UnknownRule {
                rule: rule.to_string(),
            })?;

        log_debug!(
            "Starting parse: input_len={}, rule={}",
            self.input.len(),
            rule
        );

        match self.parse_rule_ref(index, 0) {
            Ok(result) => {
                let end = self.skip_whitespace(result.end_pos);
                if end == self.input.len() {
                    log_debug!("Parse successful: consumed all input");
                    Ok(result.value)
                } else {
                    Err(ParseError::Incomplete {
                        consumed: end,
                        length: self.input.len(),
                    })
                }
            }
            Err(ParseError::Failed { .. }) => Err(ParseError::Failed {
                position: self.furthest,
                expected: self.expected.join(" or "),
            }),
            Err(e) => Err(e),
        }
    }

    /// Parse the whole input starting at the spec's start rule
    pub fn parse(&mut self) -> Result<Value, ParseError> {
        let start = self
            .spec
            .start_rule()
            .ok_or_else(|| ParseError::Internal {
                message: "Spec has no rules".to_string(),
            })?;
        self.parse_rule(start)
    }

    #[inline]
    fn skip_whitespace(&self, pos: usize) -> usize {
        if !self.config.skip_whitespace {
            return pos;
        }
        let rest = &self.input[pos..];
        pos + rest
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map_or(rest.len(), |(i, _)| i)
    }

    fn describe(&self, atom_id: usize) -> String {
        match self.spec.get_atom(atom_id) {
            Some(Atom::Token { text }) => format!("{:?}", text),
            Some(Atom::Pattern { pattern }) => format!("/{}/", pattern),
            Some(Atom::Rule { rule }) => self
                .spec
                .rules
                .get(*rule)
                .map_or_else(|| "rule".to_string(), |entry| entry.name.clone()),
            Some(atom) => atom.kind().to_string(),
            None => "nothing".to_string(),
        }
    }

    fn failure(&self, atom_id: usize, pos: usize) -> ParseError {
        ParseError::Failed {
            position: pos,
            expected: self.describe(atom_id),
        }
    }

    /// Record a terminal failure for error reporting
    fn note_failure(&mut self, atom_id: usize, pos: usize) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            let what = self.describe(atom_id);
            if !self.expected.contains(&what) {
                self.expected.push(what);
            }
        }
    }

    fn enter_recursive(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        let max_depth = self.config.max_recursion_depth;
        if max_depth > 0 && self.depth > max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                depth: self.depth,
                max_depth,
            });
        }
        Ok(())
    }

    fn exit_recursive(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Try to match an atom at the given position
    fn try_atom(&mut self, atom_id: usize, pos: usize) -> Result<ParseResult, ParseError> {
        if self.config.memoize {
            match self.memo.get(pos, atom_id) {
                Some(MemoEntry::Matched { value, end }) => {
                    return Ok(ParseResult {
                        value: value.clone(),
                        end_pos: *end,
                    })
                }
                Some(MemoEntry::Failed) => return Err(self.failure(atom_id, pos)),
                None => {}
            }
        }

        let result = self.parse_atom_uncached(atom_id, pos);

        if self.config.memoize {
            match &result {
                Ok(ok) => self.memo.insert(
                    pos,
                    atom_id,
                    MemoEntry::Matched {
                        value: ok.value.clone(),
                        end: ok.end_pos,
                    },
                ),
                Err(e) if !e.is_fatal() => self.memo.insert(pos, atom_id, MemoEntry::Failed),
                Err(_) => {}
            }
        }
        result
    }

    fn parse_atom_uncached(
        &mut self,
        atom_id: usize,
        pos: usize,
    ) -> Result<ParseResult, ParseError> {
        let spec = self.spec;
        let Some(atom) = spec.get_atom(atom_id) else {
            return Err(ParseError::Internal {
                message: format!("Invalid atom ID {}", atom_id),
            });
        };
        match atom {
            Atom::Empty => Ok(ParseResult {
                value: Value::Nil,
                end_pos: pos,
            }),
            Atom::Token { text } => self.parse_token(atom_id, text, pos),
            Atom::Pattern { pattern } => self.parse_pattern(atom_id, pattern, pos),
            Atom::Sequence { atoms } => self.parse_sequence(atoms, pos),
            Atom::Choice { atoms } => self.parse_choice(atom_id, atoms, pos),
            Atom::Optional { atom } => self.parse_optional(*atom, pos),
            Atom::Repetition { atom, min } => self.parse_repetition(atom_id, *atom, *min, pos),
            Atom::Join {
                atom,
                separator,
                min,
            } => self.parse_join(atom_id, *atom, *separator, *min, pos),
            Atom::Named { name, atom } => {
                let result = self.try_atom(*atom, pos)?;
                Ok(ParseResult {
                    value: Value::named(name.clone(), result.value),
                    end_pos: result.end_pos,
                })
            }
            Atom::Rule { rule } => self.parse_rule_ref(*rule, pos),
            Atom::Ignore { atom } => {
                let result = self.try_atom(*atom, pos)?;
                Ok(ParseResult {
                    value: Value::Nil,
                    end_pos: result.end_pos,
                })
            }
        }
    }

    fn parse_rule_ref(&mut self, rule: usize, pos: usize) -> Result<ParseResult, ParseError> {
        let spec = self.spec;
        let Some(entry) = spec.rules.get(rule) else {
            return Err(ParseError::Internal {
                message: format!("Invalid rule index {}", rule),
            });
        };
        log_trace!("Enter rule {} at {}", entry.name, pos);

        self.enter_recursive()?;
        let result = self.try_atom(entry.atom, pos);
        self.exit_recursive();
        result
    }

    fn parse_token(
        &mut self,
        atom_id: usize,
        text: &str,
        pos: usize,
    ) -> Result<ParseResult, ParseError> {
        let start = self.skip_whitespace(pos);
        if !self.input[start..].starts_with(text) {
            self.note_failure(atom_id, start);
            return Err(self.failure(atom_id, start));
        }
        let end = start + text.len();

        if self.config.nameguard {
            let ends_in_name = text.chars().next_back().is_some_and(is_name_char);
            let next_is_name = self.input[end..].chars().next().is_some_and(is_name_char);
            if ends_in_name && next_is_name {
                self.note_failure(atom_id, start);
                return Err(self.failure(atom_id, start));
            }
        }

        Ok(ParseResult {
            value: Value::string(text),
            end_pos: end,
        })
    }

    fn parse_pattern(
        &mut self,
        atom_id: usize,
        pattern: &str,
        pos: usize,
    ) -> Result<ParseResult, ParseError> {
        let start = self.skip_whitespace(pos);
        let regex = regex_cache::anchored(pattern).map_err(|_| ParseError::InvalidPattern {
            pattern: pattern.to_string(),
        })?;

        match regex.find(&self.input[start..]) {
            Some(m) => Ok(ParseResult {
                value: Value::string(m.as_str()),
                end_pos: start + m.end(),
            }),
            None => {
                self.note_failure(atom_id, start);
                Err(self.failure(atom_id, start))
            }
        }
    }

    /// Values of non-ignored children; a single value is returned as is
    fn parse_sequence(&mut self, atoms: &[usize], pos: usize) -> Result<ParseResult, ParseError> {
        let mut current_pos = pos;
        let mut values = Vec::with_capacity(atoms.len());

        for &atom_id in atoms {
            let result = self.try_atom(atom_id, current_pos)?;
            if !matches!(self.spec.get_atom(atom_id), Some(Atom::Ignore { .. })) {
                values.push(result.value);
            }
            current_pos = result.end_pos;
        }

        let value = if values.len() == 1 {
            values.pop().unwrap_or_default()
        } else {
            Value::List(values)
        };
        Ok(ParseResult {
            value,
            end_pos: current_pos,
        })
    }

    fn parse_choice(
        &mut self,
        atom_id: usize,
        atoms: &[usize],
        pos: usize,
    ) -> Result<ParseResult, ParseError> {
        for &branch in atoms {
            match self.try_atom(branch, pos) {
                Ok(result) => return Ok(result),
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => {}
            }
        }
        Err(self.failure(atom_id, pos))
    }

    fn parse_optional(&mut self, atom_id: usize, pos: usize) -> Result<ParseResult, ParseError> {
        match self.try_atom(atom_id, pos) {
            Ok(result) => Ok(result),
            Err(e) if e.is_fatal() => Err(e),
            Err(_) => Ok(ParseResult {
                value: Value::Nil,
                end_pos: pos,
            }),
        }
    }

    fn parse_repetition(
        &mut self,
        self_id: usize,
        atom_id: usize,
        min: usize,
        pos: usize,
    ) -> Result<ParseResult, ParseError> {
        let mut current_pos = pos;
        let mut items = Vec::with_capacity(min.clamp(4, 64));

        loop {
            match self.try_atom(atom_id, current_pos) {
                Ok(result) => {
                    let advanced = result.end_pos > current_pos;
                    items.push(result.value);
                    current_pos = result.end_pos;
                    if !advanced {
                        break;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => break,
            }
        }

        if items.len() < min {
            return Err(self.failure(self_id, pos));
        }
        Ok(ParseResult {
            value: Value::List(items),
            end_pos: current_pos,
        })
    }

    fn parse_join(
        &mut self,
        self_id: usize,
        atom_id: usize,
        separator: usize,
        min: usize,
        pos: usize,
    ) -> Result<ParseResult, ParseError> {
        let first = match self.try_atom(atom_id, pos) {
            Ok(result) => result,
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) if min == 0 => {
                return Ok(ParseResult {
                    value: Value::List(Vec::new()),
                    end_pos: pos,
                })
            }
            Err(_) => return Err(self.failure(self_id, pos)),
        };

        let mut items = vec![first.value];
        let mut current_pos = first.end_pos;
        loop {
            let sep = match self.try_atom(separator, current_pos) {
                Ok(result) => result,
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => break,
            };
            match self.try_atom(atom_id, sep.end_pos) {
                Ok(item) => {
                    let advanced = item.end_pos > current_pos;
                    items.push(sep.value);
                    items.push(item.value);
                    current_pos = item.end_pos;
                    if !advanced {
                        break;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => {
                    let separator = match self.spec.get_atom(separator) {
                        Some(Atom::Token { text }) => text.clone(),
                        _ => self.describe(separator),
                    };
                    return Err(ParseError::Cut {
                        position: sep.end_pos,
                        separator,
                    });
                }
            }
        }

        Ok(ParseResult {
            value: Value::List(items),
            end_pos: current_pos,
        })
    }
}

impl ParserSpec {
    /// Parse `input` from rule `rule` with default configuration
    pub fn parse(&self, rule: &str, input: &str) -> Result<Value, ParseError> {
        Parser::new(self, input).parse_rule(rule)
    }

    /// Parse `input` from rule `rule` with custom configuration
    pub fn parse_with_config(
        &self,
        rule: &str,
        input: &str,
        config: ParserConfig,
    ) -> Result<Value, ParseError> {
        Parser::with_config(self, input, config).parse_rule(rule)
    }
}

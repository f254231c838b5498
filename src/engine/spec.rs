//! Parser specifications
//!
//! A [`ParserSpec`] is the executable form of a grammar: a flat table of
//! [`Atom`]s that refer to each other by index, plus the list of named rules
//! and the atom each rule starts at. Specs serialize to JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsing expressions understood by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Atom {
    /// Match nothing
    Empty,

    /// Match literal text
    Token {
        /// Text to match
        text: String,
    },

    /// Match a regular expression at the current position
    Pattern {
        /// Regex source (anchored by the engine)
        pattern: String,
    },

    /// Match atoms one after another
    Sequence {
        /// Indices into the atom table
        atoms: Vec<usize>,
    },

    /// Try atoms in order, first match wins
    Choice {
        /// Indices into the atom table
        atoms: Vec<usize>,
    },

    /// Match an atom zero or one time
    Optional {
        /// Index into the atom table
        atom: usize,
    },

    /// Match an atom repeatedly (greedy)
    Repetition {
        /// Index into the atom table
        atom: usize,
        /// Minimum number of matches
        min: usize,
    },

    /// Items separated by a separator, no trailing separator
    ///
    /// Once a separator matched, a missing item is a fatal error.
    Join {
        /// Index of the item atom
        atom: usize,
        /// Index of the separator atom
        separator: usize,
        /// Minimum number of items (0 or 1)
        min: usize,
    },

    /// Capture the inner value under a name
    Named {
        /// Capture name
        name: String,
        /// Index into the atom table
        atom: usize,
    },

    /// Reference to a rule
    Rule {
        /// Index into the rule table
        rule: usize,
    },

    /// Match the inner atom and drop its value
    Ignore {
        /// Index into the atom table
        atom: usize,
    },
}

impl Atom {
    /// Child atoms in order
    pub fn children(&self) -> Vec<usize> {
        match self {
            Atom::Sequence { atoms } | Atom::Choice { atoms } => atoms.clone(),
            Atom::Optional { atom }
            | Atom::Repetition { atom, .. }
            | Atom::Named { atom, .. }
            | Atom::Ignore { atom } => vec![*atom],
            Atom::Join { atom, separator, .. } => vec![*atom, *separator],
            Atom::Empty | Atom::Token { .. } | Atom::Pattern { .. } | Atom::Rule { .. } => {
                Vec::new()
            }
        }
    }

    /// Short kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Atom::Empty => "empty",
            Atom::Token { .. } => "token",
            Atom::Pattern { .. } => "pattern",
            Atom::Sequence { .. } => "sequence",
            Atom::Choice { .. } => "choice",
            Atom::Optional { .. } => "optional",
            Atom::Repetition { .. } => "repetition",
            Atom::Join { .. } => "join",
            Atom::Named { .. } => "named",
            Atom::Rule { .. } => "rule",
            Atom::Ignore { .. } => "ignore",
        }
    }
}

/// A named entry point of a [`ParserSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Rule name
    pub name: String,
    /// Index of the rule body atom
    pub atom: usize,
}

/// A compiled grammar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserSpec {
    /// All atoms (referenced by index)
    pub atoms: Vec<Atom>,

    /// Rules in declaration order
    pub rules: Vec<RuleEntry>,

    /// Index of the default start rule
    pub start: usize,
}

impl ParserSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an atom and return its index
    #[inline]
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        idx
    }

    /// Get an atom by index
    #[inline]
    pub fn get_atom(&self, idx: usize) -> Option<&Atom> {
        self.atoms.get(idx)
    }

    /// Total atom count
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Index of rule `name` in the rule table
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }

    /// Rule entry by name
    pub fn rule(&self, name: &str) -> Option<&RuleEntry> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Name of the default start rule
    pub fn start_rule(&self) -> Option<&str> {
        self.rules.get(self.start).map(|rule| rule.name.as_str())
    }

    /// Rule names in declaration order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Serialize to JSON
    #[inline]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    #[inline]
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    fn fmt_atom(&self, f: &mut fmt::Formatter<'_>, idx: usize, nested: bool) -> fmt::Result {
        let Some(atom) = self.atoms.get(idx) else {
            return write!(f, "<{}?>", idx);
        };
        match atom {
            Atom::Empty => f.write_str("()"),
            Atom::Token { text } => write!(f, "{:?}", text),
            Atom::Pattern { pattern } => write!(f, "/{}/", pattern),
            Atom::Sequence { atoms } | Atom::Choice { atoms } => {
                let sep = if matches!(atom, Atom::Choice { .. }) {
                    " | "
                } else {
                    " "
                };
                if nested {
                    f.write_str("(")?;
                }
                for (i, &child) in atoms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    self.fmt_atom(f, child, true)?;
                }
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Atom::Optional { atom } => {
                f.write_str("[")?;
                self.fmt_atom(f, *atom, false)?;
                f.write_str("]")
            }
            Atom::Repetition { atom, min } => {
                self.fmt_atom(f, *atom, true)?;
                f.write_str(if *min > 0 { "+" } else { "*" })
            }
            Atom::Join {
                atom,
                separator,
                min,
            } => {
                self.fmt_atom(f, *separator, true)?;
                f.write_str(if *min > 0 { ".{" } else { "%{" })?;
                self.fmt_atom(f, *atom, false)?;
                f.write_str("}")
            }
            Atom::Named { name, atom } => {
                write!(f, "{}:", name)?;
                self.fmt_atom(f, *atom, true)
            }
            Atom::Rule { rule } => match self.rules.get(*rule) {
                Some(entry) => f.write_str(&entry.name),
                None => write!(f, "<rule {}?>", rule),
            },
            Atom::Ignore { atom } => {
                f.write_str("~")?;
                self.fmt_atom(f, *atom, true)
            }
        }
    }
}

/// EBNF-like listing, one `name = expr;` line per rule
impl fmt::Display for ParserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{} = ", rule.name)?;
            self.fmt_atom(f, rule.atom, false)?;
            writeln!(f, ";")?;
        }
        Ok(())
    }
}

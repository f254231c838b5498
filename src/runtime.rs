//! Support API for generated AST code
//!
//! Code rendered by [`crate::synth::render_rust`] imports [`FromValue`],
//! [`BuildError`], [`Repetition`] and [`Value`] from this module and uses
//! the helper methods on [`Value`] defined here to take parse values apart.
//! The constructor interpreter in [`crate::synth::build`] uses the same
//! helpers, so both paths accept exactly the same values.

pub use crate::engine::value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static NIL: Value = Value::Nil;

/// Error raised while converting a parse value into an AST node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A string value was required
    #[error("Expected text, found {found}")]
    ExpectedText {
        /// Kind of the value found
        found: &'static str,
    },

    /// A list value was required
    #[error("Expected a list, found {found}")]
    ExpectedList {
        /// Kind of the value found
        found: &'static str,
    },

    /// A list had the wrong number of elements
    #[error("Expected {expected} values, found {actual}")]
    Arity {
        /// Required length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A labeled capture was required
    #[error("Missing capture {label:?} in {found} value")]
    MissingCapture {
        /// Capture label
        label: String,
        /// Kind of the value found
        found: &'static str,
    },

    /// No variant of a union or enum accepts the value
    #[error("No variant of {ty} matches the parse value")]
    NoVariant {
        /// Type name
        ty: String,
    },

    /// The interpreter was asked for a type it does not know
    #[error("Unknown type: {name}")]
    UnknownType {
        /// Type name
        name: String,
    },

    /// A built-in leaf rule produced text its type rejects
    #[error("Invalid {kind}: {text:?}")]
    Builtin {
        /// Built-in rule name
        kind: &'static str,
        /// Offending text
        text: String,
    },
}

/// Conversion from a parse value
pub trait FromValue: Sized {
    /// Build `Self` from `value`
    fn from_value(value: &Value) -> Result<Self, BuildError>;
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        value.optional().map(T::from_value).transpose()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        value.text()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        Ok(value.present())
    }
}

impl FromValue for () {
    fn from_value(_value: &Value) -> Result<Self, BuildError> {
        Ok(())
    }
}

/// How the items of a repetition are laid out in its parse value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repetition {
    /// `[item, item, ...]`
    Plain,
    /// `[item, sep, item, sep, item]`
    Joined,
    /// `[]` or `[first, [item, ...]]`, zero or more items with an optional trailing separator
    Trailing,
    /// `[first, [item, ...]]`, one or more items with an optional trailing separator
    TrailingPositive,
}

impl Value {
    /// Matched text of a string value
    pub fn text(&self) -> Result<String, BuildError> {
        match self {
            Value::Str(s) => Ok(s.clone()),
            other => Err(BuildError::ExpectedText {
                found: other.kind(),
            }),
        }
    }

    /// Whether an optional matched
    ///
    /// Only Nil is absent: an empty list or string is a match that carried
    /// no items.
    pub fn present(&self) -> bool {
        !self.is_nil()
    }

    /// `Some(self)` when [`present`](Self::present)
    pub fn optional(&self) -> Option<&Value> {
        self.present().then_some(self)
    }

    /// The value captured under `label`
    ///
    /// An absent value (from an optional that did not match) yields Nil.
    pub fn capture(&self, label: &str) -> Result<&Value, BuildError> {
        match self {
            Value::Nil => Ok(&NIL),
            Value::Hash(map) => map.get(label).ok_or_else(|| BuildError::MissingCapture {
                label: label.to_string(),
                found: "hash",
            }),
            other => Err(BuildError::MissingCapture {
                label: label.to_string(),
                found: other.kind(),
            }),
        }
    }

    /// Label and payload of a single-entry hash
    pub fn variant(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Hash(map) if map.len() == 1 => {
                map.iter().next().map(|(label, value)| (label.as_str(), value))
            }
            _ => None,
        }
    }

    /// Exactly `count` positional values
    pub fn fields(&self, count: usize) -> Result<&[Value], BuildError> {
        match self {
            Value::List(items) if items.len() == count => Ok(items),
            Value::List(items) => Err(BuildError::Arity {
                expected: count,
                actual: items.len(),
            }),
            other => Err(BuildError::ExpectedList {
                found: other.kind(),
            }),
        }
    }

    /// Items of a repetition, separators and grouping removed
    pub fn repeated(&self, layout: Repetition) -> Result<Vec<&Value>, BuildError> {
        let items = match self {
            Value::List(items) => items,
            // An absent optional list
            Value::Nil => return Ok(Vec::new()),
            other => {
                return Err(BuildError::ExpectedList {
                    found: other.kind(),
                })
            }
        };
        match layout {
            Repetition::Plain => Ok(items.iter().collect()),
            Repetition::Joined => Ok(items.iter().step_by(2).collect()),
            Repetition::Trailing if items.is_empty() => Ok(Vec::new()),
            Repetition::Trailing => self.repeated(Repetition::TrailingPositive),
            Repetition::TrailingPositive => {
                let [first, rest] = items.as_slice() else {
                    return Err(BuildError::Arity {
                        expected: 2,
                        actual: items.len(),
                    });
                };
                let mut out = vec![first];
                out.extend(rest.repeated(Repetition::Plain)?);
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Value {
        Value::list(items.iter().map(|s| Value::string(*s)).collect())
    }

    #[test]
    fn test_text() {
        assert_eq!(Value::string("foo").text(), Ok("foo".to_string()));
        assert_eq!(
            Value::Nil.text(),
            Err(BuildError::ExpectedText { found: "nil" })
        );
    }

    #[test]
    fn test_presence() {
        assert!(!Value::Nil.present());
        assert!(Value::string("mut").present());
        assert!(strs(&["a", "b"]).present());
    }

    #[test]
    fn test_empty_match_is_present() {
        assert!(Value::list(vec![]).present());
        assert!(Value::string("").present());
        assert_eq!(
            Option::<String>::from_value(&Value::string("")),
            Ok(Some(String::new()))
        );
    }

    #[test]
    fn test_capture() {
        let value = Value::named("name", Value::string("x"));
        assert_eq!(value.capture("name"), Ok(&Value::string("x")));
        assert_eq!(Value::Nil.capture("name"), Ok(&Value::Nil));
        assert!(matches!(
            value.capture("other"),
            Err(BuildError::MissingCapture { .. })
        ));
        assert!(matches!(
            Value::string("x").capture("name"),
            Err(BuildError::MissingCapture { found: "string", .. })
        ));
    }

    #[test]
    fn test_variant() {
        let value = Value::named("Add", Value::string("+"));
        assert_eq!(value.variant(), Some(("Add", &Value::string("+"))));
        assert_eq!(Value::string("+").variant(), None);
    }

    #[test]
    fn test_fields_arity() {
        let value = strs(&["a", "b"]);
        assert_eq!(value.fields(2).map(<[Value]>::len), Ok(2));
        assert_eq!(
            value.fields(3),
            Err(BuildError::Arity {
                expected: 3,
                actual: 2
            })
        );
    }

    // ========================================================================
    // Repetition Layouts
    // ========================================================================

    #[test]
    fn test_repeated_joined_strides_over_separators() {
        let value = strs(&["foo", ",", "foo", ",", "bar"]);
        let items: Vec<_> = value
            .repeated(Repetition::Joined)
            .expect("Should split")
            .into_iter()
            .map(|v| v.as_str().unwrap_or_default())
            .collect();
        assert_eq!(items, vec!["foo", "foo", "bar"]);
    }

    #[test]
    fn test_repeated_trailing() {
        // "foo, foo" and "foo, foo," -> [foo, [foo]]
        let value = Value::list(vec![Value::string("foo"), strs(&["foo"])]);
        assert_eq!(value.repeated(Repetition::Trailing).map(|v| v.len()), Ok(2));

        // "" -> []
        let value = strs(&[]);
        assert_eq!(value.repeated(Repetition::Trailing).map(|v| v.len()), Ok(0));
    }

    #[test]
    fn test_repeated_trailing_keeps_empty_items() {
        // "x, x" where each item's value is nil -> [nil, [nil]]
        let value = Value::list(vec![Value::Nil, Value::list(vec![Value::Nil])]);
        assert_eq!(
            value.repeated(Repetition::Trailing),
            Ok(vec![&Value::Nil, &Value::Nil])
        );
    }

    #[test]
    fn test_repeated_trailing_positive() {
        let value = Value::list(vec![Value::string("foo"), strs(&["foo", "foo"])]);
        assert_eq!(
            value
                .repeated(Repetition::TrailingPositive)
                .map(|v| v.len()),
            Ok(3)
        );
    }

    #[test]
    fn test_from_value_impls() {
        assert_eq!(
            Option::<String>::from_value(&Value::string("a")),
            Ok(Some("a".to_string()))
        );
        assert_eq!(Option::<String>::from_value(&Value::Nil), Ok(None));
        assert_eq!(bool::from_value(&Value::string("mut")), Ok(true));
        assert_eq!(
            Box::<String>::from_value(&Value::string("b")),
            Ok(Box::new("b".to_string()))
        );
    }
}

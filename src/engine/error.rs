//! Engine errors

use thiserror::Error;

/// Error type for parse operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing matched at this position
    #[error("Parse failed at position {position}, expected {expected}")]
    Failed {
        /// Byte offset where matching failed
        position: usize,
        /// What the failing atom wanted
        expected: String,
    },

    /// A separator matched but no item followed it
    ///
    /// This is fatal: alternatives and repetitions do not backtrack past it.
    #[error("Expected an item after separator {separator:?} at position {position}")]
    Cut {
        /// Byte offset after the separator
        position: usize,
        /// Separator text
        separator: String,
    },

    /// Parse didn't consume entire input
    #[error("Parse incomplete: consumed {consumed} of {length} bytes")]
    Incomplete {
        /// Bytes consumed by the start rule
        consumed: usize,
        /// Input length
        length: usize,
    },

    /// The requested start rule does not exist
    #[error("Unknown rule: {rule}")]
    UnknownRule {
        /// Requested rule name
        rule: String,
    },

    /// A pattern atom holds an invalid regex
    #[error("Invalid regex pattern: {pattern}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
    },

    /// Maximum recursion depth exceeded
    #[error("Recursion limit exceeded: depth {depth} exceeds limit of {max_depth}")]
    RecursionLimitExceeded {
        /// Depth reached
        depth: usize,
        /// Configured limit
        max_depth: usize,
    },

    /// Input exceeds the configured size limit
    #[error("Input too large: {input_size} bytes exceeds limit of {max_size} bytes")]
    InputTooLarge {
        /// Input size in bytes
        input_size: usize,
        /// Configured limit
        max_size: usize,
    },

    /// Malformed spec (dangling atom or rule index)
    #[error("Internal error: {message}")]
    Internal {
        /// Description
        message: String,
    },
}

impl ParseError {
    /// Whether the error must abort the whole parse instead of letting an
    /// enclosing choice, optional or repetition try something else
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::Failed { .. })
    }

    /// Byte offset the error refers to, if any
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Failed { position, .. } | ParseError::Cut { position, .. } => {
                Some(*position)
            }
            ParseError::Incomplete { consumed, .. } => Some(*consumed),
            _ => None,
        }
    }
}

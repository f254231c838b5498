//! Lexer for GLL grammar notation
//!
//! Turns grammar source text into a flat stream of [`Token`]s. Whitespace
//! and comments (`// ...` and `/* ... */`) never become tokens. A block
//! comment left open at the end of the input simply ends the stream.
//!
//! # Example
//!
//! ```rust
//! use gllgen::gll::lexer::{tokenize, Token};
//!
//! let tokens = tokenize("Value = \"foo\"?;").unwrap();
//! assert_eq!(tokens[0], Token::Name("Value".to_string()));
//! assert_eq!(tokens[3], Token::QuestionMark);
//! ```

use memchr::{memchr, memmem};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single token of GLL notation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Rule name, symbol reference or label
    Name(String),
    /// `"..."` literal, without the quotes
    String(String),
    /// `'a'..'z'` character range (both ends inclusive)
    CharacterRange(char, char),
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `|`
    Pipe,
    /// `?`
    QuestionMark,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `%`
    Percent,
    /// `%%`
    DoublePercent,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `=`
    Equal,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "{}", name),
            Token::String(text) => write!(f, "\"{}\"", text),
            Token::CharacterRange(from, to) => write!(f, "'{}'..'{}'", from, to),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::Pipe => f.write_str("|"),
            Token::QuestionMark => f.write_str("?"),
            Token::Star => f.write_str("*"),
            Token::Plus => f.write_str("+"),
            Token::Percent => f.write_str("%"),
            Token::DoublePercent => f.write_str("%%"),
            Token::Semicolon => f.write_str(";"),
            Token::Colon => f.write_str(":"),
            Token::Equal => f.write_str("="),
        }
    }
}

/// Errors raised while scanning grammar source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A `"` with no closing quote before the end of input
    #[error("Unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote
        offset: usize,
    },

    /// A `'` that does not start a well-formed `'a'..'z'` range
    #[error("Malformed character range at offset {offset}")]
    MalformedCharacterRange {
        /// Byte offset of the opening quote
        offset: usize,
    },
}

/// Characters that end a [`Token::Name`] run
#[inline]
fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '{' | '}' | '|' | '?' | '*' | '+' | '%' | ';' | ':' | '=' | '"'
        )
}

/// Single-pass scanner over grammar source
///
/// Iterating yields tokens in source order. After the first error the
/// iterator is exhausted.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `input`
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            done: false,
        }
    }

    /// Current byte offset into the input
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let skipped = rest
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map_or(rest.len(), |(i, _)| i);
        self.pos += skipped;
    }

    /// Skip a comment at the cursor, if any. Returns whether one was skipped.
    fn skip_comment(&mut self) -> bool {
        let bytes = self.rest().as_bytes();
        if bytes.starts_with(b"//") {
            self.pos += memchr(b'\n', bytes).map_or(bytes.len(), |i| i + 1);
            true
        } else if bytes.starts_with(b"/*") {
            self.pos += memmem::find(&bytes[2..], b"*/").map_or(bytes.len(), |i| i + 4);
            true
        } else {
            false
        }
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let body = &self.input.as_bytes()[start + 1..];
        match memchr(b'"', body) {
            Some(len) => {
                let text = &self.input[start + 1..start + 1 + len];
                self.pos = start + len + 2;
                Ok(Token::String(text.to_string()))
            }
            None => Err(LexError::UnterminatedString { offset: start }),
        }
    }

    /// Read `'c'` at the cursor
    fn lex_quoted_char(&mut self) -> Option<char> {
        let mut chars = self.rest().chars();
        if chars.next() != Some('\'') {
            return None;
        }
        let c = chars.next()?;
        if chars.next() != Some('\'') {
            return None;
        }
        self.pos += 2 + c.len_utf8();
        Some(c)
    }

    fn lex_character_range(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let malformed = LexError::MalformedCharacterRange { offset: start };

        let from = self.lex_quoted_char().ok_or_else(|| malformed.clone())?;
        if !self.rest().starts_with("..") {
            return Err(malformed);
        }
        self.pos += 2;
        if self.rest().starts_with('=') {
            self.pos += 1;
        }
        let to = self.lex_quoted_char().ok_or(malformed)?;
        Ok(Token::CharacterRange(from, to))
    }

    fn lex_name(&mut self) -> Token {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| is_separator(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        Token::Name(rest[..len].to_string())
    }

    fn punct(&mut self, token: Token, len: usize) -> Result<Token, LexError> {
        self.pos += len;
        Ok(token)
    }

    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            self.skip_whitespace();
            if !self.skip_comment() {
                break;
            }
        }

        let c = self.peek()?;
        let token = match c {
            '"' => self.lex_string(),
            '\'' => self.lex_character_range(),
            '%' if self.rest().starts_with("%%") => self.punct(Token::DoublePercent, 2),
            '%' => self.punct(Token::Percent, 1),
            '{' => self.punct(Token::LeftBrace, 1),
            '}' => self.punct(Token::RightBrace, 1),
            '|' => self.punct(Token::Pipe, 1),
            '?' => self.punct(Token::QuestionMark, 1),
            '*' => self.punct(Token::Star, 1),
            '+' => self.punct(Token::Plus, 1),
            ';' => self.punct(Token::Semicolon, 1),
            ':' => self.punct(Token::Colon, 1),
            '=' => self.punct(Token::Equal, 1),
            _ => Ok(self.lex_name()),
        };
        Some(token)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_token();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Scan the whole input into a token vector
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}

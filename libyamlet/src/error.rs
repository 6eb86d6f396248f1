//! Error types for Yamlet parsing.

use std::fmt;

use thiserror::Error;

use crate::token::LexError;

/// Result type for Yamlet parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// What went wrong. Every kind aborts the whole parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input holds no content (empty, or only blank and comment lines).
    #[error("Empty document")]
    EmptyInput,

    /// A map line does not start with a key.
    #[error("Expected key")]
    ExpectedKey,

    /// A key is not followed by a colon.
    #[error("Expected colon after key")]
    ExpectedColon,

    /// A colon or list hyphen is not followed by whitespace or a newline.
    #[error("Expected space or newline after separator")]
    ExpectedSeparator,

    /// No value can start at this token.
    #[error("Expected value")]
    ExpectedValue,

    /// Extra content after a value.
    #[error("Expected newline after value")]
    ExpectedNewline,

    /// An indented block starts with something other than a key or `-`.
    #[error("Expected list or map after indentation")]
    ExpectedNestedStructure,

    /// A key appears twice in the same map.
    #[error("Duplicate key \"{0}\"")]
    DuplicateKey(String),

    /// A numeric token that does not fit its type.
    #[error("Invalid number")]
    InvalidNumber,

    /// A null token whose text is not `null`.
    #[error("Invalid null")]
    InvalidNull,

    /// A quoted string without its closing quote.
    #[error("Unterminated string")]
    UnterminatedString,

    /// Tab character found where spaces expected.
    #[error("Tab not allowed (use spaces)")]
    TabNotAllowed,

    /// A line in a list that does not start with `-`.
    #[error("List item must start with '-'")]
    ListMissingHyphen,

    /// A line indented deeper than its block without opening a nested value.
    #[error("Unexpected indent")]
    UnexpectedIndent,

    /// Nested blocks deeper than the configured limit.
    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

impl From<LexError> for ErrorKind {
    fn from(err: LexError) -> Self {
        match err {
            LexError::UnterminatedString => ErrorKind::UnterminatedString,
            LexError::TabNotAllowed => ErrorKind::TabNotAllowed,
        }
    }
}

/// Error type for Yamlet parsing: a kind plus the byte offset of the token
/// at which it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Line and column of the error within `input`.
    pub fn location(&self, input: &[u8]) -> Location {
        Location::of(input, self.position)
    }
}

/// One-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Locate `position` in `input`; offsets past the end map to the end.
    pub fn of(input: &[u8], position: usize) -> Self {
        let before = &input[..position.min(input.len())];
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Self {
            line: before.iter().filter(|&&b| b == b'\n').count() + 1,
            column: before.len() - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ParseError::new(ErrorKind::DuplicateKey("a".into()), 5);
        assert_eq!(err.to_string(), "Duplicate key \"a\" at byte 5");
        let err = ParseError::new(ErrorKind::ExpectedColon, 0);
        assert_eq!(err.to_string(), "Expected colon after key at byte 0");
    }

    #[test]
    fn test_location() {
        let input = b"a: 1\nbb: 2\n";
        assert_eq!(Location::of(input, 0), Location { line: 1, column: 1 });
        assert_eq!(Location::of(input, 5), Location { line: 2, column: 1 });
        assert_eq!(Location::of(input, 7), Location { line: 2, column: 3 });
        assert_eq!(Location::of(input, 99), Location { line: 3, column: 1 });
        assert_eq!(Location::of(input, 7).to_string(), "2:3");
    }

    #[test]
    fn test_lex_error_conversion() {
        assert_eq!(
            ErrorKind::from(LexError::TabNotAllowed),
            ErrorKind::TabNotAllowed
        );
        assert_eq!(
            ErrorKind::from(LexError::UnterminatedString),
            ErrorKind::UnterminatedString
        );
    }
}

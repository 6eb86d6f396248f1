//! Token vocabulary shared by the tokenizer and the parser.

use std::borrow::Cow;
use std::fmt;

/// Lexical failure carried by an `Invalid` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    /// A quoted string ran into a line break or the end of input.
    UnterminatedString,
    /// A tab character, which is never valid whitespace.
    TabNotAllowed,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString => write!(f, "unterminated quoted string"),
            LexError::TabNotAllowed => write!(f, "tab not allowed (use spaces)"),
        }
    }
}

/// Token type in the tokenizer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A single whitespace character other than a line break.
    Space,
    /// `:`
    Colon,
    /// `-` introducing a list item.
    Hyphen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// Quoted (quotes included) or unquoted string.
    String,
    /// Number containing `.`, `e` or `E`.
    FloatNumber,
    /// Number without a fraction or exponent.
    IntNumber,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
    /// `#` up to the end of the line.
    Comment,
    /// `\n`
    Newline,
    /// Past the last byte of input.
    EndOfInput,
    /// Lexical error; the token text is the offending input.
    Invalid(LexError),
}

impl TokenKind {
    /// Short human-readable name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Space => "whitespace",
            TokenKind::Colon => "':'",
            TokenKind::Hyphen => "'-'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::String => "string",
            TokenKind::FloatNumber => "float",
            TokenKind::IntNumber => "integer",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Comment => "comment",
            TokenKind::Newline => "newline",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Invalid(_) => "invalid token",
        }
    }

    /// Returns `true` for kinds that carry a scalar value.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::FloatNumber
                | TokenKind::IntNumber
                | TokenKind::Boolean
                | TokenKind::Null
        )
    }
}

/// A single token. `text` borrows from the input buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a [u8],
    pub position: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a [u8], position: usize) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }

    /// The token text as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }

    /// The text with one pair of matching surrounding quotes removed.
    pub fn unquoted(&self) -> Cow<'a, str> {
        let t = self.text;
        if t.len() >= 2 && (t[0] == b'"' || t[0] == b'\'') && t[t.len() - 1] == t[0] {
            String::from_utf8_lossy(&t[1..t.len() - 1])
        } else {
            self.text_lossy()
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})@{}", self.kind, self.text_lossy(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_strips_matching_quotes() {
        assert_eq!(Token::new(TokenKind::String, b"\"Alice\"", 0).unquoted(), "Alice");
        assert_eq!(Token::new(TokenKind::String, b"'Bob'", 0).unquoted(), "Bob");
        assert_eq!(Token::new(TokenKind::String, b"plain", 0).unquoted(), "plain");
        assert_eq!(Token::new(TokenKind::String, b"\"", 0).unquoted(), "\"");
        assert_eq!(Token::new(TokenKind::String, b"\"mixed'", 0).unquoted(), "\"mixed'");
    }

    #[test]
    fn test_scalar_kinds() {
        assert!(TokenKind::Null.is_scalar());
        assert!(TokenKind::String.is_scalar());
        assert!(!TokenKind::Colon.is_scalar());
        assert!(!TokenKind::Invalid(LexError::TabNotAllowed).is_scalar());
    }
}

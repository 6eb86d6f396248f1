//! Phase 1: Tokenizer
//!
//! The tokenizer is a flat character-scanning state machine over the raw
//! input bytes. It holds a single cursor and produces one token per call:
//! - Structural punctuation: `:`, `-`, `[`, `]`
//! - Scalars: quoted and unquoted strings, numbers, booleans, `null`
//! - Layout: one `Space` per whitespace character, `Newline`, `Comment`
//!
//! It never fails outright. Lexical problems come back as `Invalid` tokens
//! and the parser decides what to do with them.
//!
//! Scalar candidates (booleans, `null`, numbers) are tried speculatively from
//! the current cursor; when a candidate does not match, the same span is
//! re-lexed as an unquoted string.

use std::iter::FusedIterator;

use crate::token::{LexError, Token, TokenKind};

const BOOLEANS: &[&[u8]] = &[b"true", b"false"];
const NULLS: &[&[u8]] = &[b"null"];

/// Tokenizer over an immutable input buffer.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    cursor: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer positioned at the start of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            cursor: 0,
            finished: false,
        }
    }

    /// Byte offset of the next unconsumed character.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `position` (clamped to the input length).
    ///
    /// Seeking to the position a token started at and calling
    /// [`next_token`](Self::next_token) reproduces that token.
    pub fn seek(&mut self, position: usize) {
        self.cursor = position.min(self.input.len());
        self.finished = false;
    }

    /// Produce the next token. Once the input is exhausted every call
    /// returns `EndOfInput`.
    pub fn next_token(&mut self) -> Token<'a> {
        let start = self.cursor;
        let Some(&c) = self.input.get(start) else {
            return Token::new(TokenKind::EndOfInput, &[], self.input.len());
        };

        match c {
            b'"' | b'\'' => self.quoted(start, c),
            b':' => self.single(start, TokenKind::Colon),
            b'-' if self.starts_number(start + 1) => self.number(start),
            b'-' => self.single(start, TokenKind::Hyphen),
            b'[' => self.single(start, TokenKind::LeftBracket),
            b']' => self.single(start, TokenKind::RightBracket),
            b'#' => self.comment(start),
            b't' | b'f' => self.keyword(start, TokenKind::Boolean, BOOLEANS, false),
            b'n' => self.keyword(start, TokenKind::Null, NULLS, true),
            b'0'..=b'9' | b'.' => self.number(start),
            b'\n' => self.single(start, TokenKind::Newline),
            b'\t' => self.single(start, TokenKind::Invalid(LexError::TabNotAllowed)),
            c if c.is_ascii_whitespace() => {
                self.cursor = start + 1;
                // Positioned after the whitespace it represents.
                Token::new(TokenKind::Space, &self.input[start..start + 1], self.cursor)
            }
            _ => self.unquoted(start),
        }
    }

    fn single(&mut self, start: usize, kind: TokenKind) -> Token<'a> {
        self.cursor = start + 1;
        Token::new(kind, &self.input[start..start + 1], start)
    }

    fn quoted(&mut self, start: usize, quote: u8) -> Token<'a> {
        let mut i = start + 1;
        while i < self.input.len() {
            match self.input[i] {
                b if b == quote => {
                    self.cursor = i + 1;
                    return Token::new(TokenKind::String, &self.input[start..i + 1], start);
                }
                b'\n' => break,
                _ => i += 1,
            }
        }
        self.cursor = i;
        Token::new(
            TokenKind::Invalid(LexError::UnterminatedString),
            &self.input[start..i],
            start,
        )
    }

    fn comment(&mut self, start: usize) -> Token<'a> {
        let end = self.input[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.input.len(), |n| start + n);
        self.cursor = end;
        Token::new(TokenKind::Comment, &self.input[start..end], start)
    }

    /// Try `words` against the span up to the end of the line or an inline
    /// comment (and a colon boundary when `stop_at_colon` is set).
    fn keyword(
        &mut self,
        start: usize,
        kind: TokenKind,
        words: &[&[u8]],
        stop_at_colon: bool,
    ) -> Token<'a> {
        let end = self.scan_until(start, stop_at_colon);
        let text = &self.input[start..self.trim_end(start, end)];
        if words.contains(&text) {
            self.cursor = end;
            return Token::new(kind, text, start);
        }
        self.unquoted(start)
    }

    fn number(&mut self, start: usize) -> Token<'a> {
        let end = self.scan_until(start, false);
        let text = &self.input[start..self.trim_end(start, end)];
        let valid = std::str::from_utf8(text)
            .map(|s| s.parse::<f64>().is_ok())
            .unwrap_or(false);
        if !valid {
            return self.unquoted(start);
        }
        self.cursor = end;
        let kind = if text.iter().any(|b| matches!(b, b'.' | b'e' | b'E')) {
            TokenKind::FloatNumber
        } else {
            TokenKind::IntNumber
        };
        Token::new(kind, text, start)
    }

    fn unquoted(&mut self, start: usize) -> Token<'a> {
        let end = self.scan_until(start, true).max(start + 1);
        self.cursor = end;
        Token::new(
            TokenKind::String,
            &self.input[start..self.trim_end(start, end)],
            start,
        )
    }

    fn starts_number(&self, i: usize) -> bool {
        matches!(self.input.get(i).copied(), Some(b'0'..=b'9' | b'.'))
    }

    /// End (exclusive) of a scalar span starting at `start`.
    fn scan_until(&self, start: usize, stop_at_colon: bool) -> usize {
        let mut i = start;
        while i < self.input.len() {
            let b = self.input[i];
            if b == b'\n' || b == b'\t' || self.at_inline_comment(i) {
                break;
            }
            if stop_at_colon && self.at_colon_boundary(i) {
                break;
            }
            i += 1;
        }
        i
    }

    fn trim_end(&self, start: usize, mut end: usize) -> usize {
        while end > start && self.input[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        end
    }

    /// Whitespace immediately followed by `#`.
    fn at_inline_comment(&self, i: usize) -> bool {
        self.input[i].is_ascii_whitespace() && self.input.get(i + 1) == Some(&b'#')
    }

    /// `:` followed by whitespace or the end of input.
    fn at_colon_boundary(&self, i: usize) -> bool {
        self.input[i] == b':'
            && self
                .input
                .get(i + 1)
                .map_or(true, |b| b.is_ascii_whitespace())
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    /// Yields every token up to and including the first `EndOfInput`.
    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::EndOfInput {
            self.finished = true;
        }
        Some(token)
    }
}

impl FusedIterator for Tokenizer<'_> {}

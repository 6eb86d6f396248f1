//! Phase 2: Parser
//!
//! Recursive descent over the token stream with one token of lookahead.
//! Blocks are opened purely by indentation:
//! - A key followed by a line break opens a nested map or list when the next
//!   content line is indented deeper than the key's line.
//! - A line indented less than the current block closes it; the enclosing
//!   block picks up from that line.
//!
//! Every block remembers the column its first line started at. The parser
//! also counts how many blocks are open (`depth`), which is bounded by
//! [`ParseOptions::max_depth`].

use log::trace;

use crate::error::{ErrorKind, ParseError, Result};
use crate::lexer::Tokenizer;
use crate::options::ParseOptions;
use crate::token::{Token, TokenKind};
use crate::value::{Document, DuplicateKey, Value};

/// What may follow an inline scalar on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trailing {
    /// Only whitespace and a comment (map values).
    Reject,
    /// Anything; the rest of the line is skipped (list items).
    Skip,
}

/// Single-use parser over one input buffer.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token<'a>,
    /// At most one token pulled ahead of `current`.
    pushback: Option<Token<'a>>,
    /// Leading spaces of the line the cursor is on.
    indent: usize,
    /// Number of open nested blocks.
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &'a [u8], options: ParseOptions) -> Self {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token();
        Self {
            tokenizer,
            current,
            pushback: None,
            indent: 0,
            depth: 0,
            options,
        }
    }

    /// Parse the whole input as one top-level map.
    pub fn parse_document(mut self) -> Result<Document> {
        if self.current.kind == TokenKind::EndOfInput {
            return Err(self.error(ErrorKind::EmptyInput));
        }
        self.settle()?;
        self.start_line()?;
        if self.at_end() {
            return Err(self.error(ErrorKind::EmptyInput));
        }
        if self.indent > 0 {
            return Err(self.error(ErrorKind::UnexpectedIndent));
        }
        self.parse_map(0)
    }

    // ========================================================================
    // Token Cursor
    // ========================================================================

    /// Next token from the tokenizer, with comments dropped and lexical
    /// errors raised.
    fn pull(&mut self) -> Result<Token<'a>> {
        loop {
            let token = self.tokenizer.next_token();
            match token.kind {
                TokenKind::Comment => continue,
                TokenKind::Invalid(err) => {
                    return Err(ParseError::new(err.into(), token.position));
                }
                _ => return Ok(token),
            }
        }
    }

    /// Apply the `pull` rules to the very first token.
    fn settle(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Comment => self.advance(),
            TokenKind::Invalid(err) => Err(ParseError::new(err.into(), self.current.position)),
            _ => Ok(()),
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.current = match self.pushback.take() {
            Some(token) => token,
            None => self.pull()?,
        };
        Ok(())
    }

    /// The token after `current`. Repeated peeks return the same token.
    fn peek(&mut self) -> Result<Token<'a>> {
        if let Some(token) = self.pushback {
            return Ok(token);
        }
        let token = self.pull()?;
        self.pushback = Some(token);
        Ok(token)
    }

    fn at_end(&self) -> bool {
        self.current.kind == TokenKind::EndOfInput
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        trace!(
            "{} at {} while on {}",
            kind,
            self.current.position,
            self.current.kind.describe()
        );
        ParseError::new(kind, self.current.position)
    }

    fn skip_spaces(&mut self) -> Result<()> {
        while self.current.kind == TokenKind::Space {
            self.advance()?;
        }
        Ok(())
    }

    // ========================================================================
    // Lines and Indentation
    // ========================================================================

    /// Count the leading spaces of the line at the cursor, skipping lines
    /// that hold nothing but whitespace and comments.
    fn start_line(&mut self) -> Result<()> {
        loop {
            let mut spaces = 0;
            while self.current.kind == TokenKind::Space {
                spaces += 1;
                self.advance()?;
            }
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }
            self.indent = spaces;
            return Ok(());
        }
    }

    /// Move past the current line break to the next content line.
    fn next_line(&mut self) -> Result<()> {
        if self.current.kind == TokenKind::Newline {
            self.advance()?;
        }
        self.start_line()
    }

    /// Finish the line of an inline scalar; the cursor is on the token
    /// after the scalar.
    fn end_line(&mut self, trailing: Trailing) -> Result<()> {
        match trailing {
            Trailing::Reject => {
                self.skip_spaces()?;
                if !matches!(
                    self.current.kind,
                    TokenKind::Newline | TokenKind::EndOfInput
                ) {
                    return Err(self.error(ErrorKind::ExpectedNewline));
                }
            }
            Trailing::Skip => {
                while !matches!(
                    self.current.kind,
                    TokenKind::Newline | TokenKind::EndOfInput
                ) {
                    self.advance()?;
                }
            }
        }
        self.next_line()
    }

    /// Run `f` one block deeper. The depth is restored whatever `f` returns.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(ErrorKind::NestingTooDeep(self.options.max_depth)));
        }
        self.depth += 1;
        trace!("open block at column {} (depth {})", self.indent, self.depth);
        let result = f(self);
        trace!("close block (depth {})", self.depth);
        self.depth -= 1;
        result
    }

    /// Value of a key or list item that ends its line without an inline
    /// scalar. `column` is the indentation of the owning line.
    fn parse_indented(&mut self, column: usize) -> Result<Value> {
        self.next_line()?;
        if self.at_end() || self.indent <= column {
            return Ok(Value::Null);
        }

        let child = self.indent;
        let token = self.current;
        let opens_map = match token.kind {
            TokenKind::Hyphen => false,
            TokenKind::String | TokenKind::Colon => true,
            kind if kind.is_scalar() && self.peek()?.kind == TokenKind::Colon => true,
            _ => return Err(self.error(ErrorKind::ExpectedNestedStructure)),
        };
        self.nested(|p| {
            if opens_map {
                p.parse_map(child).map(Value::Map)
            } else {
                p.parse_list(child).map(Value::List)
            }
        })
    }

    // ========================================================================
    // Maps
    // ========================================================================

    /// Parse `key: value` lines at `column` until a shallower line or the
    /// end of input.
    fn parse_map(&mut self, column: usize) -> Result<Document> {
        let mut doc = Document::new();
        loop {
            let key_position = self.current.position;
            let key = self.parse_key()?;

            self.advance()?;
            if self.current.kind != TokenKind::Colon {
                return Err(self.error(ErrorKind::ExpectedColon));
            }
            self.advance()?;
            match self.current.kind {
                TokenKind::Space => self.advance()?,
                TokenKind::Newline | TokenKind::EndOfInput => {}
                _ => return Err(self.error(ErrorKind::ExpectedSeparator)),
            }

            trace!("key {:?} at column {}", key, column);
            let value = self.parse_value(column, Trailing::Reject)?;
            doc.insert(key, value).map_err(|DuplicateKey(key)| {
                ParseError::new(ErrorKind::DuplicateKey(key), key_position)
            })?;

            if self.at_end() || self.indent < column {
                return Ok(doc);
            }
            if self.indent > column {
                return Err(self.error(ErrorKind::UnexpectedIndent));
            }
        }
    }

    /// Key text of the current token. Quoted keys lose their quotes; a
    /// scalar such as `null` is taken literally when a colon follows it.
    fn parse_key(&mut self) -> Result<String> {
        let token = self.current;
        if token.kind == TokenKind::String {
            return Ok(token.unquoted().into_owned());
        }
        if token.kind.is_scalar() && self.peek()?.kind == TokenKind::Colon {
            return Ok(token.text_lossy().into_owned());
        }
        Err(self.error(ErrorKind::ExpectedKey))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Parse the value at the cursor. On return the cursor is at the start
    /// of the next content line (or the end of input).
    fn parse_value(&mut self, column: usize, trailing: Trailing) -> Result<Value> {
        self.skip_spaces()?;
        match self.current.kind {
            TokenKind::Newline | TokenKind::EndOfInput => self.parse_indented(column),
            kind if kind.is_scalar() => {
                let value = self.parse_scalar()?;
                self.advance()?;
                self.end_line(trailing)?;
                Ok(value)
            }
            _ => Err(self.error(ErrorKind::ExpectedValue)),
        }
    }

    /// Convert the current scalar token. Numbers are re-validated here
    /// rather than trusted from the tokenizer.
    fn parse_scalar(&self) -> Result<Value> {
        let token = self.current;
        let text = token.text_lossy();
        match token.kind {
            TokenKind::String => Ok(Value::String(token.unquoted().into_owned())),
            TokenKind::IntNumber => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.error(ErrorKind::InvalidNumber)),
            TokenKind::FloatNumber => match text.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(self.error(ErrorKind::InvalidNumber)),
            },
            TokenKind::Boolean => match text.as_ref() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(self.error(ErrorKind::ExpectedValue)),
            },
            TokenKind::Null if text == "null" => Ok(Value::Null),
            TokenKind::Null => Err(self.error(ErrorKind::InvalidNull)),
            _ => Err(self.error(ErrorKind::ExpectedValue)),
        }
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Parse `- item` lines at `column`.
    fn parse_list(&mut self, column: usize) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.advance()?;
            match self.current.kind {
                TokenKind::Space | TokenKind::Newline | TokenKind::EndOfInput => {}
                _ => return Err(self.error(ErrorKind::ExpectedSeparator)),
            }

            items.push(self.parse_value(column, Trailing::Skip)?);
            trace!("list item {} at column {}", items.len(), column);

            if self.at_end() || self.indent < column {
                return Ok(items);
            }
            if self.indent > column {
                return Err(self.error(ErrorKind::UnexpectedIndent));
            }
            if self.current.kind != TokenKind::Hyphen {
                return Err(self.error(ErrorKind::ListMissingHyphen));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse_document()
    }

    fn doc(pairs: Vec<(&str, Value)>) -> Document {
        Document::from_pairs(pairs).unwrap()
    }

    fn fails(input: &str) -> (ErrorKind, usize) {
        let err = parse(input).unwrap_err();
        (err.kind, err.position)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fails(""), (ErrorKind::EmptyInput, 0));
        assert_eq!(fails("# only a comment\n\n").0, ErrorKind::EmptyInput);
        assert_eq!(fails("   \n").0, ErrorKind::EmptyInput);
    }

    #[test]
    fn test_single_scalars() {
        assert_eq!(
            parse("name: \"Alice\"\n").unwrap(),
            doc(vec![("name", Value::from("Alice"))])
        );
        assert_eq!(parse("age: 30\n").unwrap(), doc(vec![("age", Value::Int(30))]));
        assert_eq!(
            parse("active: true\n").unwrap(),
            doc(vec![("active", Value::Bool(true))])
        );
        assert_eq!(parse("note: null\n").unwrap(), doc(vec![("note", Value::Null)]));
        assert_eq!(
            parse("ratio: 0.25\n").unwrap(),
            doc(vec![("ratio", Value::Float(0.25))])
        );
        assert_eq!(parse("delta: -4").unwrap(), doc(vec![("delta", Value::Int(-4))]));
        assert_eq!(
            parse("greeting: 'hi there'\nplain: two words\n").unwrap(),
            doc(vec![
                ("greeting", Value::from("hi there")),
                ("plain", Value::from("two words")),
            ])
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let parsed = parse("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_key() {
        assert_eq!(
            fails("a: 1\na: 2\n"),
            (ErrorKind::DuplicateKey("a".into()), 5)
        );
        assert_eq!(
            fails("a:\n  x: 1\na: text\n").0,
            ErrorKind::DuplicateKey("a".into())
        );
    }

    #[test]
    fn test_quoted_and_bare_keys_collide() {
        assert_eq!(
            fails("\"a\": 1\na: 2\n").0,
            ErrorKind::DuplicateKey("a".into())
        );
    }

    #[test]
    fn test_same_key_in_different_maps() {
        let parsed = parse("a:\n  k: 1\nb:\n  k: 2\n").unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_nested_map_closes_on_dedent() {
        let parsed = parse("parent:\n  child: 1\nsibling: 2\n").unwrap();
        let expected = doc(vec![
            ("parent", Value::Map(doc(vec![("child", Value::Int(1))]))),
            ("sibling", Value::Int(2)),
        ]);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_dedent_to_intermediate_level() {
        let input = "a:\n    b:\n        c: 1\n    d: 2\ne: 3\n";
        let expected = doc(vec![
            (
                "a",
                Value::Map(doc(vec![
                    ("b", Value::Map(doc(vec![("c", Value::Int(1))]))),
                    ("d", Value::Int(2)),
                ])),
            ),
            ("e", Value::Int(3)),
        ]);
        assert_eq!(parse(input).unwrap(), expected);
    }

    #[test]
    fn test_block_list() {
        assert_eq!(
            parse("items:\n  - 1\n  - 2\n").unwrap(),
            doc(vec![("items", Value::List(vec![Value::Int(1), Value::Int(2)]))])
        );
    }

    #[test]
    fn test_list_of_lists_and_maps() {
        let input = "matrix:\n  -\n    - 1\n    - 2\n  -\n    - 3\npeople:\n  -\n    name: Ann\n  -\n    name: Bo\n";
        let expected = doc(vec![
            (
                "matrix",
                Value::List(vec![
                    Value::List(vec![Value::Int(1), Value::Int(2)]),
                    Value::List(vec![Value::Int(3)]),
                ]),
            ),
            (
                "people",
                Value::List(vec![
                    Value::Map(doc(vec![("name", Value::from("Ann"))])),
                    Value::Map(doc(vec![("name", Value::from("Bo"))])),
                ]),
            ),
        ]);
        assert_eq!(parse(input).unwrap(), expected);
    }

    #[test]
    fn test_list_item_trailing_content_is_skipped() {
        assert_eq!(
            parse("items:\n  - \"a\" extra\n  - b\n").unwrap(),
            doc(vec![(
                "items",
                Value::List(vec![Value::from("a"), Value::from("b")])
            )])
        );
    }

    #[test]
    fn test_empty_value_is_null() {
        assert_eq!(
            parse("note:\nnext: 1\nlast:").unwrap(),
            doc(vec![
                ("note", Value::Null),
                ("next", Value::Int(1)),
                ("last", Value::Null),
            ])
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let input = "# header\na: 1 # trailing\n\n  # indented comment\nb:\n  # inside\n  c: x # note\n";
        let expected = doc(vec![
            ("a", Value::Int(1)),
            ("b", Value::Map(doc(vec![("c", Value::from("x"))]))),
        ]);
        assert_eq!(parse(input).unwrap(), expected);
    }

    #[test]
    fn test_scalar_keys_before_colon() {
        let parsed = parse("null: 1\ntrue: 2\n3: three\n").unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["null", "true", "3"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            parse("a:\r\n  b: 1\r\nc: 2\r\n").unwrap(),
            doc(vec![
                ("a", Value::Map(doc(vec![("b", Value::Int(1))]))),
                ("c", Value::Int(2)),
            ])
        );
    }

    #[test]
    fn test_tabs_are_rejected() {
        assert_eq!(fails("key:\n\tchild: 1\n"), (ErrorKind::TabNotAllowed, 5));
        assert_eq!(fails("a: 1\n  \tb: 2\n"), (ErrorKind::TabNotAllowed, 7));
        assert_eq!(fails("\ta: 1\n"), (ErrorKind::TabNotAllowed, 0));
    }

    #[test]
    fn test_unterminated_string_points_at_quote() {
        assert_eq!(fails("key: \"oops\n"), (ErrorKind::UnterminatedString, 5));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(fails("- 1\n"), (ErrorKind::ExpectedKey, 0));
        assert_eq!(fails("a b\n"), (ErrorKind::ExpectedColon, 3));
        assert_eq!(fails("\"a\":b\n"), (ErrorKind::ExpectedSeparator, 4));
        assert_eq!(fails("a: [1]\n"), (ErrorKind::ExpectedValue, 3));
        assert_eq!(fails("a: \"x\" y\n"), (ErrorKind::ExpectedNewline, 7));
        assert_eq!(fails("a: b: c\n"), (ErrorKind::ExpectedNewline, 4));
        assert_eq!(fails("a:\n  [x]\n"), (ErrorKind::ExpectedNestedStructure, 5));
        assert_eq!(fails("a:\n  42\n"), (ErrorKind::ExpectedNestedStructure, 5));
    }

    #[test]
    fn test_indentation_errors() {
        assert_eq!(fails("  a: 1\n"), (ErrorKind::UnexpectedIndent, 2));
        assert_eq!(fails("a: 1\n  b: 2\n"), (ErrorKind::UnexpectedIndent, 7));
        assert_eq!(
            fails("a:\n    b: 1\n  c: 2\n").0,
            ErrorKind::UnexpectedIndent
        );
    }

    #[test]
    fn test_list_errors() {
        assert_eq!(
            fails("items:\n  - 1\n  two: 2\n"),
            (ErrorKind::ListMissingHyphen, 15)
        );
        assert_eq!(fails("items:\n  -x\n"), (ErrorKind::ExpectedSeparator, 10));
    }

    #[test]
    fn test_invalid_number() {
        assert_eq!(
            fails("a: 99999999999999999999\n"),
            (ErrorKind::InvalidNumber, 3)
        );
    }

    #[test]
    fn test_float_out_of_range() {
        assert_eq!(fails("a: 1e400\n"), (ErrorKind::InvalidNumber, 3));
        assert_eq!(fails("a:\n  - -1e999\n"), (ErrorKind::InvalidNumber, 7));
        assert_eq!(parse("a: 1e300\n").unwrap().get("a"), Some(&Value::Float(1e300)));
    }

    #[test]
    fn test_scalar_tokens_are_revalidated() {
        let mut parser = Parser::new(b"");
        parser.current = Token::new(TokenKind::Null, b"nil", 4);
        assert_eq!(
            parser.parse_scalar().unwrap_err(),
            ParseError::new(ErrorKind::InvalidNull, 4)
        );
        parser.current = Token::new(TokenKind::IntNumber, b"1.5", 2);
        assert_eq!(
            parser.parse_scalar().unwrap_err(),
            ParseError::new(ErrorKind::InvalidNumber, 2)
        );
    }

    #[test]
    fn test_nesting_limit() {
        let input = b"a:\n  b:\n    c: 1\n";
        let shallow = ParseOptions::new().with_max_depth(1);
        let err = Parser::with_options(input, shallow)
            .parse_document()
            .unwrap_err();
        assert_eq!(err, ParseError::new(ErrorKind::NestingTooDeep(1), 12));
        assert!(Parser::with_options(input, ParseOptions::new().with_max_depth(2))
            .parse_document()
            .is_ok());
    }

    #[test]
    fn test_peek_twice_returns_same_token() {
        let mut parser = Parser::new(b"a: 1");
        let first = parser.peek().unwrap();
        let second = parser.peek().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.kind, TokenKind::Colon);
        parser.advance().unwrap();
        assert_eq!(parser.current, first);
        parser.advance().unwrap();
        assert_eq!(parser.current.kind, TokenKind::Space);
    }

    #[test]
    fn test_reparse_is_identical() {
        let input = "a:\n  - 1\n  - x: y\nb: 2.5\n";
        let first = parse(input);
        let second = parse(input);
        assert_eq!(first, second);
    }
}

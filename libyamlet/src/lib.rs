//! Yamlet: a small, strict subset of YAML.
//!
//! A Yamlet document is a block map of `key: value` lines. Values are
//! scalars (quoted or bare strings, integers, floats, booleans, `null`), or
//! nested maps and `-` lists opened by indenting the following lines.
//! Tabs are never valid and every key is unique within its map.
//!
//! # Parsing Pipeline
//!
//! The parser operates in two phases:
//!
//! 1. **Tokenizer**: Scans raw bytes into tokens carrying their kind, text
//!    slice and byte offset. Lexical problems become `Invalid` tokens.
//!
//! 2. **Parser**: Recursive descent with one token of lookahead. Counts
//!    leading spaces at each line start to open and close nested blocks, and
//!    builds an ordered [`Document`], rejecting duplicate keys.
//!
//! The first error aborts the parse; there is no recovery.

mod encode;
mod error;
mod lexer;
mod options;
mod parser;
mod token;
mod value;

use log::debug;

pub use encode::{encode, Format};
pub use error::{ErrorKind, Location, ParseError, Result};
pub use lexer::Tokenizer;
pub use options::ParseOptions;
pub use parser::Parser;
pub use token::{LexError, Token, TokenKind};
pub use value::{Document, DuplicateKey, Value};

/// Parse a Yamlet document with the default options.
///
/// # Example
///
/// ```
/// use libyamlet::{parse, Value};
///
/// let doc = parse(b"name: \"Alice\"\nage: 30\n").unwrap();
/// assert_eq!(doc.get("age"), Some(&Value::Int(30)));
/// ```
pub fn parse(input: &[u8]) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse a Yamlet document with explicit limits.
pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Document> {
    let result = Parser::with_options(input, *options).parse_document();
    match &result {
        Ok(doc) => debug!("parsed {} bytes into {} top-level keys", input.len(), doc.len()),
        Err(err) => debug!("parse failed: {}", err),
    }
    result
}

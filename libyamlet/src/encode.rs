//! Encode Yamlet documents to text formats.
//!
//! YAML, TOML and CBOR output live in the CLI tool (binyamlet), which pulls
//! in dedicated libraries for them.

use crate::lexer::Tokenizer;
use crate::token::TokenKind;
use crate::value::{Document, Value};

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Yamlet (canonical)
    Yamlet,
    /// JSON (pretty, key order preserved)
    Json,
    /// Rust `Debug` rendering
    Debug,
}

/// Encode a document to a string in the specified format.
pub fn encode(doc: &Document, format: Format) -> String {
    match format {
        Format::Yamlet => {
            let mut out = String::new();
            write_yamlet_map(&mut out, doc, 0);
            out
        }
        Format::Json => encode_json_map(doc, 0),
        Format::Debug => format!("{:?}", doc),
    }
}

/// Shortest decimal text that still reads back as a float.
fn float_text(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') || s.contains('e') {
        s
    } else {
        format!("{}.0", s)
    }
}

// =============================================================================
// Yamlet Encoder
// =============================================================================
//
// Empty maps and lists have no block syntax; they are written as a bare
// `key:` and read back as null. Non-finite floats are written as null.

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn write_yamlet_map(out: &mut String, doc: &Document, indent: usize) {
    for (key, value) in doc {
        pad(out, indent);
        out.push_str(&encode_yamlet_key(key));
        out.push(':');
        write_yamlet_value(out, value, indent);
    }
}

fn write_yamlet_list(out: &mut String, items: &[Value], indent: usize) {
    for item in items {
        pad(out, indent);
        out.push('-');
        write_yamlet_value(out, item, indent);
    }
}

/// Finish a line that holds `key:` or `-` at `indent`.
fn write_yamlet_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Map(doc) if !doc.is_empty() => {
            out.push('\n');
            write_yamlet_map(out, doc, indent + 2);
        }
        Value::List(items) if !items.is_empty() => {
            out.push('\n');
            write_yamlet_list(out, items, indent + 2);
        }
        Value::Map(_) | Value::List(_) => out.push('\n'),
        scalar => {
            out.push(' ');
            out.push_str(&encode_yamlet_scalar(scalar));
            out.push('\n');
        }
    }
}

fn encode_yamlet_scalar(value: &Value) -> String {
    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) if f.is_finite() => float_text(*f),
        Value::String(s) => {
            if lexes_alone(s, |kind| kind == TokenKind::String) {
                s.clone()
            } else {
                quote(s)
            }
        }
        _ => "null".to_string(),
    }
}

fn encode_yamlet_key(key: &str) -> String {
    // A scalar such as `null` or `3` is still a key when a colon follows.
    if lexes_alone(key, |kind| kind.is_scalar()) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Whether `text` tokenizes as exactly one token of an accepted kind whose
/// text is all of `text`. Text starting with a quote would lose it.
fn lexes_alone(text: &str, accept: impl Fn(TokenKind) -> bool) -> bool {
    if text.starts_with(['"', '\'']) {
        return false;
    }
    let mut tokenizer = Tokenizer::new(text.as_bytes());
    let first = tokenizer.next_token();
    accept(first.kind)
        && first.text == text.as_bytes()
        && tokenizer.next_token().kind == TokenKind::EndOfInput
}

/// Quoted strings have no escapes: prefer double quotes, fall back to
/// single quotes when the text holds a double quote.
fn quote(s: &str) -> String {
    if s.contains('"') && !s.contains('\'') {
        format!("'{}'", s)
    } else {
        format!("\"{}\"", s)
    }
}

// =============================================================================
// JSON Encoder
// =============================================================================

fn encode_json(value: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => {
            if f.is_finite() {
                float_text(*f)
            } else {
                "null".to_string() // JSON doesn't support NaN/Infinity
            }
        }
        Value::String(s) => encode_json_string(s),
        Value::List(items) => {
            if items.is_empty() {
                "[]".to_string()
            } else {
                let items: Vec<String> = items
                    .iter()
                    .map(|v| format!("{}{}", pad1, encode_json(v, indent + 1)))
                    .collect();
                format!("[\n{}\n{}]", items.join(",\n"), pad)
            }
        }
        Value::Map(doc) => encode_json_map(doc, indent),
    }
}

fn encode_json_map(doc: &Document, indent: usize) -> String {
    if doc.is_empty() {
        return "{}".to_string();
    }
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);
    let items: Vec<String> = doc
        .iter()
        .map(|(k, v)| {
            format!(
                "{}{}: {}",
                pad1,
                encode_json_string(k),
                encode_json(v, indent + 1)
            )
        })
        .collect();
    format!("{{\n{}\n{}}}", items.join(",\n"), pad)
}

fn encode_json_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

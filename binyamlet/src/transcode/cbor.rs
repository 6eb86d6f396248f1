//! CBOR transcoding: convert Yamlet documents to CBOR binary data.
//!
//! Mapping from Yamlet to CBOR:
//!   - Value::Null    -> CBOR null (simple value 22)
//!   - Value::Bool    -> CBOR bool (simple values 20/21)
//!   - Value::Int     -> CBOR integer (smallest encoding that fits)
//!   - Value::Float   -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Value::String  -> CBOR text string (determinate length)
//!   - Value::List    -> CBOR array (determinate length)
//!   - Value::Map     -> CBOR map (determinate length, text string keys,
//!                       document order)

use ciborium::value::Value as CborValue;
use libyamlet::{Document, Value};

// ---------------------------------------------------------------------------
// Encode (Yamlet -> CBOR)
//
// Written by hand: ciborium's serializer shrinks floats to float16/float32
// when they fit. Floats here stay float64 (major 7, info 27).
// ---------------------------------------------------------------------------

/// Encode a document as CBOR bytes.
pub fn encode(doc: &Document) -> Vec<u8> {
    let mut buf = Vec::new();
    write_map(&mut buf, doc);
    buf
}

fn write_map(buf: &mut Vec<u8>, doc: &Document) {
    write_type_and_length(buf, 5, doc.len() as u64); // major 5 = map
    for (key, value) in doc {
        write_text(buf, key);
        write_value(buf, value);
    }
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    write_type_and_length(buf, 3, s.len() as u64); // major 3 = text string
    buf.extend_from_slice(s.as_bytes());
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Int(n) => write_integer(buf, *n),
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => write_text(buf, s),
        Value::List(items) => {
            write_type_and_length(buf, 4, items.len() as u64); // major 4 = array
            for item in items {
                write_value(buf, item);
            }
        }
        Value::Map(doc) => write_map(buf, doc),
    }
}

/// Write a CBOR major type + length/value argument.
///
/// CBOR encodes the major type in the high 3 bits and uses the low 5 bits
/// plus optional following bytes for the argument:
///   0-23:    argument in the low 5 bits (1 byte total)
///   24:      1-byte argument follows
///   25:      2-byte argument follows
///   26:      4-byte argument follows
///   27:      8-byte argument follows
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => {
            buf.push(high | val as u8);
        }
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Major 0 holds n directly; major 1 holds -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        write_type_and_length(buf, 1, (-1 - n) as u64);
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}

// ---------------------------------------------------------------------------
// Diagnostic Notation (CBOR -> human-readable text, RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation (RFC 8949 §8).
///
/// Decodes the bytes with ciborium, so the output reflects the wire encoding.
/// Only the items `encode` writes are rendered: maps, arrays, text, integers,
/// floats, booleans and null.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &value, 0)?;
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, value: &CborValue, indent: usize) -> Result<(), String> {
    match value {
        CborValue::Null => out.push_str("null"),
        CborValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        CborValue::Integer(i) => out.push_str(&i128::from(*i).to_string()),
        CborValue::Float(f) => out.push_str(&diag_float(*f)),
        CborValue::Text(s) => diag_text(out, s),
        CborValue::Array(items) => diag_array(out, items, indent)?,
        CborValue::Map(pairs) => diag_map(out, pairs, indent)?,
        other => return Err(format!("unsupported CBOR item: {:?}", other)),
    }
    Ok(())
}

/// Debug formatting keeps the fraction (`2.0`, `-0.0`); an exponent form
/// like `1e300` gains one as `1.0e300`.
fn diag_float(f: f64) -> String {
    let text = format!("{:?}", f);
    match text.find('e') {
        Some(at) if !text[..at].contains('.') => format!("{}.0{}", &text[..at], &text[at..]),
        _ => text,
    }
}

fn diag_text(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn is_scalar(value: &CborValue) -> bool {
    !matches!(value, CborValue::Array(_) | CborValue::Map(_))
}

/// Arrays of scalars stay on one line; anything holding a container is
/// broken over lines like a map.
fn diag_array(out: &mut String, items: &[CborValue], indent: usize) -> Result<(), String> {
    if items.iter().all(is_scalar) {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            diag_value(out, item, indent)?;
        }
        out.push(']');
        return Ok(());
    }
    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&" ".repeat(indent + 2));
        diag_value(out, item, indent + 2)?;
        out.push_str(if i + 1 < items.len() { ",\n" } else { "\n" });
    }
    out.push_str(&" ".repeat(indent));
    out.push(']');
    Ok(())
}

fn diag_map(
    out: &mut String,
    pairs: &[(CborValue, CborValue)],
    indent: usize,
) -> Result<(), String> {
    if pairs.is_empty() {
        out.push_str("{}");
        return Ok(());
    }
    out.push_str("{\n");
    for (i, (key, value)) in pairs.iter().enumerate() {
        out.push_str(&" ".repeat(indent + 2));
        diag_value(out, key, indent + 2)?;
        out.push_str(": ");
        diag_value(out, value, indent + 2)?;
        out.push_str(if i + 1 < pairs.len() { ",\n" } else { "\n" });
    }
    out.push_str(&" ".repeat(indent));
    out.push('}');
    Ok(())
}

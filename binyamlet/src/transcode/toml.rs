//! TOML transcoding: convert Yamlet documents to TOML text.
//!
//! Mapping from Yamlet to TOML:
//!   - Value::Null    -> error (TOML has no null)
//!   - Value::Bool    -> TOML boolean
//!   - Value::Int     -> TOML integer
//!   - Value::Float   -> TOML float
//!   - Value::String  -> TOML string
//!   - Value::List    -> TOML array (maps inside become inline tables)
//!   - Value::Map     -> TOML table
//!
//! Lossy edges:
//!   - TOML has no null type; null values, including keys with nothing after
//!     the colon, cause an error.

use libyamlet::{Document, Value};
use toml_edit::DocumentMut;

/// Encode a document as a TOML string.
pub fn encode(doc: &Document) -> Result<String, String> {
    let table = document_to_table(doc)?;
    let mut out = DocumentMut::new();
    for (key, item) in table.iter() {
        out[key] = item.clone();
    }
    Ok(out.to_string())
}

fn document_to_table(doc: &Document) -> Result<toml_edit::Table, String> {
    let mut table = toml_edit::Table::new();
    for (key, value) in doc {
        let item = match value {
            Value::Map(inner) => toml_edit::Item::Table(document_to_table(inner)?),
            other => toml_edit::Item::Value(
                value_to_toml(other).map_err(|e| format!("{} (at key \"{}\")", e, key))?,
            ),
        };
        table.insert(key, item);
    }
    Ok(table)
}

/// Inline form, used for array elements and maps nested inside them.
fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok(toml_edit::Value::from(*b)),
        Value::Int(n) => Ok(toml_edit::Value::from(*n)),
        Value::Float(f) => Ok(toml_edit::Value::from(*f)),
        Value::String(s) => Ok(toml_edit::Value::from(s.as_str())),
        Value::List(items) => {
            let mut arr = toml_edit::Array::new();
            for item in items {
                arr.push(value_to_toml(item)?);
            }
            Ok(toml_edit::Value::Array(arr))
        }
        Value::Map(doc) => {
            let mut inline = toml_edit::InlineTable::new();
            for (key, item) in doc {
                inline.insert(key, value_to_toml(item)?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

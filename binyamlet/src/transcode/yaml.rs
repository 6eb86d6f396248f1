//! YAML transcoding: convert Yamlet documents to YAML text.
//!
//! Mapping from Yamlet to YAML:
//!   - Value::Null    -> YAML null
//!   - Value::Bool    -> YAML bool
//!   - Value::Int     -> YAML integer
//!   - Value::Float   -> YAML float (including .nan, .inf, -.inf)
//!   - Value::String  -> YAML string
//!   - Value::List    -> YAML sequence
//!   - Value::Map     -> YAML mapping (key order preserved)

use libyamlet::{Document, Value};

/// Encode a document as a YAML string.
pub fn encode(doc: &Document) -> Result<String, String> {
    let yaml_value = document_to_yaml(doc);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn document_to_yaml(doc: &Document) -> serde_yaml::Value {
    let mut map = serde_yaml::Mapping::new();
    for (key, value) in doc {
        map.insert(serde_yaml::Value::String(key.to_string()), value_to_yaml(value));
    }
    serde_yaml::Value::Mapping(map)
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(n) => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        Value::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::List(items) => serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect()),
        Value::Map(doc) => document_to_yaml(doc),
    }
}

//! Value tree adapter.
//!
//! The tree is `serde_json::Value` built with `preserve_order`, so objects
//! keep insertion order and serialized output follows registry order. These
//! helpers are the only place the engine inspects node kinds.
use std::io::Read;

use serde_json::{Number, Value};

use crate::error::MapError;
use crate::kind::Numeric;

pub use serde_json::Map;

/// Parse JSON text into a fully materialized tree.
pub fn parse(text: &str) -> Result<Value, MapError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_reader<R: Read>(reader: R) -> Result<Value, MapError> {
    let value = serde_json::from_reader(reader).map_err(|err| {
        if err.is_io() {
            MapError::Io(err.into())
        } else {
            MapError::Parse(err)
        }
    })?;
    Ok(value)
}

/// Runtime kind of a node, as used in type-mismatch messages.
pub fn kind_name(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Short description of a node for error messages: kind plus scalar value.
pub fn describe_node(node: &Value) -> String {
    match node {
        Value::Null | Value::Array(_) | Value::Object(_) => kind_name(node).to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("{} {n}", kind_name(node)),
        Value::String(s) => format!("string {s:?}"),
    }
}

/// Integer form when the number has no fractional part in the source,
/// floating form otherwise.
pub fn numeric(number: &Number) -> Option<Numeric> {
    if let Some(i) = number.as_i64() {
        Some(Numeric::Int(i as i128))
    } else if let Some(u) = number.as_u64() {
        Some(Numeric::Int(u as i128))
    } else {
        number.as_f64().map(Numeric::Float)
    }
}

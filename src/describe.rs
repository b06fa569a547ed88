//! JSON Schema flavoured description of a registered type.
//!
//! Properties appear in registry order. Nested structs are emitted once under
//! `$defs` and referenced, which also covers recursive types.
use serde_json::{json, Map, Value};

use crate::error::MapError;
use crate::kind::{FieldKind, Numeric};
use crate::mapping;
use crate::options::FieldOption;
use crate::registry::{self, Mapped};

#[derive(Debug, Default)]
pub struct Definitions {
    defs: Map<String, Value>,
}

impl Definitions {
    pub fn is_empty(&self) -> bool { self.defs.is_empty() }

    pub fn get(&self, name: &str) -> Option<&Value> { self.defs.get(name) }
}

pub fn describe<T: Mapped>() -> Result<Value, MapError> {
    let mut defs = Definitions::default();
    let mut root = struct_schema::<T>(&mut defs)?;
    if !defs.is_empty() {
        root["$defs"] = Value::Object(defs.defs);
    }
    Ok(root)
}

pub(crate) fn reference<T: Mapped>(defs: &mut Definitions) -> Result<Value, MapError> {
    if !defs.defs.contains_key(T::NAME) {
        // placeholder first, so a recursive reference stops here
        defs.defs.insert(T::NAME.to_string(), Value::Null);
        let schema = struct_schema::<T>(defs)?;
        defs.defs.insert(T::NAME.to_string(), schema);
    }
    Ok(json!({ "$ref": format!("#/$defs/{}", T::NAME) }))
}

fn struct_schema<T: Mapped>(defs: &mut Definitions) -> Result<Value, MapError> {
    let registry = registry::registry::<T>()?;
    let mut props = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for binding in registry.bindings() {
        let kind = binding.kind();
        let mut schema = binding.schema(defs)?;
        let mut has_default = false;
        for option in binding.options() {
            has_default |= matches!(option, FieldOption::Default(_));
            annotate(target_arm(&mut schema), kind.unwrap_optional(), option);
        }
        if !kind.is_optional() && !has_default {
            required.push(Value::from(binding.key()));
        }
        props.insert(binding.key().to_string(), schema);
    }

    let mut o = json!({ "title": T::NAME, "type": "object", "properties": props });
    if !required.is_empty() {
        o["required"] = Value::Array(required);
    }
    Ok(o)
}

pub(crate) fn scalar(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Bool => json!({ "type": "boolean" }),
        FieldKind::Int(k) => json!({ "type": "integer", "format": k.name() }),
        FieldKind::Float(k) => json!({ "type": "number", "format": k.name() }),
        FieldKind::String => json!({ "type": "string" }),
        // containers and structs describe themselves through `FieldValue::schema`
        other => json!({ "description": other.to_string() }),
    }
}

pub(crate) fn nullable(inner: Value) -> Value {
    json!({ "oneOf": [inner, { "type": "null" }] })
}

// Options describe the value, not the null arm of an optional.
fn target_arm(schema: &mut Value) -> &mut Value {
    if schema.get("oneOf").is_some() {
        &mut schema["oneOf"][0]
    } else {
        schema
    }
}

fn annotate(schema: &mut Value, kind: &FieldKind, option: &FieldOption) {
    match option {
        FieldOption::Bounds(bounds) => {
            schema["minimum"] = numeric_value(bounds.lower());
            schema["maximum"] = numeric_value(bounds.upper());
        }
        FieldOption::NotEmpty(_) => {
            let key = match kind {
                FieldKind::String => "minLength",
                FieldKind::Sequence(_) => "minItems",
                _ => "minProperties",
            };
            schema[key] = json!(1);
        }
        FieldOption::Default(default) => {
            schema["default"] = default.value().clone();
        }
    }
}

// Helper: prefer emitting integers when exact
fn numeric_value(n: Numeric) -> Value {
    match n {
        Numeric::Int(i) => i64::try_from(i)
            .map(Value::from)
            .or_else(|_| u64::try_from(i).map(Value::from))
            .unwrap_or_else(|_| Value::from(i as f64)),
        Numeric::Float(x) => Value::from(x),
    }
}

/// Serialize a struct and its description side by side (used by the CLI's
/// `describe --with-sample`).
pub fn describe_with_sample<T: Mapped>(sample: &T) -> Result<Value, MapError> {
    let mut schema = describe::<T>()?;
    schema["examples"] = json!([mapping::to_value(sample)?]);
    Ok(schema)
}

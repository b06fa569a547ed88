//! Mapping engine: value tree <-> registered structs.
//!
//! Deserialization walks the registry (not the document) in registration
//! order, so a missing required key is always reported for the first such
//! binding. Every field is converted and validated before any member is
//! written; a failed pass leaves the target untouched.
use std::any::TypeId;
use std::collections::HashSet;
use std::io::Read;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::describe::Definitions;
use crate::error::MapError;
use crate::field::FieldValue;
use crate::kind::FieldKind;
use crate::options::FieldOption;
use crate::path::FieldPath;
use crate::registry::{self, Binding, Mapped, Member, Staged};
use crate::value;

// ———————————————————————————————————————————————————————————————————————————— //
// PER-FIELD STEP
// ———————————————————————————————————————————————————————————————————————————— //

impl<T: 'static, F: FieldValue> Member<T, F> {
    fn default_node(&self) -> Option<&Value> {
        self.options.iter().find_map(|option| match option {
            FieldOption::Default(default) => Some(default.value()),
            _ => None,
        })
    }

    /// The default, converted, must pass every other option on the binding.
    fn check_default(&self, field: &str) -> Result<(), MapError> {
        let Some(default) = self.default_node() else {
            return Ok(());
        };
        let rejected = |err: MapError| MapError::config(field, format!("option Default: {err}"));
        let value = F::from_node(default, &FieldPath::label(field)).map_err(rejected)?;
        for option in &self.options {
            option.validate(&value, field).map_err(rejected)?;
        }
        Ok(())
    }
}

impl<T: 'static, F: FieldValue> Binding<T> for Member<T, F> {
    fn key(&self) -> &str { &self.key }

    fn kind(&self) -> FieldKind { F::kind() }

    fn options(&self) -> &[FieldOption] { &self.options }

    fn attach(&mut self, option: FieldOption, owner: &'static str) -> Result<(), MapError> {
        let field = format!("{owner}.{}", self.key);
        if matches!(option, FieldOption::Default(_)) && self.default_node().is_some() {
            return Err(MapError::config(field, "option Default: attached more than once"));
        }
        option.check::<F>(&field)?;
        self.options.push(option);
        if let Err(err) = self.check_default(&field) {
            self.options.pop();
            return Err(err);
        }
        Ok(())
    }

    fn stage<'a>(&'a self, node: Option<&Value>, parent: &FieldPath) -> Result<Staged<'a, T>, MapError> {
        let path = parent.key(&self.key);
        let value = match (node, self.default_node()) {
            (Some(node), _) => F::from_node(node, &path)?,
            (None, Some(default)) => F::from_node(default, &path)?,
            (None, None) => F::when_absent().ok_or_else(|| MapError::missing(&path))?,
        };
        for option in &self.options {
            option.validate(&value, path.as_str())?;
        }
        Ok(Box::new(move |target: &mut T| *(self.get_mut)(target) = value))
    }

    fn emit(&self, source: &T) -> Result<Option<Value>, MapError> {
        let value = (self.get)(source);
        if !value.is_present() {
            return Ok(None);
        }
        value.to_node().map(Some)
    }

    fn prepare(&self, seen: &mut HashSet<TypeId>) -> Result<(), MapError> {
        F::prepare(seen)
    }

    fn schema(&self, defs: &mut Definitions) -> Result<Value, MapError> {
        F::schema(defs)
    }
}

// ———————————————————————————————————————————————————————————————————————————— //
// STRUCT PASSES
// ———————————————————————————————————————————————————————————————————————————— //

/// Populate the bound members of `target` from an object node.
pub(crate) fn apply_struct<T: Mapped>(target: &mut T, node: &Value, path: &FieldPath) -> Result<(), MapError> {
    let registry = registry::registry::<T>()?;
    let Value::Object(object) = node else {
        return Err(MapError::mismatch(path, FieldKind::Struct(T::NAME), value::describe_node(node)));
    };
    let staged = registry
        .bindings()
        .iter()
        .map(|binding| binding.stage(object.get(binding.key()), path))
        .collect::<Result<Vec<_>, _>>()?;
    for write in staged {
        write(&mut *target);
    }
    Ok(())
}

pub(crate) fn read_struct<T: Mapped>(node: &Value, path: &FieldPath) -> Result<T, MapError> {
    let mut out = T::default();
    apply_struct(&mut out, node, path)?;
    Ok(out)
}

pub(crate) fn write_struct<T: Mapped>(source: &T) -> Result<Value, MapError> {
    let registry = registry::registry::<T>()?;
    let mut object = Map::new();
    for binding in registry.bindings() {
        if let Some(node) = binding.emit(source)? {
            object.insert(binding.key().to_string(), node);
        }
    }
    Ok(Value::Object(object))
}

// ———————————————————————————————————————————————————————————————————————————— //
// ENTRY POINTS
// ———————————————————————————————————————————————————————————————————————————— //

pub fn from_value<T: Mapped>(node: &Value) -> Result<T, MapError> {
    tracing::trace!(target_type = T::NAME, "deserialize pass");
    read_struct(node, &FieldPath::root())
}

pub fn to_value<T: Mapped>(instance: &T) -> Result<Value, MapError> {
    tracing::trace!(target_type = T::NAME, "serialize pass");
    write_struct(instance)
}

pub fn from_json_str<T: Mapped>(text: &str) -> Result<T, MapError> {
    from_value(&value::parse(text)?)
}

pub fn from_reader<T: Mapped, R: Read>(reader: R) -> Result<T, MapError> {
    from_value(&value::parse_reader(reader)?)
}

/// Populate an existing instance. Only bound members are written, and only
/// if the whole pass succeeds.
pub fn map_json_to_struct<T: Mapped>(instance: &mut T, text: &str) -> Result<(), MapError> {
    let root = value::parse(text)?;
    tracing::trace!(target_type = T::NAME, "deserialize pass into existing instance");
    apply_struct(instance, &root, &FieldPath::root())
}

pub fn map_struct_to_json<T: Mapped>(instance: &T) -> Result<String, MapError> {
    Ok(serde_json::to_string(&to_value(instance)?)?)
}

/// Like `map_struct_to_json`, indenting nested levels by `indent` spaces.
pub fn map_struct_to_json_pretty<T: Mapped>(instance: &T, indent: usize) -> Result<String, MapError> {
    let tree = to_value(instance)?;
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    tree.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|err| MapError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

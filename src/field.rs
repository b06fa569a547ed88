//! Conversions between value-tree nodes and native member types.
//!
//! `FieldValue` is implemented for every type a binding may point at:
//! scalars, `Option<T>`, sequences, string-keyed maps, and registered structs.
use std::any::TypeId;
use std::collections::{BTreeMap, HashSet, LinkedList, VecDeque};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::describe::{self, Definitions};
use crate::error::MapError;
use crate::kind::{FieldKind, FloatKind, IntKind, Numeric};
use crate::mapping;
use crate::path::FieldPath;
use crate::registry::{self, Mapped};
use crate::value;

pub trait FieldValue: Sized + 'static {
    /// Declared semantic type, used by registration-time option checks.
    fn kind() -> FieldKind;

    fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError>;

    fn to_node(&self) -> Result<Value, MapError>;

    /// Value to store when the key is missing; `None` means the field is required.
    fn when_absent() -> Option<Self> { None }

    /// `false` only for the absent state of an optional.
    fn is_present(&self) -> bool { true }

    fn numeric(&self) -> Option<Numeric> { None }

    /// Element count for strings, sequences and maps.
    fn length(&self) -> Option<usize> { None }

    /// Build the registries of every struct type reachable from this one.
    fn prepare(_seen: &mut HashSet<TypeId>) -> Result<(), MapError> { Ok(()) }

    fn schema(_defs: &mut Definitions) -> Result<Value, MapError> {
        Ok(describe::scalar(&Self::kind()))
    }
}

fn mismatch<F: FieldValue>(path: &FieldPath, node: &Value) -> MapError {
    MapError::mismatch(path, F::kind(), value::describe_node(node))
}

// ------------------------------- Scalars ---------------------------------- //

impl FieldValue for bool {
    fn kind() -> FieldKind { FieldKind::Bool }

    fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
        node.as_bool().ok_or_else(|| mismatch::<Self>(path, node))
    }

    fn to_node(&self) -> Result<Value, MapError> { Ok(Value::Bool(*self)) }
}

impl FieldValue for String {
    fn kind() -> FieldKind { FieldKind::String }

    fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
        match node {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch::<Self>(path, other)),
        }
    }

    fn to_node(&self) -> Result<Value, MapError> { Ok(Value::String(self.clone())) }

    fn length(&self) -> Option<usize> { Some(self.chars().count()) }
}

macro_rules! int_field {
    ($($t:ty => $k:ident),* $(,)?) => {$(
        impl FieldValue for $t {
            fn kind() -> FieldKind { FieldKind::Int(IntKind::$k) }

            fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
                let Value::Number(n) = node else {
                    return Err(mismatch::<Self>(path, node));
                };
                match value::numeric(n) {
                    Some(Numeric::Int(i)) => <$t>::try_from(i).map_err(|_| {
                        MapError::mismatch(
                            path,
                            Self::kind(),
                            format!("integer {i} outside [{} : {}]", IntKind::$k.min(), IntKind::$k.max()),
                        )
                    }),
                    _ => Err(mismatch::<Self>(path, node)),
                }
            }

            fn to_node(&self) -> Result<Value, MapError> { Ok(Value::from(*self)) }

            fn numeric(&self) -> Option<Numeric> { Some(Numeric::from(*self)) }
        }
    )*};
}

int_field!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize,
);

macro_rules! float_field {
    ($($t:ty => $k:ident),* $(,)?) => {$(
        impl FieldValue for $t {
            fn kind() -> FieldKind { FieldKind::Float(FloatKind::$k) }

            fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
                let x = node.as_f64().ok_or_else(|| mismatch::<Self>(path, node))?;
                if !FloatKind::$k.contains(x) {
                    return Err(MapError::mismatch(path, Self::kind(), format!("number {x} outside the {} range", FloatKind::$k)));
                }
                Ok(x as $t)
            }

            // non-finite values have no JSON form and become null
            fn to_node(&self) -> Result<Value, MapError> { Ok(Value::from(*self)) }

            fn numeric(&self) -> Option<Numeric> { Some(Numeric::from(*self)) }
        }
    )*};
}

float_field!(f32 => F32, f64 => F64);

// ------------------------------- Optional --------------------------------- //

impl<T: FieldValue> FieldValue for Option<T> {
    fn kind() -> FieldKind { FieldKind::Optional(Box::new(T::kind())) }

    fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
        match node {
            Value::Null => Ok(None),
            other => T::from_node(other, path).map(Some),
        }
    }

    fn to_node(&self) -> Result<Value, MapError> {
        match self {
            Some(v) => v.to_node(),
            None => Ok(Value::Null),
        }
    }

    fn when_absent() -> Option<Self> { Some(None) }

    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(FieldValue::is_present)
    }

    fn numeric(&self) -> Option<Numeric> { self.as_ref().and_then(FieldValue::numeric) }

    fn length(&self) -> Option<usize> { self.as_ref().and_then(FieldValue::length) }

    fn prepare(seen: &mut HashSet<TypeId>) -> Result<(), MapError> { T::prepare(seen) }

    fn schema(defs: &mut Definitions) -> Result<Value, MapError> {
        Ok(describe::nullable(T::schema(defs)?))
    }
}

// ------------------------------ Sequences --------------------------------- //

macro_rules! sequence_field {
    ($($c:ident),*) => {$(
        impl<T: FieldValue> FieldValue for $c<T> {
            fn kind() -> FieldKind { FieldKind::Sequence(Box::new(T::kind())) }

            fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
                let Value::Array(items) = node else {
                    return Err(mismatch::<Self>(path, node));
                };
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| T::from_node(item, &path.index(i)))
                    .collect()
            }

            fn to_node(&self) -> Result<Value, MapError> {
                let items = self.iter().map(FieldValue::to_node).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(items))
            }

            fn length(&self) -> Option<usize> { Some(self.len()) }

            fn prepare(seen: &mut HashSet<TypeId>) -> Result<(), MapError> { T::prepare(seen) }

            fn schema(defs: &mut Definitions) -> Result<Value, MapError> {
                Ok(serde_json::json!({ "type": "array", "items": T::schema(defs)? }))
            }
        }
    )*};
}

sequence_field!(Vec, VecDeque, LinkedList);

// --------------------------------- Maps ----------------------------------- //

macro_rules! map_field {
    ($($c:ident),*) => {$(
        impl<T: FieldValue> FieldValue for $c<String, T> {
            fn kind() -> FieldKind { FieldKind::Map(Box::new(T::kind())) }

            fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
                let Value::Object(entries) = node else {
                    return Err(mismatch::<Self>(path, node));
                };
                entries
                    .iter()
                    .map(|(k, v)| -> Result<(String, T), MapError> {
                        Ok((k.clone(), T::from_node(v, &path.key(k))?))
                    })
                    .collect()
            }

            fn to_node(&self) -> Result<Value, MapError> {
                let mut out = Map::new();
                for (k, v) in self {
                    out.insert(k.clone(), v.to_node()?);
                }
                Ok(Value::Object(out))
            }

            fn length(&self) -> Option<usize> { Some(self.len()) }

            fn prepare(seen: &mut HashSet<TypeId>) -> Result<(), MapError> { T::prepare(seen) }

            fn schema(defs: &mut Definitions) -> Result<Value, MapError> {
                Ok(serde_json::json!({ "type": "object", "additionalProperties": T::schema(defs)? }))
            }
        }
    )*};
}

map_field!(BTreeMap, IndexMap);

// ------------------------------- Structs ---------------------------------- //

impl<T: Mapped> FieldValue for T {
    fn kind() -> FieldKind { FieldKind::Struct(T::NAME) }

    fn from_node(node: &Value, path: &FieldPath) -> Result<Self, MapError> {
        mapping::read_struct(node, path)
    }

    fn to_node(&self) -> Result<Value, MapError> {
        mapping::write_struct(self)
    }

    fn prepare(seen: &mut HashSet<TypeId>) -> Result<(), MapError> {
        if !seen.insert(TypeId::of::<T>()) {
            return Ok(());
        }
        let registry = registry::registry::<T>()?;
        for binding in registry.bindings() {
            binding.prepare(seen)?;
        }
        Ok(())
    }

    fn schema(defs: &mut Definitions) -> Result<Value, MapError> {
        describe::reference::<T>(defs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(key: &str) -> FieldPath { FieldPath::root().key(key) }

    #[test]
    fn integers_reject_strings_floats_and_overflow() {
        assert_eq!(i32::from_node(&json!(-7), &at("x")).unwrap(), -7);
        assert!(i32::from_node(&json!("7"), &at("x")).unwrap_err().is_type_mismatch());
        assert!(i32::from_node(&json!(2.5), &at("x")).unwrap_err().is_type_mismatch());

        let err = u8::from_node(&json!(256), &at("x")).unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("integer 256 outside [0 : 255]"), "{err}");
        assert!(u32::from_node(&json!(-1), &at("x")).is_err());
        assert_eq!(u64::from_node(&json!(u64::MAX), &at("x")).unwrap(), u64::MAX);
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(f64::from_node(&json!(3), &at("x")).unwrap(), 3.0);
        assert_eq!(f32::from_node(&json!(0.5), &at("x")).unwrap(), 0.5);
        assert!(f32::from_node(&json!(1e300), &at("x")).unwrap_err().is_type_mismatch());
        assert!(f64::from_node(&json!(true), &at("x")).is_err());
    }

    #[test]
    fn optional_null_and_absent_are_none() {
        assert_eq!(Option::<i32>::from_node(&json!(null), &at("x")).unwrap(), None);
        assert_eq!(Option::<i32>::from_node(&json!(4), &at("x")).unwrap(), Some(4));
        assert_eq!(Option::<i32>::when_absent(), Some(None));
        assert_eq!(i32::when_absent(), None);
        assert!(!None::<i32>.is_present());
        assert_eq!(Some(3u8).numeric(), Some(Numeric::Int(3)));
        assert!(i32::from_node(&json!(null), &at("x")).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn sequences_keep_order_and_index_errors() {
        let colors = Vec::<String>::from_node(&json!(["#9B0F02", "#FFFFFF"]), &at("colors")).unwrap();
        assert_eq!(colors, ["#9B0F02", "#FFFFFF"]);

        let list = LinkedList::<i64>::from_node(&json!([3, 1, 2]), &at("xs")).unwrap();
        assert_eq!(list.into_iter().collect::<Vec<_>>(), [3, 1, 2]);

        let err = VecDeque::<i32>::from_node(&json!([1, "two"]), &at("xs")).unwrap_err();
        assert_eq!(err.field(), Some("xs[1]"));

        let err = Vec::<i32>::from_node(&json!(5), &at("xs")).unwrap_err();
        assert!(err.to_string().contains("expected sequence of i32, found integer 5"), "{err}");
    }

    #[test]
    fn maps_keep_document_order() {
        let m = IndexMap::<String, u16>::from_node(&json!({"z": 1, "a": 2}), &at("m")).unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), ["z", "a"]);
        assert_eq!(m.to_node().unwrap(), json!({"z": 1, "a": 2}));

        let err = BTreeMap::<String, u16>::from_node(&json!({"k": -1}), &at("m")).unwrap_err();
        assert_eq!(err.field(), Some("m.k"));

        let err = IndexMap::<String, u16>::from_node(&json!({"a.b": "x"}), &at("m")).unwrap_err();
        assert_eq!(err.field(), Some(r#"m["a.b"]"#));
    }

    #[test]
    fn non_finite_floats_serialize_as_null() {
        assert_eq!(f64::NAN.to_node().unwrap(), Value::Null);
        assert_eq!(1.5f32.to_node().unwrap(), json!(1.5));
    }
}

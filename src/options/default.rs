use serde_json::Value;

use crate::error::MapError;
use crate::field::FieldValue;
use crate::path::FieldPath;

/// JSON value used in place of a missing key. It must convert into the
/// field's type; the field's other options still run on it.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue(Value);

impl DefaultValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Value { &self.0 }

    pub fn check<F: FieldValue>(&self, field: &str) -> Result<(), MapError> {
        F::from_node(&self.0, &FieldPath::label(field))
            .map(|_| ())
            .map_err(|err| MapError::config(field, format!("option Default: {err}")))
    }
}

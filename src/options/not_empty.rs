use crate::error::MapError;
use crate::kind::FieldKind;

/// Rejects empty strings, sequences and maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotEmpty;

impl NotEmpty {
    pub fn check(&self, kind: &FieldKind, field: &str) -> Result<(), MapError> {
        match kind.unwrap_optional() {
            FieldKind::String | FieldKind::Sequence(_) | FieldKind::Map(_) => Ok(()),
            other => Err(MapError::config(
                field,
                format!("option NotEmpty: can only be applied to strings, sequences or maps, not {other}"),
            )),
        }
    }

    pub(crate) fn violation(&self, shown: String, field: &str) -> MapError {
        MapError::validation(field, shown, "must not be empty")
    }
}

//! Per-field validators.
//!
//! Each option is checked twice:
//! - once at registration, against the declared type of the bound field;
//! - once per value during a mapping pass, after the node is converted.
//!
//! Options run in attachment order and the first failure aborts the pass.
//! Absent optionals skip every check.
pub mod bounds;
pub mod default;
pub mod not_empty;

use crate::error::MapError;
use crate::field::FieldValue;

pub use bounds::Bounds;
pub use default::DefaultValue;
pub use not_empty::NotEmpty;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOption {
    Bounds(Bounds),
    NotEmpty(NotEmpty),
    Default(DefaultValue),
}

impl FieldOption {
    pub fn name(&self) -> &'static str {
        match self {
            FieldOption::Bounds(_) => "Bounds",
            FieldOption::NotEmpty(_) => "NotEmpty",
            FieldOption::Default(_) => "Default",
        }
    }

    /// Registration-time applicability check against the field type `F`.
    pub fn check<F: FieldValue>(&self, field: &str) -> Result<(), MapError> {
        match self {
            FieldOption::Bounds(bounds) => bounds.check(&F::kind(), field),
            FieldOption::NotEmpty(not_empty) => not_empty.check(&F::kind(), field),
            FieldOption::Default(default) => default.check::<F>(field),
        }
    }

    /// Value-time check. `field` is the path reported on failure.
    pub fn validate<F: FieldValue>(&self, value: &F, field: &str) -> Result<(), MapError> {
        if !value.is_present() {
            return Ok(());
        }
        match self {
            FieldOption::Bounds(bounds) => match value.numeric() {
                Some(n) => bounds.validate(n, &F::kind(), field),
                None => Ok(()),
            },
            FieldOption::NotEmpty(not_empty) => {
                if value.length() == Some(0) {
                    let shown = value.to_node()?.to_string();
                    return Err(not_empty.violation(shown, field));
                }
                Ok(())
            }
            FieldOption::Default(_) => Ok(()),
        }
    }
}

impl From<Bounds> for FieldOption {
    fn from(option: Bounds) -> Self { FieldOption::Bounds(option) }
}

impl From<NotEmpty> for FieldOption {
    fn from(option: NotEmpty) -> Self { FieldOption::NotEmpty(option) }
}

impl From<DefaultValue> for FieldOption {
    fn from(option: DefaultValue) -> Self { FieldOption::Default(option) }
}

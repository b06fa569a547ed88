//! Bind struct members to JSON keys at runtime and move data between JSON text
//! and native structs, validating per-field options on the way in.
//!
//! ```ignore
//! impl Mapped for Shape {
//!     const NAME: &'static str = "Shape";
//!
//!     fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
//!         fields.reg("type", |s| &s.kind, |s| &mut s.kind)?;
//!         fields.reg("strokeWidth", |s| &s.stroke_width, |s| &mut s.stroke_width)?
//!             .attach(Bounds::new(0, 100))?;
//!         Ok(())
//!     }
//! }
//!
//! let shape: Shape = from_json_str(r#"{"type": "RECTANGLE", "strokeWidth": 2}"#)?;
//! ```
pub mod describe;
pub mod error;
pub mod field;
pub mod kind;
pub mod mapping;
pub mod options;
pub mod path;
pub mod registry;
pub mod scene;
pub mod value;

pub use describe::describe;
pub use error::MapError;
pub use field::FieldValue;
pub use kind::{FieldKind, FloatKind, IntKind, Numeric};
pub use mapping::{
    from_json_str, from_reader, from_value, map_json_to_struct, map_struct_to_json,
    map_struct_to_json_pretty, to_value,
};
pub use options::{Bounds, DefaultValue, FieldOption, NotEmpty};
pub use path::FieldPath;
pub use registry::{ensure_registered, registry, FieldHandle, FieldInfo, FieldRegistry, Fields, Mapped};

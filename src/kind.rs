// Declared semantic types of bound members. No serde_json::Value here.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int(IntKind),
    Float(FloatKind),
    String,
    Optional(Box<FieldKind>),   // absent or null -> None
    Sequence(Box<FieldKind>),   // JSON array, homogeneous elements
    Map(Box<FieldKind>),        // JSON object with arbitrary string keys
    Struct(&'static str),       // resolved through the type's own registry
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind { I8, I16, I32, I64, Isize, U8, U16, U32, U64, Usize }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind { F32, F64 }

/// A number in integer or floating form. `i128` holds every native integer
/// width exactly, so integer comparisons never overflow or round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i128),
    Float(f64),
}

impl FieldKind {
    /// Strip any `Optional` wrappers.
    pub fn unwrap_optional(&self) -> &FieldKind {
        match self {
            FieldKind::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool { matches!(self, FieldKind::Optional(_)) }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Int(_) | FieldKind::Float(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => f.write_str("bool"),
            FieldKind::Int(k) => write!(f, "{k}"),
            FieldKind::Float(k) => write!(f, "{k}"),
            FieldKind::String => f.write_str("string"),
            FieldKind::Optional(inner) => write!(f, "optional {inner}"),
            FieldKind::Sequence(inner) => write!(f, "sequence of {inner}"),
            FieldKind::Map(inner) => write!(f, "map of {inner}"),
            FieldKind::Struct(name) => write!(f, "struct {name}"),
        }
    }
}

impl IntKind {
    pub fn min(self) -> i128 {
        match self {
            IntKind::I8 => i8::MIN as i128,
            IntKind::I16 => i16::MIN as i128,
            IntKind::I32 => i32::MIN as i128,
            IntKind::I64 => i64::MIN as i128,
            IntKind::Isize => isize::MIN as i128,
            IntKind::U8 | IntKind::U16 | IntKind::U32 | IntKind::U64 | IntKind::Usize => 0,
        }
    }

    pub fn max(self) -> i128 {
        match self {
            IntKind::I8 => i8::MAX as i128,
            IntKind::I16 => i16::MAX as i128,
            IntKind::I32 => i32::MAX as i128,
            IntKind::I64 => i64::MAX as i128,
            IntKind::Isize => isize::MAX as i128,
            IntKind::U8 => u8::MAX as i128,
            IntKind::U16 => u16::MAX as i128,
            IntKind::U32 => u32::MAX as i128,
            IntKind::U64 => u64::MAX as i128,
            IntKind::Usize => usize::MAX as i128,
        }
    }

    pub fn contains(self, value: i128) -> bool {
        self.min() <= value && value <= self.max()
    }

    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::Usize => "usize",
        }
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FloatKind {
    /// Largest finite magnitude; the representable range is `[-max, max]`.
    pub fn max(self) -> f64 {
        match self {
            FloatKind::F32 => f32::MAX as f64,
            FloatKind::F64 => f64::MAX,
        }
    }

    pub fn contains(self, value: f64) -> bool {
        -self.max() <= value && value <= self.max()
    }

    pub fn name(self) -> &'static str {
        match self {
            FloatKind::F32 => "f32",
            FloatKind::F64 => "f64",
        }
    }
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Numeric {
    pub fn is_int(&self) -> bool { matches!(self, Numeric::Int(_)) }

    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(x) => x,
        }
    }

    /// `true` when `self <= other`, comparing exactly when both are integers.
    pub fn le(self, other: Numeric) -> bool {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a <= b,
            (a, b) => a.as_f64() <= b.as_f64(),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(i) => write!(f, "{i}"),
            Numeric::Float(x) => write!(f, "{x}"),
        }
    }
}

macro_rules! numeric_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Numeric {
            fn from(v: $t) -> Self { Numeric::Int(v as i128) }
        }
    )*};
}

numeric_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for Numeric {
    fn from(v: f32) -> Self { Numeric::Float(v as f64) }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self { Numeric::Float(v) }
}

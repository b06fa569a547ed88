use std::fmt;

/// Location of a field inside the document, used as error context
/// (`elements[1].props.x`). The root is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn root() -> Self { Self::default() }

    pub fn is_root(&self) -> bool { self.0.is_empty() }

    /// Registration-time context such as `Shape.strokeWidth`, taken verbatim.
    pub(crate) fn label(text: &str) -> Self { Self(text.to_string()) }

    /// Child path for an object key. Keys that would read ambiguously are
    /// quoted: `m["a.b"]`.
    pub fn key(&self, key: &str) -> Self {
        if needs_quoting(key) {
            Self(format!("{}[{key:?}]", self.0))
        } else if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    /// Child path for a sequence element.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    pub fn as_str(&self) -> &str {
        if self.0.is_empty() { "$" } else { &self.0 }
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.chars().any(|c| matches!(c, '.' | '[' | ']' | '"') || c.is_whitespace())
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&FieldPath> for String {
    fn from(path: &FieldPath) -> Self {
        path.as_str().to_string()
    }
}

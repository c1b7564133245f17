//! Kind classification and numeric compatibility for tree nodes.

use std::fmt;

use super::TreeValue;

/// Structural kind of a [`TreeValue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// `null`.
    Null,
    /// `true` or `false`.
    Bool,
    /// Integer or floating-point number.
    Number,
    /// UTF-8 string.
    String,
    /// Ordered sequence.
    Sequence,
    /// String-keyed map.
    Map,
}

impl ValueKind {
    /// Classify `value`.
    #[must_use]
    pub const fn of(value: &TreeValue) -> Self {
        match value {
            TreeValue::Null => Self::Null,
            TreeValue::Bool(_) => Self::Bool,
            TreeValue::Number(_) => Self::Number,
            TreeValue::String(_) => Self::String,
            TreeValue::Array(_) => Self::Sequence,
            TreeValue::Object(_) => Self::Map,
        }
    }

    /// Lower-case name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether two nodes have compatible kinds.
///
/// Integers and floats share [`ValueKind::Number`], so any integer/float pair
/// is compatible; every other kind must match exactly.
#[must_use]
pub fn kinds_compatible(reference: &TreeValue, actual: &TreeValue) -> bool {
    ValueKind::of(reference) == ValueKind::of(actual)
}

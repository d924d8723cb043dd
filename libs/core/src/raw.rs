//! The raw result of a single location lookup.

use serde_json::Value;

/// A raw value pulled from one request location.
///
/// `Missing` means the field was absent from the input, which is distinct
/// from an explicit JSON `null` (`Present(Value::Null)`). Location lookups
/// never fail: a request with no parseable body for a source resolves to
/// `Missing` rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    /// The field was absent from the input.
    Missing,
    /// The field was present, possibly as an explicit `null`.
    Present(Value),
}

impl Raw {
    pub fn is_missing(&self) -> bool {
        matches!(self, Raw::Missing)
    }

    /// Wrap an optional lookup result, mapping `None` to `Missing`.
    pub fn from_option(value: Option<Value>) -> Self {
        match value {
            Some(v) => Raw::Present(v),
            None => Raw::Missing,
        }
    }
}

impl From<Value> for Raw {
    fn from(value: Value) -> Self {
        Raw::Present(value)
    }
}

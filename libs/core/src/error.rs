//! Aggregate validation failure.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// All per-field validation failures from one parse, keyed by the declared
/// field name. Individual field failures are never surfaced on their own;
/// the parser always aggregates them into one of these.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("validation failed for {} field(s)", messages.len())]
pub struct ValidationError {
    /// Field name to the list of error messages collected for it.
    pub messages: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new(messages: BTreeMap<String, Vec<String>>) -> Self {
        Self { messages }
    }

    /// Single-field constructor, mostly useful in tests.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut messages = BTreeMap::new();
        messages.insert(field.into(), vec![message.into()]);
        Self { messages }
    }
}

//! The aggregate parse loop.

use crate::error::ValidationError;
use crate::location::Location;
use crate::raw::Raw;
use crate::schema::{Parsed, Schema};
use crate::source::RequestSource;
use std::collections::BTreeMap;

/// Pulls raw values out of a [`RequestSource`] and runs them through a
/// [`Schema`].
///
/// The parser holds no per-request state; one instance (or
/// `Parser::default()`) serves any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Parser {
    default_location: Location,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            default_location: Location::Json,
        }
    }
}

impl Parser {
    pub fn new(default_location: Location) -> Self {
        Self { default_location }
    }

    /// Parse every field of `schema` out of `source`.
    ///
    /// Successes land in the output keyed by the declared field name;
    /// failures are aggregated per field and returned as one
    /// [`ValidationError`]. A single field error is never surfaced alone.
    pub fn parse<S: RequestSource>(
        &self,
        source: &S,
        schema: &Schema,
    ) -> Result<Parsed, ValidationError> {
        let mut out = Parsed::new();
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (name, field) in schema.fields() {
            let location = field.location_ref().unwrap_or(self.default_location);
            let raw = self.lookup(source, location, field.data_key_ref(), name);

            match field.deserialize(&raw) {
                Ok(Some(value)) => out.insert(name.to_string(), value),
                Ok(None) => {}
                Err(msgs) => {
                    errors.insert(name.to_string(), msgs);
                }
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            tracing::debug!(fields = errors.len(), "argument validation failed");
            Err(ValidationError::new(errors))
        }
    }

    /// One location lookup: data_key alias first, declared name fallback.
    fn lookup<S: RequestSource>(
        &self,
        source: &S,
        location: Location,
        data_key: Option<&str>,
        name: &str,
    ) -> Raw {
        if let Some(key) = data_key {
            let raw = source.lookup(location, key);
            if !raw.is_missing() {
                return raw;
            }
        }
        source.lookup(location, name)
    }
}

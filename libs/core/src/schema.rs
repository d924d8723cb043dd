//! Argument maps and parse output.

use crate::error::ValidationError;
use crate::fields::Field;
use crate::raw::Raw;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A declarative argument map: ordered field name → [`Field`].
///
/// Schemas are immutable once built and `Send + Sync`, so a single
/// instance can be shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<(String, Field)>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Deserialize a JSON object through the schema.
    ///
    /// Each field is looked up under its data_key alias first, then under
    /// its declared name. Used for nested fields and anywhere a full JSON
    /// document stands in for a request.
    pub fn load(&self, value: &Value) -> Result<Parsed, ValidationError> {
        let object = value.as_object();
        let mut out = Parsed::new();
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (name, field) in self.fields() {
            let raw = match object {
                Some(map) => lookup_keyed(map, field.data_key_ref(), name),
                None => Raw::Missing,
            };
            match field.deserialize(&raw) {
                Ok(Some(parsed)) => out.insert(name.to_string(), parsed),
                Ok(None) => {}
                Err(msgs) => {
                    errors.insert(name.to_string(), msgs);
                }
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(ValidationError::new(errors))
        }
    }
}

/// Pull a field out of a JSON object, alias first, declared name second.
fn lookup_keyed(map: &Map<String, Value>, data_key: Option<&str>, name: &str) -> Raw {
    if let Some(key) = data_key {
        if let Some(value) = map.get(key) {
            return Raw::Present(value.clone());
        }
    }
    Raw::from_option(map.get(name).cloned())
}

/// Builder for [`Schema`]. Field order is preserved.
pub struct SchemaBuilder {
    fields: Vec<(String, Field)>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }
}

/// Parse output: an ordered field name → coerced value map.
///
/// Missing optional fields have no entry at all, so "absent" is
/// observable as absence rather than as `null`. Serializes transparently
/// to a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parsed {
    entries: Map<String, Value>,
}

impl Parsed {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) {
        self.entries.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }

    /// Convert into any deserializable type; the typed-argument analog of
    /// binding parsed args to handler keywords. Missing optional fields
    /// fall back to whatever the target type defaults them to.
    pub fn deserialize_into<T: serde::de::DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.entries))
    }
}

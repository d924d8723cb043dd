//! Field definitions: per-argument coercion and validation.

use crate::location::Location;
use crate::raw::Raw;
use crate::schema::Schema;
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// Stock error messages. The exact strings are part of the public
/// contract: clients match on them.
pub mod messages {
    pub const NOT_A_VALID_INTEGER: &str = "Not a valid integer.";
    pub const NOT_A_VALID_NUMBER: &str = "Not a valid number.";
    pub const NOT_A_VALID_BOOLEAN: &str = "Not a valid boolean.";
    pub const NOT_A_VALID_STRING: &str = "Not a valid string.";
    pub const NOT_A_VALID_LIST: &str = "Not a valid list.";
    pub const INVALID_INPUT_TYPE: &str = "Invalid input type.";
    pub const MISSING_REQUIRED: &str = "Missing data for required field.";
    pub const MAY_NOT_BE_NULL: &str = "Field may not be null.";
    pub const INVALID_VALUE: &str = "Invalid value.";
}

/// String forms accepted by [`Field::boolean`], case-insensitive.
const TRUTHY: &[&str] = &["true", "1", "on", "y", "yes", "t"];
const FALSY: &[&str] = &["false", "0", "off", "n", "no", "f"];

type ValidatorFn = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// How a field's raw value is coerced before validators run.
#[derive(Clone)]
enum Kind {
    Integer,
    Float,
    Boolean,
    Str,
    /// No coercion; the raw JSON value passes through untouched.
    Any,
    List(Box<Field>),
    Nested(Schema),
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Str => "string",
            Kind::Any => "any",
            Kind::List(_) => "list",
            Kind::Nested(_) => "nested",
        }
    }
}

/// One expected argument: its coercion kind, where it is read from, an
/// optional external alias, and any user validators.
///
/// Fields are built with the `Field::integer()`-style constructors plus
/// chained builder methods, and are `Send + Sync` so a schema holding
/// them can serve concurrent requests.
#[derive(Clone)]
pub struct Field {
    kind: Kind,
    required: bool,
    allow_none: bool,
    data_key: Option<String>,
    location: Option<Location>,
    validators: Vec<ValidatorFn>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("kind", &self.kind.name())
            .field("required", &self.required)
            .field("allow_none", &self.allow_none)
            .field("data_key", &self.data_key)
            .field("location", &self.location)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl Field {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            required: false,
            allow_none: false,
            data_key: None,
            location: None,
            validators: Vec::new(),
        }
    }

    /// Integer field. Accepts JSON integers, integral floats, and strings
    /// parseable as `i64`; anything else fails with
    /// `"Not a valid integer."`.
    pub fn integer() -> Self {
        Self::new(Kind::Integer)
    }

    /// Float field. Accepts JSON numbers and strings parseable as `f64`.
    pub fn float() -> Self {
        Self::new(Kind::Float)
    }

    /// Boolean field. Accepts JSON booleans, `0`/`1`, and the usual
    /// truthy/falsy string forms (`"true"`, `"no"`, `"on"`, ...).
    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    /// String field. Accepts JSON strings only.
    pub fn string() -> Self {
        Self::new(Kind::Str)
    }

    /// Passthrough field: any JSON value is accepted uncoerced.
    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    /// List field; each element is coerced by `element`.
    pub fn list(element: Field) -> Self {
        Self::new(Kind::List(Box::new(element)))
    }

    /// Nested-object field loaded through `schema`.
    pub fn nested(schema: Schema) -> Self {
        Self::new(Kind::Nested(schema))
    }

    /// Mark the field required: a missing value becomes an error instead
    /// of being dropped from the output.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept an explicit JSON `null` (validators are skipped for it).
    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    /// External alias the field is looked up under. Lookup tries the
    /// alias first and falls back to the declared field name; output is
    /// always keyed by the declared name.
    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    /// Override the location this field is read from. Defaults to the
    /// parser's default location (the JSON body).
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a validator run after coercion. All failing validator
    /// messages for a field are collected, not just the first.
    pub fn validator(
        mut self,
        f: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Arc::new(f));
        self
    }

    /// Attach a boolean predicate validator; `false` yields the stock
    /// `"Invalid value."` message.
    pub fn predicate(self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validator(move |value| {
            if f(value) {
                Ok(())
            } else {
                Err(messages::INVALID_VALUE.to_string())
            }
        })
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn data_key_ref(&self) -> Option<&str> {
        self.data_key.as_deref()
    }

    pub fn location_ref(&self) -> Option<Location> {
        self.location
    }

    /// Deserialize one raw lookup result.
    ///
    /// `Ok(None)` means the optional field was absent and must be omitted
    /// from the output map. Errors carry every message collected for the
    /// field.
    pub fn deserialize(&self, raw: &Raw) -> Result<Option<Value>, Vec<String>> {
        match raw {
            Raw::Missing => {
                if self.required {
                    Err(vec![messages::MISSING_REQUIRED.to_string()])
                } else {
                    Ok(None)
                }
            }
            Raw::Present(Value::Null) => {
                if self.allow_none {
                    Ok(Some(Value::Null))
                } else {
                    Err(vec![messages::MAY_NOT_BE_NULL.to_string()])
                }
            }
            Raw::Present(value) => self.check(value).map(Some),
        }
    }

    /// Coerce a present, non-null value and run the validators.
    fn check(&self, value: &Value) -> Result<Value, Vec<String>> {
        let coerced = self.coerce(value).map_err(|msg| vec![msg])?;
        let mut errors = Vec::new();
        for validate in &self.validators {
            if let Err(msg) = validate(&coerced) {
                errors.push(msg);
            }
        }
        if errors.is_empty() {
            Ok(coerced)
        } else {
            Err(errors)
        }
    }

    fn coerce(&self, value: &Value) -> Result<Value, String> {
        match &self.kind {
            Kind::Integer => coerce_integer(value),
            Kind::Float => coerce_float(value),
            Kind::Boolean => coerce_boolean(value),
            Kind::Str => coerce_string(value),
            Kind::Any => Ok(value.clone()),
            Kind::List(element) => coerce_list(element, value),
            Kind::Nested(schema) => coerce_nested(schema, value),
        }
    }
}

fn coerce_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                // Integral floats pass (42.0 -> 42); anything with a
                // fractional part does not.
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(Value::from(f as i64))
                } else {
                    Err(messages::NOT_A_VALID_INTEGER.to_string())
                }
            } else {
                Err(messages::NOT_A_VALID_INTEGER.to_string())
            }
        }
        Value::String(s) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| messages::NOT_A_VALID_INTEGER.to_string()),
        _ => Err(messages::NOT_A_VALID_INTEGER.to_string()),
    }
}

fn coerce_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => {
            let parsed = s
                .parse::<f64>()
                .map_err(|_| messages::NOT_A_VALID_NUMBER.to_string())?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| messages::NOT_A_VALID_NUMBER.to_string())
        }
        _ => Err(messages::NOT_A_VALID_NUMBER.to_string()),
    }
}

fn coerce_boolean(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(messages::NOT_A_VALID_BOOLEAN.to_string()),
        },
        Value::String(s) => {
            let lower = s.to_ascii_lowercase();
            if TRUTHY.contains(&lower.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSY.contains(&lower.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(messages::NOT_A_VALID_BOOLEAN.to_string())
            }
        }
        _ => Err(messages::NOT_A_VALID_BOOLEAN.to_string()),
    }
}

fn coerce_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        _ => Err(messages::NOT_A_VALID_STRING.to_string()),
    }
}

fn coerce_list(element: &Field, value: &Value) -> Result<Value, String> {
    let items = value
        .as_array()
        .ok_or_else(|| messages::NOT_A_VALID_LIST.to_string())?;

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match element.deserialize(&Raw::Present(item.clone())) {
            Ok(Some(coerced)) => out.push(coerced),
            Ok(None) => out.push(Value::Null),
            // Inner failures flatten to "<index>: <message>" so the error
            // payload stays a flat name -> list-of-strings map.
            Err(msgs) => return Err(format!("{}: {}", index, msgs.join(" "))),
        }
    }
    Ok(Value::Array(out))
}

fn coerce_nested(schema: &Schema, value: &Value) -> Result<Value, String> {
    if !value.is_object() {
        return Err(messages::INVALID_INPUT_TYPE.to_string());
    }
    match schema.load(value) {
        Ok(parsed) => Ok(parsed.to_value()),
        Err(err) => {
            let mut flat: Vec<String> = Vec::new();
            for (key, msgs) in &err.messages {
                flat.push(format!("{}: {}", key, msgs.join(" ")));
            }
            Err(flat.join("; "))
        }
    }
}

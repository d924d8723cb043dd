//! In-memory request source for tests.

use crate::raw::Raw;
use crate::source::RequestSource;
use serde_json::Value;
use std::collections::BTreeMap;

/// A [`RequestSource`] backed by plain maps, one per location.
///
/// Useful for exercising schemas and parsers without a hosting
/// framework; adapter crates test against real requests instead.
#[derive(Debug, Clone, Default)]
pub struct StubRequest {
    view_args: BTreeMap<String, Value>,
    query: BTreeMap<String, String>,
    form: BTreeMap<String, String>,
    json: Option<Value>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl StubRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view_arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.view_args.insert(name.into(), value);
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    /// Set the parsed JSON body. `Value::Null` still counts as a body;
    /// use a fresh `StubRequest` to model "no body".
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl RequestSource for StubRequest {
    fn view_arg(&self, name: &str) -> Raw {
        Raw::from_option(self.view_args.get(name).cloned())
    }

    fn query(&self, name: &str) -> Raw {
        Raw::from_option(self.query.get(name).map(|v| Value::String(v.clone())))
    }

    fn form(&self, name: &str) -> Raw {
        Raw::from_option(self.form.get(name).map(|v| Value::String(v.clone())))
    }

    fn json(&self, name: &str) -> Raw {
        match self.json.as_ref().and_then(|body| body.get(name)) {
            Some(value) => Raw::Present(value.clone()),
            None => Raw::Missing,
        }
    }

    fn header(&self, name: &str) -> Raw {
        let key = name.to_ascii_lowercase();
        Raw::from_option(self.headers.get(&key).map(|v| Value::String(v.clone())))
    }

    fn cookie(&self, name: &str) -> Raw {
        Raw::from_option(self.cookies.get(name).map(|v| Value::String(v.clone())))
    }
}

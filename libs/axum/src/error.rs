//! HTTP error values with a serializable data payload.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cribrum_core::ValidationError;
use serde_json::{Map, Value};
use std::fmt;

/// A framework-native HTTP error: a status code plus a JSON-object data
/// payload rendered to the client.
///
/// The payload holds plain JSON only (`message`, `messages`, any extras).
/// The originating [`ValidationError`], when there is one, rides on the
/// error value itself and chains through [`std::error::Error::source`] —
/// it is never serialized into the payload.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    data: Map<String, Value>,
    source: Option<ValidationError>,
}

/// Build an [`HttpError`] for an arbitrary status code.
///
/// ```
/// use axum::http::StatusCode;
/// use cribrum_axum::abort;
///
/// let err = abort(StatusCode::BAD_REQUEST).with_message("custom error message");
/// assert_eq!(err.data()["message"], "custom error message");
/// ```
pub fn abort(status: StatusCode) -> HttpError {
    HttpError::new(status)
}

impl HttpError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            data: Map::new(),
            source: None,
        }
    }

    /// Set the human-readable `"message"` entry of the payload.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.data
            .insert("message".to_string(), Value::String(message.into()));
        self
    }

    /// Attach an arbitrary payload entry. The value must already be plain
    /// JSON; there is no escape hatch for non-serializable extras.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Attach the originating validation error for introspection. Kept
    /// alongside the payload, not inside it.
    pub fn with_source(mut self, source: ValidationError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The JSON payload rendered to the client.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The originating validation error, if this error came from a parse.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.source.as_ref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(Value::String(message)) = self.data.get("message") {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "internal error: {}", self);
        }
        (self.status, Json(Value::Object(self.data))).into_response()
    }
}

//! Parse entry points: core parsing plus 422 translation.

use crate::error::{abort, HttpError};
use crate::request::RequestSnapshot;
use axum::http::StatusCode;
use cribrum_core::{Parsed, Parser, Schema, ValidationError};
use serde_json::{Map, Value};

/// Parse the request through `schema` with the default parser.
///
/// Validation failures become a 422 [`HttpError`] whose payload carries
/// the per-field `"messages"` map and whose source is the originating
/// [`ValidationError`]. This is the single status-routing decision of the
/// adapter: validation failures are 422, never a generic 400 or 500.
pub fn parse(req: &RequestSnapshot, schema: &Schema) -> Result<Parsed, HttpError> {
    parse_with(&Parser::default(), req, schema)
}

/// [`parse`] with an explicit parser (e.g. a different default location).
pub fn parse_with(
    parser: &Parser,
    req: &RequestSnapshot,
    schema: &Schema,
) -> Result<Parsed, HttpError> {
    parser.parse(req, schema).map_err(validation_abort)
}

/// Parse and bind the result to a deserializable type.
pub fn parse_into<T>(req: &RequestSnapshot, schema: &Schema) -> Result<T, HttpError>
where
    T: serde::de::DeserializeOwned,
{
    let parsed = parse(req, schema)?;
    parsed.deserialize_into().map_err(|err| {
        abort(StatusCode::UNPROCESSABLE_ENTITY).with_message(err.to_string())
    })
}

fn validation_abort(err: ValidationError) -> HttpError {
    let mut messages = Map::new();
    for (field, msgs) in &err.messages {
        messages.insert(
            field.clone(),
            Value::Array(msgs.iter().map(|m| Value::String(m.clone())).collect()),
        );
    }
    abort(StatusCode::UNPROCESSABLE_ENTITY)
        .with_extra("messages", Value::Object(messages))
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
    use bytes::Bytes;
    use cribrum_core::Field;
    use serde_json::json;

    fn json_request(body: &Value) -> RequestSnapshot {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        RequestSnapshot::new(
            Method::POST,
            Uri::from_static("/foo"),
            headers,
            Vec::new(),
            Bytes::from(serde_json::to_vec(body).expect("serialize test body")),
        )
    }

    #[test]
    fn validation_failure_aborts_with_422() {
        let schema = Schema::builder()
            .field("value", Field::any().predicate(|v| v == &json!(42)))
            .build();
        let req = json_request(&json!({ "value": 41 }));

        let err = parse(&req, &schema).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.data()["messages"]["value"],
            json!(["Invalid value."]),
        );
        // The attached error is the validation error itself.
        let source = err.validation_error().expect("validation source");
        assert_eq!(
            source.messages.get("value").unwrap(),
            &vec!["Invalid value.".to_string()]
        );
    }

    #[test]
    fn successful_parse_returns_coerced_values() {
        let schema = Schema::builder()
            .field("value", Field::integer().required())
            .build();
        let req = json_request(&json!({ "value": "42" }));

        let parsed = parse(&req, &schema).unwrap();
        assert_eq!(parsed.get("value"), Some(&json!(42)));
    }

    #[test]
    fn parse_into_binds_a_struct() {
        #[derive(serde::Deserialize)]
        struct Args {
            val: i64,
        }

        let schema = Schema::builder()
            .field("val", Field::integer().required())
            .build();
        let req = json_request(&json!({ "val": 42 }));

        let args: Args = parse_into(&req, &schema).unwrap();
        assert_eq!(args.val, 42);
    }
}

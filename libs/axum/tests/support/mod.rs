use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use cribrum_axum::{parse, parse_into, Field, HttpError, Location, Parsed, RequestSnapshot, Schema};
use serde_json::Value;
use tower::ServiceExt as _;

/// Build the echo router the integration tests drive. Every route parses
/// its arguments and echoes the parsed map (or typed struct) back as JSON.
pub fn echo_router() -> Router {
    Router::new()
        .route("/echo_view_arg/:view_arg", get(echo_view_arg))
        .route("/echo_json", post(echo_json))
        .route("/echo_query", get(echo_query))
        .route("/echo_form", post(echo_form))
        .route("/echo_use_kwargs_missing", post(echo_use_kwargs_missing))
        .route("/echo_nested_many_data_key", post(echo_nested_many_data_key))
        .route("/echo_typed", post(echo_typed))
}

async fn echo_view_arg(req: RequestSnapshot) -> Result<Json<Parsed>, HttpError> {
    let schema = Schema::builder()
        .field("view_arg", Field::integer().location(Location::ViewArgs))
        .build();
    parse(&req, &schema).map(Json)
}

async fn echo_json(req: RequestSnapshot) -> Result<Json<Parsed>, HttpError> {
    let schema = Schema::builder().field("val", Field::integer()).build();
    parse(&req, &schema).map(Json)
}

async fn echo_query(req: RequestSnapshot) -> Result<Json<Parsed>, HttpError> {
    let schema = Schema::builder()
        .field("name", Field::string().location(Location::Query))
        .field("limit", Field::integer().location(Location::Query))
        .build();
    parse(&req, &schema).map(Json)
}

async fn echo_form(req: RequestSnapshot) -> Result<Json<Parsed>, HttpError> {
    let schema = Schema::builder()
        .field("val", Field::integer().location(Location::Form))
        .build();
    parse(&req, &schema).map(Json)
}

async fn echo_use_kwargs_missing(req: RequestSnapshot) -> Result<Json<Parsed>, HttpError> {
    let schema = Schema::builder()
        .field("username", Field::string().required())
        .field("password", Field::string())
        .build();
    parse(&req, &schema).map(Json)
}

async fn echo_nested_many_data_key(req: RequestSnapshot) -> Result<Json<Parsed>, HttpError> {
    let item = Schema::builder().field("id", Field::integer()).build();
    let schema = Schema::builder()
        .field(
            "x_field",
            Field::list(Field::nested(item)).data_key("X-Field"),
        )
        .build();
    parse(&req, &schema).map(Json)
}

async fn echo_typed(req: RequestSnapshot) -> Result<Json<Value>, HttpError> {
    #[derive(serde::Deserialize, serde::Serialize)]
    struct Args {
        val: i64,
        #[serde(default)]
        tag: Option<String>,
    }

    let schema = Schema::builder()
        .field("val", Field::integer().required())
        .field("tag", Field::string())
        .build();
    let args: Args = parse_into(&req, &schema)?;
    Ok(Json(serde_json::json!({ "val": args.val, "tag": args.tag })))
}

/// Dispatch one request against the echo router and collect the response.
pub async fn request(
    method: Method,
    path_and_query: &str,
    body: Option<Bytes>,
) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
    request_with_headers(method, path_and_query, body, &[("content-type", "application/json")])
        .await
}

pub async fn request_with_headers(
    method: Method,
    path_and_query: &str,
    body: Option<Bytes>,
    extra_headers: &[(&str, &str)],
) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
    init_tracing();

    let mut request = Request::builder()
        .method(method)
        .uri(path_and_query)
        .header("host", "example.org")
        .body(match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        })
        .context("build request")?;

    for (name, value) in extra_headers {
        request.headers_mut().insert(
            name.parse::<HeaderName>().context("parse header name")?,
            value.parse::<HeaderValue>().context("parse header value")?,
        );
    }

    let response = echo_router()
        .oneshot(request)
        .await
        .context("dispatch request")?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .context("read response body")?;

    Ok((status, headers, body))
}

pub fn to_json_body(value: &Value) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

pub fn body_json(body: &Bytes) -> anyhow::Result<Value> {
    serde_json::from_slice(body).context("parse response body as JSON")
}

fn init_tracing() {
    use std::sync::OnceLock;
    use tracing_subscriber::prelude::*;
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "cribrum=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}

//! Materialized view of one incoming request.

use crate::error::{abort, HttpError};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, RawPathParams, Request},
    http::{header, HeaderMap, Method, StatusCode, Uri},
};
use cribrum_core::{Raw, RequestSource};
use serde_json::Value;
use std::sync::OnceLock;

/// An owned snapshot of one incoming request: method, URI, headers, route
/// parameters, and the collected body bytes.
///
/// The JSON-body and form-body parses are memoized per snapshot. A
/// snapshot belongs to exactly one request, so the caches are strictly
/// request-scoped: concurrent requests going through one shared
/// [`Schema`](cribrum_core::Schema) can never observe each other's parsed
/// body.
#[derive(Debug)]
pub struct RequestSnapshot {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: Vec<(String, String)>,
    body: Bytes,
    query_cache: OnceLock<Vec<(String, String)>>,
    json_cache: OnceLock<Option<Value>>,
    form_cache: OnceLock<Option<Vec<(String, String)>>>,
}

impl RequestSnapshot {
    /// Build a snapshot directly from request parts. The extractor impl
    /// is the usual entry point; this is for tests and call sites that
    /// already hold the pieces.
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        path_params: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            path_params,
            body,
            query_cache: OnceLock::new(),
            json_cache: OnceLock::new(),
            form_cache: OnceLock::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Media type of the request body, lowercased, without parameters
    /// (`application/json; charset=utf-8` → `application/json`).
    fn media_type(&self) -> String {
        let content_type = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// The parsed JSON body, computed at most once per snapshot.
    ///
    /// `None` records "no parseable JSON body": an empty body, a non-JSON
    /// media type, or a body that fails to parse. Repeated access never
    /// re-attempts the parse.
    pub fn json_value(&self) -> Option<&Value> {
        self.json_cache
            .get_or_init(|| {
                if self.body.is_empty() {
                    return None;
                }
                let media_type = self.media_type();
                if media_type != "application/json" && !media_type.ends_with("+json") {
                    return None;
                }
                match serde_json::from_slice(&self.body) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        tracing::debug!(error = %err, "request body is not valid JSON");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Decoded form-body pairs, or `None` when the request has no
    /// URL-encoded form body. Multipart is not supported.
    fn form_pairs(&self) -> Option<&Vec<(String, String)>> {
        self.form_cache
            .get_or_init(|| {
                if self.body.is_empty() || self.media_type() != "application/x-www-form-urlencoded"
                {
                    return None;
                }
                Some(
                    url::form_urlencoded::parse(&self.body)
                        .into_owned()
                        .collect(),
                )
            })
            .as_ref()
    }

    fn query_pairs(&self) -> &[(String, String)] {
        self.query_cache.get_or_init(|| match self.uri.query() {
            Some(query) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => Vec::new(),
        })
    }
}

impl RequestSource for RequestSnapshot {
    fn view_arg(&self, name: &str) -> Raw {
        Raw::from_option(
            self.path_params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| Value::String(value.clone())),
        )
    }

    fn query(&self, name: &str) -> Raw {
        Raw::from_option(
            self.query_pairs()
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| Value::String(value.clone())),
        )
    }

    fn form(&self, name: &str) -> Raw {
        let Some(pairs) = self.form_pairs() else {
            return Raw::Missing;
        };
        Raw::from_option(
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| Value::String(value.clone())),
        )
    }

    fn json(&self, name: &str) -> Raw {
        match self.json_value().and_then(|body| body.get(name)) {
            Some(value) => Raw::Present(value.clone()),
            None => Raw::Missing,
        }
    }

    fn header(&self, name: &str) -> Raw {
        Raw::from_option(
            self.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| Value::String(v.to_string())),
        )
    }

    fn cookie(&self, name: &str) -> Raw {
        for header_value in self.headers.get_all(header::COOKIE) {
            let Ok(raw) = header_value.to_str() else {
                continue;
            };
            for pair in raw.split(';') {
                if let Some((key, value)) = pair.trim().split_once('=') {
                    if key == name {
                        return Raw::Present(Value::String(value.to_string()));
                    }
                }
            }
        }
        Raw::Missing
    }
}

#[async_trait]
impl<S> FromRequest<S> for RequestSnapshot
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        // Route parameters are only present when the request went through
        // a Router; outside one the snapshot simply has none.
        let path_params = match RawPathParams::from_request_parts(&mut parts, state).await {
            Ok(params) => params
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };

        let method = parts.method.clone();
        let uri = parts.uri.clone();
        let headers = parts.headers.clone();

        let req = Request::from_parts(parts, body);
        let body = Bytes::from_request(req, state).await.map_err(|err| {
            abort(StatusCode::BAD_REQUEST)
                .with_message(format!("Failed to read request body: {}", err))
        })?;

        Ok(Self::new(method, uri, headers, path_params, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn snapshot(headers: HeaderMap, body: &[u8]) -> RequestSnapshot {
        RequestSnapshot::new(
            Method::POST,
            Uri::from_static("/test?limit=10&name=a%20b"),
            headers,
            vec![("id".to_string(), "42".to_string())],
            Bytes::copy_from_slice(body),
        )
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    #[test]
    fn form_lookup_without_form_body_is_missing() {
        let req = snapshot(HeaderMap::new(), b"");
        assert_eq!(req.form("foo"), Raw::Missing);
    }

    #[test]
    fn json_lookup_with_malformed_body_is_missing() {
        let req = snapshot(json_headers(), b"{not json");
        assert_eq!(req.json("foo"), Raw::Missing);
        // The failed parse is memoized, not retried.
        assert_eq!(req.json("foo"), Raw::Missing);
    }

    #[test]
    fn json_body_under_non_json_content_type_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let req = snapshot(headers, br#"{"foo": 1}"#);
        assert_eq!(req.json("foo"), Raw::Missing);
    }

    #[test]
    fn json_suffix_media_types_are_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.api+json; charset=utf-8"),
        );
        let req = snapshot(headers, br#"{"foo": 1}"#);
        assert_eq!(req.json("foo"), Raw::Present(json!(1)));
    }

    #[test]
    fn query_pairs_are_percent_decoded() {
        let req = snapshot(HeaderMap::new(), b"");
        assert_eq!(req.query("name"), Raw::Present(json!("a b")));
        assert_eq!(req.query("limit"), Raw::Present(json!("10")));
        assert_eq!(req.query("absent"), Raw::Missing);
    }

    #[test]
    fn form_body_is_decoded_when_content_type_matches() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let req = snapshot(headers, b"val=42&name=a+b");
        assert_eq!(req.form("val"), Raw::Present(json!("42")));
        assert_eq!(req.form("name"), Raw::Present(json!("a b")));
    }

    #[test]
    fn view_args_and_cookies_resolve() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc; theme=dark"),
        );
        let req = snapshot(headers, b"");
        assert_eq!(req.view_arg("id"), Raw::Present(json!("42")));
        assert_eq!(req.cookie("theme"), Raw::Present(json!("dark")));
        assert_eq!(req.cookie("absent"), Raw::Missing);
    }
}

//! Request locations an argument can be read from.

/// Where a field's raw value is looked up in the incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    /// Route/path arguments (e.g. the `42` in `/item/42`).
    ViewArgs,
    /// Query-string parameters.
    Query,
    /// URL-encoded form body fields.
    Form,
    /// JSON body properties.
    #[default]
    Json,
    /// HTTP request headers.
    Headers,
    /// Cookies from the `Cookie` header.
    Cookies,
}

impl Location {
    /// Stable lowercase name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::ViewArgs => "view_args",
            Location::Query => "query",
            Location::Form => "form",
            Location::Json => "json",
            Location::Headers => "headers",
            Location::Cookies => "cookies",
        }
    }
}

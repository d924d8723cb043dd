//! The seam between core parsing and the hosting framework.

use crate::location::Location;
use crate::raw::Raw;

/// Read-only view of one incoming request, one lookup per location.
///
/// Implementations must be infallible: a request with no parseable body
/// (or no body at all) for a source resolves every lookup against that
/// source to [`Raw::Missing`] instead of an error.
pub trait RequestSource {
    /// Route/path arguments.
    fn view_arg(&self, name: &str) -> Raw;

    /// Query-string parameters.
    fn query(&self, name: &str) -> Raw;

    /// URL-encoded form body fields.
    fn form(&self, name: &str) -> Raw;

    /// JSON body properties.
    fn json(&self, name: &str) -> Raw;

    /// HTTP request headers.
    fn header(&self, name: &str) -> Raw;

    /// Cookies.
    fn cookie(&self, name: &str) -> Raw;

    /// Dispatch a lookup by [`Location`].
    fn lookup(&self, location: Location, name: &str) -> Raw {
        match location {
            Location::ViewArgs => self.view_arg(name),
            Location::Query => self.query(name),
            Location::Form => self.form(name),
            Location::Json => self.json(name),
            Location::Headers => self.header(name),
            Location::Cookies => self.cookie(name),
        }
    }
}

//! Request-argument parsing core.
//!
//! A declarative argument map ([`Schema`]) describes the fields a handler
//! expects: where each one lives in the request (route arguments, query
//! string, form body, JSON body, headers, cookies), how its raw value is
//! coerced, and which user validators run on it. [`Parser`] pulls raw
//! values out of any [`RequestSource`], runs them through the map, and
//! either returns the parsed output or an aggregate [`ValidationError`]
//! keyed by field name.
//!
//! This crate is framework-agnostic: adapters implement [`RequestSource`]
//! for their framework's request type and translate [`ValidationError`]
//! into a framework-native error response.

pub mod error;
pub mod fields;
pub mod location;
pub mod parser;
pub mod raw;
pub mod schema;
pub mod source;
pub mod testing;

pub use error::ValidationError;
pub use fields::Field;
pub use location::Location;
pub use parser::Parser;
pub use raw::Raw;
pub use schema::{Parsed, Schema, SchemaBuilder};
pub use source::RequestSource;

//! Axum adapter for cribrum request-argument parsing.
//!
//! [`RequestSnapshot`] materializes an incoming request (an axum
//! extractor), [`parse`] runs it through a [`Schema`], and validation
//! failures become a 422 [`HttpError`] whose JSON payload carries the
//! per-field error messages. [`abort`] builds the same error type for
//! arbitrary status codes.

pub mod error;
pub mod parse;
pub mod request;

pub use error::{abort, HttpError};
pub use parse::{parse, parse_into, parse_with};
pub use request::RequestSnapshot;

// Re-export the core vocabulary so handlers only need this crate.
pub use cribrum_core::{Field, Location, Parsed, Parser, Raw, RequestSource, Schema, ValidationError};

//! Error types
//!
//! `DataError` is the single failure type for both storage paths;
//! `ApiError` maps it onto HTTP responses.

pub mod types;

pub use types::{ApiError, DataError};

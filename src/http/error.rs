//! Error types for the HTTP primitives.

use thiserror::Error;

/// Errors raised while interpreting request data.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP method is not supported.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request does not carry the header a caller asked for.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// The request body could not be read as JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

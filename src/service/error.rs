//! Error types for route registration and request dispatch.

use thiserror::Error;

use crate::http::Method;

/// Reasons a route is rejected at registration time.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The method name is not a known HTTP method.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The path template could not be compiled.
    #[error("Invalid path template {path:?}: {reason}")]
    InvalidTemplate { path: String, reason: String },

    /// More than one parameter asks for the request body.
    #[error("Handler binds the request body twice (parameters {first} and {second})")]
    DuplicateBody { first: usize, second: usize },
}

/// Errors surfaced while dispatching a request.
#[derive(Debug, Error)]
pub enum Error {
    /// No registered route matches the request.
    #[error("Not found: {method} {path}")]
    NotFound { method: Method, path: String },

    /// The authorization hook refused the request.
    #[error("Access denied: {path} requires auth level {auth_level}")]
    AuthorizationDenied { auth_level: i32, path: String },

    /// The handler itself reported a failure.
    #[error("Handler failed: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),

    /// The transport cancelled the request or it ran out of time.
    #[error("Request cancelled: {0}")]
    Cancelled(String),
}

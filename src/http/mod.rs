//! HTTP primitives shared by the router and its collaborators.
//!
//! The transport layer is expected to turn bytes on the wire into an
//! [`HttpRequest`] and to write the [`HttpResponse`] produced by the
//! dispatcher back out.

mod error;
mod method;
mod request;
mod response;

// Re-export public items
pub use error::Error;
pub use method::Method;
pub use request::HttpRequest;
pub use response::{HttpResponse, ResponseWriter, StatusCode};

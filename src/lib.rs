//! Request routing and argument binding for HTTP services.
//!
//! This library finds the handler registered for a request's method and path,
//! fills the handler's parameters by type, runs it between filters and hands
//! the result to a JSON response encoder.
//!
//! # Features
//!
//! - Literal routes with exact lookup and `{name}` path templates matched by priority
//! - Handlers are plain async functions whose parameters may appear in any order
//! - Weakly typed decoding of query, body and path arguments into structs
//! - Per-request session objects and process-wide singletons injected by type
//! - In/out filters that can short-circuit, an authorization hook and an error hook
//! - Absent lists and maps encode as `[]` and `{}` rather than `null`
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use serde::{Deserialize, Serialize};
//! use webservice_rs::{Body, HttpRequest, Method, StatusCode, WebService};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Greet {
//!     name: String,
//! }
//!
//! let mut builder = WebService::builder();
//! builder
//!     .restful(0, "GET", "/greet/{name}", |Body(greet): Body<Greet>| async move {
//!         format!("hello {}", greet.name)
//!     })
//!     .unwrap();
//! let service = builder.build();
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! let response = runtime.block_on(service.handle(HttpRequest::new(Method::GET, "/greet/Ann", HashMap::new())));
//! assert_eq!(response.status, StatusCode::Ok);
//! assert_eq!(response.body, b"hello Ann");
//! ```

// Export the HTTP primitives
pub mod http;

// Export the decoding and encoding collaborators
pub mod codec;

// Export the routing core
pub mod service;

// Re-export commonly used items for convenience
pub use codec::{IntoOutput, Json, Output, Shape};
pub use http::{Error as HttpError, HttpRequest, HttpResponse, Method, ResponseWriter, StatusCode};
pub use service::{
    Args, Body, Caller, Error as ServiceError, Headers, Inject, Logger, RegistrationError, RequestContext,
    ServiceBuilder, ServiceConfig, WebService,
};

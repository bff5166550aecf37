//! Routing, argument binding and dispatch.
//!
//! Routes are registered on a [`ServiceBuilder`] during startup and sealed into
//! a [`WebService`], which is then shared read-only by every request task.

mod binder;
mod caller;
mod config;
mod context;
mod dispatcher;
mod error;
mod filter;
mod handler;
mod logger;
mod pattern;
mod registry;
mod store;
mod tests;

// Re-export public items
pub use binder::{Args, Binding, Body, DeclaredType, FromContext, Headers, Inject, ParameterSlot};
pub use caller::Caller;
pub use config::ServiceConfig;
pub use context::RequestContext;
pub use dispatcher::{AuthChecker, ErrorHandle, ServiceBuilder, SessionCreator, WebService};
pub use error::{Error, RegistrationError};
pub use filter::{FilterChain, InFilter, OutFilter};
pub use handler::{Handler, HandlerFn, HandlerFuture};
pub use logger::Logger;
pub use pattern::PathPattern;
pub use registry::{Registry, Resolved, RouteDescriptor, RouteInfo};
pub use store::ObjectStore;

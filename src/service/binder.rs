//! Type-directed argument binding.
//!
//! Each handler parameter type maps to one [`ParameterSlot`] when the route
//! is registered. At dispatch the slots are filled in declared order; binding
//! itself never fails, every parameter always receives a value.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::weak_decode;
use crate::http::{HttpRequest, ResponseWriter};
use crate::service::caller::Caller;
use crate::service::context::RequestContext;
use crate::service::logger::Logger;
use crate::service::registry::RouteInfo;
use crate::service::store::ObjectStore;

/// The declared type of a parameter.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    id: TypeId,
    name: &'static str,
}

impl DeclaredType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How one positional handler argument is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSlot {
    /// The argument bag, decoded into the declared type.
    Body(DeclaredType),
    Headers,
    RawRequest,
    RawResponse,
    Logger,
    CallerContext,
    /// Resolved from the session objects, then singletons, then the type's default.
    Unbound(DeclaredType),
}

impl ParameterSlot {
    pub fn is_body(&self) -> bool {
        matches!(self, ParameterSlot::Body(_))
    }
}

/// What a slot is filled from during one dispatch.
pub struct Binding<'a> {
    pub(crate) ctx: &'a RequestContext,
    pub(crate) injections: &'a ObjectStore,
    pub(crate) route: &'a RouteInfo,
}

impl<'a> Binding<'a> {
    pub fn context(&self) -> &'a RequestContext {
        self.ctx
    }

    /// Process-wide singletons.
    pub fn injections(&self) -> &'a ObjectStore {
        self.injections
    }

    /// Registration context of the route being dispatched.
    pub fn route(&self) -> &'a RouteInfo {
        self.route
    }
}

/// A type that can appear as a handler parameter.
pub trait FromContext: Sized + Send + 'static {
    /// The slot this type occupies, computed once at registration.
    fn slot() -> ParameterSlot;

    /// Produce the argument for this request.
    fn bind(slot: &ParameterSlot, binding: &Binding<'_>) -> Self;
}

/// The argument bag decoded into `T` with weak typing.
///
/// Decode failures are logged and leave `T::default()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body<T>(pub T);

impl<T> FromContext for Body<T>
where
    T: DeserializeOwned + Serialize + Default + Send + 'static,
{
    fn slot() -> ParameterSlot {
        ParameterSlot::Body(DeclaredType::of::<T>())
    }

    fn bind(slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        match weak_decode::<T>(&binding.ctx.args) {
            Ok(value) => Body(value),
            Err(e) => {
                binding.ctx.logger().error(format_args!(
                    "failed to decode arguments into {slot:?}: {e} ({route})",
                    route = binding.route
                ));
                Body(T::default())
            }
        }
    }
}

impl<T> Deref for Body<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Body<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

/// The raw argument bag, undecoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(pub Map<String, Value>);

impl FromContext for Args {
    fn slot() -> ParameterSlot {
        ParameterSlot::Body(DeclaredType::of::<Map<String, Value>>())
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        Args(binding.ctx.args.clone())
    }
}

impl Deref for Args {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The request headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(pub HashMap<String, String>);

impl Headers {
    /// Case-insensitive header lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl FromContext for Headers {
    fn slot() -> ParameterSlot {
        ParameterSlot::Headers
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        Headers(binding.ctx.request().headers.clone())
    }
}

impl FromContext for Arc<HttpRequest> {
    fn slot() -> ParameterSlot {
        ParameterSlot::RawRequest
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        binding.ctx.shared_request()
    }
}

impl FromContext for ResponseWriter {
    fn slot() -> ParameterSlot {
        ParameterSlot::RawResponse
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        binding.ctx.response().clone()
    }
}

impl FromContext for Logger {
    fn slot() -> ParameterSlot {
        ParameterSlot::Logger
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        binding.ctx.logger().clone()
    }
}

impl FromContext for Caller {
    fn slot() -> ParameterSlot {
        ParameterSlot::CallerContext
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        binding.ctx.caller().clone()
    }
}

/// An injected object: the request's session object of type `T`, else the
/// registered singleton, else `T::default()`.
#[derive(Debug, Clone, Default)]
pub struct Inject<T>(pub Arc<T>);

impl<T> FromContext for Inject<T>
where
    T: Default + Send + Sync + 'static,
{
    fn slot() -> ParameterSlot {
        ParameterSlot::Unbound(DeclaredType::of::<T>())
    }

    fn bind(_slot: &ParameterSlot, binding: &Binding<'_>) -> Self {
        if let Some(object) = binding.ctx.session().get::<T>() {
            return Inject(object);
        }
        if let Some(object) = binding.injections.get::<T>() {
            return Inject(object);
        }
        Inject(Arc::new(T::default()))
    }
}

impl<T> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

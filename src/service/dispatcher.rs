//! Service assembly and the end-to-end request sequence.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use serde_json::{Map, Value};

use crate::codec::{encode, Output};
use crate::http::{HttpRequest, HttpResponse, ResponseWriter, StatusCode};
use crate::service::binder::Binding;
use crate::service::config::ServiceConfig;
use crate::service::context::RequestContext;
use crate::service::error::{Error, RegistrationError};
use crate::service::filter::FilterChain;
use crate::service::handler::{Handler, HandlerFuture};
use crate::service::registry::Registry;
use crate::service::store::ObjectStore;

/// Decides whether a request may reach a route: `(auth_level, path, args, request)`.
pub type AuthChecker = Arc<dyn Fn(i32, &str, &Map<String, Value>, &HttpRequest) -> bool + Send + Sync>;

/// Turns a handler failure into the result to send.
pub type ErrorHandle = Arc<dyn Fn(&Error, &HttpRequest, &ResponseWriter) -> Output + Send + Sync>;

/// Produces a fresh session id.
pub type SessionCreator = Arc<dyn Fn() -> String + Send + Sync>;

fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Aborts the spawned handler task when dispatch is dropped mid-flight.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "handler panicked".to_string(),
        },
    }
}

/// Run a handler on its own task so a panic surfaces as a handler failure.
async fn run_handler(future: HandlerFuture) -> Result<Output, Error> {
    let task = tokio::spawn(future);
    let _guard = AbortOnDrop(task.abort_handle());
    match task.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(Error::Handler(panic_message(e.into_panic()).into())),
        Err(e) => Err(Error::Cancelled(e.to_string())),
    }
}

/// Collects routes, filters, hooks and singletons before serving starts.
///
/// [`build`](Self::build) seals everything into a [`WebService`]; nothing can be
/// registered afterwards.
pub struct ServiceBuilder {
    config: ServiceConfig,
    registry: Registry,
    filters: FilterChain,
    auth_checker: Option<AuthChecker>,
    error_handle: Option<ErrorHandle>,
    injections: ObjectStore,
    session_creator: SessionCreator,
}

impl ServiceBuilder {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            filters: FilterChain::new(),
            auth_checker: None,
            error_handle: None,
            injections: ObjectStore::new(),
            session_creator: Arc::new(new_session_id),
        }
    }

    /// Register a route for any method with priority 0.
    pub fn register<H, T>(&mut self, auth_level: i32, path: &str, handler: H) -> Result<(), RegistrationError>
    where
        H: Handler<T>,
    {
        self.restful_with_priority(auth_level, 0, "", path, handler)
    }

    /// Register a route for one method with priority 0.
    pub fn restful<H, T>(
        &mut self,
        auth_level: i32,
        method: &str,
        path: &str,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        H: Handler<T>,
    {
        self.restful_with_priority(auth_level, 0, method, path, handler)
    }

    /// Register a route for any method.
    pub fn register_with_priority<H, T>(
        &mut self,
        auth_level: i32,
        priority: i32,
        path: &str,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        H: Handler<T>,
    {
        self.restful_with_priority(auth_level, priority, "", path, handler)
    }

    /// Register a route. Higher `priority` pattern routes are tried first.
    pub fn restful_with_priority<H, T>(
        &mut self,
        auth_level: i32,
        priority: i32,
        method: &str,
        path: &str,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        H: Handler<T>,
    {
        self.registry.register(auth_level, priority, method, path, handler)
    }

    pub fn set_in_filter<F>(&mut self, filter: F)
    where
        F: Fn(&mut RequestContext) -> Option<Output> + Send + Sync + 'static,
    {
        self.filters.add_in_filter(Arc::new(filter));
    }

    pub fn set_out_filter<F>(&mut self, filter: F)
    where
        F: Fn(&mut RequestContext, Output) -> (Output, bool) + Send + Sync + 'static,
    {
        self.filters.add_out_filter(Arc::new(filter));
    }

    pub fn set_auth_checker<F>(&mut self, checker: F)
    where
        F: Fn(i32, &str, &Map<String, Value>, &HttpRequest) -> bool + Send + Sync + 'static,
    {
        self.auth_checker = Some(Arc::new(checker));
    }

    pub fn set_error_handle<F>(&mut self, handle: F)
    where
        F: Fn(&Error, &HttpRequest, &ResponseWriter) -> Output + Send + Sync + 'static,
    {
        self.error_handle = Some(Arc::new(handle));
    }

    /// Register a singleton for `Inject<T>` parameters. Replaces an earlier `T`.
    pub fn set_inject<T: Send + Sync + 'static>(&mut self, object: T) {
        self.injections.insert(object);
    }

    pub fn get_inject<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.injections.get::<T>()
    }

    /// Set the session header name. Only the first non-empty key takes effect.
    pub fn set_session_key(&mut self, key: impl Into<String>) {
        if self.config.session_key.is_none() {
            let key = key.into();
            if !key.is_empty() {
                self.config.session_key = Some(key);
            }
        }
    }

    /// Set the client header name. Only the first non-empty key takes effect.
    pub fn set_client_key(&mut self, key: impl Into<String>) {
        if self.config.client_key.is_none() {
            let key = key.into();
            if !key.is_empty() {
                self.config.client_key = Some(key);
            }
        }
    }

    pub fn set_session_creator<F>(&mut self, creator: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.session_creator = Arc::new(creator);
    }

    pub fn session_key(&self) -> Option<&str> {
        self.config.session_key.as_deref()
    }

    /// Seal the registration phase.
    pub fn build(self) -> WebService {
        let service = WebService {
            config: self.config,
            registry: self.registry,
            filters: self.filters,
            auth_checker: self.auth_checker,
            error_handle: self.error_handle,
            injections: self.injections,
            session_creator: self.session_creator,
        };
        service.display_routes();
        service
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

/// The sealed, shareable request dispatcher.
pub struct WebService {
    config: ServiceConfig,
    registry: Registry,
    filters: FilterChain,
    auth_checker: Option<AuthChecker>,
    error_handle: Option<ErrorHandle>,
    injections: ObjectStore,
    session_creator: SessionCreator,
}

impl WebService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn get_inject<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.injections.get::<T>()
    }

    pub fn session_key(&self) -> Option<&str> {
        self.config.session_key.as_deref()
    }

    fn display_routes(&self) {
        info!("Registered endpoints:");
        for route in self.registry.routes() {
            info!("  {}", route.info());
        }
    }

    /// Create the context for a request.
    ///
    /// With a session key configured, a request without a session id gets a
    /// new one; it is visible to the handler and echoed in the response.
    pub fn context(&self, mut request: HttpRequest) -> RequestContext {
        let mut created = None;
        if let Some(key) = self.config.session_key.as_deref() {
            if request.get_header(key).map_or(true, |v| v.is_empty()) {
                let id = (self.session_creator)();
                request.set_header(key, id.clone());
                created = Some((key, id));
            }
        }

        let ctx = RequestContext::new(request, &self.config);
        if let Some((key, id)) = created {
            ctx.response().set_header(key, id);
        }
        ctx
    }

    /// Route, authorize, filter, bind and invoke.
    ///
    /// `NotFound` and `AuthorizationDenied` are returned as errors without
    /// consulting the error hook. Handler failures and panics go to the error hook when
    /// one is set; otherwise they are logged and returned.
    pub async fn dispatch(&self, ctx: &mut RequestContext) -> Result<Output, Error> {
        let method = ctx.request().method;
        let path = ctx.request().route_path().to_string();

        let Some(resolved) = self.registry.resolve(method, &path) else {
            ctx.logger().debug("no matching route");
            return Err(Error::NotFound { method, path });
        };
        let route = resolved.route;
        for (name, value) in resolved.captures {
            ctx.args.insert(name, Value::String(value));
        }

        let auth_level = route.info().auth_level;
        if let Some(checker) = &self.auth_checker {
            if !checker(auth_level, &path, &ctx.args, ctx.request()) {
                ctx.logger().warn(format_args!("authorization denied ({})", route.info()));
                return Err(Error::AuthorizationDenied { auth_level, path });
            }
        }

        let result = match self.filters.run_in(ctx) {
            Some(output) => {
                debug!("In-filter answered {path} before the handler");
                Ok(output)
            }
            None => {
                let future = {
                    let binding = Binding {
                        ctx: &*ctx,
                        injections: &self.injections,
                        route: route.info(),
                    };
                    (route.handler())(route.plan(), &binding)
                };
                run_handler(future).await
            }
        };

        match result {
            Ok(output) => Ok(self.filters.run_out(ctx, output)),
            Err(e) => {
                ctx.logger().error(format_args!("{e} ({})", route.info()));
                match &self.error_handle {
                    Some(handle) => Ok(handle(&e, ctx.request(), ctx.response())),
                    None => Err(e),
                }
            }
        }
    }

    /// Handle a request end to end, bounded by the configured timeout.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        let mut ctx = self.context(request);
        let result = match self.config.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.dispatch(&mut ctx)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Cancelled(format!("timed out after {limit:?}"))),
            },
            None => self.dispatch(&mut ctx).await,
        };
        self.respond(&ctx, result)
    }

    /// Handle a request, abandoning filter and handler work once `cancel` resolves.
    pub async fn handle_with_cancel<C>(&self, request: HttpRequest, cancel: C) -> HttpResponse
    where
        C: Future<Output = ()>,
    {
        let mut ctx = self.context(request);
        let result = tokio::select! {
            result = self.dispatch(&mut ctx) => result,
            () = cancel => Err(Error::Cancelled("cancelled by transport".to_string())),
        };
        self.respond(&ctx, result)
    }

    fn respond(&self, ctx: &RequestContext, result: Result<Output, Error>) -> HttpResponse {
        let (status, output) = match result {
            Ok(output) => (None, output),
            Err(e) => {
                let status = match &e {
                    Error::NotFound { .. } => StatusCode::NotFound,
                    Error::AuthorizationDenied { .. } => StatusCode::Forbidden,
                    Error::Cancelled(reason) => {
                        ctx.logger().warn(reason);
                        StatusCode::ServiceUnavailable
                    }
                    Error::Handler(_) => StatusCode::InternalServerError,
                };
                (Some(status), Output::text(e.to_string()))
            }
        };

        let encoded = encode(&output);
        let mut response = HttpResponse::new(StatusCode::Ok).with_body_bytes(encoded.body);
        if let Some(content_type) = encoded.content_type {
            response = response.with_content_type(content_type);
        }

        let mut response = ctx.response().apply(StatusCode::Ok, response);
        if let Some(status) = status {
            response.status = status;
        }
        response
    }
}

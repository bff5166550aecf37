//! Route storage and lookup.

use std::collections::HashMap;
use std::fmt;

use log::error;

use crate::http::Method;
use crate::service::binder::ParameterSlot;
use crate::service::error::RegistrationError;
use crate::service::handler::{erase, Handler, HandlerFn};
use crate::service::pattern::PathPattern;

/// Registration context of a route, attached to every log line about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub auth_level: i32,
    pub priority: i32,
    /// `None` accepts any method.
    pub method: Option<Method>,
    pub path: String,
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method.map_or("*", |m| m.as_str());
        write!(
            f,
            "method={method} path={path} priority={priority} auth_level={auth_level}",
            path = self.path,
            priority = self.priority,
            auth_level = self.auth_level
        )
    }
}

/// A registered route. Immutable once registered.
pub struct RouteDescriptor {
    info: RouteInfo,
    pattern: Option<PathPattern>,
    plan: Vec<ParameterSlot>,
    handler: HandlerFn,
}

impl RouteDescriptor {
    pub fn info(&self) -> &RouteInfo {
        &self.info
    }

    /// Placeholder names of a pattern route; empty for literal routes.
    pub fn path_arg_names(&self) -> &[String] {
        match &self.pattern {
            Some(pattern) => pattern.names(),
            None => &[],
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// The parameter plan computed at registration.
    pub fn plan(&self) -> &[ParameterSlot] {
        &self.plan
    }

    pub(crate) fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    fn accepts(&self, method: Method) -> bool {
        self.info.method.map_or(true, |m| m == method)
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("info", &self.info)
            .field("pattern", &self.pattern.as_ref().map(|p| p.as_str()))
            .field("plan", &self.plan)
            .finish()
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub route: &'a RouteDescriptor,
    /// Placeholder captures in template order; empty for literal routes.
    pub captures: Vec<(String, String)>,
}

/// Literal routes by (method, path) plus pattern routes in precedence order.
#[derive(Default)]
pub struct Registry {
    exact: HashMap<(Option<Method>, String), RouteDescriptor>,
    patterns: Vec<RouteDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `method` and `path`.
    ///
    /// An empty `method` accepts any method. A literal path replaces a previous
    /// route with the same method and path. Pattern routes are kept ordered by
    /// descending `priority`, ties in registration order.
    pub fn register<H, T>(
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
        let result = Self::describe(auth_level, priority, method, path, H::plan()).map(|(info, pattern, plan)| {
            self.insert(RouteDescriptor {
                info,
                pattern,
                plan,
                handler: erase(handler),
            })
        });

        if let Err(e) = &result {
            error!("Route rejected: {e} (method={method:?} path={path} priority={priority} auth_level={auth_level})");
        }
        result
    }

    fn describe(
        auth_level: i32,
        priority: i32,
        method: &str,
        path: &str,
        plan: Vec<ParameterSlot>,
    ) -> Result<(RouteInfo, Option<PathPattern>, Vec<ParameterSlot>), RegistrationError> {
        let method = Method::parse_route_method(method)
            .map_err(|_| RegistrationError::InvalidMethod(method.to_string()))?;

        let mut bodies = plan.iter().enumerate().filter(|(_, slot)| slot.is_body()).map(|(i, _)| i);
        if let (Some(first), Some(second)) = (bodies.next(), bodies.next()) {
            return Err(RegistrationError::DuplicateBody { first, second });
        }

        let pattern = PathPattern::compile(path)?;
        let info = RouteInfo {
            auth_level,
            priority,
            method,
            path: path.to_string(),
        };
        Ok((info, pattern, plan))
    }

    fn insert(&mut self, route: RouteDescriptor) {
        if route.pattern.is_some() {
            let priority = route.info.priority;
            let at = self.patterns.partition_point(|r| r.info.priority >= priority);
            self.patterns.insert(at, route);
        } else {
            let key = (route.info.method, route.info.path.clone());
            self.exact.insert(key, route);
        }
    }

    /// Find the route for a request.
    ///
    /// Literal routes win over pattern routes; a route registered for the
    /// request's method wins over an any-method literal route.
    pub fn resolve(&self, method: Method, path: &str) -> Option<Resolved<'_>> {
        let exact = self
            .exact
            .get(&(Some(method), path.to_string()))
            .or_else(|| self.exact.get(&(None, path.to_string())));
        if let Some(route) = exact {
            return Some(Resolved {
                route,
                captures: Vec::new(),
            });
        }

        self.patterns
            .iter()
            .filter(|route| route.accepts(method))
            .find_map(|route| {
                let captures = route.pattern.as_ref()?.captures(path)?;
                Some(Resolved { route, captures })
            })
    }

    /// All routes: literal ones first, then pattern routes in lookup order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.exact.values().chain(self.patterns.iter())
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

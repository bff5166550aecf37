//! Request-scoped logging.

use std::fmt::Display;

use log::{log, Level};

const TARGET: &str = "webservice::request";

/// A logger bound to one request.
///
/// Every record carries the request id, method and path. Handlers receive it
/// as a parameter instead of having it pushed into shared objects.
#[derive(Debug, Clone)]
pub struct Logger {
    request_id: String,
    method: String,
    path: String,
}

impl Logger {
    pub fn new(request_id: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn log(&self, level: Level, message: impl Display) {
        log!(
            target: TARGET,
            level,
            "[{id}] {method} {path}: {message}",
            id = self.request_id,
            method = self.method,
            path = self.path
        );
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("-", "-", "-")
    }
}

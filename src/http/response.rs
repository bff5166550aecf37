//! HTTP response types and the writer handed to handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// The numeric code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Represents an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        let content_length = self.body.len().to_string();
        self.with_header("Content-Length", content_length)
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Body as UTF-8 text, lossy.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Convert the response to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        let status_line = format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.status.reason_phrase());
        bytes.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            let header_line = format!("{name}: {value}\r\n");
            bytes.extend_from_slice(header_line.as_bytes());
        }

        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(&self.body);

        bytes
    }
}

#[derive(Debug, Default)]
struct ResponseParts {
    status: Option<StatusCode>,
    headers: HashMap<String, String>,
}

/// The raw response handle given to handlers and filters.
///
/// Clones share the same state. Whatever status and headers are set here are
/// applied when the dispatcher encodes the final response.
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    parts: Arc<Mutex<ResponseParts>>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking handler must not make the response unusable.
    fn lock(&self) -> MutexGuard<'_, ResponseParts> {
        self.parts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Override the status code of the response.
    pub fn set_status(&self, status: StatusCode) {
        self.lock().status = Some(status);
    }

    /// The status explicitly set so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.lock().status
    }

    /// Add or replace a response header.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().headers.insert(name.into(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.lock()
            .headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then(|| v.clone()))
    }

    /// Copy status and headers onto an encoded response.
    ///
    /// `fallback` is used when nobody set a status explicitly.
    pub fn apply(&self, fallback: StatusCode, mut response: HttpResponse) -> HttpResponse {
        let parts = self.lock();
        response.status = parts.status.unwrap_or(fallback);
        for (name, value) in &parts.headers {
            response.headers.insert(name.clone(), value.clone());
        }
        response
    }
}

//! The inbound request as seen by the dispatcher.

use std::collections::HashMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::http::error::Error;
use crate::http::method::Method;

/// Represents an HTTP request handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target, including any query string
    pub path: String,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Query parameters parsed from the path
    pub query_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// Query parameters are parsed (and percent-decoded) from `path`.
    pub fn new(method: Method, path: impl Into<String>, headers: HashMap<String, String>) -> Self {
        let path = path.into();
        let query_params = path
            .split_once('?')
            .map(|(_, query)| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            path,
            headers,
            body: Vec::new(),
            query_params,
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(
        method: Method,
        path: impl Into<String>,
        headers: HashMap<String, String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let mut request = Self::new(method, path, headers);
        request.body = body.into();
        request
    }

    /// Builder-style header setter.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Add or replace a header, matching an existing name case-insensitively.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// The path without its query string; this is what routes are matched against.
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// Get a header value. Header names are case-insensitive.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v))
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if the request has a JSON body.
    pub fn is_json(&self) -> bool {
        self.get_header("Content-Type")
            .is_some_and(|ct| ct.starts_with("application/json"))
    }

    /// Check if the request has a url-encoded form body.
    pub fn is_form(&self) -> bool {
        self.get_header("Content-Type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
    }

    /// Parse the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Build the argument bag from query parameters and body fields.
    ///
    /// Body fields overwrite query parameters of the same name. Path captures are
    /// folded in later by the dispatcher and overwrite both.
    pub fn args(&self) -> Map<String, Value> {
        let mut args: Map<String, Value> = self
            .query_params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        if self.body.is_empty() {
            return args;
        }

        if self.is_form() {
            for (k, v) in url::form_urlencoded::parse(&self.body) {
                args.insert(k.into_owned(), Value::String(v.into_owned()));
            }
            return args;
        }

        // Bodies without a content type are still tried as JSON.
        if self.is_json() || self.get_header("Content-Type").is_none() {
            match serde_json::from_slice::<Value>(&self.body) {
                Ok(Value::Object(fields)) => args.extend(fields),
                Ok(_) => debug!("Ignoring non-object JSON body for {path}", path = self.path),
                Err(e) => debug!("Ignoring undecodable body for {path}: {e}", path = self.path),
            }
        }

        args
    }
}

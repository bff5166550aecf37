//! Service configuration.

use std::time::Duration;

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Header carrying the session id. Sessions are disabled when unset.
    pub session_key: Option<String>,
    /// Header identifying the calling client, forwarded by [`Caller`](crate::service::Caller).
    pub client_key: Option<String>,
    /// Header carrying the request id used in request-scoped log lines.
    pub request_id_header: String,
    /// Upper bound on filter and handler work for one request.
    pub request_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            session_key: None,
            client_key: None,
            request_id_header: "X-Request-Id".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

//! Context for calls a handler makes to other services.

use crate::http::HttpRequest;
use crate::service::ServiceConfig;

/// Headers a downstream call should carry so the callee sees the same
/// session, client and request id as the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    headers: Vec<(String, String)>,
}

impl Caller {
    pub(crate) fn for_request(request: &HttpRequest, config: &ServiceConfig) -> Self {
        let names = [
            config.session_key.as_deref(),
            config.client_key.as_deref(),
            Some(config.request_id_header.as_str()),
        ];

        let headers = names
            .into_iter()
            .flatten()
            .filter_map(|name| {
                request
                    .get_header(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect();

        Self { headers }
    }

    /// Headers to attach to outbound requests.
    pub fn forward_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

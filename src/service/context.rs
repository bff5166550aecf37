//! Per-request state carried through filters, binding and the handler.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::http::{HttpRequest, ResponseWriter};
use crate::service::caller::Caller;
use crate::service::logger::Logger;
use crate::service::store::ObjectStore;
use crate::service::ServiceConfig;

/// Everything the dispatcher knows about one request.
///
/// Session-scoped objects live here and are dropped together with the context.
#[derive(Debug)]
pub struct RequestContext {
    request: Arc<HttpRequest>,
    response: ResponseWriter,
    logger: Logger,
    caller: Caller,
    session_key: Option<String>,
    session: ObjectStore,
    /// Decoded query, body and path arguments.
    pub args: Map<String, Value>,
}

impl RequestContext {
    pub fn new(request: HttpRequest, config: &ServiceConfig) -> Self {
        let request_id = request
            .get_header(&config.request_id_header)
            .cloned()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let logger = Logger::new(request_id, request.method.as_str(), request.route_path());
        let caller = Caller::for_request(&request, config);
        let args = request.args();

        Self {
            request: Arc::new(request),
            response: ResponseWriter::new(),
            logger,
            caller,
            session_key: config.session_key.clone(),
            session: ObjectStore::new(),
            args,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// A shared handle to the request, as bound to `Arc<HttpRequest>` parameters.
    pub fn shared_request(&self) -> Arc<HttpRequest> {
        Arc::clone(&self.request)
    }

    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// The session id sent under the configured session key header.
    pub fn session_id(&self) -> Option<&str> {
        let key = self.session_key.as_deref()?;
        self.request.get_header(key).map(String::as_str)
    }

    /// Attach an object to this request; `Inject<T>` parameters prefer it over singletons.
    pub fn set_session_inject<T: Send + Sync + 'static>(&mut self, object: T) {
        self.session.insert(object);
    }

    pub fn get_session_inject<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.session.get::<T>()
    }

    pub(crate) fn session(&self) -> &ObjectStore {
        &self.session
    }
}

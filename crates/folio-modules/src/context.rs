//! Per-request context handed to controllers.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use folio_content::RouteTable;
use serde::Serialize;
use serde_json::Value;

/// The incoming request as seen by controllers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestInfo {
    /// HTTP method (`GET`, `POST`, ...).
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Decoded query parameters. Repeated keys keep the last value.
    pub query: BTreeMap<String, String>,
    /// Request headers with lowercase names.
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON or form body, if any.
    pub body: Option<Value>,
}

impl RequestInfo {
    /// Create request info for a method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Look up a header by (case-insensitive) name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Response status and headers requested by controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Status code override. `None` means 200.
    pub status: Option<u16>,
    /// Extra response headers in insertion order.
    pub headers: Vec<(String, String)>,
}

/// Shared handle to the response being built for the current request.
///
/// Cloning the handle shares the underlying state, so controllers deep in an
/// include chain write to the same response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    inner: Arc<Mutex<ResponseMeta>>,
}

impl ResponseHandle {
    /// Override the response status code.
    pub fn set_status(&self, status: u16) {
        self.lock().status = Some(status);
    }

    /// Add a response header, replacing an earlier value with the same name.
    pub fn insert_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let mut meta = self.lock();
        meta.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        meta.headers.push((name, value));
    }

    /// Snapshot of the current response metadata.
    #[must_use]
    pub fn snapshot(&self) -> ResponseMeta {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ResponseMeta> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything a controller can see besides its payload.
#[derive(Debug, Clone)]
pub struct RenderContext {
    request: RequestInfo,
    response: ResponseHandle,
    routes: Arc<RouteTable>,
}

impl RenderContext {
    /// Create a context for one request.
    #[must_use]
    pub fn new(request: RequestInfo, routes: Arc<RouteTable>) -> Self {
        Self {
            request,
            response: ResponseHandle::default(),
            routes,
        }
    }

    /// The request being served.
    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    /// The response being built.
    #[must_use]
    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }

    /// The site's route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut request = RequestInfo::new("GET", "/");
        request
            .headers
            .insert("content-type".to_owned(), "text/plain".to_owned());
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.header("accept"), None);
    }

    #[test]
    fn test_response_handle_is_shared_between_clones() {
        let handle = ResponseHandle::default();
        let clone = handle.clone();
        clone.set_status(201);
        clone.insert_header("X-Test", "a");
        clone.insert_header("x-test", "b");

        assert_eq!(
            handle.snapshot(),
            ResponseMeta {
                status: Some(201),
                headers: vec![("x-test".to_owned(), "b".to_owned())],
            }
        );
    }
}

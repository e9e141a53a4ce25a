//! Content route handler.
//!
//! Every route-table path is served by [`serve_content`] for every method.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{MatchedPath, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use folio_modules::RequestInfo;
use folio_site::{RenderedPage, RouteOutcome};
use serde_json::{Map, Value};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle any request to a content route.
pub(crate) async fn serve_content(
    State(state): State<Arc<AppState>>,
    matched: MatchedPath,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let route = matched.as_str();
    let request = request_info(&method, &uri, &headers, &body)?;

    match state.site.render_route(route, request)? {
        RouteOutcome::Rendered(page) => Ok(html_response(page)),
        RouteOutcome::Untemplated | RouteOutcome::NotFound => {
            Ok(StatusCode::NOT_FOUND.into_response())
        }
    }
}

/// Collect what controllers may inspect about the request.
fn request_info(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<RequestInfo, ServerError> {
    let mut request = RequestInfo::new(method.as_str(), uri.path());

    if let Some(query) = uri.query() {
        match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => request.query = pairs.into_iter().collect(),
            Err(e) => tracing::debug!(error = %e, "Ignoring malformed query string"),
        }
    }

    request.headers = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_owned(), value.to_owned()))
        })
        .collect();

    request.body = parse_body(headers, body)?;
    Ok(request)
}

/// Parse a JSON or URL-encoded form body. Other bodies are not exposed.
fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<Option<Value>, ServerError> {
    if body.is_empty() {
        return Ok(None);
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match content_type.as_str() {
        "application/json" => serde_json::from_slice(body)
            .map(Some)
            .map_err(|e| ServerError::InvalidBody(e.to_string())),
        "application/x-www-form-urlencoded" => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
                .map_err(|e| ServerError::InvalidBody(e.to_string()))?;
            let fields: BTreeMap<String, String> = pairs.into_iter().collect();
            let map: Map<String, Value> = fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            Ok(Some(Value::Object(map)))
        }
        _ => Ok(None),
    }
}

/// Build the HTML response, applying controller status and headers.
fn html_response(page: RenderedPage) -> Response {
    let status = page
        .response
        .status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);

    let mut response = Response::new(Body::from(page.html));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    for (name, value) in page.response.headers {
        let parsed = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        );
        match parsed {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Ignoring invalid controller header"),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_info_collects_query_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-token", HeaderValue::from_static("abc"));
        let uri: Uri = "/search?q=rust&page=2&q=folio".parse().unwrap();

        let info = request_info(&Method::GET, &uri, &headers, &Bytes::new()).unwrap();

        assert_eq!(info.method, "GET");
        assert_eq!(info.path, "/search");
        assert_eq!(info.query.get("q").map(String::as_str), Some("folio"));
        assert_eq!(info.query.get("page").map(String::as_str), Some("2"));
        assert_eq!(info.header("X-Token"), Some("abc"));
        assert_eq!(info.body, None);
    }

    #[test]
    fn test_parse_json_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let body = Bytes::from_static(br#"{"name": "Ada"}"#);

        assert_eq!(
            parse_body(&headers, &body).unwrap(),
            Some(json!({"name": "Ada"}))
        );
    }

    #[test]
    fn test_parse_form_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let body = Bytes::from_static(b"name=Ada+Lovelace&topic=engines");

        assert_eq!(
            parse_body(&headers, &body).unwrap(),
            Some(json!({"name": "Ada Lovelace", "topic": "engines"}))
        );
    }

    #[test]
    fn test_invalid_json_body_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let body = Bytes::from_static(b"{not json");

        let err = parse_body(&headers, &body).unwrap_err();
        assert!(matches!(err, ServerError::InvalidBody(_)));
    }

    #[test]
    fn test_other_bodies_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let body = Bytes::from_static(b"hello");

        assert_eq!(parse_body(&headers, &body).unwrap(), None);
    }
}

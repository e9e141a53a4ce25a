//! Error types for the HTTP server.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Body of every 500 response. Details go to the log only.
const INTERNAL_ERROR_HTML: &str = "<!DOCTYPE html>\n<html><head><title>500 Internal Server Error</title></head>\
<body><h1>Internal Server Error</h1><p>The page could not be rendered.</p></body></html>\n";

/// Body of 400 responses.
const BAD_REQUEST_HTML: &str = "<!DOCTYPE html>\n<html><head><title>400 Bad Request</title></head>\
<body><h1>Bad Request</h1><p>The request body could not be parsed.</p></body></html>\n";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Rendering a route failed.
    #[error("Render error: {0}")]
    Render(#[from] folio_site::SiteError),

    /// The request body does not match its content type.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The listen address is invalid.
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidBody(message) => {
                tracing::debug!(error = %message, "Rejected request body");
                (StatusCode::BAD_REQUEST, BAD_REQUEST_HTML)
            }
            Self::Render(_) | Self::Address(_) | Self::Io(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_HTML)
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

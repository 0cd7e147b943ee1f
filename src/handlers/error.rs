use std::fmt;
use std::io;

use askama::Template;
use tokio::io::AsyncWrite;

use crate::http::parser::ParseError;
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::http::writer::ResponseWriter;

/// Failures surfaced while serving a request.
///
/// The message is for the log only; clients see nothing but the status.
#[derive(Debug)]
pub enum ServeError {
    MalformedRequest(String),
    NotFound(String),
    /// Permission denied. Reported to clients as 404.
    Forbidden(String),
    Internal(String),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::MalformedRequest(_) => StatusCode::BadRequest,
            ServeError::NotFound(_) | ServeError::Forbidden(_) => StatusCode::NotFound,
            ServeError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    pub fn internal(context: &str, err: impl fmt::Display) -> Self {
        ServeError::Internal(format!("{context}: {err}"))
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::MalformedRequest(msg) => write!(f, "malformed request: {msg}"),
            ServeError::NotFound(msg) => write!(f, "not found: {msg}"),
            ServeError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            ServeError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServeError {}

impl From<ParseError> for ServeError {
    fn from(err: ParseError) -> Self {
        ServeError::MalformedRequest(err.to_string())
    }
}

impl From<io::Error> for ServeError {
    fn from(err: io::Error) -> Self {
        ServeError::Internal(err.to_string())
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage {
    code: u16,
    reason: &'static str,
}

/// Renders the HTML body announcing `status`.
pub fn error_page(status: StatusCode) -> String {
    let page = ErrorPage {
        code: status.as_u16(),
        reason: status.reason_phrase(),
    };
    page.render()
        .unwrap_or_else(|_| format!("<html><body><h1>{status}</h1></body></html>"))
}

/// Writes a complete `text/html` error response.
///
/// Best-effort: the connection is being torn down anyway, so a failed write
/// is only logged.
pub async fn respond_error<W>(stream: &mut W, status: StatusCode)
where
    W: AsyncWrite + Unpin,
{
    let response = ResponseBuilder::new(status)
        .header("Content-Type", "text/html")
        .body(error_page(status).into_bytes())
        .build();

    if let Err(e) = ResponseWriter::new(&response).write_to_stream(stream).await {
        tracing::debug!(status = status.as_u16(), error = %e, "Failed to write error response");
    }
}

//! Error pages sent to clients.
//!
//! # Responsibilities
//! - Render the HTML body and headers for a failed transaction
//! - Write them to the client, swallowing write failures
//!
//! # Design Decisions
//! - Only the failure classes the worker enumerates get a page
//! - Responses are HTTP/1.0 and always followed by a close

use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A minimal HTML error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    status: StatusCode,
    explanation: &'static str,
}

impl ErrorPage {
    pub fn new(status: StatusCode, explanation: &'static str) -> Self {
        Self { status, explanation }
    }

    pub fn malformed_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Proxy received a malformed request")
    }

    pub fn method_not_implemented() -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, "Proxy does not implement this method")
    }

    pub fn bad_headers() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Proxy could not parse request headers")
    }

    pub fn request_too_large() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Proxy request exceeds the maximum request size")
    }

    pub fn origin_unreachable() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Proxy could not reach the origin server")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    pub fn body(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>Tiny Error</title></head>\r\n\
             <body bgcolor=\"ffffff\"><h1>{code}: {reason}</h1>\r\n\
             <p>{explanation}</p><hr/><em>The Tiny Web server</em></body></html>\r\n",
            code = self.status.as_u16(),
            reason = self.reason(),
            explanation = self.explanation,
        )
    }

    pub fn head(&self, body_len: usize) -> String {
        format!(
            "HTTP/1.0 {code} {reason}\r\n\
             Content-Type: text/html\r\n\
             Content-Length: {body_len}\r\n\r\n",
            code = self.status.as_u16(),
            reason = self.reason(),
        )
    }

    /// Headers followed by body, as sent on the wire.
    pub fn render(&self) -> Vec<u8> {
        let body = self.body();
        let mut out = self.head(body.len()).into_bytes();
        out.extend_from_slice(body.as_bytes());
        out
    }

    /// Send the page. Failures are logged and dropped; the connection is
    /// closed right after either way.
    pub async fn send<W>(&self, client: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        let body = self.body();
        if let Err(e) = client.write_all(self.head(body.len()).as_bytes()).await {
            tracing::debug!(error = %e, status = %self.status, "Error writing error response headers");
            return;
        }
        if let Err(e) = client.write_all(body.as_bytes()).await {
            tracing::debug!(error = %e, status = %self.status, "Error writing error response body");
            return;
        }
        if let Err(e) = client.flush().await {
            tracing::debug!(error = %e, status = %self.status, "Error flushing error response");
        }
    }
}

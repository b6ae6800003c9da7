//! Outbound request rendering.
//!
//! Turns a [`ParsedRequest`] and its resolved [`Destination`] into the
//! HTTP/1.0 request sent to the origin: a fresh request line, the proxy's own
//! `Host`, `User-Agent`, `Connection` and `Proxy-Connection` headers, then
//! every other client header in the order it arrived.

use thiserror::Error;

use crate::http::request::{HeaderLine, ParsedRequest};

/// Headers the proxy always sets itself. Client copies are dropped.
pub const INJECTED_HEADERS: [&str; 4] = ["Host", "User-Agent", "Connection", "Proxy-Connection"];

const OUTBOUND_VERSION: &str = "HTTP/1.0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("outbound request is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

fn is_injected(header: &HeaderLine) -> bool {
    INJECTED_HEADERS.iter().any(|name| header.is_named(name))
}

/// Origin server and resource named by an `http://` request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub port: String,
    pub path: String,
}

impl Destination {
    /// Resolve the target of `request`, filling in `default_port` when it
    /// names none. Returns `None` when the target names no host.
    pub fn of(request: &ParsedRequest, default_port: &str) -> Option<Self> {
        Some(Self {
            host: request.host()?.to_string(),
            port: request.port().unwrap_or(default_port).to_string(),
            path: request.path()?.into_owned(),
        })
    }
}

/// The request the proxy sends to an origin server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    destination: Destination,
    request_line: String,
    headers: Vec<(String, String)>,
}

impl OutboundRequest {
    /// Build the outbound request for `destination`.
    pub fn new<'a>(
        method: &str,
        destination: Destination,
        user_agent: &str,
        client_headers: impl IntoIterator<Item = &'a HeaderLine>,
    ) -> Self {
        let mut headers = vec![
            (
                "Host".to_string(),
                format!("{}:{}", destination.host, destination.port),
            ),
            ("User-Agent".to_string(), user_agent.to_string()),
            ("Connection".to_string(), "close".to_string()),
            ("Proxy-Connection".to_string(), "close".to_string()),
        ];
        headers.extend(
            client_headers
                .into_iter()
                .filter(|h| !is_injected(h))
                .map(|h| (h.name.clone(), h.value.clone())),
        );

        Self {
            request_line: format!("{method} {} {OUTBOUND_VERSION}", destination.path),
            destination,
            headers,
        }
    }

    /// Build from a parsed client request whose target was already resolved.
    pub fn for_request(request: &ParsedRequest, destination: Destination, user_agent: &str) -> Self {
        Self::new(request.method(), destination, user_agent, request.headers())
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn request_line(&self) -> &str {
        &self.request_line
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Serialize to wire format, failing if the result exceeds `limit` bytes.
    pub fn render(&self, limit: usize) -> Result<Vec<u8>, TranslateError> {
        let size = self.request_line.len()
            + 2
            + self
                .headers
                .iter()
                .map(|(name, value)| name.len() + 2 + value.len() + 2)
                .sum::<usize>()
            + 2;
        if size > limit {
            return Err(TranslateError::TooLarge { size, limit });
        }

        let mut buf = Vec::with_capacity(size);
        buf.extend_from_slice(self.request_line.as_bytes());
        buf.extend_from_slice(b"\r\n");
        for (name, value) in &self.headers {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"\r\n");
        Ok(buf)
    }
}

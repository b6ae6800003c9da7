//! Request line and header parsing.
//!
//! # Responsibilities
//! - Split a request line into method, target and version
//! - Resolve an absolute-form target into host, port and path
//! - Parse `Name: Value` header lines, keeping arrival order
//!
//! # Design Decisions
//! - Lines are parsed one at a time as the connection reads them
//! - Only `http://` targets yield a host; anything else is left for the
//!   worker to treat as unroutable
//! - Header values are trimmed of surrounding whitespace and otherwise kept
//!   verbatim

use std::borrow::Cow;

use http::Uri;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid utf-8 encoding")]
    InvalidUtf8,
    #[error("too long line (> {0})")]
    LineTooLong(usize),
    #[error("expected 3 tokens in request line, found {0}")]
    WrongTokenCount(usize),
    #[error("invalid method")]
    InvalidMethod,
    #[error("invalid request target")]
    InvalidTarget,
    #[error("invalid version")]
    InvalidVersion,
    #[error("no delimiter '{0}' found")]
    NoDelimiterFound(char),
    #[error("invalid header name")]
    InvalidHeaderName,
}

/// Strip one trailing `\n` and an optional `\r` before it.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Returns true for a line that terminates the header block.
pub fn is_blank_line(line: &[u8]) -> bool {
    trim_line_ending(line).is_empty()
}

fn is_http_version(version: &str) -> bool {
    match version.strip_prefix("HTTP/").map(str::as_bytes) {
        Some([major, b'.', minor]) => major.is_ascii_digit() && minor.is_ascii_digit(),
        _ => false,
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}

/// A parsed `Name: Value` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub name: String,
    pub value: String,
}

impl HeaderLine {
    pub fn parse(line: &[u8]) -> Result<Self, ParseError> {
        let line = std::str::from_utf8(trim_line_ending(line)).map_err(|_| ParseError::InvalidUtf8)?;
        let Some(p) = memchr::memchr(b':', line.as_bytes()) else {
            return Err(ParseError::NoDelimiterFound(':'));
        };

        let name = &line[..p];
        if !is_token(name) {
            return Err(ParseError::InvalidHeaderName);
        }
        let value = line[p + 1..].trim_matches([' ', '\t']);

        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A client request: the request line plus every header read so far.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    method: String,
    target: Uri,
    version: String,
    headers: Vec<HeaderLine>,
}

impl ParsedRequest {
    /// Parse `METHOD SP request-target SP HTTP-version`.
    pub fn parse_request_line(line: &[u8]) -> Result<Self, ParseError> {
        let line = std::str::from_utf8(trim_line_ending(line)).map_err(|_| ParseError::InvalidUtf8)?;
        let tokens: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = tokens[..] else {
            return Err(ParseError::WrongTokenCount(tokens.len()));
        };

        if !is_token(method) {
            return Err(ParseError::InvalidMethod);
        }
        if !is_http_version(version) {
            return Err(ParseError::InvalidVersion);
        }
        let target: Uri = target.parse().map_err(|_| ParseError::InvalidTarget)?;

        Ok(Self {
            method: method.to_string(),
            target,
            version: version.to_string(),
            headers: Vec::new(),
        })
    }

    /// Parse one header line and append it.
    pub fn push_header_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        self.headers.push(HeaderLine::parse(line)?);
        Ok(())
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    fn is_http_target(&self) -> bool {
        self.target.scheme() == Some(&http::uri::Scheme::HTTP)
    }

    /// Host named by an `http://` target, as written (IPv6 keeps brackets).
    pub fn host(&self) -> Option<&str> {
        if !self.is_http_target() {
            return None;
        }
        self.target.host().filter(|h| !h.is_empty())
    }

    /// Port named by the target, if any.
    pub fn port(&self) -> Option<&str> {
        if !self.is_http_target() {
            return None;
        }
        let authority = self.target.authority()?.as_str();
        let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
        let after_host = host_port.rfind(']').map_or(host_port, |i| &host_port[i + 1..]);
        after_host
            .rsplit_once(':')
            .map(|(_, port)| port)
            .filter(|p| !p.is_empty())
    }

    /// Path and query to request from the origin. An empty path becomes `/`,
    /// also when only a query follows the authority.
    pub fn path(&self) -> Option<Cow<'_, str>> {
        if !self.is_http_target() {
            return None;
        }
        let pq = self.target.path_and_query().map_or("", |pq| pq.as_str());
        if pq.is_empty() {
            Some(Cow::Borrowed("/"))
        } else if pq.starts_with('?') {
            Some(Cow::Owned(format!("/{pq}")))
        } else {
            Some(Cow::Borrowed(pq))
        }
    }

    /// Headers in the order the client sent them.
    pub fn headers(&self) -> &[HeaderLine] {
        &self.headers
    }
}

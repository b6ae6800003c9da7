//! Transaction outcomes.
//!
//! Every way a transaction can stop short of a finished relay, and whether
//! the client gets an error page for it.

use thiserror::Error;

use crate::http::{ErrorPage, ParseError, TranslateError};
use crate::net::upstream::UpstreamError;
use crate::proxy::relay::RelayError;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("client closed before sending a request")]
    ClientGone,
    #[error("client read failed: {0}")]
    ClientRead(#[source] std::io::Error),
    #[error("malformed request line: {0}")]
    MalformedRequest(#[source] ParseError),
    #[error("method {0} not implemented")]
    MethodNotImplemented(String),
    #[error("request target names no host")]
    MissingHost,
    #[error("request target names no path")]
    MissingPath,
    #[error("malformed header line: {0}")]
    MalformedHeader(#[source] ParseError),
    #[error("outbound request too large: {0}")]
    RequestTooLarge(#[from] TranslateError),
    #[error("origin unreachable: {0}")]
    OriginUnreachable(#[from] UpstreamError),
    #[error("sending request to origin failed: {0}")]
    OriginWrite(#[source] std::io::Error),
    #[error("relay aborted: {0}")]
    Relay(#[from] RelayError),
}

impl TransactionError {
    /// The page owed to the client, or `None` when the connection is just
    /// closed.
    pub fn error_page(&self) -> Option<ErrorPage> {
        match self {
            TransactionError::MalformedRequest(_) => Some(ErrorPage::malformed_request()),
            TransactionError::MethodNotImplemented(_) => Some(ErrorPage::method_not_implemented()),
            TransactionError::MalformedHeader(_) => Some(ErrorPage::bad_headers()),
            TransactionError::RequestTooLarge(_) => Some(ErrorPage::request_too_large()),
            TransactionError::OriginUnreachable(_) => Some(ErrorPage::origin_unreachable()),
            TransactionError::ClientGone
            | TransactionError::ClientRead(_)
            | TransactionError::MissingHost
            | TransactionError::MissingPath
            | TransactionError::OriginWrite(_)
            | TransactionError::Relay(_) => None,
        }
    }
}

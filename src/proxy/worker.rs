//! Per-connection transaction handling.
//!
//! # Responsibilities
//! - Read and validate the request line and headers
//! - Render the outbound request and open the origin connection
//! - Relay the origin response to the client
//! - Send an error page for the failure classes that warrant one
//! - Close both sockets on every path
//!
//! # Design Decisions
//! - The worker owns its client and origin streams outright; nothing is
//!   shared with other workers except the read-only config
//! - No timeouts: a stalled peer stalls only this worker

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::error::TransactionError;
use crate::http::request::is_blank_line;
use crate::http::{Destination, OutboundRequest, ParseError, ParsedRequest};
use crate::net::connection::{ClientConnection, Line};
use crate::net::upstream;
use crate::proxy::relay::relay;

/// Run one transaction to completion and close the connection.
pub async fn handle_connection<S>(mut client: ClientConnection<S>, config: Arc<ProxyConfig>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let span = tracing::info_span!(
        "connection",
        id = %client.id(),
        peer = %client.peer_addr()
    );

    async move {
        let started = Instant::now();
        match run_transaction(&mut client, &config).await {
            Ok(bytes) => {
                tracing::info!(
                    bytes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transaction complete"
                );
            }
            Err(e) => match e.error_page() {
                Some(page) => {
                    tracing::info!(status = page.status().as_u16(), error = %e, "Rejecting request");
                    page.send(&mut client).await;
                }
                None => {
                    tracing::debug!(error = %e, "Transaction aborted");
                }
            },
        }

        if let Err(e) = client.shutdown().await {
            tracing::trace!(error = %e, "Client shutdown failed");
        }
    }
    .instrument(span)
    .await
}

async fn run_transaction<S>(
    client: &mut ClientConnection<S>,
    config: &ProxyConfig,
) -> Result<u64, TransactionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let line = match client.read_line().await.map_err(TransactionError::ClientRead)? {
        Line::Data(line) => line,
        Line::TooLong => {
            return Err(TransactionError::MalformedRequest(ParseError::LineTooLong(
                config.limits.max_line_bytes,
            )))
        }
        Line::Eof => return Err(TransactionError::ClientGone),
    };
    tracing::debug!(request_line = %String::from_utf8_lossy(&line).trim_end(), "Request received");

    let mut request = ParsedRequest::parse_request_line(&line).map_err(TransactionError::MalformedRequest)?;
    if request.method() != "GET" {
        return Err(TransactionError::MethodNotImplemented(request.method().to_string()));
    }
    let Some(destination) = Destination::of(&request, &config.upstream.default_port) else {
        return Err(if request.host().is_none() {
            TransactionError::MissingHost
        } else {
            TransactionError::MissingPath
        });
    };

    read_headers(client, &mut request, config.limits.max_line_bytes).await?;

    let outbound = OutboundRequest::for_request(&request, destination, &config.upstream.user_agent);
    let wire = outbound.render(config.limits.max_request_bytes)?;

    let Destination { host, port, path } = outbound.destination();
    tracing::debug!(
        host = %host,
        port = %port,
        path = %path,
        forwarded_headers = outbound.headers().len(),
        "Forwarding request"
    );

    let mut origin = upstream::connect(host, port).await?;
    origin
        .write_all(&wire)
        .await
        .map_err(TransactionError::OriginWrite)?;

    let bytes = relay(&mut origin, client, config.relay.chunk_size).await?;
    Ok(bytes)
}

/// Read header lines into `request` up to the blank line.
///
/// EOF or a read error ends the header block early; the request is still
/// forwarded with what arrived.
async fn read_headers<S>(
    client: &mut ClientConnection<S>,
    request: &mut ParsedRequest,
    max_line_bytes: usize,
) -> Result<(), TransactionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        match client.read_line().await {
            Ok(Line::Data(line)) => {
                if is_blank_line(&line) {
                    return Ok(());
                }
                request
                    .push_header_line(&line)
                    .map_err(TransactionError::MalformedHeader)?;
            }
            Ok(Line::TooLong) => {
                return Err(TransactionError::MalformedHeader(ParseError::LineTooLong(
                    max_line_bytes,
                )));
            }
            Ok(Line::Eof) => return Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "Header read failed, forwarding headers received so far");
                return Ok(());
            }
        }
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, ports valid)
//! - Reject header values that would corrupt the outbound request
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_host must not be empty")]
    EmptyBindHost,
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("relay.chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("upstream.default_port {0:?} is not a valid port")]
    InvalidDefaultPort(String),
    #[error("upstream.user_agent must be a non-empty single line")]
    InvalidUserAgent,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_host.trim().is_empty() {
        errors.push(ValidationError::EmptyBindHost);
    }

    if config.limits.max_line_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("max_line_bytes"));
    }
    if config.limits.max_request_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("max_request_bytes"));
    }

    if config.relay.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    match config.upstream.default_port.parse::<u16>() {
        Ok(port) if port != 0 => {}
        _ => errors.push(ValidationError::InvalidDefaultPort(
            config.upstream.default_port.clone(),
        )),
    }

    let agent = &config.upstream.user_agent;
    if agent.is_empty() || agent.contains(['\r', '\n']) {
        errors.push(ValidationError::InvalidUserAgent);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

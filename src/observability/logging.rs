//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Honor `RUST_LOG`, falling back to the configured filter
//! - Select full or compact output
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Every transaction logs inside a `connection` span

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the filter used when `RUST_LOG` is unset or unparsable.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.log_filter)?),
    }
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(env_filter(config)?);
    let fmt = tracing_subscriber::fmt::layer().with_ansi(config.ansi);

    match config.log_format {
        LogFormat::Full => registry.with(fmt).try_init()?,
        LogFormat::Compact => registry.with(fmt.compact()).try_init()?,
    }
    Ok(())
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → connection spans (id, peer) around each transaction
//!
//! Consumers:
//!     → logging.rs fmt layer (stdout)
//! ```

pub mod logging;

pub use logging::{init_logging, LoggingError};

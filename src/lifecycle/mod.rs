//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Apply CLI overrides → Validate → Bind → Accept loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then the listener
//! - In-flight transactions are not drained or cancelled

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{prepare_config, run, Overrides, StartupError};

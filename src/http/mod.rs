//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! client lines
//!     → request.rs (request line + headers → ParsedRequest)
//!     → translate.rs (ParsedRequest → OutboundRequest bytes)
//!     → [origin connection, relay]
//!
//! failure branches
//!     → response.rs (ErrorPage → client)
//! ```

pub mod request;
pub mod response;
pub mod translate;

pub use request::{HeaderLine, ParseError, ParsedRequest};
pub use response::ErrorPage;
pub use translate::{Destination, OutboundRequest, TranslateError, INJECTED_HEADERS};

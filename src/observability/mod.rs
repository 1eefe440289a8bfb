//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Clients, request sender, confirmation poller produce:
//!     → tracing events with structured fields (request id, operation, tx hash)
//!     → metrics.rs (counters, histograms) through the metrics facade
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON), if the app installs it
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Signing keys and passwords never appear in events

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

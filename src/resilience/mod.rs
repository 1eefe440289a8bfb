//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Confirmation round fails:
//!     → backoff.rs (delay for the next round: fixed or exponential + jitter)
//!     → clock.rs (sleep through the injectable clock)
//!     → cancel.rs (stop early when the caller cancels)
//! Each receipt lookup:
//!     → timeouts.rs (bounded; a timeout is a failed lookup, not a fatal error)
//! ```
//!
//! # Design Decisions
//! - Every lookup has a deadline; the overall poll only has one if configured
//! - Time is injected so polling logic is testable without real sleeps

pub mod backoff;
pub mod cancel;
pub mod clock;
pub mod timeouts;

pub use backoff::PollDelay;
pub use cancel::CancelToken;
pub use clock::{Clock, TokioClock, VirtualClock};
pub use timeouts::{with_timeout, TimeoutError};

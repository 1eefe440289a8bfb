//! HTTP request subsystem.
//!
//! # Data Flow
//! ```text
//! Client method (validated parameters)
//!     → operation.rs (verb + encoding for the operation)
//!     → auth.rs (Basic for node calls, Bearer for platform calls)
//!     → sender.rs (request id, timeout, send, metrics)
//!     → response.rs (status + error envelope → JSON value or Error::Api)
//!     → client method reshapes the value
//! ```

pub mod auth;
pub mod operation;
pub mod response;
pub mod sender;

pub use auth::{Credentials, NodeContext, PlatformContext};
pub use operation::{Encoding, NodeApi, OperationCategory, OperationDescriptor, OperationKind};
pub use sender::{ApiCall, Payload, RequestSender, X_REQUEST_ID};

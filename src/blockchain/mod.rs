//! Ledger transaction subsystem.
//!
//! # Data Flow
//! ```text
//! RawTransaction descriptors + SigningKey
//!     → signer.rs (validate all, sign locally, EIP-2718 encode)
//!     → submit.rs (one batch through LedgerNode, one hash per envelope)
//!     → confirmation.rs (rounds of concurrent receipt lookups until all mined)
//! ```
//!
//! `node.rs` holds the [`LedgerNode`] seam and its HTTP implementation;
//! `engine.rs` composes the steps for a single node.
//!
//! # Security Constraints
//! - Signing keys are supplied per call and never stored
//! - Never log private keys; `SigningKey` is redacted in `Debug`
//! - Signing performs no I/O

pub mod confirmation;
pub mod engine;
pub mod node;
pub mod signer;
pub mod submit;
pub mod types;

pub use confirmation::{ConfirmationOutcome, ConfirmationPoller, HashSelection};
pub use engine::TransactionEngine;
pub use node::{LedgerNode, NodeRpc};
pub use signer::{sign_transaction, sign_transactions, signer_address};
pub use submit::{submit, SubmissionOutcome};
pub use types::{
    parse_hash, BlockchainError, BlockchainResult, LookupError, Quantity, RawTransaction, Receipt,
    SignedEnvelope, SigningKey,
};

//! Metrics collection.
//!
//! # Metrics
//! - `blockcluster_requests_total` (counter): API requests by operation, status
//! - `blockcluster_request_duration_seconds` (histogram): request latency
//! - `blockcluster_transactions_submitted_total` (counter): signed envelopes submitted
//! - `blockcluster_confirmation_rounds_total` (counter): receipt lookup rounds by outcome
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the application picks the exporter
//! - Labels are low-cardinality (operation name, status class)

use std::time::Instant;

use metrics::{counter, histogram};

/// Record a completed API request.
pub fn record_request(operation: &str, status: u16, start: Instant) {
    counter!(
        "blockcluster_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "blockcluster_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request that failed before a status was received.
pub fn record_transport_error(operation: &str) {
    counter!(
        "blockcluster_requests_total",
        "operation" => operation.to_string(),
        "status" => "transport_error"
    )
    .increment(1);
}

/// Record envelopes handed to the ledger node.
pub fn record_transactions_submitted(count: usize) {
    counter!("blockcluster_transactions_submitted_total").increment(count as u64);
}

/// How a confirmation round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Confirmed,
    Pending,
    Rejected,
}

impl RoundOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

/// Record the outcome of one confirmation round.
pub fn record_confirmation_round(outcome: RoundOutcome) {
    counter!("blockcluster_confirmation_rounds_total", "outcome" => outcome.as_str()).increment(1);
}

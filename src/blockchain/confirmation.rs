//! All-or-nothing confirmation polling.
//!
//! # Data Flow
//! ```text
//! hashes (deduplicated, first-seen order)
//!     → round: one concurrent receipt lookup per hash (join_all)
//!     → every receipt present?   → ConfirmationOutcome
//!     → any lookup rejected?     → BlockchainError::LookupRejected
//!     → otherwise                → sleep PollDelay, next round
//! ```
//!
//! # Design Decisions
//! - A round either confirms every hash or none; partial progress is discarded
//!   and every hash is looked up again next round
//! - Transient lookup failures count as "not yet mined"
//! - Unbounded by default; round limit, deadline and cancellation are opt-in

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::instrument;

use crate::blockchain::node::LedgerNode;
use crate::blockchain::submit::SubmissionOutcome;
use crate::blockchain::types::{
    parse_hash, BlockchainError, BlockchainResult, LookupError, Receipt,
};
use crate::config::ConfirmationConfig;
use crate::observability::metrics::{self, RoundOutcome};
use crate::resilience::{with_timeout, CancelToken, Clock, PollDelay, TokioClock};

/// One or more transaction hashes to wait for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashSelection(Vec<TxHash>);

impl HashSelection {
    /// Parse caller-supplied hex hashes. Any malformed entry fails the whole set.
    pub fn parse<S: AsRef<str>>(hashes: &[S]) -> BlockchainResult<Self> {
        hashes
            .iter()
            .map(|h| parse_hash(h.as_ref()))
            .collect::<BlockchainResult<Vec<_>>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_unique(self) -> Vec<TxHash> {
        let mut seen = HashSet::with_capacity(self.0.len());
        self.0.into_iter().filter(|h| seen.insert(*h)).collect()
    }
}

impl From<TxHash> for HashSelection {
    fn from(hash: TxHash) -> Self {
        Self(vec![hash])
    }
}

impl From<Vec<TxHash>> for HashSelection {
    fn from(hashes: Vec<TxHash>) -> Self {
        Self(hashes)
    }
}

impl From<&[TxHash]> for HashSelection {
    fn from(hashes: &[TxHash]) -> Self {
        Self(hashes.to_vec())
    }
}

impl From<SubmissionOutcome> for HashSelection {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self(outcome.transaction_hashes)
    }
}

/// Receipts for every distinct hash, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationOutcome {
    pub receipts: Vec<Receipt>,
    /// Lookup rounds performed, including the confirming one.
    pub rounds: u32,
    #[serde(skip)]
    pub elapsed: Duration,
}

enum RoundResult {
    Confirmed(Vec<Receipt>),
    Pending { missing: usize },
    Rejected { hash: TxHash, message: String },
}

/// Polls a [`LedgerNode`] until every hash in a set has a receipt.
#[derive(Clone)]
pub struct ConfirmationPoller {
    node: Arc<dyn LedgerNode>,
    clock: Arc<dyn Clock>,
    delay: PollDelay,
    max_rounds: Option<u32>,
    deadline: Option<Duration>,
    lookup_timeout: Duration,
    cancel: Option<CancelToken>,
}

impl ConfirmationPoller {
    pub fn new(node: Arc<dyn LedgerNode>, config: &ConfirmationConfig) -> Self {
        Self {
            node,
            clock: Arc::new(TokioClock),
            delay: PollDelay::from_config(config),
            max_rounds: config.max_rounds,
            deadline: config.deadline(),
            lookup_timeout: config.lookup_timeout(),
            cancel: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_delay(mut self, delay: PollDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Wait until every hash has a receipt.
    ///
    /// An empty selection resolves immediately without contacting the node.
    #[instrument(skip_all, fields(hashes = tracing::field::Empty))]
    pub async fn await_confirmation(
        &self,
        hashes: impl Into<HashSelection>,
    ) -> BlockchainResult<ConfirmationOutcome> {
        let hashes = hashes.into().into_unique();
        tracing::Span::current().record("hashes", hashes.len());

        let start = self.clock.now();
        if hashes.is_empty() {
            return Ok(ConfirmationOutcome {
                receipts: Vec::new(),
                rounds: 0,
                elapsed: Duration::ZERO,
            });
        }

        let mut rounds = 0u32;
        loop {
            if self.is_cancelled() {
                tracing::info!(rounds, "Confirmation polling cancelled");
                return Err(BlockchainError::Cancelled { rounds });
            }

            rounds += 1;
            let result = self.run_round(&hashes).await;
            let elapsed = self.clock.now() - start;

            match result {
                RoundResult::Confirmed(receipts) => {
                    metrics::record_confirmation_round(RoundOutcome::Confirmed);
                    tracing::info!(
                        rounds,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "All transactions confirmed"
                    );
                    return Ok(ConfirmationOutcome {
                        receipts,
                        rounds,
                        elapsed,
                    });
                }
                RoundResult::Rejected { hash, message } => {
                    metrics::record_confirmation_round(RoundOutcome::Rejected);
                    tracing::warn!(tx_hash = %hash, error = %message, "Receipt lookup rejected");
                    return Err(BlockchainError::LookupRejected { hash, message });
                }
                RoundResult::Pending { missing } => {
                    metrics::record_confirmation_round(RoundOutcome::Pending);
                    tracing::debug!(round = rounds, missing, "Transactions pending");
                }
            }

            if self.max_rounds.is_some_and(|max| rounds >= max) {
                return Err(BlockchainError::ConfirmationTimeout { rounds, elapsed });
            }

            let mut delay = self.delay.delay_for(rounds);
            if let Some(deadline) = self.deadline {
                if elapsed >= deadline {
                    return Err(BlockchainError::ConfirmationTimeout { rounds, elapsed });
                }
                delay = delay.min(deadline - elapsed);
            }

            match &self.cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            tracing::info!(rounds, "Confirmation polling cancelled");
                            return Err(BlockchainError::Cancelled { rounds });
                        }
                        _ = self.clock.sleep(delay) => {}
                    }
                }
                None => self.clock.sleep(delay).await,
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    async fn run_round(&self, hashes: &[TxHash]) -> RoundResult {
        let lookups = hashes.iter().map(|hash| self.lookup(hash));
        let results = join_all(lookups).await;

        let mut receipts = Vec::with_capacity(hashes.len());
        let mut missing = 0;

        for (hash, result) in hashes.iter().zip(results) {
            match result {
                Ok(Some(receipt)) => receipts.push(receipt),
                Ok(None) => missing += 1,
                Err(LookupError::Transient(message)) => {
                    tracing::debug!(tx_hash = %hash, error = %message, "Transient lookup failure");
                    missing += 1;
                }
                Err(LookupError::Rejected(message)) => {
                    return RoundResult::Rejected {
                        hash: *hash,
                        message,
                    }
                }
            }
        }

        if missing == 0 {
            RoundResult::Confirmed(receipts)
        } else {
            RoundResult::Pending { missing }
        }
    }

    async fn lookup(&self, hash: &TxHash) -> Result<Option<Receipt>, LookupError> {
        with_timeout(
            "receipt lookup",
            self.lookup_timeout,
            self.node.transaction_receipt(hash),
        )
        .await
        .map_err(|e| LookupError::Transient(e.to_string()))?
    }
}

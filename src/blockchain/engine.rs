//! Sign, submit and confirm against one ledger node.

use std::sync::Arc;

use tracing::instrument;

use crate::blockchain::confirmation::{ConfirmationOutcome, ConfirmationPoller, HashSelection};
use crate::blockchain::node::LedgerNode;
use crate::blockchain::signer::sign_transactions;
use crate::blockchain::submit::{submit, SubmissionOutcome};
use crate::blockchain::types::{BlockchainResult, RawTransaction, SigningKey};
use crate::config::ConfirmationConfig;
use crate::resilience::{CancelToken, Clock, PollDelay};

/// Transaction pipeline bound to a single node.
#[derive(Clone)]
pub struct TransactionEngine {
    node: Arc<dyn LedgerNode>,
    poller: ConfirmationPoller,
}

impl TransactionEngine {
    pub fn new(node: Arc<dyn LedgerNode>, config: &ConfirmationConfig) -> Self {
        let poller = ConfirmationPoller::new(node.clone(), config);
        Self { node, poller }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.poller = self.poller.with_clock(clock);
        self
    }

    pub fn with_delay(mut self, delay: PollDelay) -> Self {
        self.poller = self.poller.with_delay(delay);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.poller = self.poller.with_cancel_token(token);
        self
    }

    pub fn poller(&self) -> &ConfirmationPoller {
        &self.poller
    }

    /// Sign every descriptor locally, then submit them as one batch.
    ///
    /// Signing failures abort before anything is sent.
    #[instrument(skip_all, fields(count = raw.len()))]
    pub async fn sign_and_submit(
        &self,
        raw: &[RawTransaction],
        key: &SigningKey,
    ) -> BlockchainResult<SubmissionOutcome> {
        let envelopes = sign_transactions(raw, key)?;
        submit(self.node.as_ref(), &envelopes).await
    }

    pub async fn await_confirmation(
        &self,
        hashes: impl Into<HashSelection>,
    ) -> BlockchainResult<ConfirmationOutcome> {
        self.poller.await_confirmation(hashes).await
    }
}

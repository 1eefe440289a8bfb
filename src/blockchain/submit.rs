//! Batched submission of signed envelopes.

use alloy::primitives::TxHash;
use serde::Serialize;

use crate::blockchain::node::LedgerNode;
use crate::blockchain::types::{BlockchainError, BlockchainResult, SignedEnvelope};
use crate::observability::metrics;

/// Hashes assigned by the node, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub transaction_hashes: Vec<TxHash>,
}

/// Submit `envelopes` as one batch.
///
/// An empty batch is a no-op and performs no request. The node must return
/// exactly one hash per envelope.
pub async fn submit(
    node: &dyn LedgerNode,
    envelopes: &[SignedEnvelope],
) -> BlockchainResult<SubmissionOutcome> {
    if envelopes.is_empty() {
        return Ok(SubmissionOutcome {
            transaction_hashes: Vec::new(),
        });
    }

    let hashes = node.submit_signed_transactions(envelopes).await?;

    if hashes.len() != envelopes.len() {
        return Err(BlockchainError::Submission(format!(
            "node returned {} hashes for {} transactions",
            hashes.len(),
            envelopes.len()
        )));
    }

    for (index, (envelope, hash)) in envelopes.iter().zip(&hashes).enumerate() {
        if envelope.hash() != *hash {
            tracing::warn!(
                index,
                expected = %envelope.hash(),
                returned = %hash,
                "Node returned a hash that differs from the signed envelope"
            );
        }
    }

    metrics::record_transactions_submitted(hashes.len());
    tracing::info!(count = hashes.len(), "Submitted signed transactions");

    Ok(SubmissionOutcome {
        transaction_hashes: hashes,
    })
}

//! Ledger node transport.
//!
//! # Responsibilities
//! - Submit a batch of signed envelopes in one request
//! - Fetch a single transaction receipt over JSON-RPC
//! - Classify lookup failures as transient or permanent
//!
//! # Design Decisions
//! - [`LedgerNode`] is the seam the poller and submitter depend on; tests
//!   substitute scripted nodes
//! - Transport errors, timeouts, 5xx and 429 are transient; everything the
//!   node answered deliberately (JSON-RPC error, 4xx, undecodable receipt) is not

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::TxHash;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::types::{
    parse_hash, BlockchainError, BlockchainResult, LookupError, Receipt, SignedEnvelope,
};
use crate::error::Error;
use crate::http::{ApiCall, NodeApi, NodeContext, OperationDescriptor, Payload, RequestSender};

/// Operations a ledger node exposes to the transaction engine.
#[async_trait]
pub trait LedgerNode: Send + Sync {
    /// Submit envelopes in order; the node answers with one hash per envelope.
    async fn submit_signed_transactions(
        &self,
        envelopes: &[SignedEnvelope],
    ) -> BlockchainResult<Vec<TxHash>>;

    /// `Ok(None)` means the transaction is not mined yet.
    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, LookupError>;
}

/// [`LedgerNode`] backed by a node's HTTP API.
#[derive(Debug)]
pub struct NodeRpc {
    context: NodeContext,
    sender: RequestSender,
    next_id: AtomicU64,
}

impl NodeRpc {
    pub fn new(context: NodeContext, sender: RequestSender) -> Self {
        Self {
            context,
            sender,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn context(&self) -> &NodeContext {
        &self.context
    }
}

#[async_trait]
impl LedgerNode for NodeRpc {
    async fn submit_signed_transactions(
        &self,
        envelopes: &[SignedEnvelope],
    ) -> BlockchainResult<Vec<TxHash>> {
        let api = NodeApi::SendRawTransactions;
        let url = self
            .context
            .api_url(api.name())
            .map_err(|e| BlockchainError::Submission(e.to_string()))?;
        let raw: Vec<&str> = envelopes.iter().map(SignedEnvelope::as_hex).collect();

        let body = self
            .sender
            .send(ApiCall {
                name: api.name(),
                descriptor: api.descriptor(),
                url,
                credentials: self.context.credentials(),
                payload: Payload::Json(json!({ "rawTxns": raw })),
            })
            .await
            .map_err(|e| match e {
                Error::Api { message, .. } => BlockchainError::Submission(message),
                other => BlockchainError::Submission(other.to_string()),
            })?;

        match body.get("txnHash") {
            Some(Value::String(hash)) => Ok(vec![parse_hash(hash)?]),
            Some(Value::Array(hashes)) => hashes
                .iter()
                .map(|h| {
                    h.as_str()
                        .ok_or_else(|| BlockchainError::InvalidHash(h.to_string()))
                        .and_then(parse_hash)
                })
                .collect(),
            _ => Err(BlockchainError::Submission(format!(
                "response has no txnHash: {}",
                body
            ))),
        }
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, LookupError> {
        let url = self
            .context
            .jsonrpc_url()
            .map_err(|e| LookupError::Rejected(e.to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let result = self
            .sender
            .send(ApiCall {
                name: "eth_getTransactionReceipt",
                descriptor: OperationDescriptor::POST,
                url,
                credentials: self.context.credentials(),
                payload: Payload::Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": "eth_getTransactionReceipt",
                    "params": [hash],
                })),
            })
            .await;

        let body = match result {
            Ok(body) => body,
            Err(e) => return Err(classify(e)),
        };

        match body.get("result") {
            None | Some(Value::Null) => Ok(None),
            Some(receipt) => serde_json::from_value(receipt.clone())
                .map(Some)
                .map_err(|e| LookupError::Rejected(format!("undecodable receipt: {}", e))),
        }
    }
}

fn classify(error: Error) -> LookupError {
    match error {
        Error::Http(e) => LookupError::Transient(e.to_string()),
        Error::Timeout(e) => LookupError::Transient(e.to_string()),
        Error::Api { status, message } if status >= 500 || status == 429 => {
            LookupError::Transient(format!("status {}: {}", status, message))
        }
        other => LookupError::Rejected(other.to_string()),
    }
}

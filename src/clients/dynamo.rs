//! Dynamo node client.
//!
//! # Data Flow
//! ```text
//! call_api(api, data, key?)
//!     → node API (raw = true when a key is given)
//!     → blockchain write?
//!         key given: rawTx → sign locally → utility/sendRawTxns → txnHash
//!         no key:    txnHash from the response
//!     → wait until every txnHash is mined
//!     → response (rawTx replaced by txnHash)
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use url::Url;

use crate::blockchain::{
    ConfirmationOutcome, HashSelection, NodeRpc, RawTransaction, SigningKey, SubmissionOutcome,
    TransactionEngine,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{ApiCall, NodeApi, NodeContext, Payload, RequestSender};
use crate::resilience::{CancelToken, Clock};

/// Where a Dynamo node lives and how to authenticate to it.
#[derive(Clone, PartialEq, Eq)]
pub struct DynamoOptions {
    pub location_domain: String,
    pub instance_id: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for DynamoOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoOptions")
            .field("location_domain", &self.location_domain)
            .field("instance_id", &self.instance_id)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Client for one Dynamo node.
#[derive(Clone)]
pub struct Dynamo {
    context: NodeContext,
    sender: RequestSender,
    engine: TransactionEngine,
}

impl Dynamo {
    pub fn new(options: &DynamoOptions, config: &ClientConfig) -> Result<Self> {
        let context = NodeContext::new(
            &config.http.node_scheme,
            &options.location_domain,
            &options.instance_id,
            options.password.as_deref(),
        )?;
        Self::with_context(context, config)
    }

    /// Client against an already-built node context.
    pub fn with_context(context: NodeContext, config: &ClientConfig) -> Result<Self> {
        let sender = RequestSender::new(&config.http)?;
        let node = Arc::new(NodeRpc::new(context.clone(), sender.clone()));
        let engine = TransactionEngine::new(node, &config.confirmation);

        Ok(Self {
            context,
            sender,
            engine,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.engine = self.engine.with_cancel_token(token);
        self
    }

    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    pub fn instance_id(&self) -> &str {
        self.context.instance_id()
    }

    /// Endpoint for direct JSON-RPC access to the node.
    pub fn jsonrpc_url(&self) -> Result<Url> {
        self.context.jsonrpc_url()
    }

    /// Call a node API.
    ///
    /// With `signing`, the node is asked for unsigned transactions which are
    /// signed locally and submitted. Blockchain writes only return once every
    /// resulting transaction is mined.
    pub async fn call_api(
        &self,
        api: NodeApi,
        data: Value,
        signing: Option<&SigningKey>,
    ) -> Result<Value> {
        let mut data = match data {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(Error::invalid(format!(
                    "data for {} must be an object, got {}",
                    api, other
                )))
            }
        };
        if signing.is_some() {
            data.insert("raw".to_string(), Value::Bool(true));
        }

        let response = self
            .sender
            .send(ApiCall {
                name: api.name(),
                descriptor: api.descriptor(),
                url: self.context.api_url(api.name())?,
                credentials: self.context.credentials(),
                payload: Payload::Json(Value::Object(data)),
            })
            .await?;

        if !api.requires_confirmation() {
            return Ok(response);
        }

        let mut response = match response {
            Value::Object(map) => map,
            other => {
                return Err(Error::Decode(format!(
                    "{} should answer with an object, got {}",
                    api, other
                )))
            }
        };

        let hashes = match signing {
            Some(key) => {
                let raw_tx = response
                    .remove("rawTx")
                    .ok_or_else(|| Error::Decode(format!("{} response has no rawTx", api)))?;
                let (raw, single) = raw_transactions(raw_tx)?;
                let submitted = self.engine.sign_and_submit(&raw, key).await?;

                let hashes: Vec<Value> = submitted
                    .transaction_hashes
                    .iter()
                    .map(|h| Value::String(h.to_string()))
                    .collect();
                let txn_hash = match (single, hashes.as_slice()) {
                    (true, [hash]) => hash.clone(),
                    _ => Value::Array(hashes),
                };
                response.insert("txnHash".to_string(), txn_hash);
                HashSelection::from(submitted)
            }
            None => {
                let txn_hash = response
                    .get("txnHash")
                    .ok_or_else(|| Error::Decode(format!("{} response has no txnHash", api)))?;
                hash_selection(txn_hash)?
            }
        };

        tracing::debug!(operation = %api, hashes = hashes.len(), "Waiting for transactions to be mined");
        self.engine.await_confirmation(hashes).await?;

        Ok(Value::Object(response))
    }

    pub async fn sign_and_submit(
        &self,
        raw: &[RawTransaction],
        key: &SigningKey,
    ) -> Result<SubmissionOutcome> {
        Ok(self.engine.sign_and_submit(raw, key).await?)
    }

    pub async fn await_confirmation(
        &self,
        hashes: impl Into<HashSelection>,
    ) -> Result<ConfirmationOutcome> {
        Ok(self.engine.await_confirmation(hashes).await?)
    }
}

/// `rawTx` may be one descriptor or an array. The flag reports a single one.
fn raw_transactions(value: Value) -> Result<(Vec<RawTransaction>, bool)> {
    let decode = |e: serde_json::Error| Error::Decode(format!("invalid rawTx: {}", e));
    match value {
        Value::Array(items) => {
            let raw = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<RawTransaction>, _>>()
                .map_err(decode)?;
            Ok((raw, false))
        }
        single => Ok((vec![serde_json::from_value(single).map_err(decode)?], true)),
    }
}

fn hash_selection(value: &Value) -> Result<HashSelection> {
    match value {
        Value::String(hash) => Ok(HashSelection::parse(&[hash])?),
        Value::Array(items) => {
            let hashes = items
                .iter()
                .map(|h| {
                    h.as_str()
                        .ok_or_else(|| Error::Decode(format!("txnHash entry is not a string: {}", h)))
                })
                .collect::<Result<Vec<&str>>>()?;
            Ok(HashSelection::parse(&hashes)?)
        }
        other => Err(Error::Decode(format!("txnHash should be a string or array, got {}", other))),
    }
}

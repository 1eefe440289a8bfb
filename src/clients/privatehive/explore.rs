//! Ledger explorer queries. Every query is scoped to a channel.

use serde_json::{json, Value};

use crate::clients::common::require;
use crate::clients::privatehive::PrivatehiveNode;
use crate::error::Result;
use crate::http::{OperationDescriptor, Payload};

pub struct Explore<'a> {
    node: &'a PrivatehiveNode,
}

impl<'a> Explore<'a> {
    pub(crate) fn new(node: &'a PrivatehiveNode) -> Self {
        Self { node }
    }

    pub async fn latest_block(&self, channel_name: &str) -> Result<Value> {
        self.query(
            "privatehive.explore.latest_block",
            "/explore/getLatestBlock",
            channel_name,
            json!({ "channelName": channel_name }),
        )
        .await
    }

    pub async fn transaction(&self, channel_name: &str, txn_id: &str) -> Result<Value> {
        require("txnId", txn_id)?;
        self.query(
            "privatehive.explore.transaction",
            "/explore/getTransaction",
            channel_name,
            json!({ "channelName": channel_name, "txnId": txn_id }),
        )
        .await
    }

    pub async fn blocks(&self, channel_name: &str) -> Result<Value> {
        self.query(
            "privatehive.explore.blocks",
            "/explore/getBlocks",
            channel_name,
            json!({ "channelName": channel_name }),
        )
        .await
    }

    pub async fn list_orgs(&self, channel_name: &str) -> Result<Value> {
        self.query(
            "privatehive.explore.list_orgs",
            "/explore/organisations",
            channel_name,
            json!({ "channelName": channel_name }),
        )
        .await
    }

    /// A specific block. The node serves it from the latest-block endpoint.
    pub async fn block(&self, channel_name: &str, block_number: u64) -> Result<Value> {
        self.query(
            "privatehive.explore.block",
            "/explore/getLatestBlock",
            channel_name,
            json!({ "channelName": channel_name, "blockNumber": block_number }),
        )
        .await
    }

    pub async fn chaincodes_instantiated(&self, channel_name: &str) -> Result<Value> {
        self.query(
            "privatehive.explore.chaincodes_instantiated",
            "/explore/chaincodesInstantiated",
            channel_name,
            json!({ "channelName": channel_name }),
        )
        .await
    }

    async fn query(&self, name: &str, path: &str, channel_name: &str, params: Value) -> Result<Value> {
        require("channelName", channel_name)?;
        self.node
            .request_message(name, OperationDescriptor::GET, path, Payload::Json(params))
            .await
    }
}

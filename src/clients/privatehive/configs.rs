//! Node configuration artifacts.

use serde_json::Value;
use tokio::io::AsyncWrite;

use crate::clients::common::copy_body;
use crate::clients::privatehive::PrivatehiveNode;
use crate::error::Result;
use crate::http::{OperationDescriptor, Payload};

pub struct Configs<'a> {
    node: &'a PrivatehiveNode,
}

impl<'a> Configs<'a> {
    pub(crate) fn new(node: &'a PrivatehiveNode) -> Self {
        Self { node }
    }

    pub async fn orderer_certs(&self) -> Result<Value> {
        self.get("privatehive.config.orderer_certs", "/config/ordererCerts")
            .await
    }

    pub async fn org_details(&self) -> Result<Value> {
        self.get("privatehive.config.org_details", "/config/orgDetails")
            .await
    }

    pub async fn connection_profile(&self) -> Result<Value> {
        self.get("privatehive.config.connection_profile", "/config/connectionProfile")
            .await
    }

    /// Download the crypto config archive into `writer`. Returns bytes written.
    pub async fn crypto_config<W>(&self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let response = self
            .node
            .stream("privatehive.config.crypto_config", "/config/cryptoConfig")
            .await?;
        let written = copy_body(response, writer).await?;
        tracing::debug!(instance_id = self.node.instance_id(), bytes = written, "Crypto config downloaded");
        Ok(written)
    }

    async fn get(&self, name: &str, path: &str) -> Result<Value> {
        self.node
            .request_message(name, OperationDescriptor::GET, path, Payload::Empty)
            .await
    }
}

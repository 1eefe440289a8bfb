//! Channel management.

use serde_json::{json, Value};

use crate::clients::common::require;
use crate::clients::privatehive::PrivatehiveNode;
use crate::error::{Error, Result};
use crate::http::{OperationDescriptor, Payload};

pub struct Channels<'a> {
    node: &'a PrivatehiveNode,
}

impl<'a> Channels<'a> {
    pub(crate) fn new(node: &'a PrivatehiveNode) -> Self {
        Self { node }
    }

    /// Create a channel.
    ///
    /// `orderer_url` and `orderer_domain` fall back to the orderer attached with
    /// [`PrivatehiveNode::with_orderer`]; the domain becomes
    /// `orderer.{organization}.com`.
    pub async fn create(
        &self,
        name: &str,
        orderer_url: Option<&str>,
        orderer_domain: Option<&str>,
    ) -> Result<Value> {
        require("name", name)?;
        let (orderer_url, orderer_domain) = self.resolve_orderer(orderer_url, orderer_domain)?;

        self.node
            .request_message(
                "privatehive.channel.create",
                OperationDescriptor::POST,
                "/channel/create",
                Payload::Json(json!({
                    "name": name,
                    "ordererDomain": orderer_domain,
                    "ordererURL": orderer_url,
                })),
            )
            .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.node
            .request_message(
                "privatehive.channel.list",
                OperationDescriptor::GET,
                "/channels/list",
                Payload::Empty,
            )
            .await
    }

    fn resolve_orderer(
        &self,
        orderer_url: Option<&str>,
        orderer_domain: Option<&str>,
    ) -> Result<(String, String)> {
        let attached = self.node.orderer.as_ref();

        let url = orderer_url
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| attached.and_then(|o| o.url.clone()))
            .ok_or_else(|| {
                Error::invalid("orderer URL is missing; pass one or set an orderer on this node")
            })?;

        let domain = match orderer_domain.filter(|d| !d.is_empty()) {
            Some(domain) => domain.to_string(),
            None => attached
                .map(|o| o.organization.as_str())
                .filter(|org| !org.is_empty())
                .map(|org| format!("orderer.{}.com", org.to_lowercase()))
                .ok_or_else(|| {
                    Error::invalid(
                        "orderer organization is missing; pass a domain or set an orderer on this node",
                    )
                })?,
        };

        Ok((url, domain))
    }
}

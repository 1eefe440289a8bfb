//! Privatehive provisioning on the platform.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

use crate::clients::common::{require, to_json, PlatformApi};
use crate::clients::privatehive::{NodeInfo, NodeType, PrivatehiveNode};
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::http::response::{take_field, take_string};
use crate::http::{OperationDescriptor, Payload};

const PRIVATEHIVE_PATH: &str = "/api/platform/privatehive";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdererType {
    #[default]
    Solo,
    Kafka,
}

impl fmt::Display for OrdererType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Solo => "solo",
            Self::Kafka => "kafka",
        })
    }
}

/// Parameters for a new privatehive node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePrivatehive {
    pub node_type: NodeType,
    pub name: String,
    pub org_name: String,
    pub network_config_id: String,
    pub location_code: String,
    /// Peer the orderer attaches to. Orderers only.
    pub peer_id: Option<String>,
    /// Orderers only; `solo` when absent.
    pub orderer_type: Option<OrdererType>,
    pub voucher_code: Option<String>,
    /// Only honoured when the network configuration allows disk changes.
    pub disk_space: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
    location_code: &'a str,
    name: &'a str,
    org_name: &'a str,
    network_config_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    disk_space: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voucher_code: Option<&'a str>,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    orderer_type: Option<OrdererType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peer_id: Option<&'a str>,
}

/// Filters for [`PrivatehivePlatform::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub show_deleted: bool,
    pub node_type: Option<NodeType>,
    pub location_code: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
}

impl ListFilter {
    fn to_query(&self) -> Value {
        json!({
            "showDeleted": self.show_deleted,
            "nodeType": self.node_type,
            "locationCode": self.location_code,
            "createdAfter": self.created_after,
            "createdBefore": self.created_before,
        })
    }
}

pub struct PrivatehivePlatform<'a> {
    api: &'a PlatformApi,
    http: &'a HttpConfig,
}

impl<'a> PrivatehivePlatform<'a> {
    pub(crate) fn new(api: &'a PlatformApi, http: &'a HttpConfig) -> Self {
        Self { api, http }
    }

    /// Create a node; returns its instance id.
    pub async fn create(&self, params: &CreatePrivatehive) -> Result<String> {
        let is_orderer = params.node_type == NodeType::Orderer;
        let peer_id = params.peer_id.as_deref().filter(|p| !p.is_empty());

        if is_orderer && peer_id.is_none() {
            return Err(Error::invalid("peerId is required to create an orderer"));
        }
        require("name", &params.name)?;
        require("orgName", &params.org_name)?;

        let orderer_type = if is_orderer {
            Some(params.orderer_type.unwrap_or_else(|| {
                tracing::warn!("Orderer type not specified, defaulting to solo");
                OrdererType::Solo
            }))
        } else {
            None
        };

        require("networkConfigId", &params.network_config_id)?;
        require("locationCode", &params.location_code)?;

        let body = CreateBody {
            location_code: &params.location_code,
            name: &params.name,
            org_name: &params.org_name,
            network_config_id: &params.network_config_id,
            disk_space: params.disk_space,
            voucher_code: params.voucher_code.as_deref(),
            node_type: params.node_type,
            orderer_type,
            peer_id: peer_id.filter(|_| is_orderer),
        };

        let response = self
            .api
            .call(
                "privatehive.create",
                OperationDescriptor::POST,
                PRIVATEHIVE_PATH,
                Payload::Json(to_json(&body)?),
            )
            .await?;
        let instance_id = take_string(take_field(response, "data")?, "instanceId")?;
        tracing::info!(instance_id = %instance_id, node_type = %params.node_type, "Privatehive node created");
        Ok(instance_id)
    }

    /// Nodes matching `filter`, or only `instance_id` when given.
    pub async fn list(&self, instance_id: Option<&str>, filter: &ListFilter) -> Result<Value> {
        let path = match instance_id.filter(|id| !id.is_empty()) {
            Some(id) => format!("{}/{}", PRIVATEHIVE_PATH, id),
            None => PRIVATEHIVE_PATH.to_string(),
        };

        let response = self
            .api
            .call(
                "privatehive.list",
                OperationDescriptor::GET,
                &path,
                Payload::Json(filter.to_query()),
            )
            .await?;
        take_field(response, "data")
    }

    /// Delete a node; returns its instance id.
    pub async fn delete(&self, instance_id: &str) -> Result<String> {
        require("instanceId", instance_id)?;

        let response = self
            .api
            .call(
                "privatehive.delete",
                OperationDescriptor::DELETE,
                &format!("{}/{}", PRIVATEHIVE_PATH, instance_id),
                Payload::Empty,
            )
            .await?;
        take_string(take_field(response, "data")?, "instanceId")
    }

    /// Invite a user to a channel; returns the invite id.
    pub async fn invite_user_to_channel(
        &self,
        email: &str,
        peer_id: &str,
        channel_name: &str,
        orderer_domain: &str,
        orderer_connection_details: &str,
    ) -> Result<String> {
        require("email", email)?;
        require("peerId", peer_id)?;
        require("channelName", channel_name)?;

        let response = self
            .api
            .call(
                "privatehive.invite",
                OperationDescriptor::POST,
                &format!("{}/invite", PRIVATEHIVE_PATH),
                Payload::Json(json!({
                    "email": email,
                    "networkId": peer_id,
                    "channelName": channel_name,
                    "ordererDomain": orderer_domain,
                    "ordererConnectionDetails": orderer_connection_details,
                })),
            )
            .await?;
        take_string(take_field(response, "data")?, "inviteId")
    }

    /// Accept a channel invite with `peer_id`; returns the peer's instance id.
    pub async fn accept_channel_invitation(&self, invite_id: &str, peer_id: &str) -> Result<String> {
        require("inviteId", invite_id)?;
        require("peerId", peer_id)?;

        let response = self
            .api
            .call(
                "privatehive.accept_invite",
                OperationDescriptor::POST,
                &format!("{}/invite/accept/{}", PRIVATEHIVE_PATH, invite_id),
                Payload::Json(json!({ "peerId": peer_id })),
            )
            .await?;
        take_string(take_field(response, "data")?, "instanceId")
    }

    /// Pending channel invites.
    pub async fn list_channel_invites(&self) -> Result<Value> {
        let response = self
            .api
            .call(
                "privatehive.list_invites",
                OperationDescriptor::GET,
                &format!("{}/invite", PRIVATEHIVE_PATH),
                Payload::Empty,
            )
            .await?;
        take_field(response, "data")
    }

    /// Handle on a node, typically built from a [`list`](Self::list) entry.
    pub fn get_node(&self, info: NodeInfo) -> Result<PrivatehiveNode> {
        PrivatehiveNode::new(info, self.http)
    }
}

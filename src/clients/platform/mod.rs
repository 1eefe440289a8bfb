//! Platform account client: networks, invites and privatehive provisioning.

pub mod privatehive;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::clients::common::{require, to_json, PlatformApi};
use crate::config::{ClientConfig, HttpConfig};
use crate::error::{Error, Result};
use crate::http::response::{take_field, take_string};
use crate::http::{OperationDescriptor, Payload};

pub use privatehive::{CreatePrivatehive, ListFilter, OrdererType, PrivatehivePlatform};

/// Role of a Dynamo network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkRole {
    Authority,
    Peer,
}

impl NetworkRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authority => "authority",
            Self::Peer => "peer",
        }
    }
}

impl fmt::Display for NetworkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "authority" => Ok(Self::Authority),
            "peer" => Ok(Self::Peer),
            _ => Err(Error::invalid("node type should either be authority or peer")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNetwork {
    pub network_name: String,
    pub network_config_id: String,
    pub location_code: String,
}

/// A node that joins an existing network. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinNetwork {
    pub network_name: String,
    pub node_type: NetworkRole,
    pub genesis_file_content: String,
    #[serde(rename = "totalENodes")]
    pub total_enodes: Vec<String>,
    #[serde(rename = "impulseURL")]
    pub impulse_url: String,
    pub assets_contract_address: String,
    pub atomic_swap_contract_address: String,
    pub streams_contract_address: String,
    pub impulse_contract_address: String,
    pub location_code: String,
    pub network_config_id: String,
}

impl JoinNetwork {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("networkName", &self.network_name),
            ("genesisFileContent", &self.genesis_file_content),
            ("impulseURL", &self.impulse_url),
            ("assetsContractAddress", &self.assets_contract_address),
            ("atomicSwapContractAddress", &self.atomic_swap_contract_address),
            ("streamsContractAddress", &self.streams_contract_address),
            ("impulseContractAddress", &self.impulse_contract_address),
            ("locationCode", &self.location_code),
            ("networkConfigId", &self.network_config_id),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                return Err(Error::invalid(format!("missing property {}", field)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteViaEmail {
    pub invite_to_email: String,
    pub network_id: String,
    pub network_type: NetworkRole,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvite {
    pub invite_id: String,
    pub location_code: String,
    pub network_config_id: String,
}

#[derive(Debug, Clone)]
pub struct Platform {
    api: PlatformApi,
    http: HttpConfig,
}

impl Platform {
    /// Fails with `InvalidArgument` when `api_key` is empty.
    pub fn new(api_key: &str, config: &ClientConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::invalid("API key required while initializing Platform"));
        }
        Ok(Self {
            api: PlatformApi::new(&config.platform.host, api_key, &config.http)?,
            http: config.http.clone(),
        })
    }

    pub fn privatehive(&self) -> PrivatehivePlatform<'_> {
        PrivatehivePlatform::new(&self.api, &self.http)
    }

    /// Network types; pass a type id to create or invite requests.
    pub async fn fetch_network_types(&self) -> Result<Value> {
        self.api
            .call(
                "platform.network_types",
                OperationDescriptor::GET,
                "/api/platform/networks/types",
                Payload::Empty,
            )
            .await
    }

    pub async fn fetch_locations(&self) -> Result<Value> {
        self.api
            .call(
                "platform.locations",
                OperationDescriptor::GET,
                "/api/platform/networks/locations",
                Payload::Empty,
            )
            .await
    }

    /// Create a network; returns the new network's `data`, if any.
    pub async fn create_network(&self, network: &CreateNetwork) -> Result<Option<Value>> {
        let response = self
            .api
            .call(
                "platform.create_network",
                OperationDescriptor::POST,
                "/api/platform/networks",
                Payload::Json(to_json(network)?),
            )
            .await?;
        Ok(take_field(response, "data").ok().filter(|d| !d.is_null()))
    }

    pub async fn delete_network(&self, network_id: &str) -> Result<Value> {
        require("networkId", network_id)?;
        self.api
            .call(
                "platform.delete_network",
                OperationDescriptor::DELETE,
                &format!("/api/platform/networks/{}", network_id),
                Payload::Empty,
            )
            .await
    }

    pub async fn join_network(&self, join: &JoinNetwork) -> Result<Value> {
        join.validate()?;
        self.api
            .call(
                "platform.join_network",
                OperationDescriptor::POST,
                "/api/platform/networks/join",
                Payload::Json(to_json(join)?),
            )
            .await
    }

    /// Invite a user by email; returns the invite id.
    pub async fn invite_via_email(&self, invite: &InviteViaEmail) -> Result<String> {
        if invite.invite_to_email.split('@').count() != 2 {
            return Err(Error::invalid("invalid email id to invite"));
        }
        require("networkId", &invite.network_id)?;

        let response = self
            .api
            .call(
                "platform.invite",
                OperationDescriptor::POST,
                "/api/platform/networks/invite",
                Payload::Json(to_json(invite)?),
            )
            .await?;
        take_string(response, "inviteId")
    }

    /// Accept an invite; returns the new node's instance id.
    pub async fn accept_invite(&self, accept: &AcceptInvite) -> Result<String> {
        require("inviteId", &accept.invite_id)?;

        let response = self
            .api
            .call(
                "platform.accept_invite",
                OperationDescriptor::POST,
                "/api/platform/networks/invite/accept",
                Payload::Json(to_json(accept)?),
            )
            .await?;
        take_string(take_field(response, "data")?, "instanceId")
    }
}

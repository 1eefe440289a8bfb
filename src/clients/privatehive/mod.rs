//! Privatehive (Hyperledger Fabric) node client.
//!
//! # Data Flow
//! ```text
//! PrivatehiveNode (NodeInfo + optional Basic credentials + optional orderer)
//!     → channels() / chaincodes() / configs() / explore() / notifications()
//!     → {domain}/api/privatehive/{instanceId}{path}
//!     → { error, message } envelope → message
//! ```
//!
//! # Design Decisions
//! - Nodes are immutable: `with_auth` and `with_orderer` return new values
//! - Only peers accept an orderer

pub mod chaincodes;
pub mod channel;
pub mod configs;
pub mod explore;
pub mod notifications;

use std::fmt;
use std::str::FromStr;

use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::clients::common::require;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::http::auth::parse_base_url;
use crate::http::response::take_field;
use crate::http::{ApiCall, Credentials, OperationDescriptor, Payload, RequestSender};

pub use chaincodes::{ChaincodeCall, ChaincodeLanguage, Chaincodes, Instantiate, Upgrade};
pub use channel::Channels;
pub use configs::Configs;
pub use explore::Explore;
pub use notifications::{Notification, Notifications};

/// Role of a Fabric node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Peer,
    Orderer,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Peer => "peer",
            Self::Orderer => "orderer",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "peer" => Ok(Self::Peer),
            "orderer" => Ok(Self::Orderer),
            _ => Err(Error::invalid("privatehive node type should be peer or orderer")),
        }
    }
}

/// Node details as listed by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub name: String,
    pub instance_id: String,
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub location_code: String,
    /// Base URL of the node's host, scheme optional.
    #[serde(default)]
    pub domain: String,
    #[serde(default, rename = "type")]
    pub node_type: Option<NodeType>,
    /// gRPC address of an orderer, without protocol.
    #[serde(default, rename = "ordererURL")]
    pub orderer_url: Option<String>,
    #[serde(default)]
    pub orderer_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OrdererRef {
    url: Option<String>,
    organization: String,
}

/// Handle on one privatehive node.
#[derive(Debug, Clone)]
pub struct PrivatehiveNode {
    info: NodeInfo,
    node_type: NodeType,
    base: String,
    credentials: Credentials,
    orderer: Option<OrdererRef>,
    sender: RequestSender,
}

impl PrivatehiveNode {
    pub fn new(info: NodeInfo, http: &HttpConfig) -> Result<Self> {
        require("instanceId", &info.instance_id)?;
        require("domain", &info.domain)?;

        let node_type = match info.node_type {
            Some(node_type) => node_type,
            None if info.orderer_type.is_some() => NodeType::Orderer,
            None => NodeType::Peer,
        };

        let domain = info.domain.trim_end_matches('/');
        let base = if domain.contains("://") {
            format!("{}/api/privatehive/{}", domain, info.instance_id)
        } else {
            format!("{}://{}/api/privatehive/{}", http.node_scheme, domain, info.instance_id)
        };
        parse_base_url(&base)?;

        Ok(Self {
            info,
            node_type,
            base,
            credentials: Credentials::None,
            orderer: None,
            sender: RequestSender::new(http)?,
        })
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn instance_id(&self) -> &str {
        &self.info.instance_id
    }

    pub fn organization(&self) -> &str {
        &self.info.org_name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Same node, authenticating with HTTP Basic.
    pub fn with_auth(&self, username: &str, password: &str) -> Self {
        Self {
            credentials: Credentials::basic(username, password),
            ..self.clone()
        }
    }

    /// Same peer, with `orderer` as the default for channel creation.
    pub fn with_orderer(&self, orderer: &PrivatehiveNode) -> Result<Self> {
        if self.node_type != NodeType::Peer {
            return Err(Error::invalid("an orderer can only be set on peer nodes"));
        }
        Ok(Self {
            orderer: Some(OrdererRef {
                url: orderer.info.orderer_url.clone(),
                organization: orderer.info.org_name.clone(),
            }),
            ..self.clone()
        })
    }

    pub fn channels(&self) -> Channels<'_> {
        Channels::new(self)
    }

    pub fn chaincodes(&self) -> Chaincodes<'_> {
        Chaincodes::new(self)
    }

    pub fn configs(&self) -> Configs<'_> {
        Configs::new(self)
    }

    pub fn explore(&self) -> Explore<'_> {
        Explore::new(self)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    fn url(&self, path: &str) -> Result<Url> {
        parse_base_url(&format!("{}{}", self.base, path))
    }

    pub(crate) async fn request(
        &self,
        name: &str,
        descriptor: OperationDescriptor,
        path: &str,
        payload: Payload,
    ) -> Result<Value> {
        self.sender
            .send(ApiCall {
                name,
                descriptor,
                url: self.url(path)?,
                credentials: &self.credentials,
                payload,
            })
            .await
    }

    /// Send and unwrap the `message` field of the node's envelope.
    pub(crate) async fn request_message(
        &self,
        name: &str,
        descriptor: OperationDescriptor,
        path: &str,
        payload: Payload,
    ) -> Result<Value> {
        let body = self.request(name, descriptor, path, payload).await?;
        take_field(body, "message")
    }

    pub(crate) async fn stream(&self, name: &str, path: &str) -> Result<Response> {
        self.sender
            .send_streaming(ApiCall {
                name,
                descriptor: OperationDescriptor::GET,
                url: self.url(path)?,
                credentials: &self.credentials,
                payload: Payload::Empty,
            })
            .await
    }
}

#[cfg(test)]
pub(crate) fn offline_node(node_type: NodeType) -> PrivatehiveNode {
    PrivatehiveNode::new(
        NodeInfo {
            name: "Peer 1".to_string(),
            instance_id: "abcd1234".to_string(),
            org_name: "BlockCluster".to_string(),
            domain: "http://127.0.0.1:9".to_string(),
            node_type: Some(node_type),
            orderer_url: Some("1.2.3.4:7050".to_string()),
            ..Default::default()
        },
        &HttpConfig::default(),
    )
    .unwrap()
}

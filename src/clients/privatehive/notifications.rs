//! Chaincode event notifications delivered to a webhook.

use serde::Serialize;
use serde_json::{json, Value};

use crate::clients::common::{require, to_json};
use crate::clients::privatehive::PrivatehiveNode;
use crate::error::Result;
use crate::http::{OperationDescriptor, Payload};

/// A chaincode event subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub chaincode_name: String,
    pub channel_name: String,
    pub chaincode_event_name: String,
    #[serde(rename = "notificationURL")]
    pub notification_url: String,
}

impl Notification {
    fn validate_target(&self) -> Result<()> {
        require("chaincodeName", &self.chaincode_name)?;
        require("channelName", &self.channel_name)?;
        require("chaincodeEventName", &self.chaincode_event_name)
    }

    fn validate(&self) -> Result<()> {
        self.validate_target()?;
        require("notificationURL", &self.notification_url)
    }
}

pub struct Notifications<'a> {
    node: &'a PrivatehiveNode,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(node: &'a PrivatehiveNode) -> Self {
        Self { node }
    }

    pub async fn add(&self, notification: &Notification) -> Result<Value> {
        notification.validate()?;
        self.post("privatehive.notifications.add", "/notifications/add", to_json(notification)?)
            .await
    }

    pub async fn update(&self, notification: &Notification) -> Result<Value> {
        notification.validate()?;
        self.post("privatehive.notifications.update", "/notifications/update", to_json(notification)?)
            .await
    }

    /// Remove a subscription. The URL is not needed.
    pub async fn remove(&self, notification: &Notification) -> Result<Value> {
        notification.validate_target()?;
        self.post(
            "privatehive.notifications.remove",
            "/notifications/remove",
            json!({
                "chaincodeName": notification.chaincode_name,
                "channelName": notification.channel_name,
                "chaincodeEventName": notification.chaincode_event_name,
            }),
        )
        .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.node
            .request_message(
                "privatehive.notifications.list",
                OperationDescriptor::GET,
                "/notifications/list",
                Payload::Empty,
            )
            .await
    }

    async fn post(&self, name: &str, path: &str, body: Value) -> Result<Value> {
        self.node
            .request_message(name, OperationDescriptor::POST, path, Payload::Json(body))
            .await
    }
}

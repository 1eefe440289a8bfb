//! Resource clients.
//!
//! # Responsibilities
//! - Validate required parameters before any request is made
//! - Turn method calls into authenticated requests through [`crate::http`]
//! - Reshape responses (`data`, `message`, `inviteId`, ...) into return values
//!
//! Node-scoped clients ([`Dynamo`], [`PrivatehiveNode`]) authenticate with
//! HTTP Basic; platform-scoped clients ([`Hyperion`], [`Paymeter`],
//! [`Platform`]) with a Bearer API key.

pub(crate) mod common;
pub mod dynamo;
pub mod hyperion;
pub mod paymeter;
pub mod platform;
pub mod privatehive;

pub use dynamo::{Dynamo, DynamoOptions};
pub use hyperion::{FileUpload, Hyperion};
pub use paymeter::{CreateWallet, Paymeter, SendTokens};
pub use platform::{
    AcceptInvite, CreateNetwork, CreatePrivatehive, InviteViaEmail, JoinNetwork, ListFilter,
    NetworkRole, OrdererType, Platform, PrivatehivePlatform,
};
pub use privatehive::{NodeInfo, NodeType, PrivatehiveNode};

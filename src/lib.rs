//! BlockCluster client library.
//!
//! Clients for the BlockCluster platform: Dynamo ledger nodes, Hyperion file
//! storage, Paymeter wallets, platform provisioning and privatehive (Fabric)
//! nodes. Ledger writes can be signed locally and are only reported complete
//! once every resulting transaction is mined.

pub mod blockchain;
pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;

pub use blockchain::{RawTransaction, SigningKey, TransactionEngine};
pub use clients::{Dynamo, Hyperion, Paymeter, Platform, PrivatehiveNode};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::NodeApi;

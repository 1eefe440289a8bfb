//! Typed operation descriptors.
//!
//! Every remote call is described by a verb and a payload encoding decided at
//! compile time. Node-scoped Dynamo operations form a closed enum so the verb,
//! encoding and confirmation behavior cannot drift from the operation name.

use reqwest::Method;

/// Where the request payload goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Payload fields become query-string parameters.
    Query,
    /// Payload is sent as a JSON body.
    Json,
    /// Payload is a multipart form.
    Multipart,
}

/// Verb + encoding of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub method: Method,
    pub encoding: Encoding,
}

impl OperationDescriptor {
    pub const GET: Self = Self {
        method: Method::GET,
        encoding: Encoding::Query,
    };
    pub const DELETE: Self = Self {
        method: Method::DELETE,
        encoding: Encoding::Query,
    };
    pub const POST: Self = Self {
        method: Method::POST,
        encoding: Encoding::Json,
    };
    pub const PUT: Self = Self {
        method: Method::PUT,
        encoding: Encoding::Json,
    };
    pub const UPLOAD: Self = Self {
        method: Method::POST,
        encoding: Encoding::Multipart,
    };
}

/// Whether an operation changes ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

/// Which part of the node an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCategory {
    /// Produces or reads ledger transactions.
    Blockchain,
    /// Node plumbing that is not itself a ledger transaction.
    Utility,
}

/// Dynamo node API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeApi {
    CreateAssetType,
    IssueSoloAsset,
    IssueBulkAsset,
    TransferSoloAsset,
    TransferBulkAsset,
    CloseSoloAsset,
    GetSoloAssetInfo,
    GetBulkAssetBalance,
    CreateStream,
    PublishToStream,
    GetStreamItems,
    /// Batched submission of locally signed transactions.
    SendRawTransactions,
}

impl NodeApi {
    pub const ALL: [NodeApi; 12] = [
        Self::CreateAssetType,
        Self::IssueSoloAsset,
        Self::IssueBulkAsset,
        Self::TransferSoloAsset,
        Self::TransferBulkAsset,
        Self::CloseSoloAsset,
        Self::GetSoloAssetInfo,
        Self::GetBulkAssetBalance,
        Self::CreateStream,
        Self::PublishToStream,
        Self::GetStreamItems,
        Self::SendRawTransactions,
    ];

    /// Path segment under `/api/node/{instanceId}/`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAssetType => "assets/createAssetType",
            Self::IssueSoloAsset => "assets/issueSoloAsset",
            Self::IssueBulkAsset => "assets/issueBulkAsset",
            Self::TransferSoloAsset => "assets/transferSoloAsset",
            Self::TransferBulkAsset => "assets/transferBulkAsset",
            Self::CloseSoloAsset => "assets/closeSoloAsset",
            Self::GetSoloAssetInfo => "assets/getSoloAssetInfo",
            Self::GetBulkAssetBalance => "assets/getBulkAssetBalance",
            Self::CreateStream => "streams/create",
            Self::PublishToStream => "streams/publish",
            Self::GetStreamItems => "streams/getStreamItems",
            Self::SendRawTransactions => "utility/sendRawTxns",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|api| api.name() == name)
    }

    pub fn descriptor(&self) -> OperationDescriptor {
        match self {
            Self::GetBulkAssetBalance | Self::GetStreamItems => OperationDescriptor::GET,
            _ => OperationDescriptor::POST,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::GetSoloAssetInfo | Self::GetBulkAssetBalance | Self::GetStreamItems => {
                OperationKind::Read
            }
            _ => OperationKind::Write,
        }
    }

    pub fn category(&self) -> OperationCategory {
        match self {
            Self::SendRawTransactions => OperationCategory::Utility,
            _ => OperationCategory::Blockchain,
        }
    }

    /// Writes to the ledger answer with a transaction hash that must be mined
    /// before the call is reported complete.
    pub fn requires_confirmation(&self) -> bool {
        self.kind() == OperationKind::Write && self.category() == OperationCategory::Blockchain
    }
}

impl std::fmt::Display for NodeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

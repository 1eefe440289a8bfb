//! Ledger-facing types and error definitions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy::consensus::{TxEip1559, TxLegacy};
use alloy::primitives::{Address, Bytes, TxHash, TxKind, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur while signing, submitting or confirming transactions.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Signing key is not 32 bytes of hex or not a valid secp256k1 scalar.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// A raw transaction is missing a required field or has an unusable value.
    #[error("Invalid transaction #{index}: {field} {reason}")]
    InvalidTransaction {
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// A hash returned by the node or supplied by the caller is malformed.
    #[error("Invalid transaction hash: {0}")]
    InvalidHash(String),

    /// ECDSA signing itself failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The node rejected the submitted batch.
    #[error("Transaction submission failed: {0}")]
    Submission(String),

    /// The node answered a receipt lookup with a permanent error.
    #[error("Receipt lookup for {hash} rejected: {message}")]
    LookupRejected { hash: TxHash, message: String },

    /// Configured round limit or deadline reached before every receipt appeared.
    #[error("Transactions not mined after {rounds} rounds ({}ms)", .elapsed.as_millis())]
    ConfirmationTimeout { rounds: u32, elapsed: Duration },

    /// The caller cancelled polling.
    #[error("Confirmation polling cancelled after {rounds} rounds")]
    Cancelled { rounds: u32 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Outcome of a failed receipt lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Network trouble, timeouts, 5xx: the next round may succeed.
    #[error("transient lookup failure: {0}")]
    Transient(String),

    /// The node understood the request and refused it.
    #[error("lookup rejected: {0}")]
    Rejected(String),
}

/// Parse a `0x`-prefixed 32-byte transaction hash.
pub fn parse_hash(raw: &str) -> BlockchainResult<TxHash> {
    let hex = raw
        .strip_prefix("0x")
        .ok_or_else(|| BlockchainError::InvalidHash(format!("'{}' is missing the 0x prefix", raw)))?;
    if hex.len() != 64 {
        return Err(BlockchainError::InvalidHash(format!(
            "'{}' should have 64 hex characters, has {}",
            raw,
            hex.len()
        )));
    }
    B256::from_str(hex).map_err(|e| BlockchainError::InvalidHash(format!("'{}': {}", raw, e)))
}

/// Unsigned integer quantity as found in node JSON.
///
/// Accepts JSON numbers, decimal strings and `0x` hex strings (`"0x"` is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quantity(pub U256);

impl Quantity {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let parsed = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            if hex.is_empty() {
                Ok(U256::ZERO)
            } else {
                U256::from_str_radix(hex, 16)
            }
        } else if raw.is_empty() {
            return Err("empty quantity".to_string());
        } else {
            U256::from_str_radix(raw, 10)
        };
        parsed
            .map(Quantity)
            .map_err(|e| format!("invalid quantity '{}': {}", raw, e))
    }

    fn narrow<T: TryFrom<U256>>(self, field: &'static str, index: usize) -> BlockchainResult<T> {
        T::try_from(self.0).map_err(|_| BlockchainError::InvalidTransaction {
            index,
            field,
            reason: format!("value {} is out of range", self.0),
        })
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", self.0))
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Quantity::parse(&s).map_err(de::Error::custom),
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(v) => Ok(Quantity::from(v)),
                None => Quantity::parse(&n.to_string()).map_err(de::Error::custom),
            },
            other => Err(de::Error::custom(format!(
                "expected a number or string quantity, got {}",
                other
            ))),
        }
    }
}

/// Unsigned transaction descriptor as produced by the node's raw endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub nonce: Option<Quantity>,
    pub gas_price: Option<Quantity>,
    pub max_fee_per_gas: Option<Quantity>,
    pub max_priority_fee_per_gas: Option<Quantity>,
    #[serde(alias = "gas")]
    pub gas_limit: Option<Quantity>,
    pub to: Option<Address>,
    pub value: Option<Quantity>,
    #[serde(alias = "input")]
    pub data: Option<Bytes>,
    pub chain_id: Option<Quantity>,
}

/// Validated, ready-to-sign transaction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UnsignedTransaction {
    Legacy(TxLegacy),
    Eip1559(TxEip1559),
}

impl RawTransaction {
    /// Legacy transfer/call with every required field set.
    pub fn legacy(nonce: u64, gas_price: u128, gas_limit: u64, to: Address, value: U256) -> Self {
        Self {
            nonce: Some(nonce.into()),
            gas_price: Some(Quantity(U256::from(gas_price))),
            gas_limit: Some(gas_limit.into()),
            to: Some(to),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Check required fields and build the typed transaction.
    ///
    /// `index` is the position in the caller's batch, reported in errors.
    pub(crate) fn to_unsigned(&self, index: usize) -> BlockchainResult<UnsignedTransaction> {
        let missing = |field: &'static str| BlockchainError::InvalidTransaction {
            index,
            field,
            reason: "is required".to_string(),
        };

        let nonce: u64 = self.nonce.ok_or_else(|| missing("nonce"))?.narrow("nonce", index)?;
        let gas_limit: u64 = self
            .gas_limit
            .ok_or_else(|| missing("gasLimit"))?
            .narrow("gasLimit", index)?;
        let to = TxKind::Call(self.to.ok_or_else(|| missing("to"))?);
        let value = self.value.ok_or_else(|| missing("value"))?.0;
        let input = self.data.clone().unwrap_or_default();
        let chain_id: Option<u64> = self
            .chain_id
            .map(|c| c.narrow("chainId", index))
            .transpose()?;

        if let Some(max_fee) = self.max_fee_per_gas {
            let chain_id = chain_id.ok_or_else(|| BlockchainError::InvalidTransaction {
                index,
                field: "chainId",
                reason: "is required for fee-market transactions".to_string(),
            })?;
            let priority = self
                .max_priority_fee_per_gas
                .ok_or_else(|| missing("maxPriorityFeePerGas"))?;

            return Ok(UnsignedTransaction::Eip1559(TxEip1559 {
                chain_id,
                nonce,
                gas_limit,
                max_fee_per_gas: max_fee.narrow("maxFeePerGas", index)?,
                max_priority_fee_per_gas: priority.narrow("maxPriorityFeePerGas", index)?,
                to,
                value,
                input,
                ..Default::default()
            }));
        }

        let gas_price: u128 = self
            .gas_price
            .ok_or_else(|| missing("gasPrice"))?
            .narrow("gasPrice", index)?;

        Ok(UnsignedTransaction::Legacy(TxLegacy {
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
        }))
    }
}

/// Caller-supplied private key, used for one signing call.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub(crate) fn to_signer(&self) -> BlockchainResult<PrivateKeySigner> {
        let hex = self.0.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        if hex.len() != 64 {
            return Err(BlockchainError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                hex.len()
            )));
        }
        let bytes = B256::from_str(hex)
            .map_err(|_| BlockchainError::InvalidKey("key is not valid hex".to_string()))?;
        PrivateKeySigner::from_bytes(&bytes)
            .map_err(|_| BlockchainError::InvalidKey("key is not a valid secp256k1 scalar".to_string()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

impl From<&str> for SigningKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SigningKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Signed transaction in EIP-2718 wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    encoded: String,
    hash: TxHash,
}

impl SignedEnvelope {
    pub(crate) fn new(encoded: String, hash: TxHash) -> Self {
        Self { encoded, hash }
    }

    /// `0x`-prefixed lowercase hex of the encoded transaction.
    pub fn as_hex(&self) -> &str {
        &self.encoded
    }

    /// Hash the ledger will assign to this transaction.
    pub fn hash(&self) -> TxHash {
        self.hash
    }
}

impl fmt::Display for SignedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Proof that a transaction was mined, as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<Quantity>,
    pub status: Option<Quantity>,
}

impl Receipt {
    pub fn block_number(&self) -> Option<u64> {
        self.block_number.and_then(|b| u64::try_from(b.0).ok())
    }

    /// `Some(false)` when the transaction was mined but reverted.
    pub fn succeeded(&self) -> Option<bool> {
        self.status.map(|s| s.0 != U256::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use serde_json::json;

    #[test]
    fn test_quantity_forms() {
        assert_eq!(Quantity::parse("0x").unwrap(), Quantity::from(0));
        assert_eq!(Quantity::parse("0x1b4").unwrap(), Quantity::from(436));
        assert_eq!(Quantity::parse("21000").unwrap(), Quantity::from(21000));
        assert!(Quantity::parse("").is_err());
        assert!(Quantity::parse("0xzz").is_err());

        let q: Quantity = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(q, Quantity::from(9));
        assert!(serde_json::from_value::<Quantity>(json!(true)).is_err());
    }

    #[test]
    fn test_raw_transaction_from_node_json() {
        let raw: RawTransaction = serde_json::from_value(json!({
            "nonce": "0x09",
            "gasPrice": "0x04a817c800",
            "gas": 21000,
            "to": "0x3535353535353535353535353535353535353535",
            "value": "1000000000000000000",
            "data": "0x",
            "chainId": 1
        }))
        .unwrap();

        assert_eq!(raw.gas_limit, Some(Quantity::from(21000)));
        assert_eq!(raw.to, Some(address!("3535353535353535353535353535353535353535")));
        match raw.to_unsigned(0).unwrap() {
            UnsignedTransaction::Legacy(tx) => {
                assert_eq!(tx.nonce, 9);
                assert_eq!(tx.gas_price, 20_000_000_000);
                assert_eq!(tx.chain_id, Some(1));
            }
            other => panic!("expected legacy, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_are_named() {
        let raw = RawTransaction {
            to: None,
            ..RawTransaction::legacy(0, 1, 21000, Address::ZERO, U256::ZERO)
        };
        let err = raw.to_unsigned(3).unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::InvalidTransaction { index: 3, field: "to", .. }
        ));

        let raw = RawTransaction {
            gas_price: None,
            ..RawTransaction::legacy(0, 1, 21000, Address::ZERO, U256::ZERO)
        };
        let err = raw.to_unsigned(0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid transaction #0: gasPrice is required");
    }

    #[test]
    fn test_fee_market_requires_chain_id() {
        let raw = RawTransaction {
            gas_price: None,
            max_fee_per_gas: Some(Quantity::from(2)),
            max_priority_fee_per_gas: Some(Quantity::from(1)),
            ..RawTransaction::legacy(0, 1, 21000, Address::ZERO, U256::ZERO)
        };
        let err = raw.to_unsigned(0).unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::InvalidTransaction { field: "chainId", .. }
        ));

        let raw = raw.with_chain_id(5);
        assert!(matches!(
            raw.to_unsigned(0).unwrap(),
            UnsignedTransaction::Eip1559(_)
        ));
    }

    #[test]
    fn test_nonce_out_of_range() {
        let raw = RawTransaction {
            nonce: Some(Quantity(U256::MAX)),
            ..RawTransaction::legacy(0, 1, 21000, Address::ZERO, U256::ZERO)
        };
        let err = raw.to_unsigned(0).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_parse_hash() {
        let ok = format!("0x{}", "ab".repeat(32));
        assert!(parse_hash(&ok).is_ok());
        assert!(parse_hash(&"ab".repeat(32)).is_err());
        assert!(parse_hash("0x1234").is_err());
        assert!(parse_hash(&format!("0x{}", "zz".repeat(32))).is_err());
    }

    #[test]
    fn test_receipt_from_rpc_result() {
        let receipt: Receipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x1b4",
            "status": "0x1",
            "gasUsed": "0x5208",
            "logs": []
        }))
        .unwrap();
        assert_eq!(receipt.block_number(), Some(436));
        assert_eq!(receipt.succeeded(), Some(true));
    }

    #[test]
    fn test_signing_key_is_redacted() {
        let key = SigningKey::new("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
        assert_eq!(format!("{:?}", key), "SigningKey(***)");
    }
}

//! Local transaction signing.
//!
//! # Security
//! - Keys are parsed per call and dropped when the call returns
//! - Keys are never logged; only the derived address is
//! - No network access happens here

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{keccak256, Address};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, RawTransaction, SignedEnvelope, SigningKey,
    UnsignedTransaction,
};

/// Sign a batch of raw transactions with one key.
///
/// Every descriptor is validated before any signature is produced, so a bad
/// entry anywhere in the batch yields no output at all.
///
/// # Arguments
/// * `raw` - Descriptors in submission order
/// * `key` - 32-byte private key as hex, `0x` optional
///
/// # Returns
/// One envelope per descriptor, same order.
pub fn sign_transactions(
    raw: &[RawTransaction],
    key: &SigningKey,
) -> BlockchainResult<Vec<SignedEnvelope>> {
    let signer = key.to_signer()?;

    let unsigned = raw
        .iter()
        .enumerate()
        .map(|(index, tx)| tx.to_unsigned(index))
        .collect::<BlockchainResult<Vec<_>>>()?;

    let envelopes = unsigned
        .into_iter()
        .map(|tx| sign_unsigned(&signer, tx))
        .collect::<BlockchainResult<Vec<_>>>()?;

    tracing::debug!(
        signer = %signer.address(),
        count = envelopes.len(),
        "Signed transactions"
    );

    Ok(envelopes)
}

/// Sign a single raw transaction.
pub fn sign_transaction(raw: &RawTransaction, key: &SigningKey) -> BlockchainResult<SignedEnvelope> {
    let signer = key.to_signer()?;
    sign_unsigned(&signer, raw.to_unsigned(0)?)
}

/// Address controlled by `key`.
pub fn signer_address(key: &SigningKey) -> BlockchainResult<Address> {
    Ok(key.to_signer()?.address())
}

fn sign_unsigned(
    signer: &PrivateKeySigner,
    tx: UnsignedTransaction,
) -> BlockchainResult<SignedEnvelope> {
    let envelope: TxEnvelope = match tx {
        UnsignedTransaction::Legacy(tx) => {
            let signature = signer
                .sign_hash_sync(&tx.signature_hash())
                .map_err(|e| BlockchainError::Signing(e.to_string()))?;
            tx.into_signed(signature).into()
        }
        UnsignedTransaction::Eip1559(tx) => {
            let signature = signer
                .sign_hash_sync(&tx.signature_hash())
                .map_err(|e| BlockchainError::Signing(e.to_string()))?;
            tx.into_signed(signature).into()
        }
    };

    let encoded = envelope.encoded_2718();
    Ok(SignedEnvelope::new(
        alloy::hex::encode_prefixed(&encoded),
        keccak256(&encoded),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::Quantity;
    use alloy::primitives::{address, U256};

    const EIP155_KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";
    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn eip155_example() -> RawTransaction {
        RawTransaction::legacy(
            9,
            20_000_000_000,
            21_000,
            address!("3535353535353535353535353535353535353535"),
            U256::from(1_000_000_000_000_000_000u64),
        )
        .with_chain_id(1)
    }

    #[test]
    fn test_eip155_reference_vector() {
        let signed = sign_transaction(&eip155_example(), &SigningKey::new(EIP155_KEY)).unwrap();
        assert_eq!(
            signed.as_hex(),
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(
            signed.hash().to_string(),
            "0x33469b22e9f636356c4160a87eb19df52b7412e8eac32a4a55ffe88ea8350788"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = SigningKey::new(ANVIL_KEY);
        let raw = vec![eip155_example(), eip155_example().with_data(vec![0xde, 0xad])];

        let first = sign_transactions(&raw, &key).unwrap();
        let second = sign_transactions(&raw, &key).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_ne!(first[0], first[1]);
        assert!(first.iter().all(|e| e.as_hex().starts_with("0x")));
    }

    #[test]
    fn test_key_with_or_without_prefix() {
        let bare = SigningKey::new(ANVIL_KEY);
        let prefixed = SigningKey::new(format!("0x{}", ANVIL_KEY));
        assert_eq!(
            sign_transaction(&eip155_example(), &bare).unwrap(),
            sign_transaction(&eip155_example(), &prefixed).unwrap()
        );
        assert_eq!(
            signer_address(&bare).unwrap(),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", "0x1234", &"zz".repeat(32), &"00".repeat(32)] {
            let err = sign_transaction(&eip155_example(), &SigningKey::new(key)).unwrap_err();
            assert!(
                matches!(err, BlockchainError::InvalidKey(_)),
                "key {key:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_bad_entry_fails_whole_batch() {
        let mut broken = eip155_example();
        broken.nonce = None;
        let raw = vec![eip155_example(), broken];

        let err = sign_transactions(&raw, &SigningKey::new(ANVIL_KEY)).unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::InvalidTransaction { index: 1, field: "nonce", .. }
        ));
    }

    #[test]
    fn test_fee_market_envelope_is_typed() {
        let raw = RawTransaction {
            gas_price: None,
            max_fee_per_gas: Some(Quantity::from(2_000_000_000)),
            max_priority_fee_per_gas: Some(Quantity::from(1_000_000_000)),
            ..eip155_example()
        };
        let signed = sign_transaction(&raw, &SigningKey::new(ANVIL_KEY)).unwrap();
        assert!(signed.as_hex().starts_with("0x02"));
    }

    #[test]
    fn test_empty_batch() {
        assert!(sign_transactions(&[], &SigningKey::new(ANVIL_KEY))
            .unwrap()
            .is_empty());
        assert!(sign_transactions(&[], &SigningKey::new("nope")).is_err());
    }
}

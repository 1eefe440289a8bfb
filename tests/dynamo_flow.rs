//! Dynamo node flows against a mock node.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blockcluster::blockchain::BlockchainError;
use blockcluster::clients::{Dynamo, DynamoOptions};
use blockcluster::resilience::VirtualClock;
use blockcluster::{ClientConfig, Error, NodeApi, SigningKey};
use serde_json::{json, Value};

mod common;

const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn tx_hash(byte: &str) -> String {
    format!("0x{}", byte.repeat(32))
}

fn receipt(hash: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "transactionHash": hash,
            "blockNumber": "0x10",
            "status": "0x1"
        }
    })
}

fn dynamo(backend: &common::MockBackend, clock: &VirtualClock) -> Dynamo {
    let mut config = ClientConfig::default();
    config.http.node_scheme = "http".to_string();

    Dynamo::new(
        &DynamoOptions {
            location_domain: backend.addr.to_string(),
            instance_id: "node1".to_string(),
            password: Some("secret".to_string()),
        },
        &config,
    )
    .unwrap()
    .with_clock(Arc::new(clock.clone()))
}

#[tokio::test]
async fn test_write_waits_for_mining() {
    let lookups = Arc::new(AtomicU32::new(0));
    let counter = lookups.clone();
    let hash = tx_hash("ab");
    let mined = hash.clone();

    let backend = common::start_programmable_backend(move |req| match req.path.as_str() {
        "/api/node/node1/assets/createAssetType" => {
            (200, json!({ "txnHash": mined }).to_string())
        }
        "/api/node/node1/jsonrpc" => {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                (200, json!({ "jsonrpc": "2.0", "id": 1, "result": null }).to_string())
            } else {
                (200, receipt(&mined).to_string())
            }
        }
        _ => (404, "Not Found".to_string()),
    })
    .await;
    let clock = VirtualClock::new();

    let response = dynamo(&backend, &clock)
        .call_api(
            NodeApi::CreateAssetType,
            json!({ "assetName": "license", "assetType": "solo" }),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response["txnHash"], json!(hash));
    assert_eq!(lookups.load(Ordering::SeqCst), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(3000); 2]);

    let create = &backend.requests_to("/api/node/node1/assets/createAssetType")[0];
    assert_eq!(create.method, "POST");
    assert_eq!(create.header("authorization"), Some("Basic bm9kZTE6c2VjcmV0"));
    assert_eq!(create.json()["assetName"], json!("license"));
    assert!(create.header("x-request-id").is_some());

    let rpc = &backend.requests_to("/api/node/node1/jsonrpc")[0];
    assert_eq!(rpc.json()["method"], json!("eth_getTransactionReceipt"));
    assert_eq!(rpc.json()["params"], json!([hash]));
}

#[tokio::test]
async fn test_signed_write_replaces_raw_tx() {
    let submitted_hash = tx_hash("cd");
    let reply_hash = submitted_hash.clone();

    let backend = common::start_programmable_backend(move |req| match req.path.as_str() {
        "/api/node/node1/assets/issueSoloAsset" => (
            200,
            json!({
                "rawTx": {
                    "nonce": "0x0",
                    "gasPrice": "0x3b9aca00",
                    "gasLimit": "0x30d40",
                    "to": "0x3535353535353535353535353535353535353535",
                    "value": "0x0",
                    "data": "0xdeadbeef",
                    "chainId": 1337
                }
            })
            .to_string(),
        ),
        "/api/node/node1/utility/sendRawTxns" => {
            (200, json!({ "txnHash": reply_hash }).to_string())
        }
        "/api/node/node1/jsonrpc" => (200, receipt(&reply_hash).to_string()),
        _ => (404, "Not Found".to_string()),
    })
    .await;
    let clock = VirtualClock::new();

    let response = dynamo(&backend, &clock)
        .call_api(
            NodeApi::IssueSoloAsset,
            json!({ "assetName": "license", "to": "0x01", "identifier": "1" }),
            Some(&SigningKey::new(ANVIL_KEY)),
        )
        .await
        .unwrap();

    assert_eq!(response.get("rawTx"), None);
    assert_eq!(response["txnHash"], json!(submitted_hash));

    let issue = &backend.requests_to("/api/node/node1/assets/issueSoloAsset")[0];
    assert_eq!(issue.json()["raw"], json!(true));

    let send = &backend.requests_to("/api/node/node1/utility/sendRawTxns")[0];
    let raw = send.json()["rawTxns"].clone();
    assert_eq!(raw.as_array().unwrap().len(), 1);
    assert!(raw[0].as_str().unwrap().starts_with("0xf8"));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_read_skips_confirmation() {
    let backend = common::start_programmable_backend(|req| match req.path.as_str() {
        "/api/node/node1/assets/getBulkAssetBalance" => {
            (200, json!({ "balance": 42 }).to_string())
        }
        _ => (404, "Not Found".to_string()),
    })
    .await;
    let clock = VirtualClock::new();

    let response = dynamo(&backend, &clock)
        .call_api(
            NodeApi::GetBulkAssetBalance,
            json!({ "assetName": "gold", "address": "0xabc" }),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response, json!({ "balance": 42 }));
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].query_pairs()["assetName"], "gold");
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_rpc_error_is_permanent() {
    let backend = common::start_programmable_backend(|req| match req.path.as_str() {
        "/api/node/node1/streams/create" => {
            (200, json!({ "txnHash": tx_hash("ef") }).to_string())
        }
        "/api/node/node1/jsonrpc" => (
            200,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32602, "message": "invalid argument 0" }
            })
            .to_string(),
        ),
        _ => (404, "Not Found".to_string()),
    })
    .await;
    let clock = VirtualClock::new();

    let err = dynamo(&backend, &clock)
        .call_api(NodeApi::CreateStream, json!({ "streamName": "events" }), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Blockchain(BlockchainError::LookupRejected { .. })
    ));
    assert_eq!(backend.requests_to("/api/node/node1/jsonrpc").len(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let lookups = Arc::new(AtomicU32::new(0));
    let counter = lookups.clone();
    let hash = tx_hash("12");
    let mined = hash.clone();

    let backend = common::start_programmable_backend(move |req| match req.path.as_str() {
        "/api/node/node1/streams/publish" => (200, json!({ "txnHash": mined }).to_string()),
        "/api/node/node1/jsonrpc" => {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                (503, "Service Unavailable".to_string())
            } else {
                (200, receipt(&mined).to_string())
            }
        }
        _ => (404, "Not Found".to_string()),
    })
    .await;
    let clock = VirtualClock::new();

    let response = dynamo(&backend, &clock)
        .call_api(NodeApi::PublishToStream, json!({ "streamName": "events" }), None)
        .await
        .unwrap();

    assert_eq!(response["txnHash"], json!(hash));
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_error_envelope_surfaces_message() {
    let backend = common::start_mock_backend(r#"{"error":true,"message":"Asset type already exists"}"#).await;
    let clock = VirtualClock::new();

    let err = dynamo(&backend, &clock)
        .call_api(NodeApi::CreateAssetType, json!({ "assetName": "license" }), None)
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "Asset type already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_raw_tx_without_recipient_is_never_submitted() {
    let backend = common::start_programmable_backend(|req| match req.path.as_str() {
        "/api/node/node1/assets/transferSoloAsset" => (
            200,
            json!({
                "rawTx": {
                    "nonce": "0x1",
                    "gasPrice": "0x3b9aca00",
                    "gasLimit": "0x30d40",
                    "value": "0x0",
                    "data": "0xdeadbeef",
                    "chainId": 1337
                }
            })
            .to_string(),
        ),
        _ => (200, json!({ "txnHash": tx_hash("99") }).to_string()),
    })
    .await;
    let clock = VirtualClock::new();

    let err = dynamo(&backend, &clock)
        .call_api(
            NodeApi::TransferSoloAsset,
            json!({ "assetName": "license", "identifier": "1", "to": "0x02" }),
            Some(&SigningKey::new(ANVIL_KEY)),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Blockchain(BlockchainError::InvalidTransaction { field: "to", .. })
    ));
    assert!(backend.requests_to("/api/node/node1/utility/sendRawTxns").is_empty());
    assert!(backend.requests_to("/api/node/node1/jsonrpc").is_empty());
    assert_eq!(backend.requests().len(), 1);
}

//! The request/response bridge, driven with serialized requests.

use std::sync::Arc;

use keyhaven_integration_tests::fallback_manager;
use keyhaven_secrets::{BridgeRequest, BridgeResponse, StorageBridge};
use serde_json::{json, Value};
use tempfile::TempDir;

async fn send(bridge: &StorageBridge, raw: Value) -> BridgeResponse {
    let request: BridgeRequest = serde_json::from_value(raw).unwrap();
    bridge.handle(request).await
}

#[tokio::test]
async fn test_token_lifecycle_over_bridge() {
    let tmp = TempDir::new().unwrap();
    let bridge = StorageBridge::new(Arc::new(fallback_manager(tmp.path()).await));

    let response = send(
        &bridge,
        json!({
            "id": 1,
            "method": "provider_token.store",
            "params": { "providerId": "p1", "token": "sk-test-123" }
        }),
    )
    .await;
    assert!(response.error.is_none());

    let response = send(
        &bridge,
        json!({ "id": 2, "method": "provider_token.get", "params": { "providerId": "p1" } }),
    )
    .await;
    assert_eq!(response.id, Some(json!(2)));
    assert_eq!(response.result, Some(json!("sk-test-123")));

    let response = send(
        &bridge,
        json!({ "id": 3, "method": "provider_token.delete", "params": { "providerId": "p1" } }),
    )
    .await;
    assert_eq!(response.result, Some(json!(true)));

    let response = send(
        &bridge,
        json!({ "id": 4, "method": "provider_token.delete", "params": { "providerId": "p1" } }),
    )
    .await;
    assert_eq!(response.result, Some(json!(false)));
}

#[tokio::test]
async fn test_responses_serialize_without_empty_fields() {
    let tmp = TempDir::new().unwrap();
    let bridge = StorageBridge::new(Arc::new(fallback_manager(tmp.path()).await));

    let ok = send(&bridge, json!({ "id": "a", "method": "storage.backend" })).await;
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({ "id": "a", "result": "file" })
    );

    let err = send(&bridge, json!({ "id": "b", "method": "nope" })).await;
    let wire = serde_json::to_value(&err).unwrap();
    assert_eq!(wire["error"]["code"], json!(-32601));
    assert!(wire.get("result").is_none());
}

#[tokio::test]
async fn test_raw_envelope_matches_config_store() {
    let tmp = TempDir::new().unwrap();
    let bridge = StorageBridge::new(Arc::new(fallback_manager(tmp.path()).await));

    let envelope = send(
        &bridge,
        json!({ "method": "crypto.encrypt", "params": { "plaintext": "{\"a\":1}" } }),
    )
    .await
    .result
    .unwrap();

    let decrypted = send(
        &bridge,
        json!({ "method": "crypto.decrypt", "params": { "envelope": envelope } }),
    )
    .await;
    assert_eq!(decrypted.result, Some(json!("{\"a\":1}")));

    let missing = send(
        &bridge,
        json!({ "method": "config.get", "params": { "key": "absent" } }),
    )
    .await;
    assert_eq!(missing.result, Some(Value::Null));
}

//! CLI routing, run in-process against a temporary file store.

use clap::Parser;
use keyhaven_cli::{run, Cli};
use keyhaven_integration_tests::{file_only_config, storage_dir};
use keyhaven_secrets::SecureStorageManager;
use tempfile::TempDir;

async fn keyhaven(tmp: &TempDir, args: &[&str]) -> Result<(), String> {
    let cli = Cli::try_parse_from(std::iter::once("keyhaven").chain(args.iter().copied()))
        .expect("arguments should parse");
    run(cli, file_only_config(tmp.path())).await.map_err(|e| e.to_string())
}

#[tokio::test]
async fn test_version() {
    let tmp = TempDir::new().unwrap();
    keyhaven(&tmp, &["version"]).await.unwrap();
    assert!(!storage_dir(tmp.path()).exists());
}

#[tokio::test]
async fn test_token_set_then_delete() {
    let tmp = TempDir::new().unwrap();
    keyhaven(&tmp, &["token", "set", "openai", "--value", "sk-cli"])
        .await
        .unwrap();
    assert!(storage_dir(tmp.path()).join("provider_openai.enc").exists());

    keyhaven(&tmp, &["token", "get", "openai"]).await.unwrap();
    keyhaven(&tmp, &["token", "delete", "openai"]).await.unwrap();
    assert!(!storage_dir(tmp.path()).join("provider_openai.enc").exists());

    let err = keyhaven(&tmp, &["token", "get", "openai"]).await.unwrap_err();
    assert!(err.contains("No token stored"));
}

#[tokio::test]
async fn test_config_put_is_readable_by_manager() {
    let tmp = TempDir::new().unwrap();
    keyhaven(&tmp, &["config", "put", "ui", r#"{"theme":"dark"}"#])
        .await
        .unwrap();

    let manager = SecureStorageManager::new(&file_only_config(tmp.path()))
        .await
        .unwrap();
    assert_eq!(
        manager.get_encrypted_config("ui").await.unwrap(),
        Some(serde_json::json!({ "theme": "dark" }))
    );
}

#[tokio::test]
async fn test_settings_must_be_object() {
    let tmp = TempDir::new().unwrap();
    assert!(keyhaven(&tmp, &["settings", "put", "[1,2]"]).await.is_err());
    keyhaven(&tmp, &["settings", "put", r#"{"autoStart":false}"#])
        .await
        .unwrap();
    keyhaven(&tmp, &["settings", "get"]).await.unwrap();
}

#[tokio::test]
async fn test_decrypt_rejects_garbage() {
    let tmp = TempDir::new().unwrap();
    assert!(keyhaven(&tmp, &["decrypt", "not:an:envelope"]).await.is_err());
    keyhaven(&tmp, &["encrypt", "hello"]).await.unwrap();
    keyhaven(&tmp, &["backend"]).await.unwrap();
}

//! End-to-end storage behaviour through `SecureStorageManager`.

use keyhaven_integration_tests::{fallback_manager, storage_dir, test_config, unavailable_vault};
use keyhaven_secrets::{BackendKind, DecryptionError, SecretError, SecureStorageManager};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_provider_token_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;

    manager.store_provider_token("p1", "sk-test-123").await.unwrap();
    let token = manager.get_provider_token("p1").await.unwrap().unwrap();
    assert_eq!(token.expose_secret(), "sk-test-123");

    assert!(manager.delete_provider_token("p1").await);
    assert!(manager.get_provider_token("p1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fallback_routes_everything_to_files() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;
    assert_eq!(manager.backend_kind(), BackendKind::File);

    manager.store_provider_token("openai", "sk-a").await.unwrap();
    manager
        .store_encrypted_config("ui", &json!({ "theme": "dark" }))
        .await
        .unwrap();

    let mut files: Vec<String> = std::fs::read_dir(storage_dir(tmp.path()))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["config_ui.enc", "provider_openai.enc"]);
}

#[tokio::test]
async fn test_entries_survive_a_new_manager() {
    let tmp = TempDir::new().unwrap();
    {
        let manager = fallback_manager(tmp.path()).await;
        manager.store_provider_token("p1", "sk-persist").await.unwrap();
    }

    let manager = fallback_manager(tmp.path()).await;
    let token = manager.get_provider_token("p1").await.unwrap().unwrap();
    assert_eq!(token.expose_secret(), "sk-persist");
}

#[tokio::test]
async fn test_namespace_isolation() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;

    manager.store_provider_token("x", "A").await.unwrap();
    manager
        .store_encrypted_config("x", &json!("B"))
        .await
        .unwrap();

    assert_eq!(
        manager.get_provider_token("x").await.unwrap().unwrap().expose_secret(),
        "A"
    );
    assert_eq!(
        manager.get_encrypted_config("x").await.unwrap(),
        Some(json!("B"))
    );
}

#[tokio::test]
async fn test_sanitization_collision_overwrites() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;

    manager.store_provider_token("acme.prod", "first").await.unwrap();
    manager.store_provider_token("acme-prod", "second").await.unwrap();

    let token = manager.get_provider_token("acme.prod").await.unwrap().unwrap();
    assert_eq!(token.expose_secret(), "second");
}

#[tokio::test]
async fn test_delete_missing_is_false() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;
    assert!(!manager.delete_provider_token("never-stored").await);
}

#[tokio::test]
async fn test_tampered_entry_is_reported() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;
    manager.store_provider_token("p1", "sk-tamper").await.unwrap();

    let path = storage_dir(tmp.path()).join("provider_p1.enc");
    let envelope = std::fs::read_to_string(&path).unwrap();
    let last = envelope.chars().last().unwrap();
    let flipped = if last == '0' { '1' } else { '0' };
    let tampered = format!("{}{}", &envelope[..envelope.len() - 1], flipped);
    std::fs::write(&path, tampered).unwrap();

    assert!(matches!(
        manager.get_provider_token("p1").await,
        Err(SecretError::Decryption(DecryptionError::AuthenticationFailed))
    ));
}

#[tokio::test]
async fn test_config_is_encrypted_twice_on_disk() {
    let tmp = TempDir::new().unwrap();
    let manager = fallback_manager(tmp.path()).await;
    let document = json!({ "apiKey": "sk-nested", "retries": 3 });
    manager.store_encrypted_config("llm", &document).await.unwrap();

    let outer = std::fs::read_to_string(storage_dir(tmp.path()).join("config_llm.enc")).unwrap();
    assert!(!outer.contains("sk-nested"));

    // Peeling the file layer yields another envelope, not the document.
    let inner = manager.decrypt_data(&outer).await.unwrap();
    assert_eq!(inner.expose_secret().split(':').count(), 3);
    assert!(!inner.expose_secret().contains("sk-nested"));

    let plain = manager.decrypt_data(inner.expose_secret()).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(plain.expose_secret()).unwrap();
    assert_eq!(parsed, document);
}

#[tokio::test]
async fn test_typed_config_and_system_settings() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Window {
        width: u32,
        height: u32,
    }

    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let manager = SecureStorageManager::with_vault_connector(&config, unavailable_vault)
        .await
        .unwrap();

    let window = Window {
        width: 1280,
        height: 800,
    };
    manager.store_encrypted_config("window", &window).await.unwrap();
    let loaded: Option<Window> = manager.get_encrypted_config_as("window").await.unwrap();
    assert_eq!(loaded, Some(window));

    manager
        .store_system_settings(&json!({ "startMinimized": true }))
        .await
        .unwrap();
    assert_eq!(
        manager.get_system_settings().await.unwrap(),
        Some(json!({ "startMinimized": true }))
    );
}

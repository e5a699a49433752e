//! Config save/load roundtrip integration tests.

use keyhaven_core::config::{BackendPreference, Config, LogLevel};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyhaven.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.storage.backend, config.storage.backend);
    assert_eq!(loaded.storage.service_name, config.storage.service_name);
    assert_eq!(loaded.kdf, config.kdf);
    assert_eq!(loaded.logging.level, config.logging.level);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyhaven.json5");

    let mut config = Config::default();
    config.storage.backend = BackendPreference::File;
    config.storage.dir = Some(dir.path().join("vault-less"));
    config.logging.level = LogLevel::Warn;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.storage.backend, BackendPreference::File);
    assert_eq!(loaded.storage_dir().unwrap(), dir.path().join("vault-less"));
    assert_eq!(loaded.logging.level, LogLevel::Warn);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/keyhaven.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json5").is_err());
}

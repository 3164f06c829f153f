//! Configuration persistence.

use commerce_admin::{AdminConfig, AdminCore, AdminError};

#[test]
fn saved_config_loads_back_identically() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("config.toml");

    let mut config = AdminConfig::default();
    config.gateway.base_url = "https://shop.example/api".into();
    config.gateway.token = Some("secret".into());
    config.gateway.auth_scheme = "Bearer".into();
    config.dispatch.ai_timeout_ms = 12_000;
    config.dispatch.provider_error_markers = vec!["OpenAI".into(), "Anthropic".into()];
    config.reconcile.max_in_flight = 4;

    config.save_to_file(&path).unwrap();
    let loaded = AdminConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_is_an_io_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = AdminConfig::from_file(&tmp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AdminError::Io(_)));
}

#[test]
fn malformed_file_is_a_config_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[dispatch\nai_timeout_ms = ").unwrap();
    let err = AdminConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, AdminError::Config(_)));
}

#[test]
fn loaded_config_with_bad_url_cannot_build_core() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[gateway]\nbase_url = \"not a url\"\n").unwrap();
    let config = AdminConfig::from_file(&path).unwrap();
    assert!(AdminCore::from_config(&config).is_err());
}

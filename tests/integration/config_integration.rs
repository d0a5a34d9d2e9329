//! Integration tests for configuration loading and precedence

use super::test_utils::with_env;
use partner_link::{ApiError, ConfigLoader, PartnerClient};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_file_values_layer_over_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("partner.toml");
    std::fs::write(
        &config_file,
        r#"
[api]
base_url = "https://de.coresuite.com/"

[shell]
handshake_timeout_ms = 5000
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.api.base(), "https://de.coresuite.com");
    assert_eq!(config.shell.handshake_timeout(), Duration::from_millis(5000));
    assert_eq!(config.shell.expiry_margin_ms, 3000);
    assert_eq!(config.client.id, "fsm-ext-demo-uf4jra");
    assert_eq!(config.permissions.price_list_udo_meta_name, "Cennik_part");

    assert!(PartnerClient::new(config).is_ok());
}

#[test]
fn test_invalid_file_values_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("partner.toml");
    std::fs::write(
        &config_file,
        r#"
[client]
id = ""

[api]
base_url = "ftp://example.com"
"#,
    )
    .unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    let ApiError::ConfigError(message) = &err else {
        panic!("expected a configuration error, got {:?}", err);
    };
    assert!(message.contains("id cannot be empty"));
    assert!(message.contains("base_url must start with http:// or https://"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let result = with_env(&temp_dir, &[], || ConfigLoader::load_with(Some(&missing)));
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}

#[test]
fn test_environment_overrides_files() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("partner.toml");
    std::fs::write(
        &config_file,
        r#"
[api]
base_url = "https://file.example.com"

[shell]
handshake_timeout_ms = 5000
accept_uncorrelated = false
"#,
    )
    .unwrap();

    let config = with_env(
        &temp_dir,
        &[
            ("PARTNER_LINK__API__BASE_URL", "https://env.example.com"),
            ("PARTNER_LINK__SHELL__HANDSHAKE_TIMEOUT_MS", "1500"),
        ],
        || ConfigLoader::load_with(Some(&config_file)),
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://env.example.com");
    assert_eq!(config.shell.handshake_timeout_ms, 1500);
    assert!(!config.shell.accept_uncorrelated);
}

#[test]
fn test_user_level_file_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();

    let config = with_env(&temp_dir, &[], || {
        let path = ConfigLoader::global_config_path().unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"
[permissions]
price_list_udo_meta_name = "Cennik_test"
"#,
        )
        .unwrap();
        ConfigLoader::load()
    })
    .unwrap();

    assert_eq!(config.permissions.price_list_udo_meta_name, "Cennik_test");
    assert_eq!(config.api.base_url, "https://eu.coresuite.com");
}

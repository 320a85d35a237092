//! TOML Integration Tests
//!
//! TOML environment snapshots and TOML export of resolved configs.

#![cfg(feature = "toml")]

mod common;

use common::{SnapshotFixture, full_gitlab_env};
use deploycfg::{Environment, Error, REDACTED, gitlab};
use gitlab::keys;

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_toml_snapshot_resolves() {
    let fixture = SnapshotFixture::new();
    let path = fixture.write(
        "gitlab.env.toml",
        r#"
GITLAB_EXTERNAL_URL = "https://git.corp.example"
GITLAB_DB_PORT = "6432"
GITLAB_SSH_BIND = "2222"
"#,
    );

    let env = Environment::load_file(&path).unwrap();
    assert_eq!(env.len(), 3);

    let config = gitlab::schema().resolve(&env).unwrap();
    assert_eq!(config.get_int(keys::DB_PORT).unwrap(), 6432);
    assert_eq!(config.get_int(keys::SHELL_SSH_PORT).unwrap(), 2222);
    assert_eq!(
        config.get_str(keys::EXTERNAL_URL).unwrap(),
        "https://git.corp.example"
    );
}

#[test]
fn test_toml_snapshot_rejects_non_string_values() {
    // Values are raw environment strings; a bare integer is not one
    let err = Environment::from_toml_str("GITLAB_DB_PORT = 6432").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn test_toml_snapshot_layers_over_base() {
    let base = Environment::new()
        .with("GITLAB_DB_PORT", "5433")
        .with("GITLAB_REDIS_PORT", "6380");
    let snapshot = Environment::from_toml_str(r#"GITLAB_DB_PORT = "6432""#).unwrap();

    let config = gitlab::schema().resolve(&base.merged(&snapshot)).unwrap();
    assert_eq!(config.get_int(keys::DB_PORT).unwrap(), 6432);
    assert_eq!(config.get_int(keys::REDIS_PORT).unwrap(), 6380);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_toml_export_nested_tables() {
    let config = gitlab::schema().resolve(&full_gitlab_env()).unwrap();
    let text = config.to_toml_string(true).unwrap();

    let parsed: toml::Table = toml::from_str(&text).unwrap();
    assert_eq!(
        parsed["external_url"].as_str(),
        Some("https://git.corp.example")
    );
    assert_eq!(parsed["gitlab_rails"]["db_port"].as_integer(), Some(6432));
    assert_eq!(parsed["gitlab_rails"]["db_password"].as_str(), Some(REDACTED));
    assert_eq!(parsed["nginx"]["listen_https"].as_bool(), Some(false));
}

#[test]
fn test_toml_export_unredacted() {
    let config = gitlab::schema().resolve(&full_gitlab_env()).unwrap();
    let text = config.to_toml_string(false).unwrap();

    assert!(text.contains("s3cret"));
}

//! Resolution Workflow Integration Tests
//!
//! End-to-end resolution of the GitLab deployment schema:
//! - Defaults without overrides
//! - Overrides for every recognised variable
//! - Range, type and required-key failures
//! - Error collection across several bad values
//! - Idempotence

mod common;

use common::{env, error_keys, full_gitlab_env, schema_with_required};
use deploycfg::{
    Environment, SettingKind, SettingValue, ValidationReason, ValueSource, gitlab, resolve,
};
use gitlab::keys;

// =============================================================================
// Defaults and Overrides
// =============================================================================

#[test]
fn test_no_overrides_yields_defaults() {
    let schema = gitlab::schema();
    let config = resolve(&schema, &Environment::new()).unwrap();

    assert_eq!(config.len(), schema.len());
    for spec in &schema {
        assert_eq!(config.get(&spec.key), spec.default.as_ref(), "{}", spec.key);
        assert_eq!(config.source(&spec.key), Some(&ValueSource::Default));
    }
}

#[test]
fn test_keys_match_schema_exactly() {
    let schema = gitlab::schema();
    let config = resolve(&schema, &full_gitlab_env()).unwrap();

    assert!(config.keys().eq(schema.keys()));
}

#[test]
fn test_every_override_applied() {
    let config = resolve(&gitlab::schema(), &full_gitlab_env()).unwrap();

    assert_eq!(config.get_str(keys::EXTERNAL_URL).unwrap(), "https://git.corp.example");
    assert_eq!(config.get_str(keys::DB_HOST).unwrap(), "db.internal");
    assert_eq!(config.get_int(keys::DB_PORT).unwrap(), 6432);
    assert_eq!(config.get_str(keys::DB_USERNAME).unwrap(), "gitlab_app");
    assert_eq!(config.get_str(keys::DB_PASSWORD).unwrap(), "s3cret");
    assert_eq!(config.get_str(keys::DB_DATABASE).unwrap(), "gitlab");
    assert_eq!(config.get_str(keys::REDIS_HOST).unwrap(), "cache.internal");
    assert_eq!(config.get_int(keys::REDIS_PORT).unwrap(), 6380);
    assert_eq!(config.get_int(keys::SHELL_SSH_PORT).unwrap(), 2222);
    assert_eq!(config.override_count(), 9);
    assert_eq!(
        config.source(keys::SHELL_SSH_PORT),
        Some(&ValueSource::Environment("GITLAB_SSH_BIND".into()))
    );

    // Settings without env var keep their defaults
    assert_eq!(config.get_int(keys::SIDEKIQ_CONCURRENCY).unwrap(), 5);
    assert!(!config.is_overridden(keys::SIDEKIQ_CONCURRENCY));
}

#[test]
fn test_port_bounds_accepted() {
    let schema = gitlab::schema();

    for port in ["1", "65535"] {
        let config = resolve(&schema, &env(&[("GITLAB_DB_PORT", port)])).unwrap();
        assert_eq!(
            config.get(keys::DB_PORT),
            Some(&SettingValue::Integer(port.parse().unwrap()))
        );
    }
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_db_port_out_of_range() {
    let errors = resolve(&gitlab::schema(), &env(&[("GITLAB_DB_PORT", "99999")])).unwrap_err();

    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.key, keys::DB_PORT);
    assert_eq!(error.env_var.as_deref(), Some("GITLAB_DB_PORT"));
    assert!(error.is_out_of_range());
}

#[test]
fn test_db_port_not_a_number() {
    let errors =
        resolve(&gitlab::schema(), &env(&[("GITLAB_DB_PORT", "notanumber")])).unwrap_err();

    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.key, keys::DB_PORT);
    assert_eq!(
        error.reason,
        ValidationReason::TypeMismatch {
            expected: SettingKind::Integer,
            raw: "notanumber".into()
        }
    );
}

#[test]
fn test_missing_required_key() {
    let errors = resolve(&schema_with_required(), &Environment::new()).unwrap_err();

    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.key, "gitlab_rails.initial_root_password");
    assert_eq!(error.reason, ValidationReason::MissingRequired);

    let config = resolve(
        &schema_with_required(),
        &env(&[("GITLAB_ROOT_PASSWORD", "changeme")]),
    )
    .unwrap();
    assert_eq!(
        config.get_str("gitlab_rails.initial_root_password").unwrap(),
        "changeme"
    );
}

#[test]
fn test_two_bad_values_two_errors() {
    let errors = resolve(
        &gitlab::schema(),
        &env(&[("GITLAB_DB_PORT", "notanumber"), ("GITLAB_SSH_BIND", "0")]),
    )
    .unwrap_err();

    assert_eq!(errors.len(), 2);
    assert_eq!(
        error_keys(&errors),
        vec![keys::DB_PORT.to_string(), keys::SHELL_SSH_PORT.to_string()]
    );
    assert!(errors.for_key(keys::DB_PORT).all(|e| e.is_type_mismatch()));
    assert!(errors.for_key(keys::SHELL_SSH_PORT).all(|e| e.is_out_of_range()));
}

#[test]
fn test_all_failure_kinds_in_one_call() {
    let errors = resolve(
        &schema_with_required(),
        &env(&[
            ("GITLAB_EXTERNAL_URL", "not a url"),
            ("GITLAB_REDIS_PORT", "6379.5"),
            ("GITLAB_SSH_BIND", "70000"),
        ]),
    )
    .unwrap_err();

    assert_eq!(
        error_keys(&errors),
        vec![
            keys::EXTERNAL_URL.to_string(),
            keys::REDIS_PORT.to_string(),
            keys::SHELL_SSH_PORT.to_string(),
            "gitlab_rails.initial_root_password".to_string(),
        ]
    );
}

// =============================================================================
// Idempotence and Purity
// =============================================================================

#[test]
fn test_resolution_is_idempotent() {
    let schema = gitlab::schema();
    let env = full_gitlab_env();

    let first = resolve(&schema, &env).unwrap();
    let second = resolve(&schema, &env).unwrap();

    assert_eq!(first, second);
    assert!(first.diff(&second).is_empty());
}

#[test]
fn test_environment_not_mutated() {
    let schema = gitlab::schema();
    let env = env(&[("GITLAB_DB_PORT", "bad")]);
    let before = env.clone();

    let _ = resolve(&schema, &env);
    assert_eq!(env, before);
}

#[test]
fn test_concurrent_resolution() {
    let schema = std::sync::Arc::new(gitlab::schema());

    let handles: Vec<_> = (1..=8)
        .map(|i| {
            let schema = schema.clone();
            std::thread::spawn(move || {
                let port = (5000 + i).to_string();
                let env = Environment::new().with("GITLAB_DB_PORT", port);
                resolve(&schema, &env).unwrap().get_int(keys::DB_PORT).unwrap()
            })
        })
        .collect();

    let ports: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ports, (5001..=5008).collect::<Vec<i64>>());
}

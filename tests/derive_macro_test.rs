//! Integration tests for deploycfg-derive macro
//!
//! Tests the `#[derive(DeploymentSchema)]` macro with various attribute combinations.

use deploycfg::{DeploymentSchema, Environment, Error, SettingKind, SettingValue};

// =============================================================================
// Basic Derive Tests
// =============================================================================

#[derive(Debug, PartialEq, DeploymentSchema)]
#[schema(section = "nginx")]
struct NginxSettings {
    #[setting(min = 1, max = 65535, description = "HTTP listener")]
    listen_port: u16,

    listen_https: bool,
}

impl Default for NginxSettings {
    fn default() -> Self {
        Self {
            listen_port: 80,
            listen_https: false,
        }
    }
}

#[test]
fn test_basic_derive() {
    let specs = NginxSettings::settings();

    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].key, "nginx.listen_port");
    assert_eq!(specs[0].kind, SettingKind::Integer);
    assert_eq!(specs[0].default, Some(SettingValue::Integer(80)));
    assert_eq!(specs[0].description.as_deref(), Some("HTTP listener"));
    assert_eq!(specs[1].key, "nginx.listen_https");
    assert_eq!(specs[1].kind, SettingKind::Boolean);
    assert!(specs[1].env_var.is_none());
}

// =============================================================================
// Defaults, Env Vars and Required Fields
// =============================================================================

#[derive(Debug, PartialEq, DeploymentSchema)]
#[schema(section = "gitlab_rails")]
struct Database {
    #[setting(env = "GITLAB_DB_HOST")]
    db_host: String,

    #[setting(env = "GITLAB_DB_PORT", min = 1, max = 65535)]
    db_port: u16,

    #[setting(env = "GITLAB_DB_PASSWORD", secret)]
    db_password: String,

    #[setting(key = "gitlab_rails.gitlab_shell_ssh_port", env = "GITLAB_SSH_BIND", min = 1, max = 65535)]
    ssh_port: u16,

    #[setting(skip)]
    connect_attempts: u32,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            db_host: "pg-main".into(),
            db_port: 5432,
            db_password: String::new(),
            ssh_port: 22,
            connect_attempts: 3,
        }
    }
}

#[test]
fn test_defaults_taken_from_default_impl() {
    let specs = Database::settings();

    assert_eq!(specs.len(), 4);
    assert_eq!(specs[0].default, Some(SettingValue::from("pg-main")));
    assert_eq!(specs[1].default, Some(SettingValue::Integer(5432)));
    assert_eq!(specs[1].env_var.as_deref(), Some("GITLAB_DB_PORT"));
    assert!(specs[2].secret);
    assert_eq!(specs[3].key, "gitlab_rails.gitlab_shell_ssh_port");
}

#[test]
fn test_resolve_from_env() {
    let env = Environment::new()
        .with("GITLAB_DB_HOST", "db.internal")
        .with("GITLAB_SSH_BIND", "2222");

    let db = Database::resolve_from(&env).unwrap();

    assert_eq!(db.db_host, "db.internal");
    assert_eq!(db.db_port, 5432);
    assert_eq!(db.ssh_port, 2222);
    // Skipped fields keep the struct's own default
    assert_eq!(db.connect_attempts, 3);
}

#[test]
fn test_resolve_from_collects_errors() {
    let env = Environment::new()
        .with("GITLAB_DB_PORT", "notanumber")
        .with("GITLAB_SSH_BIND", "0");

    match Database::resolve_from(&env) {
        Err(Error::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation errors, got {other:?}"),
    }
}

// =============================================================================
// Integer Bounds
// =============================================================================

#[derive(Debug, Default, DeploymentSchema)]
#[schema(section = "nginx")]
struct Listen {
    #[setting(env = "NGINX_LISTEN_PORT")]
    listen_port: u16,

    #[setting(env = "NGINX_WORKERS")]
    workers: u32,

    #[setting(env = "NGINX_OFFSET", min = -10)]
    offset: i8,
}

#[test]
fn test_integer_fields_bounded_by_type() {
    let specs = Listen::settings();

    let range = |i: usize| specs[i].constraints.range.map(|r| (r.min, r.max));
    assert_eq!(range(0), Some((Some(0), Some(65535))));
    assert_eq!(range(1), Some((Some(0), Some(u32::MAX as i64))));
    // Explicit bounds are intersected with the type's
    assert_eq!(range(2), Some((Some(-10), Some(127))));
}

#[test]
fn test_values_outside_field_type_collected() {
    let env = Environment::new()
        .with("NGINX_LISTEN_PORT", "70000")
        .with("NGINX_WORKERS", "-1");

    match Listen::resolve_from(&env) {
        Err(Error::Validation(errors)) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().all(|e| e.is_out_of_range()));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[derive(Debug, Default, DeploymentSchema)]
struct Runner {
    #[setting(key = "runner.token", env = "RUNNER_TOKEN", required, secret)]
    token: String,

    #[setting(key = "runner.url", pattern = "^https?://")]
    url: String,
}

#[test]
fn test_required_field() {
    let specs = Runner::settings();
    assert!(specs[0].required);
    assert!(specs[0].default.is_none());

    // Default url is "" which violates the pattern
    assert!(Runner::schema().unwrap_err().is_schema_error());
}

// =============================================================================
// Nested Struct Tests
// =============================================================================

#[derive(Debug, Default, DeploymentSchema)]
#[schema(section = "puma")]
struct Puma {
    #[setting(min = 0)]
    worker_processes: u32,
    #[setting(min = 1)]
    max_threads: u32,
}

#[derive(Debug, Default, DeploymentSchema)]
struct Deployment {
    #[setting(key = "external_url", env = "GITLAB_EXTERNAL_URL")]
    external_url: String,

    database: Database,

    puma: Puma,
}

#[test]
fn test_nested_structs() {
    let specs = Deployment::settings();
    let keys: Vec<&str> = specs.iter().map(|s| s.key.as_str()).collect();

    assert_eq!(
        keys,
        vec![
            "external_url",
            "gitlab_rails.db_host",
            "gitlab_rails.db_port",
            "gitlab_rails.db_password",
            "gitlab_rails.gitlab_shell_ssh_port",
            "puma.worker_processes",
            "puma.max_threads",
        ]
    );
}

#[test]
fn test_nested_schema_validation_fails_on_bad_default() {
    // Puma::default() has max_threads = 0, below its declared minimum
    assert!(Deployment::schema().is_err());
}

#[test]
fn test_from_resolved_roundtrip_defaults() {
    let nginx = NginxSettings::resolve_from(&Environment::new()).unwrap();
    assert_eq!(nginx, NginxSettings::default());

    let schema = NginxSettings::schema().unwrap();
    assert_eq!(schema.len(), 2);

    let env = Environment::new().with("UNRELATED", "1");
    let config = schema.resolve(&env).unwrap();
    assert_eq!(NginxSettings::from_resolved(&config).unwrap().listen_port, 80);
}

//! Common test utilities for deploycfg integration tests
//!
//! Provides shared schemas, environment fixtures and helper functions.

#![allow(dead_code)]

use deploycfg::{Environment, Schema, SettingKind, SettingSpec, ValidationErrors, gitlab};
use std::path::PathBuf;
use tempfile::TempDir;

// =============================================================================
// Test Schemas
// =============================================================================

/// GitLab schema plus one required setting without default
pub fn schema_with_required() -> Schema {
    let mut specs: Vec<SettingSpec> = gitlab::schema().iter().cloned().collect();
    specs.push(
        SettingSpec::required("gitlab_rails.initial_root_password", SettingKind::String)
            .env("GITLAB_ROOT_PASSWORD")
            .secret(),
    );
    Schema::builder()
        .settings(specs)
        .build()
        .expect("test schema is valid")
}

/// Small schema covering every kind and constraint
pub fn mixed_schema() -> Schema {
    Schema::builder()
        .setting(
            SettingSpec::string("app.url", "http://localhost")
                .env("APP_URL")
                .pattern(r"^https?://"),
        )
        .setting(
            SettingSpec::integer("app.port", 8080)
                .env("APP_PORT")
                .range(1, 65535),
        )
        .setting(SettingSpec::boolean("app.debug", false).env("APP_DEBUG"))
        .setting(
            SettingSpec::string("app.log_level", "info")
                .env("APP_LOG_LEVEL")
                .one_of(["debug", "info", "warn", "error"]),
        )
        .build()
        .expect("test schema is valid")
}

// =============================================================================
// Environment Fixtures
// =============================================================================

/// Environment built from literal pairs
pub fn env(pairs: &[(&str, &str)]) -> Environment {
    Environment::from_pairs(pairs.iter().copied())
}

/// Environment overriding every variable the GitLab schema recognises
pub fn full_gitlab_env() -> Environment {
    env(&[
        ("GITLAB_EXTERNAL_URL", "https://git.corp.example"),
        ("GITLAB_DB_HOST", "db.internal"),
        ("GITLAB_DB_PORT", "6432"),
        ("GITLAB_DB_USER", "gitlab_app"),
        ("GITLAB_DB_PASSWORD", "s3cret"),
        ("GITLAB_DB_NAME", "gitlab"),
        ("GITLAB_REDIS_HOST", "cache.internal"),
        ("GITLAB_REDIS_PORT", "6380"),
        ("GITLAB_SSH_BIND", "2222"),
    ])
}

/// Temporary directory holding environment snapshot files
pub struct SnapshotFixture {
    pub temp_dir: TempDir,
}

impl SnapshotFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write `content` to `name` and return its path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write snapshot");
        path
    }
}

impl Default for SnapshotFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Keys of all errors, in order
pub fn error_keys(errors: &ValidationErrors) -> Vec<String> {
    errors.iter().map(|e| e.key.clone()).collect()
}

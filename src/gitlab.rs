//! Deployment schema for a GitLab Omnibus instance
//!
//! Bundled PostgreSQL and Redis are disabled in favour of external services
//! reached through the `GITLAB_DB_*` / `GITLAB_REDIS_*` variables; monitoring
//! is off, the container registry is on.
//!
//! ```rust
//! use deploycfg::{Environment, gitlab};
//!
//! let env = Environment::new()
//!     .with("GITLAB_DB_HOST", "db.internal")
//!     .with("GITLAB_SSH_BIND", "2222");
//!
//! let config = gitlab::schema().resolve(&env).unwrap();
//! let settings = gitlab::GitlabSettings::from_resolved(&config).unwrap();
//!
//! assert_eq!(settings.database.host, "db.internal");
//! assert_eq!(settings.shell.ssh_port, 2222);
//! assert!(!settings.services.postgresql);
//! ```

use serde::Serialize;

use crate::config::{Schema, SettingSpec};
use crate::error::Result;
use crate::resolved::ResolvedConfig;

/// Setting keys, named after the `gitlab.rb` attributes they render to
pub mod keys {
    pub const EXTERNAL_URL: &str = "external_url";

    pub const POSTGRESQL_ENABLE: &str = "postgresql.enable";
    pub const REDIS_ENABLE: &str = "redis.enable";

    pub const DB_HOST: &str = "gitlab_rails.db_host";
    pub const DB_PORT: &str = "gitlab_rails.db_port";
    pub const DB_USERNAME: &str = "gitlab_rails.db_username";
    pub const DB_PASSWORD: &str = "gitlab_rails.db_password";
    pub const DB_DATABASE: &str = "gitlab_rails.db_database";

    pub const REDIS_HOST: &str = "gitlab_rails.redis_host";
    pub const REDIS_PORT: &str = "gitlab_rails.redis_port";

    pub const PROMETHEUS_ENABLE: &str = "prometheus.enable";
    pub const ALERTMANAGER_ENABLE: &str = "alertmanager.enable";
    pub const NODE_EXPORTER_ENABLE: &str = "node_exporter.enable";
    pub const REDIS_EXPORTER_ENABLE: &str = "redis_exporter.enable";

    pub const REGISTRY_ENABLE: &str = "registry.enable";
    pub const REGISTRY_ENABLED: &str = "gitlab_rails.registry_enabled";
    pub const PAGES_ENABLE: &str = "gitlab_pages.enable";
    pub const KAS_ENABLE: &str = "gitlab_kas.enable";

    pub const PUMA_WORKER_PROCESSES: &str = "puma.worker_processes";
    pub const PUMA_MIN_THREADS: &str = "puma.min_threads";
    pub const PUMA_MAX_THREADS: &str = "puma.max_threads";
    pub const SIDEKIQ_CONCURRENCY: &str = "sidekiq.concurrency";

    pub const NGINX_LISTEN_PORT: &str = "nginx.listen_port";
    pub const NGINX_LISTEN_HTTPS: &str = "nginx.listen_https";

    pub const SHELL_SSH_PORT: &str = "gitlab_rails.gitlab_shell_ssh_port";
}

/// Environment variables recognised by [`schema`]
pub mod env {
    pub const EXTERNAL_URL: &str = "GITLAB_EXTERNAL_URL";
    pub const DB_HOST: &str = "GITLAB_DB_HOST";
    pub const DB_PORT: &str = "GITLAB_DB_PORT";
    pub const DB_USER: &str = "GITLAB_DB_USER";
    pub const DB_PASSWORD: &str = "GITLAB_DB_PASSWORD";
    pub const DB_NAME: &str = "GITLAB_DB_NAME";
    pub const REDIS_HOST: &str = "GITLAB_REDIS_HOST";
    pub const REDIS_PORT: &str = "GITLAB_REDIS_PORT";
    pub const SSH_BIND: &str = "GITLAB_SSH_BIND";
}

const PORT_MIN: i64 = 1;
const PORT_MAX: i64 = 65535;

fn port(key: &str, default: i64) -> SettingSpec {
    SettingSpec::integer(key, default).range(PORT_MIN, PORT_MAX)
}

/// The full Omnibus deployment schema
///
/// Infallible in practice: the definition is static and covered by tests.
#[must_use]
pub fn schema() -> Schema {
    let specs = vec![
        SettingSpec::string(keys::EXTERNAL_URL, "https://gitlab.example.com")
            .env(env::EXTERNAL_URL)
            .pattern(r"^https?://\S+$")
            .description("URL users reach GitLab at"),
        // Bundled services replaced by external ones
        SettingSpec::boolean(keys::POSTGRESQL_ENABLE, false),
        SettingSpec::boolean(keys::REDIS_ENABLE, false),
        // Database
        SettingSpec::string(keys::DB_HOST, "pg-main").env(env::DB_HOST),
        port(keys::DB_PORT, 5432).env(env::DB_PORT),
        SettingSpec::string(keys::DB_USERNAME, "gitlab").env(env::DB_USER),
        SettingSpec::string(keys::DB_PASSWORD, "")
            .env(env::DB_PASSWORD)
            .secret(),
        SettingSpec::string(keys::DB_DATABASE, "gitlabhq_production").env(env::DB_NAME),
        // Cache
        SettingSpec::string(keys::REDIS_HOST, "redis-main").env(env::REDIS_HOST),
        port(keys::REDIS_PORT, 6379).env(env::REDIS_PORT),
        // Monitoring
        SettingSpec::boolean(keys::PROMETHEUS_ENABLE, false),
        SettingSpec::boolean(keys::ALERTMANAGER_ENABLE, false),
        SettingSpec::boolean(keys::NODE_EXPORTER_ENABLE, false),
        SettingSpec::boolean(keys::REDIS_EXPORTER_ENABLE, false),
        // Optional components
        SettingSpec::boolean(keys::REGISTRY_ENABLE, true),
        SettingSpec::boolean(keys::REGISTRY_ENABLED, true),
        SettingSpec::boolean(keys::PAGES_ENABLE, false),
        SettingSpec::boolean(keys::KAS_ENABLE, false),
        // Workers. worker_processes = 0 runs puma in single mode.
        SettingSpec::integer(keys::PUMA_WORKER_PROCESSES, 0).min(0),
        SettingSpec::integer(keys::PUMA_MIN_THREADS, 1).min(1),
        SettingSpec::integer(keys::PUMA_MAX_THREADS, 4).min(1),
        SettingSpec::integer(keys::SIDEKIQ_CONCURRENCY, 5).min(1),
        // Listeners
        port(keys::NGINX_LISTEN_PORT, 80),
        SettingSpec::boolean(keys::NGINX_LISTEN_HTTPS, false),
        port(keys::SHELL_SSH_PORT, 22)
            .env(env::SSH_BIND)
            .description("Port advertised in SSH clone URLs"),
    ];

    match Schema::builder().settings(specs).build() {
        Ok(schema) => schema,
        Err(e) => unreachable!("static GitLab schema is invalid: {e}"),
    }
}

// =============================================================================
// Typed view
// =============================================================================

/// Typed view of a resolved GitLab configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitlabSettings {
    pub external_url: String,
    pub services: Services,
    pub database: Database,
    pub redis: Redis,
    pub puma: Puma,
    pub sidekiq: Sidekiq,
    pub nginx: Nginx,
    pub shell: Shell,
}

/// Which bundled services run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Services {
    pub postgresql: bool,
    pub redis: bool,
    pub prometheus: bool,
    pub alertmanager: bool,
    pub node_exporter: bool,
    pub redis_exporter: bool,
    pub registry: bool,
    pub rails_registry: bool,
    pub pages: bool,
    pub kas: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Database {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redis {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Puma {
    pub worker_processes: u32,
    pub min_threads: u32,
    pub max_threads: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sidekiq {
    pub concurrency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Nginx {
    pub listen_port: u16,
    pub listen_https: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shell {
    pub ssh_port: u16,
}

impl GitlabSettings {
    /// Build the typed view from a config resolved with [`schema`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingNotFound`](crate::Error::SettingNotFound) or
    /// [`Error::TypeMismatch`](crate::Error::TypeMismatch) when `config`
    /// was resolved from a different schema.
    pub fn from_resolved(config: &ResolvedConfig) -> Result<Self> {
        Ok(Self {
            external_url: config.get_str(keys::EXTERNAL_URL)?.to_string(),
            services: Services {
                postgresql: config.get_bool(keys::POSTGRESQL_ENABLE)?,
                redis: config.get_bool(keys::REDIS_ENABLE)?,
                prometheus: config.get_bool(keys::PROMETHEUS_ENABLE)?,
                alertmanager: config.get_bool(keys::ALERTMANAGER_ENABLE)?,
                node_exporter: config.get_bool(keys::NODE_EXPORTER_ENABLE)?,
                redis_exporter: config.get_bool(keys::REDIS_EXPORTER_ENABLE)?,
                registry: config.get_bool(keys::REGISTRY_ENABLE)?,
                rails_registry: config.get_bool(keys::REGISTRY_ENABLED)?,
                pages: config.get_bool(keys::PAGES_ENABLE)?,
                kas: config.get_bool(keys::KAS_ENABLE)?,
            },
            database: Database {
                host: config.get_str(keys::DB_HOST)?.to_string(),
                port: config.get_int_as(keys::DB_PORT)?,
                username: config.get_str(keys::DB_USERNAME)?.to_string(),
                password: config.get_str(keys::DB_PASSWORD)?.to_string(),
                database: config.get_str(keys::DB_DATABASE)?.to_string(),
            },
            redis: Redis {
                host: config.get_str(keys::REDIS_HOST)?.to_string(),
                port: config.get_int_as(keys::REDIS_PORT)?,
            },
            puma: Puma {
                worker_processes: config.get_int_as(keys::PUMA_WORKER_PROCESSES)?,
                min_threads: config.get_int_as(keys::PUMA_MIN_THREADS)?,
                max_threads: config.get_int_as(keys::PUMA_MAX_THREADS)?,
            },
            sidekiq: Sidekiq {
                concurrency: config.get_int_as(keys::SIDEKIQ_CONCURRENCY)?,
            },
            nginx: Nginx {
                listen_port: config.get_int_as(keys::NGINX_LISTEN_PORT)?,
                listen_https: config.get_bool(keys::NGINX_LISTEN_HTTPS)?,
            },
            shell: Shell {
                ssh_port: config.get_int_as(keys::SHELL_SSH_PORT)?,
            },
        })
    }

    /// PostgreSQL connection URL, password omitted
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}@{}:{}/{}",
            self.database.username, self.database.host, self.database.port, self.database.database
        )
    }

    /// Redis connection URL
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis.host, self.redis.port)
    }
}

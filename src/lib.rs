//! # deploycfg - Deployment Configuration Resolver
//!
//! A typed replacement for the "environment variable or default" pattern
//! found in deployment configuration files such as GitLab Omnibus'
//! `gitlab.rb`.
//!
//! ## Features
//!
//! - **Declarative Schema**: Keys, kinds, defaults, env var overrides and constraints
//! - **Explicit Conversion**: Environment strings become typed values or named errors, never silent zeros
//! - **Full Error Picture**: Every invalid setting is reported in one call
//! - **Immutable Results**: `ResolvedConfig` is a plain value; reloads replace it wholesale
//! - **Reload Listeners**: `ConfigStore` notifies per changed key
//! - **Typed Structs**: `DeploymentSchema` trait and derive macro
//! - **Export**: Nested JSON, plus TOML and YAML behind features
//!
//! ## Quick Start
//!
//! ```rust
//! use deploycfg::{Environment, Schema, SettingSpec};
//!
//! let schema = Schema::builder()
//!     .setting(SettingSpec::string("gitlab_rails.db_host", "pg-main").env("GITLAB_DB_HOST"))
//!     .setting(
//!         SettingSpec::integer("gitlab_rails.db_port", 5432)
//!             .env("GITLAB_DB_PORT")
//!             .range(1, 65535),
//!     )
//!     .setting(SettingSpec::boolean("registry.enable", true))
//!     .build()
//!     .unwrap();
//!
//! let env = Environment::new().with("GITLAB_DB_PORT", "6432");
//! let config = schema.resolve(&env).unwrap();
//!
//! assert_eq!(config.get_str("gitlab_rails.db_host").unwrap(), "pg-main");
//! assert_eq!(config.get_int("gitlab_rails.db_port").unwrap(), 6432);
//! assert!(config.is_overridden("gitlab_rails.db_port"));
//! ```
//!
//! ## Collected Errors
//!
//! Resolution never stops at the first problem:
//!
//! ```rust
//! use deploycfg::{Environment, gitlab};
//!
//! let env = Environment::new()
//!     .with("GITLAB_DB_PORT", "notanumber")
//!     .with("GITLAB_SSH_BIND", "0");
//!
//! let errors = gitlab::schema().resolve(&env).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! for error in &errors {
//!     eprintln!("{error}");
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cli` | `deploycfg` command line tool (default) |
//! | `derive` | `#[derive(DeploymentSchema)]` |
//! | `toml` | TOML snapshot files and TOML export |
//! | `yaml` | YAML export |

pub mod config;
mod error;
pub mod events;
pub mod gitlab;
mod resolved;
mod resolver;
mod store;
pub(crate) mod sync;
mod typed;
mod validation;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{
    EnvSource, Environment, IntRange, ProcessEnv, Schema, SchemaBuilder, SettingConstraints,
    SettingKind, SettingSpec, SettingValue,
};
pub use error::{Error, Result};
pub use events::{ChangeCallback, EventManager};
pub use resolved::{REDACTED, ResolvedConfig, ResolvedSetting, SettingChange, ValueSource};
pub use resolver::{convert, resolve};
pub use store::ConfigStore;
pub use typed::DeploymentSchema;
pub use validation::{ValidationError, ValidationErrors, ValidationReason};

#[cfg(feature = "derive")]
pub use deploycfg_derive::DeploymentSchema;

//! Statically declared schemas backed by a Rust struct

use crate::config::{EnvSource, Schema, SettingSpec};
use crate::error::Result;
use crate::resolved::ResolvedConfig;

/// A struct whose fields are deployment settings
///
/// Implement by hand or with `#[derive(DeploymentSchema)]` (`derive`
/// feature). Keys are then declared once, next to the field they fill, and
/// a misspelled key is a compile error rather than a lookup failure.
pub trait DeploymentSchema: Sized {
    /// Specs for every field, in declaration order
    fn settings() -> Vec<SettingSpec>;

    /// Build the struct from a config resolved with [`schema`](Self::schema)
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingNotFound`](crate::Error::SettingNotFound) or
    /// [`Error::TypeMismatch`](crate::Error::TypeMismatch) if `config` came
    /// from another schema.
    fn from_resolved(config: &ResolvedConfig) -> Result<Self>;

    /// Validated schema built from [`settings`](Self::settings)
    ///
    /// # Errors
    ///
    /// Returns a schema error if the declared settings are inconsistent.
    fn schema() -> Result<Schema> {
        Schema::builder().settings(Self::settings()).build()
    }

    /// Resolve against `env` and build the struct in one step
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) with every
    /// resolution error, or a schema error.
    fn resolve_from<E>(env: &E) -> Result<Self>
    where
        E: EnvSource + ?Sized,
    {
        let config = Self::schema()?.resolve(env)?;
        Self::from_resolved(&config)
    }
}

impl DeploymentSchema for crate::gitlab::GitlabSettings {
    fn settings() -> Vec<SettingSpec> {
        crate::gitlab::schema().iter().cloned().collect()
    }

    fn from_resolved(config: &ResolvedConfig) -> Result<Self> {
        crate::gitlab::GitlabSettings::from_resolved(config)
    }
}

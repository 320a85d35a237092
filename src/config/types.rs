//! Environment sources for resolution

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};

/// Read-only lookup of environment variables
///
/// The resolver only ever reads through this trait, so callers decide where
/// values come from: the process environment, a fixed snapshot in tests, or
/// a snapshot file written by deployment tooling.
pub trait EnvSource: Send + Sync {
    /// Raw value of `name`, or `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// Owned snapshot of environment variables
///
/// # Example
///
/// ```rust
/// use deploycfg::{EnvSource, Environment};
///
/// let env = Environment::new()
///     .with("GITLAB_DB_HOST", "db.internal")
///     .with("GITLAB_DB_PORT", "6432");
///
/// assert_eq!(env.var("GITLAB_DB_PORT").as_deref(), Some("6432"));
/// assert_eq!(env.var("GITLAB_REDIS_HOST"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        let mut vars = BTreeMap::new();
        for (name, value) in std::env::vars_os() {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => {
                    vars.insert(name, value);
                }
                (Ok(name), Err(_)) => {
                    log::warn!("Skipping environment variable {name}: value is not valid UTF-8");
                }
                (Err(name), _) => {
                    log::warn!("Skipping environment variable {name:?}: name is not valid UTF-8");
                }
            }
        }
        Self { vars }
    }

    /// Build a snapshot from name/value pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a JSON object of string values
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the document is not an object of strings.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let vars: BTreeMap<String, String> =
            serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Self { vars })
    }

    /// Parse a TOML table of string values
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the document is not a table of strings.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let vars: BTreeMap<String, String> =
            toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Self { vars })
    }

    /// Load a snapshot file
    ///
    /// `.toml` files are parsed as TOML (requires the `toml` feature),
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] or [`Error::Parse`].
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = crate::error::read_file(path)?;
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");

        let env = if is_toml {
            #[cfg(feature = "toml")]
            {
                Self::from_toml_str(&content)?
            }
            #[cfg(not(feature = "toml"))]
            {
                return Err(Error::Parse(format!(
                    "{}: TOML snapshots require the `toml` feature",
                    path.display()
                )));
            }
        } else {
            Self::from_json_str(&content)?
        };

        log::debug!("Loaded {} variables from {}", env.len(), path.display());
        Ok(env)
    }

    /// Add or replace a variable
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Layer `other` on top of this snapshot; its values win
    #[must_use]
    pub fn merged(mut self, other: &Environment) -> Self {
        self.vars
            .extend(other.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for Environment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Live view of the process environment
///
/// Reads `std::env` on every lookup. Prefer [`Environment::from_process`]
/// when a consistent snapshot is needed. A value that is not valid UTF-8
/// is treated as unset and logged at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                log::warn!("Ignoring environment variable {name}: value is not valid UTF-8");
                None
            }
        }
    }
}

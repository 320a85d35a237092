//! The immutable output of one resolution call

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::config::{SettingKind, SettingValue};
use crate::error::{Error, Result};

/// Placeholder printed instead of secret values
pub const REDACTED: &str = "********";

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "var", rename_all = "lowercase")]
pub enum ValueSource {
    /// Schema default
    Default,
    /// Environment override (variable name)
    Environment(String),
}

/// One resolved setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSetting {
    pub key: String,
    pub value: SettingValue,
    pub source: ValueSource,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
}

/// A value that differs between two resolved configs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    pub old: Option<SettingValue>,
    pub new: Option<SettingValue>,
}

/// Fully typed configuration, one entry per schema key, in schema order
///
/// Produced by [`resolve`](crate::resolve) and never mutated afterwards.
/// A reload produces a new value that replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    entries: Vec<ResolvedSetting>,
    index: HashMap<String, usize>,
}

impl ResolvedConfig {
    pub(crate) fn from_entries(entries: Vec<ResolvedSetting>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key.clone(), i))
            .collect();
        Self { entries, index }
    }

    fn entry(&self, key: &str) -> Option<&ResolvedSetting> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entry(key).map(|e| &e.value)
    }

    fn get_typed<'a, T>(
        &'a self,
        key: &str,
        expected: SettingKind,
        extract: impl FnOnce(&'a SettingValue) -> Option<T>,
    ) -> Result<T> {
        let value = self
            .get(key)
            .ok_or_else(|| Error::SettingNotFound(key.to_string()))?;
        extract(value).ok_or_else(|| Error::TypeMismatch {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: value.kind().to_string(),
        })
    }

    /// Get a string value
    ///
    /// # Errors
    ///
    /// [`Error::SettingNotFound`] for unknown keys, [`Error::TypeMismatch`]
    /// if the setting is not a string.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.get_typed(key, SettingKind::String, SettingValue::as_str)
    }

    /// Get an integer value
    ///
    /// # Errors
    ///
    /// [`Error::SettingNotFound`] for unknown keys, [`Error::TypeMismatch`]
    /// if the setting is not an integer.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_typed(key, SettingKind::Integer, SettingValue::as_int)
    }

    /// Get a boolean value
    ///
    /// # Errors
    ///
    /// [`Error::SettingNotFound`] for unknown keys, [`Error::TypeMismatch`]
    /// if the setting is not a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get_typed(key, SettingKind::Boolean, SettingValue::as_bool)
    }

    /// Get an integer and narrow it to `T` (e.g. a port as `u16`)
    ///
    /// # Errors
    ///
    /// Same as [`get_int`](Self::get_int), plus [`Error::TypeMismatch`] when
    /// the value does not fit in `T`.
    pub fn get_int_as<T: TryFrom<i64>>(&self, key: &str) -> Result<T> {
        let n = self.get_int(key)?;
        T::try_from(n).map_err(|_| Error::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: n.to_string(),
        })
    }

    /// Where the value of `key` came from
    pub fn source(&self, key: &str) -> Option<&ValueSource> {
        self.entry(key).map(|e| &e.source)
    }

    /// Whether `key` was taken from the environment
    pub fn is_overridden(&self, key: &str) -> bool {
        matches!(self.source(key), Some(ValueSource::Environment(_)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate settings in schema order
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedSetting> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of values taken from the environment
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.source, ValueSource::Environment(_)))
            .count()
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Keys whose values differ between `self` and `newer`
    ///
    /// Keys present on only one side are reported with `None` on the other.
    /// Order follows `self`, then keys only present in `newer`.
    pub fn diff(&self, newer: &ResolvedConfig) -> Vec<SettingChange> {
        let mut changes = Vec::new();

        for entry in &self.entries {
            let new = newer.get(&entry.key);
            if new != Some(&entry.value) {
                changes.push(SettingChange {
                    key: entry.key.clone(),
                    old: Some(entry.value.clone()),
                    new: new.cloned(),
                });
            }
        }

        for entry in newer.entries.iter().filter(|e| !self.contains_key(&e.key)) {
            changes.push(SettingChange {
                key: entry.key.clone(),
                old: None,
                new: Some(entry.value.clone()),
            });
        }

        changes
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Render as nested JSON (`a.b = 1` becomes `{"a": {"b": 1}}`)
    ///
    /// With `redact`, secret values are replaced by [`REDACTED`].
    #[must_use]
    pub fn to_json(&self, redact: bool) -> Value {
        let mut root = Map::new();
        for entry in &self.entries {
            let value = if redact && entry.secret {
                Value::String(REDACTED.to_string())
            } else {
                match entry.value {
                    SettingValue::String(ref s) => Value::String(s.clone()),
                    SettingValue::Integer(n) => Value::from(n),
                    SettingValue::Boolean(b) => Value::Bool(b),
                }
            };
            insert_nested(&mut root, &entry.key, value);
        }
        Value::Object(root)
    }

    /// Pretty-printed JSON document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if serialization fails.
    pub fn to_json_string(&self, redact: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json(redact))?)
    }

    /// TOML document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] if serialization fails.
    #[cfg(feature = "toml")]
    pub fn to_toml_string(&self, redact: bool) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_json(redact))?)
    }

    /// YAML document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if serialization fails.
    #[cfg(feature = "yaml")]
    pub fn to_yaml_string(&self, redact: bool) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_json(redact))?)
    }
}

impl<'a> IntoIterator for &'a ResolvedConfig {
    type Item = &'a ResolvedSetting;
    type IntoIter = std::slice::Iter<'a, ResolvedSetting>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            if entry.secret {
                writeln!(f, "{} = {REDACTED}", entry.key)?;
            } else {
                writeln!(f, "{} = {}", entry.key, entry.value)?;
            }
        }
        Ok(())
    }
}

/// Insert `value` under a dotted path, creating intermediate objects
///
/// The schema builder rejects keys that are prefixes of other keys, so
/// intermediate segments are always objects here.
fn insert_nested(root: &mut Map<String, Value>, key: &str, value: Value) {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(map) = slot.as_object_mut() else {
            log::warn!("Setting {key} collides with scalar {segment}; keeping scalar");
            return;
        };
        current = map;
    }
    current.insert(leaf.to_string(), value);
}

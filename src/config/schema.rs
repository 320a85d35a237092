//! Setting specs, typed values and the schema they form
//!
//! # Overview
//!
//! A [`Schema`] is an ordered list of [`SettingSpec`]s. Each spec declares:
//!
//! - **Key**: unique dotted name (e.g. `gitlab_rails.db_port`)
//! - **Kind**: `String`, `Integer` or `Boolean`
//! - **Default**: typed value used when no override is present
//! - **Env var**: optional environment variable that overrides the default
//! - **Constraints**: integer range, allowed values or a regex pattern
//!
//! ```rust
//! use deploycfg::{Schema, SettingSpec};
//!
//! let schema = Schema::builder()
//!     .setting(
//!         SettingSpec::integer("gitlab_rails.db_port", 5432)
//!             .env("GITLAB_DB_PORT")
//!             .range(1, 65535),
//!     )
//!     .setting(SettingSpec::string("gitlab_rails.db_host", "pg-main").env("GITLAB_DB_HOST"))
//!     .setting(SettingSpec::boolean("registry.enable", true))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.len(), 3);
//! ```
//!
//! # Schema Validation
//!
//! [`SchemaBuilder::build`] rejects definitions that could never resolve
//! cleanly: duplicate keys, defaults of the wrong kind, inverted ranges,
//! invalid patterns and defaults that violate their own constraints.
//!
//! ```rust
//! use deploycfg::{Schema, SettingSpec};
//!
//! let invalid = Schema::builder()
//!     .setting(SettingSpec::integer("puma.max_threads", 4).range(10, 1))
//!     .build();
//! assert!(invalid.is_err());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

// =============================================================================
// Setting Kinds and Values
// =============================================================================

/// Declared type of a setting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Free-form text
    String,
    /// Base-10 signed 64-bit integer
    Integer,
    /// `true`/`false` flag
    Boolean,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingKind::String => "string",
            SettingKind::Integer => "integer",
            SettingKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A typed setting value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl SettingValue {
    /// Kind of this value
    #[must_use]
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::String(_) => SettingKind::String,
            SettingValue::Integer(_) => SettingKind::Integer,
            SettingValue::Boolean(_) => SettingKind::Boolean,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => write!(f, "{s:?}"),
            SettingValue::Integer(n) => write!(f, "{n}"),
            SettingValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Boolean(value)
    }
}

// =============================================================================
// Constraints
// =============================================================================

/// Inclusive integer range; either bound may be open
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IntRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Constraints checked against a typed value after conversion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SettingConstraints {
    /// Range for Integer settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<IntRange>,

    /// Allowed values (enum constraint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SettingValue>>,

    /// Regex pattern for String settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl SettingConstraints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_none() && self.options.is_none() && self.pattern.is_none()
    }
}

impl fmt::Display for SettingConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(range) = self.range {
            match (range.min, range.max) {
                (Some(min), Some(max)) => parts.push(format!("{min}..={max}")),
                (Some(min), None) => parts.push(format!(">= {min}")),
                (None, Some(max)) => parts.push(format!("<= {max}")),
                (None, None) => {}
            }
        }
        if let Some(ref options) = self.options {
            let list: Vec<String> = options.iter().map(ToString::to_string).collect();
            parts.push(format!("one of [{}]", list.join(", ")));
        }
        if let Some(ref pattern) = self.pattern {
            parts.push(format!("matches /{pattern}/"));
        }
        f.write_str(&parts.join(", "))
    }
}

// =============================================================================
// Setting Spec
// =============================================================================

/// Declarative description of one configuration key
///
/// # Example
///
/// ```
/// use deploycfg::{SettingKind, SettingSpec};
///
/// let port = SettingSpec::integer("nginx.listen_port", 80).range(1, 65535);
/// let password = SettingSpec::string("gitlab_rails.db_password", "")
///     .env("GITLAB_DB_PASSWORD")
///     .secret();
/// let token = SettingSpec::required("runner.token", SettingKind::String)
///     .env("RUNNER_TOKEN");
///
/// assert_eq!(port.kind, SettingKind::Integer);
/// assert!(password.secret);
/// assert!(token.default.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingSpec {
    /// Unique key within the schema
    pub key: String,

    /// Declared kind
    pub kind: SettingKind,

    /// Default value (already typed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SettingValue>,

    /// Environment variable overriding the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,

    /// Value constraints
    #[serde(default, skip_serializing_if = "SettingConstraints::is_empty")]
    pub constraints: SettingConstraints,

    /// Resolution fails when neither override nor default is available
    #[serde(default)]
    pub required: bool,

    /// Redacted in display and export
    #[serde(default)]
    pub secret: bool,

    /// Human readable help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SettingSpec {
    // =========================================================================
    // Type-specific constructors
    // =========================================================================

    fn with_default(key: impl Into<String>, default: SettingValue) -> Self {
        Self {
            key: key.into(),
            kind: default.kind(),
            default: Some(default),
            env_var: None,
            constraints: SettingConstraints::default(),
            required: false,
            secret: false,
            description: None,
        }
    }

    /// Create a string setting
    pub fn string(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self::with_default(key, SettingValue::String(default.into()))
    }

    /// Create an integer setting
    pub fn integer(key: impl Into<String>, default: i64) -> Self {
        Self::with_default(key, SettingValue::Integer(default))
    }

    /// Create a boolean setting
    pub fn boolean(key: impl Into<String>, default: bool) -> Self {
        Self::with_default(key, SettingValue::Boolean(default))
    }

    /// Create a required setting with no default
    ///
    /// Resolution reports `MissingRequired` unless an environment override
    /// is present.
    pub fn required(key: impl Into<String>, kind: SettingKind) -> Self {
        Self {
            key: key.into(),
            kind,
            default: None,
            env_var: None,
            constraints: SettingConstraints::default(),
            required: true,
            secret: false,
            description: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the environment variable overriding this setting
    #[must_use]
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env_var = Some(var.into());
        self
    }

    /// Set minimum value for Integer settings
    #[must_use]
    pub fn min(mut self, val: i64) -> Self {
        self.constraints.range.get_or_insert_with(IntRange::default).min = Some(val);
        self
    }

    /// Set maximum value for Integer settings
    #[must_use]
    pub fn max(mut self, val: i64) -> Self {
        self.constraints.range.get_or_insert_with(IntRange::default).max = Some(val);
        self
    }

    /// Set both bounds for Integer settings
    #[must_use]
    pub fn range(self, min: i64, max: i64) -> Self {
        self.min(min).max(max)
    }

    /// Restrict the setting to a fixed set of values
    #[must_use]
    pub fn one_of<V: Into<SettingValue>>(mut self, options: impl IntoIterator<Item = V>) -> Self {
        self.constraints.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Set regex pattern for String settings
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Mark setting as secret (redacted when printed or exported)
    #[must_use]
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Set help text
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate a typed value against this setting's constraints
    ///
    /// Checks:
    /// - Number range (min/max)
    /// - Membership in allowed values
    /// - Regex pattern for text
    ///
    /// The value's kind is assumed to match; conversion happens earlier.
    /// Messages of secret settings never contain the value.
    pub fn validate(&self, value: &SettingValue) -> std::result::Result<(), String> {
        let pattern = self.compile_pattern()?;
        self.check(value, pattern.as_ref())
    }

    /// [`validate`](Self::validate) with the pattern already compiled
    pub(crate) fn check(
        &self,
        value: &SettingValue,
        pattern: Option<&Regex>,
    ) -> std::result::Result<(), String> {
        if let (Some(range), SettingValue::Integer(num)) = (self.constraints.range, value) {
            let shown = if self.secret {
                String::new()
            } else {
                format!(" {num}")
            };
            if let Some(min) = range.min {
                if *num < min {
                    return Err(format!("value{shown} must be at least {min}"));
                }
            }
            if let Some(max) = range.max {
                if *num > max {
                    return Err(format!("value{shown} must be at most {max}"));
                }
            }
        }

        if let Some(ref options) = self.constraints.options {
            if !options.contains(value) {
                return Err(format!(
                    "value must be {}",
                    SettingConstraints {
                        options: Some(options.clone()),
                        ..Default::default()
                    }
                ));
            }
        }

        if let (Some(re), SettingValue::String(text)) = (pattern, value) {
            if !re.is_match(text) {
                return Err(format!("value does not match pattern: {}", re.as_str()));
            }
        }

        Ok(())
    }

    fn compile_pattern(&self) -> std::result::Result<Option<Regex>, String> {
        self.constraints
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| format!("invalid regex pattern: {e}"))
    }

    /// Validate the spec definition itself
    ///
    /// Checks that the spec is properly configured:
    /// - Key is not empty
    /// - Default kind matches the declared kind
    /// - A spec without default is marked required
    /// - Range is only used on Integer and has min <= max
    /// - Pattern is only used on String, non-empty and valid regex
    /// - Allowed values match the declared kind
    /// - Default value satisfies constraints
    pub fn validate_schema(&self) -> std::result::Result<(), String> {
        self.validate_definition().map(|_| ())
    }

    /// Check the definition and return its compiled pattern
    fn validate_definition(&self) -> std::result::Result<Option<Regex>, String> {
        if self.key.trim().is_empty() {
            return Err("key cannot be empty".to_string());
        }
        if self.key.split('.').any(str::is_empty) {
            return Err("key cannot contain empty segments".to_string());
        }

        if let Some(ref var) = self.env_var {
            if var.is_empty() || var.contains('=') || var.contains('\0') {
                return Err(format!("invalid environment variable name {var:?}"));
            }
        }

        match self.default {
            Some(ref default) if default.kind() != self.kind => {
                return Err(format!(
                    "default is {} but setting is declared {}",
                    default.kind(),
                    self.kind
                ));
            }
            None if !self.required => {
                return Err("setting without default must be marked required".to_string());
            }
            _ => {}
        }

        if let Some(range) = self.constraints.range {
            if self.kind != SettingKind::Integer {
                return Err(format!("range constraint on {} setting", self.kind));
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(format!("min ({min}) cannot be greater than max ({max})"));
                }
            }
        }

        if let Some(ref pattern) = self.constraints.pattern {
            if self.kind != SettingKind::String {
                return Err(format!("pattern constraint on {} setting", self.kind));
            }
            if pattern.is_empty() {
                return Err("pattern cannot be empty string".to_string());
            }
        }
        let compiled = self.compile_pattern()?;

        if let Some(ref options) = self.constraints.options {
            if options.is_empty() {
                return Err("allowed values cannot be empty".to_string());
            }
            if let Some(bad) = options.iter().find(|o| o.kind() != self.kind) {
                return Err(format!(
                    "allowed value {bad} is not a {} value",
                    self.kind
                ));
            }
        }

        if let Some(ref default) = self.default {
            self.check(default, compiled.as_ref())
                .map_err(|e| format!("default value is invalid: {e}"))?;
        }

        Ok(compiled)
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Ordered, validated set of setting specs
///
/// Built once with [`Schema::builder`] and never mutated afterwards.
/// Patterns are compiled at build time and reused by every resolution.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    specs: Vec<SettingSpec>,
    #[serde(skip)]
    patterns: Vec<Option<Regex>>,
}

impl Schema {
    /// Start building a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Look up a spec by key
    pub fn get(&self, key: &str) -> Option<&SettingSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Iterate specs in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, SettingSpec> {
        self.specs.iter()
    }

    /// Keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs paired with their compiled patterns
    pub(crate) fn compiled(&self) -> impl Iterator<Item = (&SettingSpec, Option<&Regex>)> {
        self.specs
            .iter()
            .zip(self.patterns.iter().map(Option::as_ref))
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.specs == other.specs
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a SettingSpec;
    type IntoIter = std::slice::Iter<'a, SettingSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

/// Builder for creating a [`Schema`] with a fluent API
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    specs: Vec<SettingSpec>,
}

impl SchemaBuilder {
    /// Append a setting
    #[must_use]
    pub fn setting(mut self, spec: SettingSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Append several settings in order
    #[must_use]
    pub fn settings(mut self, specs: impl IntoIterator<Item = SettingSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Validate every spec and build the schema
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] for a repeated key and
    /// [`Error::InvalidSchema`] for the first malformed spec.
    pub fn build(self) -> Result<Schema> {
        let mut seen_keys = HashSet::new();
        let mut seen_vars = HashSet::new();
        let mut patterns = Vec::with_capacity(self.specs.len());

        for spec in &self.specs {
            let pattern = spec
                .validate_definition()
                .map_err(|reason| Error::invalid_schema(&spec.key, reason))?;
            patterns.push(pattern);

            if !seen_keys.insert(spec.key.as_str()) {
                return Err(Error::DuplicateKey(spec.key.clone()));
            }

            if let Some(ref var) = spec.env_var {
                if !seen_vars.insert(var.as_str()) {
                    log::debug!("Environment variable {var} feeds more than one setting");
                }
            }
        }

        // "a" and "a.b" cannot both exist: nested export would need "a" to be
        // a scalar and a table at once.
        for key in &seen_keys {
            let mut prefix_end = 0;
            while let Some(pos) = key[prefix_end..].find('.') {
                prefix_end += pos;
                let prefix = &key[..prefix_end];
                if seen_keys.contains(prefix) {
                    return Err(Error::invalid_schema(
                        key,
                        format!("key is nested under setting {prefix}"),
                    ));
                }
                prefix_end += 1;
            }
        }

        Ok(Schema {
            specs: self.specs,
            patterns,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = SettingSpec::integer("gitlab_rails.db_port", 5432)
            .env("GITLAB_DB_PORT")
            .range(1, 65535)
            .description("PostgreSQL port");

        assert_eq!(spec.kind, SettingKind::Integer);
        assert_eq!(spec.default, Some(SettingValue::Integer(5432)));
        assert_eq!(spec.env_var.as_deref(), Some("GITLAB_DB_PORT"));
        assert_eq!(
            spec.constraints.range,
            Some(IntRange {
                min: Some(1),
                max: Some(65535)
            })
        );
        assert!(!spec.required);
        assert!(spec.validate_schema().is_ok());
    }

    #[test]
    fn test_range_validation() {
        let spec = SettingSpec::integer("port", 8080).range(1, 65535);

        assert!(spec.validate(&SettingValue::Integer(1)).is_ok());
        assert!(spec.validate(&SettingValue::Integer(65535)).is_ok());

        let err = spec.validate(&SettingValue::Integer(0)).unwrap_err();
        assert_eq!(err, "value 0 must be at least 1");
        let err = spec.validate(&SettingValue::Integer(99999)).unwrap_err();
        assert_eq!(err, "value 99999 must be at most 65535");
    }

    #[test]
    fn test_open_range() {
        let spec = SettingSpec::integer("puma.worker_processes", 0).min(0);

        assert!(spec.validate(&SettingValue::Integer(i64::MAX)).is_ok());
        assert!(spec.validate(&SettingValue::Integer(-1)).is_err());
    }

    #[test]
    fn test_secret_range_message_hides_value() {
        let spec = SettingSpec::integer("vault.pin", 1234).range(1000, 9999).secret();

        let err = spec.validate(&SettingValue::Integer(123)).unwrap_err();
        assert_eq!(err, "value must be at least 1000");
        let err = spec.validate(&SettingValue::Integer(99999)).unwrap_err();
        assert!(!err.contains("99999"));
    }

    #[test]
    fn test_patterns_compiled_at_build() {
        let schema = Schema::builder()
            .setting(SettingSpec::string("external_url", "http://a").pattern(r"^https?://"))
            .setting(SettingSpec::integer("nginx.listen_port", 80))
            .build()
            .unwrap();

        let patterns: Vec<Option<&str>> = schema
            .compiled()
            .map(|(_, re)| re.map(Regex::as_str))
            .collect();
        assert_eq!(patterns, vec![Some(r"^https?://"), None]);
    }

    #[test]
    fn test_pattern_validation() {
        let spec = SettingSpec::string("external_url", "https://gitlab.example.com")
            .pattern(r"^https?://\S+$");

        assert!(spec.validate(&"http://localhost".into()).is_ok());
        let result = spec.validate(&"gitlab.example.com".into());
        assert_eq!(
            result.unwrap_err(),
            r"value does not match pattern: ^https?://\S+$"
        );
    }

    #[test]
    fn test_options_validation() {
        let spec = SettingSpec::string("log.level", "info").one_of(["debug", "info", "warn"]);

        assert!(spec.validate(&"warn".into()).is_ok());
        let err = spec.validate(&"trace".into()).unwrap_err();
        assert!(err.contains("one of"));
    }

    #[test]
    fn test_schema_validation() {
        assert!(SettingSpec::integer("a", 5).range(1, 10).validate_schema().is_ok());

        // min > max
        assert!(SettingSpec::integer("a", 5).range(10, 1).validate_schema().is_err());

        // default outside range
        assert!(SettingSpec::integer("a", 0).range(1, 10).validate_schema().is_err());

        // range on non-integer
        assert!(SettingSpec::string("a", "x").min(1).validate_schema().is_err());

        // invalid regex
        assert!(SettingSpec::string("a", "x").pattern("(").validate_schema().is_err());

        // empty pattern
        assert!(SettingSpec::string("a", "x").pattern("").validate_schema().is_err());

        // options of wrong kind
        assert!(SettingSpec::integer("a", 1).one_of(["1"]).validate_schema().is_err());
    }

    #[test]
    fn test_default_kind_mismatch() {
        let mut spec = SettingSpec::integer("a", 5);
        spec.kind = SettingKind::Boolean;

        let err = spec.validate_schema().unwrap_err();
        assert_eq!(err, "default is integer but setting is declared boolean");
    }

    #[test]
    fn test_missing_default_requires_flag() {
        let mut spec = SettingSpec::required("runner.token", SettingKind::String);
        assert!(spec.validate_schema().is_ok());

        spec.required = false;
        assert!(spec.validate_schema().is_err());
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let result = Schema::builder()
            .setting(SettingSpec::integer("nginx.listen_port", 80))
            .setting(SettingSpec::integer("nginx.listen_port", 8080))
            .build();

        assert!(matches!(result, Err(Error::DuplicateKey(ref k)) if k == "nginx.listen_port"));
    }

    #[test]
    fn test_builder_reports_key() {
        let err = Schema::builder()
            .setting(SettingSpec::boolean("ok", true))
            .setting(SettingSpec::integer("bad", 0).range(1, 2))
            .build()
            .unwrap_err();

        assert!(err.is_schema_error());
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_builder_rejects_nested_collision() {
        let err = Schema::builder()
            .setting(SettingSpec::boolean("redis", false))
            .setting(SettingSpec::boolean("redis.enable", false))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("nested under setting redis"));

        let err = Schema::builder()
            .setting(SettingSpec::boolean("a..b", false))
            .build()
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = Schema::builder()
            .setting(SettingSpec::string("z", "1"))
            .setting(SettingSpec::string("a", "2"))
            .setting(SettingSpec::string("m", "3"))
            .build()
            .unwrap();

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert!(schema.get("a").is_some());
        assert!(schema.get("missing").is_none());
    }

    #[test]
    fn test_serialization() {
        let spec = SettingSpec::integer("gitlab_rails.redis_port", 6379)
            .env("GITLAB_REDIS_PORT")
            .range(1, 65535);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "integer");
        assert_eq!(json["default"], 6379);
        assert_eq!(json["constraints"]["range"]["max"], 65535);

        let back: SettingSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }
}

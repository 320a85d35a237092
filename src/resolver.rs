//! Resolution of a schema against an environment snapshot
//!
//! Resolution is a pure function of `(schema, environment)`: it performs no
//! I/O, never mutates either input and never stops at the first problem.
//! Every spec is visited in order and every failure is collected, so one
//! call reports the full picture.

use regex::Regex;

use crate::config::{EnvSource, Schema, SettingKind, SettingSpec, SettingValue};
use crate::resolved::{REDACTED, ResolvedConfig, ResolvedSetting, ValueSource};
use crate::validation::{ValidationError, ValidationErrors};

/// Resolve every setting of `schema` against `env`
///
/// # Errors
///
/// Returns all [`ValidationError`]s in schema order when any setting fails;
/// no partial configuration is exposed in that case.
///
/// # Example
///
/// ```rust
/// use deploycfg::{Environment, Schema, SettingSpec, resolve};
///
/// let schema = Schema::builder()
///     .setting(SettingSpec::integer("gitlab_rails.db_port", 5432).env("GITLAB_DB_PORT").range(1, 65535))
///     .setting(SettingSpec::integer("gitlab_rails.gitlab_shell_ssh_port", 22).env("GITLAB_SSH_BIND").range(1, 65535))
///     .build()
///     .unwrap();
///
/// let env = Environment::new().with("GITLAB_DB_PORT", "6432");
/// let config = resolve(&schema, &env).unwrap();
/// assert_eq!(config.get_int("gitlab_rails.db_port").unwrap(), 6432);
///
/// let env = Environment::new()
///     .with("GITLAB_DB_PORT", "notanumber")
///     .with("GITLAB_SSH_BIND", "0");
/// let errors = resolve(&schema, &env).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
pub fn resolve<E>(schema: &Schema, env: &E) -> Result<ResolvedConfig, ValidationErrors>
where
    E: EnvSource + ?Sized,
{
    let mut entries = Vec::with_capacity(schema.len());
    let mut errors = ValidationErrors::default();

    for (spec, pattern) in schema.compiled() {
        match resolve_setting(spec, pattern, env) {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                log::debug!("Setting {} failed: {error}", spec.key);
                errors.push(error);
            }
        }
    }

    if errors.is_empty() {
        let config = ResolvedConfig::from_entries(entries);
        log::info!(
            "Resolved {} settings ({} from environment)",
            config.len(),
            config.override_count()
        );
        Ok(config)
    } else {
        log::warn!(
            "Configuration resolution failed with {} error(s)",
            errors.len()
        );
        Err(errors)
    }
}

impl Schema {
    /// Resolve this schema against `env`
    ///
    /// Shorthand for [`resolve`].
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve<E>(&self, env: &E) -> Result<ResolvedConfig, ValidationErrors>
    where
        E: EnvSource + ?Sized,
    {
        resolve(self, env)
    }
}

fn resolve_setting<E>(
    spec: &SettingSpec,
    pattern: Option<&Regex>,
    env: &E,
) -> Result<ResolvedSetting, ValidationError>
where
    E: EnvSource + ?Sized,
{
    let raw = spec
        .env_var
        .as_deref()
        .and_then(|var| env.var(var).map(|raw| (var, raw)));

    let (value, source) = match (raw, &spec.default) {
        (Some((var, raw)), _) => {
            let value = convert(&raw, spec.kind).ok_or_else(|| {
                let shown = if spec.secret { REDACTED } else { raw.as_str() };
                ValidationError::type_mismatch(&spec.key, Some(var.to_string()), spec.kind, shown)
            })?;
            if spec.secret {
                log::debug!("Setting {} overridden by {var}", spec.key);
            } else {
                log::debug!("Setting {} overridden by {var} = {raw:?}", spec.key);
            }
            (value, ValueSource::Environment(var.to_string()))
        }
        (None, Some(default)) => (default.clone(), ValueSource::Default),
        (None, None) => {
            return Err(ValidationError::missing_required(
                &spec.key,
                spec.env_var.clone(),
            ));
        }
    };

    spec.check(&value, pattern)
        .map_err(|detail| ValidationError::out_of_range(&spec.key, spec.env_var.clone(), detail))?;

    Ok(ResolvedSetting {
        key: spec.key.clone(),
        value,
        source,
        secret: spec.secret,
    })
}

/// Convert a raw environment string to `kind`
///
/// Conversion is total: it yields a typed value or `None`, never a
/// fallback. Input is not trimmed.
pub fn convert(raw: &str, kind: SettingKind) -> Option<SettingValue> {
    match kind {
        SettingKind::String => Some(SettingValue::String(raw.to_string())),
        SettingKind::Integer => raw.parse::<i64>().ok().map(SettingValue::Integer),
        SettingKind::Boolean => parse_bool(raw).map(SettingValue::Boolean),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

//! Validation errors collected during resolution

use serde::Serialize;
use std::fmt;

use crate::config::SettingKind;

/// Why a single setting failed to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationReason {
    /// Required key has neither an environment override nor a default
    MissingRequired,
    /// Environment value could not be converted to the declared kind
    TypeMismatch { expected: SettingKind, raw: String },
    /// Converted value violates a declared constraint
    OutOfRange { detail: String },
}

/// One failed setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    #[serde(flatten)]
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn missing_required(key: impl Into<String>, env_var: Option<String>) -> Self {
        Self {
            key: key.into(),
            env_var,
            reason: ValidationReason::MissingRequired,
        }
    }

    pub fn type_mismatch(
        key: impl Into<String>,
        env_var: Option<String>,
        expected: SettingKind,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            env_var,
            reason: ValidationReason::TypeMismatch {
                expected,
                raw: raw.into(),
            },
        }
    }

    pub fn out_of_range(
        key: impl Into<String>,
        env_var: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            env_var,
            reason: ValidationReason::OutOfRange {
                detail: detail.into(),
            },
        }
    }

    #[must_use]
    pub fn is_missing_required(&self) -> bool {
        matches!(self.reason, ValidationReason::MissingRequired)
    }

    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.reason, ValidationReason::TypeMismatch { .. })
    }

    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.reason, ValidationReason::OutOfRange { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.env_var {
            Some(ref var) => write!(f, "{} ({var}): ", self.key)?,
            None => write!(f, "{}: ", self.key)?,
        }
        match self.reason {
            ValidationReason::MissingRequired => {
                f.write_str("required setting has no value and no default")
            }
            ValidationReason::TypeMismatch { expected, ref raw } => {
                write!(f, "cannot parse {raw:?} as {expected}")
            }
            ValidationReason::OutOfRange { ref detail } => f.write_str(detail),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every error from one resolution call, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Errors reported for `key`
    pub fn for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.0.iter().filter(move |e| e.key == key)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_env_var() {
        let err = ValidationError::type_mismatch(
            "gitlab_rails.db_port",
            Some("GITLAB_DB_PORT".into()),
            SettingKind::Integer,
            "notanumber",
        );
        assert_eq!(
            err.to_string(),
            "gitlab_rails.db_port (GITLAB_DB_PORT): cannot parse \"notanumber\" as integer"
        );
    }

    #[test]
    fn test_display_without_env_var() {
        let err = ValidationError::missing_required("runner.token", None);
        assert_eq!(
            err.to_string(),
            "runner.token: required setting has no value and no default"
        );
        assert!(err.is_missing_required());
    }

    #[test]
    fn test_collection_display_one_line_each() {
        let errors = ValidationErrors::from(vec![
            ValidationError::out_of_range("a", None, "value 0 must be at least 1"),
            ValidationError::missing_required("b", Some("B".into())),
        ]);

        let text = errors.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("  - a: value 0"));
        assert_eq!(errors.for_key("b").count(), 1);
    }

    #[test]
    fn test_serialize_shape() {
        let err = ValidationError::out_of_range("nginx.listen_port", None, "too big");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["key"], "nginx.listen_port");
        assert_eq!(json["reason"], "out_of_range");
        assert_eq!(json["detail"], "too big");
        assert!(json.get("env_var").is_none());
    }
}

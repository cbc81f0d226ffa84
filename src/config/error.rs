use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required configuration value `{0}` is not set")]
    MissingValue(String),

    #[error("invalid value for `{name}`: {value:?} is not {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: String,
    },

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{} configuration errors: {}", .0.len(), join(.0))]
    Multiple(Vec<ConfigError>),

    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config file value `{0}` must be a scalar")]
    NonScalarValue(String),
}

impl ConfigError {
    pub(crate) fn invalid(
        name: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            name: name.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the configuration field this error is about, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingValue(name)
            | Self::InvalidValue { name, .. }
            | Self::Validation { field: name, .. }
            | Self::NonScalarValue(name) => Some(name),
            _ => None,
        }
    }

    /// Flattens an aggregated error into its individual field errors.
    pub fn errors(&self) -> Vec<&ConfigError> {
        match self {
            Self::Multiple(errors) => errors.iter().flat_map(ConfigError::errors).collect(),
            other => vec![other],
        }
    }
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_field() {
        let err = ConfigError::validation("API_URL", "API URL cannot be empty");
        assert_eq!(err.to_string(), "API_URL: API URL cannot be empty");
        assert_eq!(err.field(), Some("API_URL"));
    }

    #[test]
    fn test_multiple_flattens() {
        let err = ConfigError::Multiple(vec![
            ConfigError::MissingValue("API_URL".into()),
            ConfigError::invalid("DEBUG", "maybe", "a boolean"),
        ]);
        let fields: Vec<_> = err.errors().iter().filter_map(|e| e.field()).collect();
        assert_eq!(fields, ["API_URL", "DEBUG"]);
        assert!(err.to_string().starts_with("2 configuration errors"));
        assert_eq!(err.field(), None);
    }
}

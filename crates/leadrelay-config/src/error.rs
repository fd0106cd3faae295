//! Errors raised while loading or checking `leadrelay.toml`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config file at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config is not valid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A `${VAR}` placeholder names an unset variable.
    #[error("${{{0}}} is referenced in the config but not set")]
    EnvVarNotSet(String),

    #[error("Bad env placeholder pattern: {0}")]
    Placeholder(#[from] regex::Error),

    /// A setting the relay cannot run without, e.g. `submission.endpoint`.
    #[error("{0} is required")]
    MissingField(String),

    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Dotted path of the offending setting, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field) | Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_setting() {
        let missing = ConfigError::MissingField("submission.endpoint".to_string());
        assert_eq!(missing.to_string(), "submission.endpoint is required");
        assert_eq!(missing.field(), Some("submission.endpoint"));

        let invalid = ConfigError::InvalidValue {
            field: "submission.global_timeout_ms".to_string(),
            message: "must be greater than 0".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "submission.global_timeout_ms: must be greater than 0"
        );
        assert_eq!(invalid.field(), Some("submission.global_timeout_ms"));
    }

    #[test]
    fn test_env_placeholder_is_quoted() {
        let err = ConfigError::EnvVarNotSet("LEADRELAY_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "${LEADRELAY_KEY} is referenced in the config but not set"
        );
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_read_error_keeps_source() {
        use std::error::Error as _;

        let err = ConfigError::Read {
            path: PathBuf::from("/etc/leadrelay.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("Cannot read /etc/leadrelay.toml"));
        assert!(err.source().is_some());
    }
}

//! Configuration loader.

use std::fs;
use std::io;
use std::path::Path;

use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        if let Some(dir) = config.logging.directory.take() {
            config.logging.directory = Some(Self::expand_path(&dir.to_string_lossy()).into());
        }
        Ok(config)
    }

    /// Substitute `${VAR}` placeholders. The first unset variable is an error.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let placeholder = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")?;
        let mut unset: Option<String> = None;

        let expanded = placeholder.replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| {
                unset.get_or_insert_with(|| caps[1].to_string());
                String::new()
            })
        });

        match unset {
            Some(name) => Err(ConfigError::EnvVarNotSet(name)),
            None => Ok(expanded.into_owned()),
        }
    }

    /// Expand shell-style paths (e.g., `~/.leadrelay`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

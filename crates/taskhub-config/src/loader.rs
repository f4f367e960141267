//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        crate::schema::taskhub_dir().join("config.toml")
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        config.session.storage_path = Self::expand_path_buf(&config.session.storage_path);
        config.logging.log_dir = Self::expand_path_buf(&config.logging.log_dir);
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
            field: "env pattern".to_string(),
            message: e.to_string(),
        })?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.taskhub`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(Self::expand_path(s)),
            None => path.to_path_buf(),
        }
    }
}

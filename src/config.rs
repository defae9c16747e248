//! Updater configuration.
//!
//! Configuration is read once, from environment variables or any other
//! key/value source, and handed to the updater factories. Every key is
//! optional and falls back to a default.
//!
//! | Key                            | Default                             |
//! |--------------------------------|-------------------------------------|
//! | `SCIM_UPDATER_USERNAME_PATTERN`| `^[A-Za-z][A-Za-z0-9._-]{1,127}$`   |
//! | `SCIM_UPDATER_MAX_NAME_LENGTH` | `64`                                |
//! | `SCIM_UPDATER_AUDIT`           | `false`                             |
//!
//! # Example
//!
//! ```
//! use scim_updater::config::UpdaterConfig;
//!
//! let config = UpdaterConfig::from_lookup(|key| match key {
//!     "SCIM_UPDATER_MAX_NAME_LENGTH" => Some("32".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.max_name_length, 32);
//! assert!(!config.audit);
//! ```

use std::env;

use regex::Regex;
use thiserror::Error;

use crate::validation::anchored;

/// Environment key for the username pattern.
pub const USERNAME_PATTERN_KEY: &str = "SCIM_UPDATER_USERNAME_PATTERN";
/// Environment key for the maximum given/family/group name length.
pub const MAX_NAME_LENGTH_KEY: &str = "SCIM_UPDATER_MAX_NAME_LENGTH";
/// Environment key for audit logging.
pub const AUDIT_KEY: &str = "SCIM_UPDATER_AUDIT";

const DEFAULT_USERNAME_PATTERN: &str = "^[A-Za-z][A-Za-z0-9._-]{1,127}$";
const DEFAULT_MAX_NAME_LENGTH: usize = 64;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A key has a value that cannot be used.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Settings for the account and group updater factories.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Usernames must match this pattern in full.
    pub username_pattern: Regex,
    /// Maximum length, in characters, of given, family and group names.
    pub max_name_length: usize,
    /// Emit one audit record per applied updater.
    pub audit: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            username_pattern: anchored(DEFAULT_USERNAME_PATTERN)
                .unwrap_or_else(|error| unreachable!("{error}")),
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            audit: false,
        }
    }
}

impl UpdaterConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to an
    /// unusable value, including a value that is not valid Unicode.
    pub fn from_env() -> Result<Self, ConfigError> {
        for key in [USERNAME_PATTERN_KEY, MAX_NAME_LENGTH_KEY, AUDIT_KEY] {
            if let Err(env::VarError::NotUnicode(_)) = env::var(key) {
                return Err(ConfigError::invalid(key, "value is not valid Unicode"));
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a key holds an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(pattern) = lookup(USERNAME_PATTERN_KEY) {
            config.username_pattern = anchored(&pattern)
                .map_err(|error| ConfigError::invalid(USERNAME_PATTERN_KEY, error.to_string()))?;
        }

        if let Some(length) = lookup(MAX_NAME_LENGTH_KEY) {
            config.max_name_length = parse_length(&length)?;
        }

        if let Some(audit) = lookup(AUDIT_KEY) {
            config.audit = parse_flag(AUDIT_KEY, &audit)?;
        }

        tracing::debug!(
            username_pattern = config.username_pattern.as_str(),
            max_name_length = config.max_name_length,
            audit = config.audit,
            "updater configuration loaded"
        );
        Ok(config)
    }
}

fn parse_length(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::invalid(MAX_NAME_LENGTH_KEY, "must be greater than zero")),
        Ok(length) => Ok(length),
        Err(error) => Err(ConfigError::invalid(MAX_NAME_LENGTH_KEY, error.to_string())),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("'{other}' is not a boolean"))),
    }
}

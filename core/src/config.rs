#![deny(missing_docs)]

//! # Configuration
//!
//! Document-level settings: `info.title`, `info.version`, `host` and
//! `basePath`. Loaded from the environment at startup.

use crate::error::{SpecError, SpecResult};

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "swagger project";
/// Version used when none is configured.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// Environment variable holding the document title.
pub const ENV_TITLE: &str = "SWAGPLUS_TITLE";
/// Environment variable holding the API version.
pub const ENV_VERSION: &str = "SWAGPLUS_VERSION";
/// Environment variable holding the host.
pub const ENV_HOST: &str = "SWAGPLUS_HOST";
/// Environment variable holding the base path.
pub const ENV_BASE_PATH: &str = "SWAGPLUS_BASE_PATH";

/// Settings copied into every assembled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecConfig {
    /// `info.title`.
    pub title: String,
    /// `info.version`.
    pub version: String,
    /// `host`, omitted when unset.
    pub host: Option<String>,
    /// `basePath`, omitted when unset.
    pub base_path: Option<String>,
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            host: None,
            base_path: None,
        }
    }
}

impl SpecConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> SpecResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> SpecResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> SpecResult<Option<String>> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(SpecError::Config(format!(
                    "Environment variable {} is set but empty",
                    key
                ))),
                Some(value) => Ok(Some(value.trim().to_string())),
                None => Ok(None),
            }
        };

        let defaults = Self::default();
        let config = Self {
            title: read(ENV_TITLE)?.unwrap_or(defaults.title),
            version: read(ENV_VERSION)?.unwrap_or(defaults.version),
            host: read(ENV_HOST)?,
            base_path: read(ENV_BASE_PATH)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that cannot be expressed by the types.
    pub fn validate(&self) -> SpecResult<()> {
        if self.title.trim().is_empty() {
            return Err(SpecError::Config("title must not be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(SpecError::Config("version must not be empty".to_string()));
        }
        if let Some(base_path) = &self.base_path {
            if !base_path.starts_with('/') {
                return Err(SpecError::Config(format!(
                    "base path '{}' must start with '/'",
                    base_path
                )));
            }
        }
        if let Some(host) = &self.host {
            if host.contains("://") || host.contains('/') {
                return Err(SpecError::Config(format!(
                    "host '{}' must not include a scheme or path",
                    host
                )));
            }
        }
        Ok(())
    }
}

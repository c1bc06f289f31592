//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they are usable
//! (e.g., the fetch timeout must be positive).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for `fetch.timeout_secs`: one week.
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [fetch]
/// timeout_secs = 300
/// proxy_auto = true
/// scratch_dir = "/var/tmp"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Clone and remote listing settings
    pub fetch: Option<FetchConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(fetch) = &self.fetch {
            fetch.validate()?;
        }
        Ok(())
    }
}

/// Settings for talking to a remote repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Deadline for a clone or remote listing, in seconds
    pub timeout_secs: Option<u64>,

    /// Let libgit2 auto-detect a proxy (default: true)
    pub proxy_auto: Option<bool>,

    /// Parent directory for the private clone scratch area
    /// (default: the system temporary directory)
    pub scratch_dir: Option<PathBuf>,
}

impl FetchConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fetch.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(secs) = self.timeout_secs {
            if secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "fetch.timeout_secs must be at most {}, got {}",
                    MAX_TIMEOUT_SECS, secs
                )));
            }
        }

        if let Some(dir) = &self.scratch_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue(format!(
                    "fetch.scratch_dir must be an absolute path, got '{}'",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// The configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Whether proxy auto-detection is enabled.
    ///
    /// Defaults to `true` if not configured.
    pub fn proxy_auto(&self) -> bool {
        self.proxy_auto.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [fetch]
            timeout_secs = 120
            proxy_auto = false
            scratch_dir = "/var/tmp"
        "#;

        let config: FileConfig = toml::from_str(toml).unwrap();
        let fetch = config.fetch.unwrap();
        assert_eq!(fetch.timeout(), Some(Duration::from_secs(120)));
        assert!(!fetch.proxy_auto());
        assert_eq!(fetch.scratch_dir, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.fetch.is_none());
        assert!(config.validate().is_ok());

        let fetch = FetchConfig::default();
        assert!(fetch.timeout().is_none());
        assert!(fetch.proxy_auto());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[fetch]\ndepth = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let fetch = FetchConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            fetch.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn oversized_timeout_rejected() {
        let fetch = FetchConfig {
            timeout_secs: Some(i64::MAX as u64),
            ..Default::default()
        };
        assert!(matches!(
            fetch.validate(),
            Err(ConfigError::InvalidValue(_))
        ));

        let fetch = FetchConfig {
            timeout_secs: Some(MAX_TIMEOUT_SECS),
            ..Default::default()
        };
        assert!(fetch.validate().is_ok());
    }

    #[test]
    fn relative_scratch_dir_rejected() {
        let fetch = FetchConfig {
            scratch_dir: Some(PathBuf::from("relative/dir")),
            ..Default::default()
        };
        assert!(fetch.validate().is_err());
    }
}

//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! The configuration file is searched in order, first hit wins:
//! 1. `$GITREPOFS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitrepofs/config.toml`
//! 3. `~/.gitrepofs/config.toml`
//!
//! Missing files are not an error; defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use gitrepofs::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! println!("proxy auto-detection: {}", result.config.fetch().proxy_auto());
//! ```

pub mod schema;

pub use schema::{FetchConfig, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GITREPOFS_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (defaults if no file was found)
    pub file: FileConfig,
    /// Path of the file the configuration was read from
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// holds invalid values.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        Self::load_first(&Self::candidates())
    }

    /// Load the first existing file out of `candidates`.
    ///
    /// Candidates that are not regular files are reported as warnings and
    /// skipped.
    pub fn load_first(candidates: &[PathBuf]) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        for path in candidates {
            if !path.exists() {
                continue;
            }
            if !path.is_file() {
                warnings.push(ConfigWarning {
                    message: "config location exists but is not a file, ignoring".to_string(),
                    path: path.clone(),
                });
                continue;
            }
            debug!(path = %path.display(), "loading config");
            let config = Self::load_from(path)?;
            return Ok(ConfigLoadResult { config, warnings });
        }

        debug!("no config file found, using defaults");
        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Read, parse and validate one config file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Candidate config file locations in search order.
    fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("gitrepofs/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".gitrepofs/config.toml"));
        }
        candidates
    }

    /// The file this configuration was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Fetch settings, defaults if not configured.
    pub fn fetch(&self) -> FetchConfig {
        self.file.fetch.clone().unwrap_or_default()
    }
}

//! Configuration module
//!
//! `AppConfig` is read from a TOML file. Every section and field has a
//! default, so a missing file or a partial file both load.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::database::DatabaseConfig;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CHARGENET_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Deployment-wide price per kWh
    pub rate_per_kwh: f64,
    /// Issue the invoice in the same transaction as the session stop
    pub auto_issue_invoice: bool,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            rate_per_kwh: 1.0,
            auto_issue_invoice: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub billing: BillingConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.billing.rate_per_kwh;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "billing.rate_per_kwh must be a non-negative number, got {}",
                rate
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `$CHARGENET_CONFIG`, else `<config dir>/chargenet/config.toml`,
/// else `./config.toml` when the platform has no config dir.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .map(|dir| dir.join("chargenet").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

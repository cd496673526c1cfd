//! Application configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `INTAKE_*` environment variables (e.g. `INTAKE_ADMIN_PASSKEY`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ADMIN_PASSKEY: &str = "111111";
pub const DEFAULT_STORAGE_URL: &str = "/storage";
pub const DEFAULT_CLINIC_NAME: &str = "IvoireSante";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// SQLite database file; `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
    /// Six-digit passkey guarding the admin dashboard
    pub admin_passkey: String,
    /// Seconds before an in-flight submission is abandoned; 0 disables the limit
    pub submit_timeout_secs: u64,
    /// Base URL stored files are served under
    pub storage_url: String,
    /// Name used in patient notifications
    pub clinic_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            admin_passkey: DEFAULT_ADMIN_PASSKEY.to_string(),
            submit_timeout_secs: DEFAULT_SUBMIT_TIMEOUT_SECS,
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            clinic_name: DEFAULT_CLINIC_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, reading `path` when given and present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("admin_passkey", DEFAULT_ADMIN_PASSKEY)?
            .set_default("submit_timeout_secs", DEFAULT_SUBMIT_TIMEOUT_SECS)?
            .set_default("storage_url", DEFAULT_STORAGE_URL)?
            .set_default("clinic_name", DEFAULT_CLINIC_NAME)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let config: AppConfig = builder
            .add_source(Environment::with_prefix("INTAKE"))
            .build()?
            .try_deserialize()?;
        config.validate()?;

        log::debug!("Loaded configuration: {:?}", config.redacted());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_passkey.len() != 6 || !self.admin_passkey.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid("admin_passkey must be six digits".into()));
        }
        Ok(())
    }

    /// Submission timeout, `None` when disabled.
    pub fn submit_timeout(&self) -> Option<Duration> {
        match self.submit_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Copy safe to log.
    pub fn redacted(&self) -> AppConfig {
        AppConfig {
            admin_passkey: "******".into(),
            ..self.clone()
        }
    }
}

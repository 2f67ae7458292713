//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokengate_auth::ACCESS_TOKEN_TTL_MINUTES;
use tokengate_core::RefreshStoreKind;
use tracing::info;

/// Main configuration structure
///
/// Token signing secrets are deliberately not part of the file; they come
/// from the environment or the command line only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding a client build to serve for non-API routes
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Upper bound for the access token TTL (30 days)
const MAX_ACCESS_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default)]
    pub refresh_store: RefreshStoreKind,
}

impl SessionConfig {
    /// Access token lifetime; values outside the accepted range fall back to the default
    pub fn access_token_ttl(&self) -> chrono::Duration {
        let secs = if self.validate().is_ok() {
            self.access_token_ttl_secs
        } else {
            default_access_token_ttl_secs()
        };
        chrono::Duration::seconds(secs as i64)
    }

    /// The access token TTL must lie in `[1, MAX_ACCESS_TOKEN_TTL_SECS]`
    pub fn validate(&self) -> Result<()> {
        if self.access_token_ttl_secs == 0 {
            anyhow::bail!("session.access_token_ttl_secs must be at least 1");
        }
        if self.access_token_ttl_secs > MAX_ACCESS_TOKEN_TTL_SECS {
            anyhow::bail!(
                "session.access_token_ttl_secs {} exceeds maximum {}",
                self.access_token_ttl_secs,
                MAX_ACCESS_TOKEN_TTL_SECS
            );
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_secs: default_access_token_ttl_secs(),
            refresh_store: RefreshStoreKind::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "./data/tokengate.db".to_string()
}

fn default_access_token_ttl_secs() -> u64 {
    ACCESS_TOKEN_TTL_MINUTES as u64 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config
            .session
            .validate()
            .with_context(|| format!("Invalid session settings in {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

/// Signing secrets for the two token classes
pub struct Secrets {
    pub access: String,
    pub refresh: String,
}

impl Secrets {
    /// Both secrets must be set and must differ
    pub fn validate(&self) -> Result<()> {
        if self.access.is_empty() {
            anyhow::bail!("ACCESS_TOKEN_SECRET must not be empty");
        }
        if self.refresh.is_empty() {
            anyhow::bail!("REFRESH_TOKEN_SECRET must not be empty");
        }
        if self.access == self.refresh {
            anyhow::bail!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ");
        }
        Ok(())
    }
}

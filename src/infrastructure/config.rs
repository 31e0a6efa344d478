//! Configuration infrastructure
//!
//! Contains configuration loading and management for the catalog
//! reconciliation engine: the remote API endpoint, the fetcher's retry and
//! batching knobs, the debounced-reload timing and logging.
//!
//! The configuration lives in a single JSON file under the user's config
//! directory and is created with defaults on first run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::infrastructure::collection_fetcher::FetcherConfig;
use crate::infrastructure::http_client::HttpClientConfig;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote API endpoint and HTTP behavior.
    pub api: ApiConfig,

    /// Pagination, retry and batching behavior of the collection fetcher.
    pub fetcher: FetcherConfig,

    /// Debounced reload behavior after bulk operations.
    pub reload: ReloadConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, including the version prefix and a trailing slash.
    pub base_url: String,

    /// HTTP client behavior (timeout, user agent, RPS ceiling).
    pub client: HttpClientConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.storefront.local/v1/".to_string(),
            client: HttpClientConfig::default(),
        }
    }
}

/// Debounce timing for the full reload that follows bulk imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Delay before a scheduled full reload fires; a burst of bulk
    /// operations inside this window coalesces into one reload.
    pub debounce_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (`trace` | `debug` | `info` | `warn` | `error`).
    pub level: String,

    /// Whether to log to stderr.
    pub console_enabled: bool,

    /// Whether to also write a rolling log file.
    pub file_enabled: bool,

    /// Directory for log files; defaults to `logs/` next to the executable.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_enabled: true,
            file_enabled: false,
            directory: None,
        }
    }
}

/// Manages the configuration file lifecycle.
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory.
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("storefront-catalog");

        Ok(config_dir)
    }

    /// Create a new configuration manager with the default file location.
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let config_path = config_dir.join("storefront_catalog_config.json");

        Ok(Self { config_path })
    }

    /// Create a configuration manager over an explicit file path.
    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Initialize the configuration system on first run: create the config
    /// directory and write defaults if no file exists yet, otherwise load
    /// the existing file.
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        let config_dir = self
            .config_path
            .parent()
            .context("Failed to get config directory")?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .await
                .context("Failed to create config directory")?;
            info!("Created configuration directory: {:?}", config_dir);
        }

        if self.config_path.exists() {
            self.load_config().await
        } else {
            info!("First run detected - initializing default configuration");
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            Ok(default_config)
        }
    }

    /// Load configuration from the file.
    pub async fn load_config(&self) -> Result<AppConfig> {
        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read config file {:?}", self.config_path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", self.config_path))?;

        Ok(config)
    }

    /// Save configuration to the file.
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .with_context(|| format!("Failed to write config file {:?}", self.config_path))?;

        Ok(())
    }
}

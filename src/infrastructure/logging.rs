//! Logging system configuration and initialization
//!
//! This module provides the tracing setup for the catalog core:
//! - Console output with an environment-overridable filter
//! - Optional file logging via a non-blocking rolling writer
//! - Noise suppression for chatty dependencies below TRACE

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

// Re-export LoggingConfig from config module
pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
static LOG_GUARDS: Lazy<Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// Get the log directory relative to the executable location.
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize logging with custom configuration.
///
/// `RUST_LOG` overrides the configured level and the dependency
/// suppressions, e.g. `RUST_LOG="debug,reqwest=debug"`.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&config.level);

        // HTTP client internals drown out reconciliation logs below TRACE.
        if !config.level.to_lowercase().contains("trace") {
            filter = filter
                .add_directive("reqwest=info".parse().expect("static directive"))
                .add_directive("hyper=warn".parse().expect("static directive"))
                .add_directive("h2=warn".parse().expect("static directive"))
                .add_directive("tokio=info".parse().expect("static directive"));
        }

        filter
    });

    let console_layer = if config.console_enabled {
        Some(fmt::layer().with_target(true).with_writer(std::io::stderr))
    } else {
        None
    };

    let file_layer = if config.file_enabled {
        let log_dir = config.directory.clone().unwrap_or_else(get_log_directory);
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let file_appender = tracing_appender::rolling::daily(&log_dir, "storefront-catalog.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard mutex poisoned"))?
            .push(guard);

        Some(fmt::layer().with_ansi(false).with_writer(writer))
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

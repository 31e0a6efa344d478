//! Infrastructure layer for remote API access, response parsing and external
//! integrations
//!
//! This module provides the HTTP client, the REST transport seam, the
//! paginated collection fetcher, tolerant parsing/normalization, and the
//! configuration and logging plumbing.

pub mod api_client;
pub mod api_error; // Typed errors the retry policy is built on
pub mod collection_fetcher;
pub mod config; // Configuration file management
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod parsing; // Envelope extraction and record normalization

// Re-export commonly used items
pub use api_client::{ApiTransport, RestApiClient};
pub use api_error::{ApiError, ApiResult};
pub use collection_fetcher::{CollectionFetcher, FetcherConfig};
pub use config::{AppConfig, ConfigManager, LoggingConfig, ReloadConfig};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{normalize_brand, normalize_category, normalize_product};

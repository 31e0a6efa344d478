//! HTTP client for the storefront REST API with rate limiting and error
//! mapping.
//!
//! Provides a JSON-speaking client that keeps a polite requests-per-second
//! ceiling towards the remote API and maps HTTP failures into the typed
//! error taxonomy the retry policy is built on.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT},
    Client, Response, StatusCode,
};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::infrastructure::api_error::{ApiError, ApiResult};

/// HTTP client configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "storefront-catalog/0.2".to_string(),
            timeout_seconds: 30,
            max_requests_per_second: 10,
            follow_redirects: true,
        }
    }
}

/// JSON HTTP client with a token-bucket ceiling on outgoing requests.
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &Url) -> ApiResult<Value> {
        self.rate_limiter.until_ready().await;

        debug!("HTTP GET: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        Self::read_json(url, Self::check_status(url, response)?).await
    }

    /// POST a JSON payload and return the JSON response.
    pub async fn post_json(&self, url: &Url, payload: &Value) -> ApiResult<Value> {
        self.rate_limiter.until_ready().await;

        debug!("HTTP POST: {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        Self::read_json(url, Self::check_status(url, response)?).await
    }

    /// Get the configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn check_status(url: &Url, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            return Err(ApiError::RateLimited {
                url: url.to_string(),
                retry_after_seconds,
            });
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }

    async fn read_json(url: &Url, response: Response) -> ApiResult<Value> {
        response.json().await.map_err(|source| ApiError::InvalidBody {
            url: url.to_string(),
            source,
        })
    }
}

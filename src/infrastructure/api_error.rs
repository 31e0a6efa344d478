//! Error types for the storefront REST API boundary.
//!
//! The retry policy hangs off this taxonomy: only `RateLimited` is ever
//! retried, and only for the critical first page of a collection fetch.

use thiserror::Error;

use crate::domain::catalog::CollectionKind;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("rate limited by remote API: {url}")]
    RateLimited {
        url: String,
        retry_after_seconds: Option<u64>,
    },

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response body from {url}: {source}")]
    InvalidBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid request URL: {message}")]
    InvalidUrl { message: String },

    #[error("created {kind} came back without a usable id")]
    MissingCreatedId { kind: CollectionKind },
}

impl ApiError {
    /// Whether this failure is the transient rate-limit signal the first-page
    /// retry loop is allowed to wait out.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

//! REST API client for the storefront catalog endpoints.
//!
//! The transport is a trait seam so the fetcher and use-case layer can run
//! against a scripted fake in tests; `RestApiClient` is the production
//! implementation over [`HttpClient`].

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::domain::catalog::CollectionKind;
use crate::infrastructure::api_error::{ApiError, ApiResult};
use crate::infrastructure::http_client::HttpClient;

/// Transport to the remote catalog API.
///
/// `fetch_page` issues `GET /{collection}?page=n&limit=m&{extra}`; `create`
/// issues `POST /{collection}` and returns the raw response body (which may
/// or may not wrap the created entity in an envelope).
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn fetch_page(
        &self,
        collection: CollectionKind,
        page: u32,
        limit: u32,
        extra: &[(String, String)],
    ) -> ApiResult<Value>;

    async fn create(
        &self,
        collection: CollectionKind,
        payload: Value,
        extra: &[(String, String)],
    ) -> ApiResult<Value>;
}

/// Production transport over HTTP.
pub struct RestApiClient {
    http: HttpClient,
    base_url: Url,
}

impl RestApiClient {
    /// `base_url` is the API root, e.g. `https://api.example.com/v1/`.
    pub fn new(base_url: Url, http: HttpClient) -> Self {
        Self { http, base_url }
    }

    fn collection_url(
        &self,
        collection: CollectionKind,
        query: &[(String, String)],
    ) -> ApiResult<Url> {
        let mut url = self
            .base_url
            .join(collection.path())
            .map_err(|e| ApiError::InvalidUrl {
                message: format!("{}/{}: {e}", self.base_url, collection.path()),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

#[async_trait]
impl ApiTransport for RestApiClient {
    async fn fetch_page(
        &self,
        collection: CollectionKind,
        page: u32,
        limit: u32,
        extra: &[(String, String)],
    ) -> ApiResult<Value> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        query.extend_from_slice(extra);

        let url = self.collection_url(collection, &query)?;
        self.http.get_json(&url).await
    }

    async fn create(
        &self,
        collection: CollectionKind,
        payload: Value,
        extra: &[(String, String)],
    ) -> ApiResult<Value> {
        let url = self.collection_url(collection, extra)?;
        self.http.post_json(&url, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClientConfig;

    #[test]
    fn collection_urls_carry_page_and_extra_params() {
        let http = HttpClient::new(HttpClientConfig::default()).unwrap();
        let client = RestApiClient::new(Url::parse("https://api.example.com/v1/").unwrap(), http);

        let url = client
            .collection_url(
                CollectionKind::Products,
                &[
                    ("page".to_string(), "2".to_string()),
                    ("limit".to_string(), "100".to_string()),
                    ("includeBrand".to_string(), "true".to_string()),
                ],
            )
            .unwrap();

        assert_eq!(url.path(), "/v1/products");
        assert_eq!(
            url.query(),
            Some("page=2&limit=100&includeBrand=true")
        );
    }
}

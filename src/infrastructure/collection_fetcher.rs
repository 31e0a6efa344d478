//! Paginated collection fetcher.
//!
//! Pulls one logical remote collection across all of its pages and returns a
//! single flat list of raw records, whatever envelope shape each page
//! arrived in.
//!
//! Page 1 is the critical request: it carries the page count, so it is
//! retried through rate-limit responses with strictly doubling backoff.
//! Later pages are fetched in bounded concurrent batches and degrade to an
//! empty contribution on failure. That lossy policy can under-report counts,
//! but it beats failing a whole reconciliation pass for one bad page.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::catalog::CollectionKind;
use crate::infrastructure::api_client::ApiTransport;
use crate::infrastructure::api_error::ApiResult;
use crate::infrastructure::parsing::envelope::{extract_items, extract_total_pages};

/// Fetcher tuning. The defaults are the production contract; tests shrink
/// the delays.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FetcherConfig {
    /// Fixed page size requested from the API.
    pub page_size: u32,
    /// Retry budget for the first page, on rate-limit responses only.
    pub first_page_max_retries: u32,
    /// Backoff before the first retry; doubles on every subsequent retry,
    /// no jitter.
    pub retry_initial_delay_ms: u64,
    /// How many page requests may be in flight at once.
    pub page_batch_size: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            first_page_max_retries: 5,
            retry_initial_delay_ms: 3_000,
            page_batch_size: 5,
        }
    }
}

/// Fetches one remote collection across all its pages.
pub struct CollectionFetcher {
    api: Arc<dyn ApiTransport>,
    config: FetcherConfig,
}

impl CollectionFetcher {
    pub fn new(api: Arc<dyn ApiTransport>, config: FetcherConfig) -> Self {
        Self { api, config }
    }

    /// Fetch every page of `collection` and concatenate the contributions in
    /// page order.
    ///
    /// Fails only if page 1 is unobtainable after the retry budget; later
    /// page failures contribute empty lists.
    pub async fn fetch_all(
        &self,
        collection: CollectionKind,
        extra: &[(String, String)],
    ) -> ApiResult<Vec<Value>> {
        let first_page = self.fetch_first_page(collection, extra).await?;

        let mut items = extract_items(collection, &first_page);
        let total_pages = extract_total_pages(&first_page).unwrap_or(1);
        debug!(
            %collection,
            total_pages,
            first_page_items = items.len(),
            "first page fetched"
        );

        if total_pages > 1 {
            let remaining: Vec<u32> = (2..=total_pages).collect();
            for batch in remaining.chunks(self.config.page_batch_size) {
                let mut tasks = Vec::with_capacity(batch.len());
                for &page in batch {
                    let api = Arc::clone(&self.api);
                    let extra = extra.to_vec();
                    let page_size = self.config.page_size;
                    tasks.push(tokio::spawn(async move {
                        match api.fetch_page(collection, page, page_size, &extra).await {
                            Ok(body) => extract_items(collection, &body),
                            Err(e) => {
                                warn!(%collection, page, error = %e, "page fetch failed, contributing nothing");
                                Vec::new()
                            }
                        }
                    }));
                }

                // join_all keeps task order, so contributions stay in page order.
                for (offset, joined) in join_all(tasks).await.into_iter().enumerate() {
                    match joined {
                        Ok(mut page_items) => items.append(&mut page_items),
                        Err(e) => {
                            warn!(%collection, page = batch[offset], error = %e, "page task join failed");
                        }
                    }
                }
            }
        }

        info!(%collection, total = items.len(), total_pages, "collection fetch complete");
        Ok(items)
    }

    /// First-page fetch with the rate-limit retry budget. Non-rate-limit
    /// failures propagate immediately.
    async fn fetch_first_page(
        &self,
        collection: CollectionKind,
        extra: &[(String, String)],
    ) -> ApiResult<Value> {
        let max_retries = self.config.first_page_max_retries;
        let mut attempt: u32 = 0;

        loop {
            match self
                .api
                .fetch_page(collection, 1, self.config.page_size, extra)
                .await
            {
                Ok(body) => return Ok(body),
                Err(e) if e.is_rate_limited() && attempt < max_retries => {
                    let delay =
                        Duration::from_millis(self.config.retry_initial_delay_ms << attempt);
                    warn!(
                        %collection,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited on first page, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

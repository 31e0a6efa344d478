//! Use-case facade the explorer UI drives.
//!
//! Owns the full reconciliation pass (fetch all three collections →
//! normalize → resolve brands → replace the store), the lazy per-category
//! product load, the interactive creates with incremental append, and the
//! debounced full reload that follows bulk imports.
//!
//! Full reloads over a couple thousand products are slow; the interactive
//! path therefore never re-fetches. Only bulk operations schedule a reload,
//! and a burst of them coalesces into one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::application::catalog_store::CatalogStore;
use crate::domain::catalog::{Brand, Category, CollectionKind, Product};
use crate::domain::events::CatalogEvent;
use crate::infrastructure::api_client::{ApiTransport, RestApiClient};
use crate::infrastructure::api_error::ApiError;
use crate::infrastructure::collection_fetcher::{CollectionFetcher, FetcherConfig};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::envelope::extract_created_entity;
use crate::infrastructure::parsing::normalize::{
    normalize_brand, normalize_category, normalize_product,
};

/// Query parameters the product list is always fetched with: the tree needs
/// brand and category references resolved server-side where possible.
fn product_list_params() -> Vec<(String, String)> {
    vec![
        ("includeBrand".to_string(), "true".to_string()),
        ("includeCategories".to_string(), "true".to_string()),
    ]
}

/// The catalog engine's surface towards the explorer tree.
#[derive(Clone)]
pub struct CatalogUseCases {
    api: Arc<dyn ApiTransport>,
    fetcher: Arc<CollectionFetcher>,
    store: CatalogStore,
    reload_debounce: Duration,
    loading: Arc<AtomicBool>,
    reload_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CatalogUseCases {
    pub fn new(
        api: Arc<dyn ApiTransport>,
        fetcher_config: FetcherConfig,
        reload_debounce: Duration,
    ) -> Self {
        let fetcher = Arc::new(CollectionFetcher::new(Arc::clone(&api), fetcher_config));
        Self {
            api,
            fetcher,
            store: CatalogStore::new(),
            reload_debounce,
            loading: Arc::new(AtomicBool::new(false)),
            reload_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Production wiring from the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.api.base_url))?;
        let http = HttpClient::new(config.api.client.clone())?;
        let api: Arc<dyn ApiTransport> = Arc::new(RestApiClient::new(base_url, http));

        Ok(Self::new(
            api,
            config.fetcher.clone(),
            Duration::from_millis(config.reload.debounce_ms),
        ))
    }

    /// The store the tree consumer reads and subscribes to.
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub async fn brands(&self) -> Arc<Vec<Brand>> {
        self.store.brands().await
    }

    pub async fn categories(&self) -> Arc<Vec<Category>> {
        self.store.categories().await
    }

    pub async fn products(&self) -> Arc<Vec<Product>> {
        self.store.products().await
    }

    /// Full reconciliation pass.
    ///
    /// Guarded against concurrent re-entry: a call while a pass is in
    /// flight is skipped, so rapid UI events cannot stack duplicate loads.
    /// On any failure the previous store state is left intact.
    pub async fn load_all(&self, show_loading: bool) -> Result<()> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("reconciliation already in flight, skipping load request");
            return Ok(());
        }

        self.store.emit(CatalogEvent::LoadStarted { show_loading });
        let result = self.reconcile().await;
        self.loading.store(false, Ordering::SeqCst);

        if let Err(e) = &result {
            warn!(error = %e, "catalog reconciliation failed, previous state retained");
            self.store.emit(CatalogEvent::LoadFailed {
                message: format!("{e:#}"),
            });
        }

        result
    }

    async fn reconcile(&self) -> Result<()> {
        let pass_id = Uuid::new_v4();
        info!(%pass_id, "starting full catalog reconciliation");

        let products_params = product_list_params();
        let (raw_brands, raw_categories, raw_products) = tokio::try_join!(
            self.fetcher.fetch_all(CollectionKind::Brands, &[]),
            self.fetcher.fetch_all(CollectionKind::Categories, &[]),
            self.fetcher
                .fetch_all(CollectionKind::Products, &products_params),
        )
        .context("collection fetch failed")?;

        let brands: Vec<Brand> = raw_brands.iter().filter_map(normalize_brand).collect();
        let categories: Vec<Category> = raw_categories
            .iter()
            .filter_map(normalize_category)
            .collect();
        let products: Vec<Product> = raw_products
            .iter()
            .filter_map(|raw| normalize_product(raw, &brands))
            .collect();

        info!(
            %pass_id,
            brands = brands.len(),
            categories = categories.len(),
            products = products.len(),
            dropped = (raw_brands.len() + raw_categories.len() + raw_products.len())
                - (brands.len() + categories.len() + products.len()),
            "reconciliation pass complete"
        );

        self.store.replace_all(brands, categories, products).await;
        Ok(())
    }

    /// Fetch and normalize the products of one category for lazy sub-tree
    /// expansion. Does not mutate the store.
    pub async fn load_products_by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        let mut params = product_list_params();
        params.push(("categoryId".to_string(), category_id.to_string()));

        let raw = self
            .fetcher
            .fetch_all(CollectionKind::Products, &params)
            .await
            .with_context(|| format!("failed to load products of category {category_id}"))?;

        let brands = self.store.brands().await;
        Ok(raw
            .iter()
            .filter_map(|record| normalize_product(record, &brands))
            .collect())
    }

    /// Create a brand remotely and append it without a reload.
    pub async fn on_create_brand(
        &self,
        data: Value,
        options: &[(String, String)],
    ) -> Result<Brand> {
        let response = self
            .api
            .create(CollectionKind::Brands, data, options)
            .await
            .context("brand create request failed")?;

        let raw = extract_created_entity(CollectionKind::Brands, &response);
        let brand = normalize_brand(&raw).ok_or(ApiError::MissingCreatedId {
            kind: CollectionKind::Brands,
        })?;

        let _ = self.store.append_brand(brand.clone()).await;
        Ok(brand)
    }

    /// Create a category remotely and append it without a reload.
    pub async fn on_create_category(
        &self,
        data: Value,
        options: &[(String, String)],
    ) -> Result<Category> {
        let response = self
            .api
            .create(CollectionKind::Categories, data, options)
            .await
            .context("category create request failed")?;

        let raw = extract_created_entity(CollectionKind::Categories, &response);
        let category = normalize_category(&raw).ok_or(ApiError::MissingCreatedId {
            kind: CollectionKind::Categories,
        })?;

        let _ = self.store.append_category(category.clone()).await;
        Ok(category)
    }

    /// Create a product remotely and append it without a reload.
    pub async fn on_create_product(
        &self,
        data: Value,
        options: &[(String, String)],
    ) -> Result<Product> {
        let response = self
            .api
            .create(CollectionKind::Products, data, options)
            .await
            .context("product create request failed")?;

        let raw = extract_created_entity(CollectionKind::Products, &response);
        let brands = self.store.brands().await;
        let product = normalize_product(&raw, &brands).ok_or(ApiError::MissingCreatedId {
            kind: CollectionKind::Products,
        })?;

        let _ = self.store.append_product(product.clone()).await;
        Ok(product)
    }

    /// Bulk brand import finished; reconcile once the burst settles.
    pub async fn on_brands_update(&self) {
        self.schedule_full_reload().await;
    }

    /// Bulk category import finished; reconcile once the burst settles.
    pub async fn on_categories_update(&self) {
        self.schedule_full_reload().await;
    }

    /// Bulk product import finished; reconcile once the burst settles.
    pub async fn on_products_update(&self) {
        self.schedule_full_reload().await;
    }

    /// Debounced full reload: the pending timer, if any, is superseded, so
    /// any number of bulk completions inside the window fire one reload.
    async fn schedule_full_reload(&self) {
        let delay = self.reload_debounce;
        let mut timer = self.reload_timer.lock().await;

        if let Some(previous) = timer.take() {
            previous.abort();
        }

        self.store.emit(CatalogEvent::ReloadScheduled {
            delay_ms: delay.as_millis() as u64,
        });

        let engine = self.clone();
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = engine.load_all(false).await {
                warn!(error = %e, "debounced full reload failed");
            }
        }));
    }
}

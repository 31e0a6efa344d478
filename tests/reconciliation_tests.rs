//! End-to-end reconciliation tests: the full load pass, brand resolution,
//! incremental appends after creates, the re-entrancy guard and the
//! debounced reload after bulk imports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use storefront_catalog::infrastructure::api_error::ApiResult;
use storefront_catalog::infrastructure::collection_fetcher::FetcherConfig;
use storefront_catalog::{ApiTransport, CatalogUseCases, CollectionKind, ProductStatus};

/// Transport serving one fixed page per collection plus canned create
/// responses, with per-collection fetch counters and an optional artificial
/// latency to widen race windows.
struct MockApi {
    pages: HashMap<CollectionKind, Value>,
    create_responses: HashMap<CollectionKind, Value>,
    brand_fetches: AtomicU32,
    latency: Option<Duration>,
    failing: AtomicBool,
}

impl MockApi {
    fn new(pages: HashMap<CollectionKind, Value>) -> Self {
        Self {
            pages,
            create_responses: HashMap::new(),
            brand_fetches: AtomicU32::new(0),
            latency: None,
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent fetch fail with a server error.
    fn break_remote(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn with_create_response(mut self, collection: CollectionKind, response: Value) -> Self {
        let _ = self.create_responses.insert(collection, response);
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn brand_fetch_count(&self) -> u32 {
        self.brand_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiTransport for MockApi {
    async fn fetch_page(
        &self,
        collection: CollectionKind,
        _page: u32,
        _limit: u32,
        _extra: &[(String, String)],
    ) -> ApiResult<Value> {
        if collection == CollectionKind::Brands {
            let _ = self.brand_fetches.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(storefront_catalog::ApiError::Status {
                status: 503,
                url: format!("mock://{collection}"),
            });
        }
        Ok(self
            .pages
            .get(&collection)
            .cloned()
            .unwrap_or_else(|| json!([])))
    }

    async fn create(
        &self,
        collection: CollectionKind,
        _payload: Value,
        _extra: &[(String, String)],
    ) -> ApiResult<Value> {
        Ok(self
            .create_responses
            .get(&collection)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

fn engine(api: Arc<MockApi>, debounce: Duration) -> CatalogUseCases {
    CatalogUseCases::new(
        api as Arc<dyn ApiTransport>,
        FetcherConfig {
            retry_initial_delay_ms: 1,
            ..FetcherConfig::default()
        },
        debounce,
    )
}

/// The catalog every scenario starts from: two brands (one with a nested
/// parent category reference), one category, three products exercising all
/// three brand-resolution outcomes.
fn scenario_pages() -> HashMap<CollectionKind, Value> {
    HashMap::from([
        (
            CollectionKind::Brands,
            json!({"brands": [
                {"id": "b1", "name": "PlayStation", "nameAr": ""},
                {"id": "b2", "name": "Acme", "nameAr": "", "parentCategoryId": {"id": "c1"}}
            ]}),
        ),
        (
            CollectionKind::Categories,
            json!({"data": [
                {"id": "c1", "name": "Gaming", "nameAr": ""}
            ]}),
        ),
        (
            CollectionKind::Products,
            json!({"data": [
                {"id": "p1", "name": "PlayStation Plus 12 Month", "price": 60, "isAvailable": true},
                {"id": "p2", "name": "Roadrunner Trap", "price": 199, "brandId": "b2"},
                {"id": "p3", "name": "Generic USB Cable", "price": 5, "brandId": "deleted"}
            ]}),
        ),
    ])
}

#[tokio::test]
async fn full_load_reconciles_brands_categories_and_products() {
    let api = Arc::new(MockApi::new(scenario_pages()));
    let engine = engine(api, Duration::from_millis(500));

    engine.load_all(true).await.unwrap();

    let brands = engine.brands().await;
    let categories = engine.categories().await;
    let products = engine.products().await;

    assert_eq!(brands.len(), 2);
    assert_eq!(categories.len(), 1);
    assert_eq!(products.len(), 3);

    // The nested parent category object flattened to a plain id.
    let acme = brands.iter().find(|b| b.id == "b2").unwrap();
    assert_eq!(acme.parent_category_id.as_deref(), Some("c1"));

    // p1: no brand reference, resolved by the name heuristic.
    assert_eq!(products[0].brand_id.as_deref(), Some("b1"));
    assert_eq!(products[0].status, ProductStatus::Active);
    // p2: valid direct reference, untouched.
    assert_eq!(products[1].brand_id.as_deref(), Some("b2"));
    // p3: unresolvable reference, left without a brand.
    assert_eq!(products[2].brand_id, None);
}

#[tokio::test]
async fn duplicate_ids_across_a_load_keep_the_later_record() {
    let mut pages = scenario_pages();
    let _ = pages.insert(
        CollectionKind::Products,
        json!({"data": [
            {"id": "p1", "name": "Stale Listing", "price": 10},
            {"id": "p2", "name": "Other", "price": 20},
            {"id": "p1", "name": "Fresh Listing", "price": 12}
        ]}),
    );
    let api = Arc::new(MockApi::new(pages));
    let engine = engine(api, Duration::from_millis(500));
    engine.load_all(true).await.unwrap();

    let products = engine.products().await;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, "p1");
    assert_eq!(products[0].name, "Fresh Listing");
}

#[tokio::test]
async fn failed_load_keeps_the_previous_state() {
    let api = Arc::new(MockApi::new(scenario_pages()));
    let remote = Arc::clone(&api);
    let engine = engine(api, Duration::from_millis(500));
    engine.load_all(true).await.unwrap();
    assert_eq!(engine.products().await.len(), 3);

    remote.break_remote();
    assert!(engine.load_all(false).await.is_err());

    // No partial overwrite: the previous reconciled state is fully intact.
    assert_eq!(engine.products().await.len(), 3);
    assert_eq!(engine.brands().await.len(), 2);
    assert_eq!(engine.categories().await.len(), 1);
}

#[tokio::test]
async fn created_category_is_appended_without_a_reload_and_idempotently() {
    let api = Arc::new(
        MockApi::new(scenario_pages()).with_create_response(
            CollectionKind::Categories,
            json!({"category": {"id": "c2", "name": "Consoles", "nameAr": "", "parentId": "c1"}}),
        ),
    );
    let brand_fetches = Arc::clone(&api);
    let engine = engine(api, Duration::from_millis(500));
    engine.load_all(true).await.unwrap();
    let fetches_after_load = brand_fetches.brand_fetch_count();

    let created = engine.on_create_category(json!({"name": "Consoles"}), &[]).await.unwrap();
    assert_eq!(created.id, "c2");
    assert_eq!(created.parent_id.as_deref(), Some("c1"));

    // Same create response again: the append must be a no-op.
    let _ = engine.on_create_category(json!({"name": "Consoles"}), &[]).await.unwrap();

    let categories = engine.categories().await;
    assert_eq!(categories.len(), 2);
    // And crucially, no re-fetch happened on the hot path.
    assert_eq!(brand_fetches.brand_fetch_count(), fetches_after_load);
}

#[tokio::test]
async fn create_without_a_usable_id_fails_loudly() {
    let api = Arc::new(
        MockApi::new(scenario_pages())
            .with_create_response(CollectionKind::Brands, json!({"message": "created"})),
    );
    let engine = engine(api, Duration::from_millis(500));

    let error = engine.on_create_brand(json!({"name": "NoId"}), &[]).await.unwrap_err();
    assert!(error.to_string().contains("without a usable id"));
    assert!(engine.brands().await.is_empty());
}

#[tokio::test]
async fn created_product_resolves_brand_against_the_live_store() {
    let api = Arc::new(
        MockApi::new(scenario_pages()).with_create_response(
            CollectionKind::Products,
            json!({"product": {"id": "p9", "name": "PlayStation Portal", "price": 199}}),
        ),
    );
    let engine = engine(api, Duration::from_millis(500));
    engine.load_all(true).await.unwrap();

    let created = engine.on_create_product(json!({"name": "PlayStation Portal"}), &[]).await.unwrap();
    assert_eq!(created.brand_id.as_deref(), Some("b1"));
    assert_eq!(engine.products().await.len(), 4);
}

#[tokio::test]
async fn load_products_by_category_does_not_mutate_the_store() {
    let api = Arc::new(MockApi::new(scenario_pages()));
    let engine = engine(api, Duration::from_millis(500));
    engine.load_all(true).await.unwrap();

    let lazy = engine.load_products_by_category("c1").await.unwrap();
    assert_eq!(lazy.len(), 3);
    // The lazily loaded list still resolves brands from the store.
    assert_eq!(lazy[0].brand_id.as_deref(), Some("b1"));
    assert_eq!(engine.products().await.len(), 3);
}

#[tokio::test]
async fn concurrent_load_requests_run_a_single_pass() {
    let api = Arc::new(MockApi::new(scenario_pages()).with_latency(Duration::from_millis(50)));
    let counter = Arc::clone(&api);
    let engine = engine(api, Duration::from_millis(500));

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_all(true).await })
    };
    // Give the first load time to take the guard.
    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.load_all(true).await.unwrap(); // skipped, returns immediately
    first.await.unwrap().unwrap();

    assert_eq!(counter.brand_fetch_count(), 1);
}

#[tokio::test]
async fn bulk_import_burst_coalesces_into_one_debounced_reload() {
    let api = Arc::new(MockApi::new(scenario_pages()));
    let counter = Arc::clone(&api);
    let engine = engine(api, Duration::from_millis(40));

    engine.on_categories_update().await;
    engine.on_brands_update().await;
    engine.on_products_update().await;

    // Before the debounce window elapses nothing has fired.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(counter.brand_fetch_count(), 0);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(counter.brand_fetch_count(), 1);
    assert_eq!(engine.products().await.len(), 3);
}

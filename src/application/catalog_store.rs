//! Shared catalog state for the explorer tree.
//!
//! The three collections live behind one `RwLock` as `Arc`'d lists. Every
//! mutation builds a fresh list and swaps it in wholesale, so a consumer
//! that grabbed a list `Arc` before a mutation keeps reading a consistent
//! snapshot: copy-on-write instead of locking around the renderer.
//!
//! The collections only reference each other by string id, which is what
//! lets `replace_all` and the incremental appends swap one list without
//! touching the other two.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::domain::catalog::{Brand, Category, CollectionKind, Identified, Product};
use crate::domain::events::CatalogEvent;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default)]
struct CatalogLists {
    brands: Arc<Vec<Brand>>,
    categories: Arc<Vec<Category>>,
    products: Arc<Vec<Product>>,
    last_reconciled_at: Option<DateTime<Utc>>,
}

/// The reconciled in-memory catalog.
#[derive(Clone)]
pub struct CatalogStore {
    lists: Arc<RwLock<CatalogLists>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            lists: Arc::new(RwLock::new(CatalogLists::default())),
            events,
        }
    }

    /// Subscribe to store events. The tree consumer re-renders on these
    /// instead of polling.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn brands(&self) -> Arc<Vec<Brand>> {
        Arc::clone(&self.lists.read().await.brands)
    }

    pub async fn categories(&self) -> Arc<Vec<Category>> {
        Arc::clone(&self.lists.read().await.categories)
    }

    pub async fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.lists.read().await.products)
    }

    /// When the last successful full reconciliation replaced the store.
    pub async fn last_reconciled_at(&self) -> Option<DateTime<Utc>> {
        self.lists.read().await.last_reconciled_at
    }

    /// Atomic full replacement after a reconciliation pass. Each list is
    /// deduplicated by id, keeping the value of the last occurrence: a later
    /// page or a freshly-created entity supersedes an earlier stale record.
    pub async fn replace_all(
        &self,
        brands: Vec<Brand>,
        categories: Vec<Category>,
        products: Vec<Product>,
    ) {
        let snapshot = CatalogLists {
            brands: Arc::new(dedup_last_wins(brands)),
            categories: Arc::new(dedup_last_wins(categories)),
            products: Arc::new(dedup_last_wins(products)),
            last_reconciled_at: Some(Utc::now()),
        };

        let event = CatalogEvent::LoadCompleted {
            brands: snapshot.brands.len(),
            categories: snapshot.categories.len(),
            products: snapshot.products.len(),
            completed_at: snapshot.last_reconciled_at.unwrap_or_else(Utc::now),
        };

        *self.lists.write().await = snapshot;
        self.emit(event);
    }

    /// Append one brand unless its id is already present. Returns whether
    /// the list changed.
    pub async fn append_brand(&self, brand: Brand) -> bool {
        let mut lists = self.lists.write().await;
        let Some(next) = append_unique(&lists.brands, brand.clone()) else {
            debug!(id = %brand.id, "brand already present, append skipped");
            return false;
        };
        lists.brands = next;
        drop(lists);
        self.emit(CatalogEvent::EntityAppended {
            collection: CollectionKind::Brands,
            id: brand.id,
        });
        true
    }

    /// Append one category unless its id is already present.
    pub async fn append_category(&self, category: Category) -> bool {
        let mut lists = self.lists.write().await;
        let Some(next) = append_unique(&lists.categories, category.clone()) else {
            debug!(id = %category.id, "category already present, append skipped");
            return false;
        };
        lists.categories = next;
        drop(lists);
        self.emit(CatalogEvent::EntityAppended {
            collection: CollectionKind::Categories,
            id: category.id,
        });
        true
    }

    /// Append one product unless its id is already present.
    pub async fn append_product(&self, product: Product) -> bool {
        let mut lists = self.lists.write().await;
        let Some(next) = append_unique(&lists.products, product.clone()) else {
            debug!(id = %product.id, "product already present, append skipped");
            return false;
        };
        lists.products = next;
        drop(lists);
        self.emit(CatalogEvent::EntityAppended {
            collection: CollectionKind::Products,
            id: product.id,
        });
        true
    }

    /// Emit a store event; nobody listening is fine.
    pub(crate) fn emit(&self, event: CatalogEvent) {
        let _ = self.events.send(event);
    }
}

/// Deduplicate by id: the value of the *last* occurrence wins, at the
/// position of the first (list-building order).
fn dedup_last_wins<T: Identified>(items: Vec<T>) -> Vec<T> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut out: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match index.entry(item.entity_id().to_string()) {
            Entry::Occupied(slot) => out[*slot.get()] = item,
            Entry::Vacant(slot) => {
                let _ = slot.insert(out.len());
                out.push(item);
            }
        }
    }

    out
}

/// New list with `item` appended, or `None` when the id already exists.
fn append_unique<T: Identified + Clone>(list: &Arc<Vec<T>>, item: T) -> Option<Arc<Vec<T>>> {
    if list.iter().any(|existing| existing.entity_id() == item.entity_id()) {
        return None;
    }

    let mut next = Vec::with_capacity(list.len() + 1);
    next.extend(list.iter().cloned());
    next.push(item);
    Some(Arc::new(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            name_ar: String::new(),
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn replace_all_dedups_keeping_the_later_record() {
        let store = CatalogStore::new();
        store
            .replace_all(
                Vec::new(),
                vec![
                    category("c1", "stale"),
                    category("c2", "other"),
                    category("c1", "fresh"),
                ],
                Vec::new(),
            )
            .await;

        let categories = store.categories().await;
        assert_eq!(categories.len(), 2);
        // Position of first occurrence, value of the last.
        assert_eq!(categories[0].id, "c1");
        assert_eq!(categories[0].name, "fresh");
        assert_eq!(categories[1].id, "c2");
    }

    #[tokio::test]
    async fn append_category_is_idempotent_by_id() {
        let store = CatalogStore::new();
        assert!(store.append_category(category("c1", "first")).await);
        assert!(!store.append_category(category("c1", "again")).await);

        let categories = store.categories().await;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "first");
    }

    #[tokio::test]
    async fn readers_holding_a_snapshot_never_see_a_partial_update() {
        let store = CatalogStore::new();
        store
            .replace_all(Vec::new(), vec![category("c1", "old")], Vec::new())
            .await;

        let before = store.categories().await;
        store
            .replace_all(
                Vec::new(),
                vec![category("c1", "new"), category("c2", "new")],
                Vec::new(),
            )
            .await;

        // The old snapshot is untouched; the store serves the new one.
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name, "old");
        assert_eq!(store.categories().await.len(), 2);
    }

    #[tokio::test]
    async fn mutations_emit_events() {
        let store = CatalogStore::new();
        let mut events = store.subscribe();

        store.append_category(category("c1", "x")).await;
        match events.recv().await.unwrap() {
            CatalogEvent::EntityAppended { collection, id } => {
                assert_eq!(collection, CollectionKind::Categories);
                assert_eq!(id, "c1");
            }
            other => panic!("unexpected event: {other}"),
        }

        store.replace_all(Vec::new(), Vec::new(), Vec::new()).await;
        assert!(matches!(
            events.recv().await.unwrap(),
            CatalogEvent::LoadCompleted { .. }
        ));
    }
}

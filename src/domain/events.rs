//! Event types for real-time communication between the catalog core and the
//! explorer frontend.
//!
//! The tree consumer subscribes to these instead of polling the store, so a
//! reconciliation pass or an incremental append re-renders exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::domain::catalog::CollectionKind;

/// Events emitted by the catalog store and use-case layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum CatalogEvent {
    /// A full reconciliation pass started. `show_loading` tells the UI
    /// whether to raise its blocking loading indicator.
    #[serde(rename_all = "camelCase")]
    LoadStarted { show_loading: bool },

    /// A full reconciliation pass replaced the store.
    #[serde(rename_all = "camelCase")]
    LoadCompleted {
        brands: usize,
        categories: usize,
        products: usize,
        completed_at: DateTime<Utc>,
    },

    /// A full reconciliation pass failed; the previous store state is intact.
    #[serde(rename_all = "camelCase")]
    LoadFailed { message: String },

    /// A freshly created entity was appended without a reload.
    #[serde(rename_all = "camelCase")]
    EntityAppended { collection: CollectionKind, id: String },

    /// A bulk operation requested a debounced full reload.
    #[serde(rename_all = "camelCase")]
    ReloadScheduled { delay_ms: u64 },
}

impl std::fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadStarted { show_loading } => {
                write!(f, "load started (show_loading={show_loading})")
            }
            Self::LoadCompleted {
                brands,
                categories,
                products,
                ..
            } => write!(
                f,
                "load completed: {brands} brands, {categories} categories, {products} products"
            ),
            Self::LoadFailed { message } => write!(f, "load failed: {message}"),
            Self::EntityAppended { collection, id } => {
                write!(f, "appended {id} to {collection}")
            }
            Self::ReloadScheduled { delay_ms } => {
                write!(f, "full reload scheduled in {delay_ms}ms")
            }
        }
    }
}

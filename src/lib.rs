//! Storefront Catalog - In-memory catalog reconciliation engine
//!
//! This crate assembles a consistent, deduplicated, cross-referenced catalog
//! of brands, categories and products from three independently paginated,
//! inconsistently-shaped, rate-limited REST collections, and keeps it
//! responsive during bulk import without re-fetching everything after every
//! write. It is the data layer behind the storefront admin's explorer tree.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the explorer-facing surface for easier access
pub use application::{CatalogStore, CatalogUseCases};
pub use domain::{
    Brand, CatalogEvent, Category, CollectionKind, Product, ProductCategoryRef, ProductStatus,
};
pub use infrastructure::{
    ApiError, ApiTransport, AppConfig, ConfigManager, FetcherConfig, RestApiClient,
};

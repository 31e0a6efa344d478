//! Domain module - Core business logic and entities
//!
//! This module contains the catalog entities, the frontend event types and
//! the brand-resolution service that represent the core business logic.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod brand_resolver;
pub mod catalog;
pub mod events;

// Re-export commonly used items for convenience
pub use brand_resolver::{match_brand_by_name, resolve_brand_id};
pub use catalog::{
    Brand, Category, CollectionKind, Identified, Product, ProductCategoryRef, ProductStatus,
};
pub use events::CatalogEvent;

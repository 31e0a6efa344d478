//! Tolerant response parsing and record normalization.
//!
//! The storefront API's envelope shape is not fixed per endpoint and its
//! records accumulated several field-name generations, so parsing is split
//! into two pure layers: envelope extraction (which list / entity is inside
//! this response?) and record normalization (coerce one raw record into a
//! catalog entity).

pub mod envelope;
pub mod normalize;

// Re-export public types
pub use envelope::{extract_created_entity, extract_items, extract_total_pages};
pub use normalize::{normalize_brand, normalize_category, normalize_product};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A brand as exposed to the explorer tree.
///
/// `parent_category_id` is already flattened to a plain id by the normalizer;
/// the raw API may ship it as a bare string, a nested object or a legacy
/// field-name alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<String>,
}

/// A category node. Forms a tree via `parent_id`; a parent id that does not
/// exist in the current set simply makes this node a root, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Product lifecycle status. `ACTIVE` is derived from availability during
/// normalization; `ARCHIVED` only ever arrives through admin tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "ARCHIVED")]
    Archived,
}

/// A single category membership on a product. The id is optional because the
/// raw association may not carry a resolvable category reference; the entry is
/// kept so counts stay faithful to the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductCategoryRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// A product as exposed to the explorer tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    pub categories: Vec<ProductCategoryRef>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub stock: i64,
    pub status: ProductStatus,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub is_available: bool,
    pub is_published: bool,
}

impl Product {
    /// Status derivation rule: available products are live, everything else
    /// stays in draft until an admin decides otherwise.
    pub fn derive_status(is_available: bool) -> ProductStatus {
        if is_available {
            ProductStatus::Active
        } else {
            ProductStatus::Draft
        }
    }
}

/// One of the three independently paginated remote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CollectionKind {
    Brands,
    Categories,
    Products,
}

impl CollectionKind {
    /// REST path segment of the collection.
    pub fn path(self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Categories => "categories",
            Self::Products => "products",
        }
    }

    /// Collection-specific envelope field some API versions wrap the item
    /// list in (`{ "products": [...] }`).
    pub fn items_field(self) -> &'static str {
        self.path()
    }

    /// Envelope field a create response may wrap the created entity in
    /// (`{ "category": {...} }`).
    pub fn created_field(self) -> &'static str {
        match self {
            Self::Brands => "brand",
            Self::Categories => "category",
            Self::Products => "product",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Anything stored in the catalog under a string identity.
pub trait Identified {
    fn entity_id(&self) -> &str;
}

impl Identified for Brand {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

impl Identified for Category {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

impl Identified for Product {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

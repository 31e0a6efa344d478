//! Normalization of heterogeneous raw records into catalog entities.
//!
//! Pure and synchronous: one raw `serde_json::Value` in, one entity out.
//! Records that cannot produce a non-empty id are dropped by returning
//! `None`; nothing is ever inserted under a missing identity.
//!
//! The raw shapes are inconsistent across API versions and import paths, so
//! every foreign key is flattened through a fixed-priority alias list, and
//! numeric fields are coerced from the strings a spreadsheet import leaves
//! behind.

use serde_json::Value;

use crate::domain::brand_resolver::resolve_brand_id;
use crate::domain::catalog::{Brand, Category, Product, ProductCategoryRef};

/// Priority-ordered aliases for a brand's parent category reference.
const PARENT_CATEGORY_ALIASES: &[&str] = &[
    "parentCategoryId",
    "ParentCategoryID",
    "parent_category_id",
    "parentCategory",
    "category",
];

/// Priority-ordered aliases for a category's parent reference.
const PARENT_ALIASES: &[&str] = &["parentId", "ParentID", "parent_id", "parent"];

/// Priority-ordered aliases for a product's brand reference.
const BRAND_ALIASES: &[&str] = &["brandId", "BrandID", "brand_id", "brand"];

/// Priority-ordered aliases for a category association on a product.
const CATEGORY_REF_ALIASES: &[&str] = &["categoryId", "CategoryID", "category_id", "category"];

/// Coerce a value that *is* an identifier: strings are trimmed, numbers are
/// stringified, everything else (and the empty string) is rejected.
pub(crate) fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The record's own identity: `id`, falling back to the legacy `_id`.
pub(crate) fn record_id(raw: &Value) -> Option<String> {
    raw.get("id")
        .and_then(coerce_id)
        .or_else(|| raw.get("_id").and_then(coerce_id))
}

/// Flatten a foreign-key field that may arrive as a bare id, a nested object
/// carrying `id`/`_id`, or under one of several historical aliases. Aliases
/// are checked in the given order; the first that yields an id wins.
pub(crate) fn flatten_reference(raw: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        let field = raw.get(alias)?;
        match field {
            Value::Object(_) => record_id(field),
            other => coerce_id(other),
        }
    })
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn display_name(raw: &Value) -> String {
    coerce_string(raw.get("name")).unwrap_or_default()
}

fn localized_name(raw: &Value) -> String {
    coerce_string(raw.get("nameAr"))
        .or_else(|| coerce_string(raw.get("name_ar")))
        .unwrap_or_default()
}

/// Normalize one raw brand record. `None` when no id can be coerced.
pub fn normalize_brand(raw: &Value) -> Option<Brand> {
    let id = record_id(raw)?;
    Some(Brand {
        id,
        name: display_name(raw),
        name_ar: localized_name(raw),
        code: coerce_string(raw.get("code")),
        logo: coerce_string(raw.get("logo")),
        parent_category_id: flatten_reference(raw, PARENT_CATEGORY_ALIASES),
    })
}

/// Normalize one raw category record. `None` when no id can be coerced.
pub fn normalize_category(raw: &Value) -> Option<Category> {
    let id = record_id(raw)?;
    Some(Category {
        id,
        name: display_name(raw),
        name_ar: localized_name(raw),
        parent_id: flatten_reference(raw, PARENT_ALIASES),
    })
}

/// Normalize one raw product record against the known brand set. `None` when
/// no id can be coerced. A brand reference that does not resolve leaves
/// `brand_id` unset; that is a documented miss, not an error.
pub fn normalize_product(raw: &Value, brands: &[Brand]) -> Option<Product> {
    let id = record_id(raw)?;
    let name = display_name(raw);

    let candidate = flatten_reference(raw, BRAND_ALIASES);
    let brand_id = resolve_brand_id(candidate.as_deref(), &name, brands);

    let is_available = coerce_bool(raw.get("isAvailable"))
        .or_else(|| coerce_bool(raw.get("is_available")))
        .unwrap_or(false);
    let is_published = coerce_bool(raw.get("isPublished"))
        .or_else(|| coerce_bool(raw.get("is_published")))
        .unwrap_or(false);

    Some(Product {
        id,
        name_ar: localized_name(raw),
        brand_id,
        categories: category_refs(raw),
        price: coerce_f64(raw.get("price")).unwrap_or(0.0),
        cost: product_cost(raw),
        sku: coerce_string(raw.get("sku")),
        barcode: coerce_string(raw.get("barcode")),
        stock: coerce_i64(raw.get("stock")).unwrap_or(0),
        status: Product::derive_status(is_available),
        images: image_urls(raw),
        featured: coerce_bool(raw.get("featured")),
        path: coerce_string(raw.get("path")),
        is_available,
        is_published,
        name,
    })
}

/// Flatten the multi-category association list. Each entry may be a bare id
/// or an object in any of the aliased shapes; entries that carry no
/// resolvable id keep a `None` reference so the association count survives.
fn category_refs(raw: &Value) -> Vec<ProductCategoryRef> {
    let Some(entries) = raw.get("categories").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            let category_id = match entry {
                Value::Object(_) => {
                    flatten_reference(entry, CATEGORY_REF_ALIASES).or_else(|| record_id(entry))
                }
                other => coerce_id(other),
            };
            ProductCategoryRef { category_id }
        })
        .collect()
}

/// Cost, falling back to a nested variant's cost when the record itself has
/// none (the shape older imports used).
fn product_cost(raw: &Value) -> Option<f64> {
    coerce_f64(raw.get("cost"))
        .or_else(|| coerce_f64(raw.get("variant").and_then(|v| v.get("cost"))))
        .or_else(|| {
            coerce_f64(
                raw.get("variants")
                    .and_then(Value::as_array)
                    .and_then(|v| v.first())
                    .and_then(|v| v.get("cost")),
            )
        })
}

fn image_urls(raw: &Value) -> Vec<String> {
    let Some(entries) = raw.get("images").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(_) => {
                coerce_string(entry.get("url")).or_else(|| coerce_string(entry.get("src")))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ProductStatus;
    use serde_json::json;

    #[test]
    fn id_coercion_trims_stringifies_and_rejects() {
        assert_eq!(record_id(&json!({"id": "  b1  "})).as_deref(), Some("b1"));
        assert_eq!(record_id(&json!({"_id": 42})).as_deref(), Some("42"));
        assert_eq!(record_id(&json!({"id": "   "})), None);
        assert_eq!(record_id(&json!({"name": "no id"})), None);
        // `id` wins over `_id` when both are present.
        assert_eq!(
            record_id(&json!({"id": "new", "_id": "legacy"})).as_deref(),
            Some("new")
        );
    }

    #[test]
    fn brand_parent_category_flattens_from_every_shape() {
        let nested = json!({"id": "b1", "name": "Acme", "parentCategory": {"id": "c1"}});
        assert_eq!(
            normalize_brand(&nested).unwrap().parent_category_id.as_deref(),
            Some("c1")
        );

        let legacy = json!({"id": "b1", "name": "Acme", "ParentCategoryID": "c2"});
        assert_eq!(
            normalize_brand(&legacy).unwrap().parent_category_id.as_deref(),
            Some("c2")
        );

        let snake = json!({"id": "b1", "name": "Acme", "parent_category_id": 7});
        assert_eq!(
            normalize_brand(&snake).unwrap().parent_category_id.as_deref(),
            Some("7")
        );

        let none = json!({"id": "b1", "name": "Acme"});
        assert_eq!(normalize_brand(&none).unwrap().parent_category_id, None);
    }

    #[test]
    fn alias_priority_is_fixed() {
        // Camel-case id beats the nested object when both are present.
        let raw = json!({
            "id": "b1",
            "parentCategoryId": "c-direct",
            "parentCategory": {"id": "c-nested"}
        });
        assert_eq!(
            normalize_brand(&raw).unwrap().parent_category_id.as_deref(),
            Some("c-direct")
        );
    }

    #[test]
    fn category_tolerates_dangling_parent() {
        let raw = json!({"id": "c2", "name": "Shoes", "parentId": "missing-root"});
        let category = normalize_category(&raw).unwrap();
        assert_eq!(category.parent_id.as_deref(), Some("missing-root"));
    }

    #[test]
    fn product_numeric_coercion_from_strings() {
        let brands = Vec::new();
        let raw = json!({
            "id": "p1",
            "name": "Sneaker",
            "price": "149.50",
            "stock": "12",
            "isAvailable": true
        });
        let product = normalize_product(&raw, &brands).unwrap();
        assert!((product.price - 149.50).abs() < f64::EPSILON);
        assert_eq!(product.stock, 12);
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[test]
    fn absent_cost_falls_back_to_variant_cost() {
        let brands = Vec::new();
        let raw = json!({
            "id": "p1",
            "name": "Sneaker",
            "price": 100,
            "variants": [{"cost": "40.5"}]
        });
        let product = normalize_product(&raw, &brands).unwrap();
        assert_eq!(product.cost, Some(40.5));
    }

    #[test]
    fn category_associations_flatten_nested_shapes() {
        let brands = Vec::new();
        let raw = json!({
            "id": "p1",
            "name": "Sneaker",
            "price": 1,
            "categories": [
                {"categoryId": "c1"},
                {"category": {"_id": "c2"}},
                "c3",
                {"note": "no id here"}
            ]
        });
        let product = normalize_product(&raw, &brands).unwrap();
        let ids: Vec<Option<&str>> = product
            .categories
            .iter()
            .map(|c| c.category_id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("c1"), Some("c2"), Some("c3"), None]);
    }

    #[test]
    fn unavailable_product_normalizes_to_draft() {
        let brands = Vec::new();
        let raw = json!({"id": "p1", "name": "Sneaker", "price": 1, "isAvailable": false});
        let product = normalize_product(&raw, &brands).unwrap();
        assert_eq!(product.status, ProductStatus::Draft);
        // Missing availability is treated the same way.
        let raw = json!({"id": "p2", "name": "Sneaker", "price": 1});
        assert_eq!(
            normalize_product(&raw, &brands).unwrap().status,
            ProductStatus::Draft
        );
    }

    #[test]
    fn invalid_brand_reference_falls_back_to_name_heuristic() {
        let brands = vec![Brand {
            id: "b1".into(),
            name: "PlayStation".into(),
            name_ar: String::new(),
            code: None,
            logo: None,
            parent_category_id: None,
        }];
        let raw = json!({
            "id": "p1",
            "name": "PlayStation Plus 12 Month",
            "price": 60,
            "brandId": "deleted-brand"
        });
        let product = normalize_product(&raw, &brands).unwrap();
        assert_eq!(product.brand_id.as_deref(), Some("b1"));
    }

    #[test]
    fn image_list_flattens_strings_and_objects() {
        let brands = Vec::new();
        let raw = json!({
            "id": "p1",
            "name": "Sneaker",
            "price": 1,
            "images": ["https://cdn/a.jpg", {"url": "https://cdn/b.jpg"}, {"broken": true}]
        });
        let product = normalize_product(&raw, &brands).unwrap();
        assert_eq!(product.images, vec!["https://cdn/a.jpg", "https://cdn/b.jpg"]);
    }
}

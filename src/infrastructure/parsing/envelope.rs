//! Tolerant extraction of payloads from the storefront API's response
//! envelopes.
//!
//! The API does not commit to one envelope shape per endpoint: a list may
//! arrive bare, under `data`, under a collection-specific field, or under
//! whatever single list-valued field an older deployment used. Extraction is
//! an ordered chain of strategies; the first one that produces a list wins.

use serde_json::Value;

use crate::domain::catalog::CollectionKind;

type ListStrategy = fn(CollectionKind, &Value) -> Option<Vec<Value>>;

/// Strategy order is part of the contract: a `data` field beats the
/// collection-specific field, which beats positional guessing.
const LIST_STRATEGIES: &[ListStrategy] = &[
    bare_list,
    data_field_list,
    collection_field_list,
    first_list_valued_field,
];

/// Extract the item list from one page response. A response with no
/// list-valued field anywhere contributes an empty list rather than an error.
pub fn extract_items(kind: CollectionKind, body: &Value) -> Vec<Value> {
    LIST_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(kind, body))
        .unwrap_or_default()
}

fn bare_list(_kind: CollectionKind, body: &Value) -> Option<Vec<Value>> {
    body.as_array().cloned()
}

fn data_field_list(_kind: CollectionKind, body: &Value) -> Option<Vec<Value>> {
    body.get("data")?.as_array().cloned()
}

fn collection_field_list(kind: CollectionKind, body: &Value) -> Option<Vec<Value>> {
    body.get(kind.items_field())?.as_array().cloned()
}

fn first_list_valued_field(_kind: CollectionKind, body: &Value) -> Option<Vec<Value>> {
    body.as_object()?
        .values()
        .find_map(|value| value.as_array().cloned())
}

/// Total page count declared by the response metadata, if any. Checked under
/// `meta` first, then at the top level, accepting numbers and numeric
/// strings.
pub fn extract_total_pages(body: &Value) -> Option<u32> {
    let candidates = [
        body.get("meta").and_then(|m| m.get("totalPages")),
        body.get("meta").and_then(|m| m.get("total_pages")),
        body.get("totalPages"),
        body.get("total_pages"),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::Number(n) => n.as_u64().map(|n| n as u32),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        })
}

/// Unwrap the entity out of a create response. Create endpoints return either
/// the entity itself or an envelope carrying it under the singular collection
/// name or `data`.
pub fn extract_created_entity(kind: CollectionKind, body: &Value) -> Value {
    for field in [kind.created_field(), "data"] {
        if let Some(entity) = body.get(field) {
            if entity.is_object() {
                return entity.clone();
            }
        }
    }
    body.clone()
}

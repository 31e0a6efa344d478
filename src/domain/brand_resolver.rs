//! Brand resolution for products that arrive without a usable brand reference.
//!
//! Two phases, the first always preferred:
//! 1. a direct reference (already flattened from the raw record's alias
//!    shapes) validated against the known brand set by canonical id or code;
//! 2. a name heuristic that looks for a known brand's name embedded in the
//!    product's display name. Spreadsheet imports routinely ship
//!    "PlayStation Plus 12 Month" with no structured brand id at all.
//!
//! A resolution miss is not an error; the product simply keeps no brand.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::catalog::Brand;

/// Names at or below this length are never matched by substring; short brand
/// codes ("PS", "LG") would otherwise match half the catalog.
const MIN_NAME_MATCH_LEN: usize = 3;

/// Strips everything outside lowercase latin, digits and the Arabic letter
/// block, so "Play-Station!" and "PlayStation" compare equal.
static NON_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\x{0600}-\x{06FF}]").expect("static pattern"));

/// Resolve the brand for a product.
///
/// `candidate` is the directly referenced brand id, if the raw record carried
/// one in any of its historical shapes. Returns the canonical id of the
/// matched brand.
pub fn resolve_brand_id(
    candidate: Option<&str>,
    product_name: &str,
    brands: &[Brand],
) -> Option<String> {
    if let Some(reference) = candidate {
        if let Some(brand) = brands
            .iter()
            .find(|b| b.id == reference || b.code.as_deref() == Some(reference))
        {
            return Some(brand.id.clone());
        }
    }

    match_brand_by_name(product_name, brands)
}

/// Substring heuristic, isolated so it can be swapped without touching the
/// resolution call sites.
///
/// Iterates brands in list order and returns the first whose normalized name
/// or localized name occurs inside the normalized product name. When several
/// brand names are embedded in one title the earliest brand in the list wins;
/// that tie-break is inherited behavior, not a ranking.
pub fn match_brand_by_name(product_name: &str, brands: &[Brand]) -> Option<String> {
    let haystack = normalize_name(product_name);
    if haystack.is_empty() {
        return None;
    }

    for brand in brands {
        for name in [brand.name.as_str(), brand.name_ar.as_str()] {
            let needle = normalize_name(name);
            if needle.chars().count() > MIN_NAME_MATCH_LEN && haystack.contains(&needle) {
                debug!(
                    brand_id = %brand.id,
                    brand_name = %name,
                    product_name,
                    "brand resolved by name heuristic"
                );
                return Some(brand.id.clone());
            }
        }
    }

    None
}

fn normalize_name(name: &str) -> String {
    NON_NAME_CHARS
        .replace_all(&name.to_lowercase(), "")
        .into_owned()
}

//! Display metadata resolution for products and variations.
//!
//! ## Fallback chains
//!
//! Titles, descriptions and thumbnails are resolved from several sources in
//! priority order; the first non-empty value wins:
//!
//! - **Product title**: product title → product name
//! - **Variation title**: variation title → variation name
//! - **Parameter value**: selected value title → custom value
//!
//! ## Custom parameters
//!
//! Products carry a free-text block of extra parameters, one per line:
//!
//! ```text
//! Warranty: 5 years
//! Assembly: required
//! ```
//!
//! Lines that do not match `key: value` (missing colon, empty key or empty
//! value) are dropped without a warning.

use serde::{Deserialize, Serialize};

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title:     resolve(&[Some(&product.title), Some(&product.name)])
/// parameter: resolve(&[value_title, Some(&parameter.custom_value)])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// A `key: value` pair from the custom parameter block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Parse custom parameters, keeping line order.
pub fn parse_custom_parameters(text: &str) -> Vec<KeyValue> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(KeyValue {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

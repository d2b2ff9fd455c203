//! Facet aggregation into category files.
//!
//! Every product exported under a category contributes filterable options to
//! that category's [`CategoryFile`]. Sources are scanned in fixed order:
//!
//! 1. filterable product parameters: their selected value
//! 2. filterable product properties: every enabled price's value
//! 3. filterable properties of explicit variations: same rule
//!
//! Sources 1 and 2 produce [`FacetKind::Products`] facets, source 3
//! [`FacetKind::Variation`]. Facets are keyed by option id; an option that
//! is filterable at both levels is a `Products` facet, whichever product
//! contributed it first. Values are keyed by value id; the first
//! occurrence wins and later duplicates are dropped, thumbnails included.
//!
//! After each merge the facet list is sorted by kind, then title, then id,
//! so the final order does not depend on the order products were merged in.
//!
//! The same pass widens the category's price, dimension and weight ranges
//! with the product's purchasable variations (see [`priced_variants`]).

use crate::content::{CategoryFile, FacetKind, FacetOption, FacetValue};
use crate::metadata::resolve;
use crate::model::{CatalogOption, Dimensions, Pricing, Product, Value};
use crate::render::RenderReport;
use chrono::{DateTime, Utc};

/// Resolves the thumbnail string of a facet value.
pub trait ValueThumbnails {
    fn resolve(&mut self, value: &Value, report: &mut RenderReport) -> String;
}

/// Pricing and dimensions of what a customer can actually buy: the explicit
/// variations when there are any, otherwise the product itself.
pub fn priced_variants(product: &Product) -> Vec<(&Pricing, &Dimensions)> {
    if product.variations.is_empty() {
        vec![(&product.pricing, &product.dimensions)]
    } else {
        product
            .variations
            .iter()
            .map(|v| (&v.pricing, &v.dimensions))
            .collect()
    }
}

/// Merge `product` into `file`.
pub fn merge_facets(
    file: &mut CategoryFile,
    product: &Product,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
    now: DateTime<Utc>,
) {
    for parameter in product.parameters.iter().filter(|p| p.filterable) {
        if let (Some(option), Some(value)) = (&parameter.option, &parameter.value) {
            add_value(
                &mut file.options,
                FacetKind::Products,
                option,
                value,
                thumbnails,
                report,
            );
        }
    }

    for property in product.properties.iter().filter(|p| p.filterable) {
        for price in property.prices.iter().filter(|p| p.enabled) {
            add_value(
                &mut file.options,
                FacetKind::Products,
                &property.option,
                &price.value,
                thumbnails,
                report,
            );
        }
    }

    for variation in &product.variations {
        for property in variation.properties.iter().filter(|p| p.filterable) {
            for price in property.prices.iter().filter(|p| p.enabled) {
                add_value(
                    &mut file.options,
                    FacetKind::Variation,
                    &property.option,
                    &price.value,
                    thumbnails,
                    report,
                );
            }
        }
    }

    for (pricing, dimensions) in priced_variants(product) {
        file.include_base_price(pricing.base_price);
        file.price.include(Some(pricing.effective(now)));
        file.dimensions.width.include(dimensions.width);
        file.dimensions.height.include(dimensions.height);
        file.dimensions.depth.include(dimensions.depth);
        file.weight.include(dimensions.weight);
    }

    sort_facets(&mut file.options);
}

fn add_value(
    options: &mut Vec<FacetOption>,
    kind: FacetKind,
    option: &CatalogOption,
    value: &Value,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) {
    let index = match options.iter().position(|o| o.id == option.id) {
        Some(index) => index,
        None => {
            options.push(FacetOption {
                id: option.id,
                kind,
                name: option.name.clone(),
                title: resolve(&[Some(option.title.as_str()), Some(option.name.as_str())])
                    .unwrap_or_default(),
                values: Vec::new(),
            });
            options.len() - 1
        }
    };

    let facet = &mut options[index];
    facet.kind = facet.kind.min(kind);
    if facet.values.iter().any(|v| v.id == value.id) {
        return;
    }
    let thumbnail = thumbnails.resolve(value, report);
    facet.values.push(FacetValue {
        id: value.id,
        thumbnail,
        title: resolve(&[Some(value.title.as_str()), Some(value.name.as_str())])
            .unwrap_or_default(),
        value: value.value.clone(),
    });
}

/// Product facets first, then by title; id breaks ties.
pub fn sort_facets(options: &mut [FacetOption]) {
    options.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
}

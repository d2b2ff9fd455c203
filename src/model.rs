//! Catalog entities read from the store.
//!
//! These are plain data carriers. The exporters never mutate them; everything
//! derived (paths, thumbnails, facets) lives in [`content`](crate::content).
//!
//! Prices and dimensions are `f64` the way the store keeps them. Dimensions
//! are optional: a product without a recorded weight has `weight: None`, which
//! is different from a product that weighs `0.0`.

use chrono::{DateTime, Utc};

/// Category node. `parent_id == None` marks a root category.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    /// Slug, used as the output directory name.
    pub name: String,
    pub title: String,
    pub description: String,
    /// Path relative to blob storage.
    pub thumbnail: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group of selectable values (e.g. "body-color").
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogOption {
    pub id: i64,
    pub name: String,
    pub title: String,
    /// Widget hint passed through to the site ("select", "radio", ...).
    pub kind: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub values: Vec<Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub id: i64,
    pub option_id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Raw value string, e.g. `RAL9010`.
    pub value: String,
}

/// A product-level parameter: either an option/value pair or a custom value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub option: Option<CatalogOption>,
    pub value: Option<Value>,
    pub custom_value: String,
    pub filterable: bool,
}

/// One selectable value of a property, with its price.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub id: i64,
    pub enabled: bool,
    pub price: f64,
    pub availability: String,
    pub sending: String,
    pub value: Value,
}

/// A priced option attached to a product or a variation.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub option: CatalogOption,
    pub filterable: bool,
    pub prices: Vec<Price>,
}

/// Physical dimensions. `None` means "not recorded".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub weight: Option<f64>,
}

/// Base price plus an optional sale with its validity window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pricing {
    pub base_price: f64,
    pub sale_price: Option<f64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Pricing {
    /// Whether the sale price applies at `now`.
    pub fn sale_active(&self, now: DateTime<Utc>) -> bool {
        self.sale_price.is_some()
            && self.start.is_none_or(|start| start <= now)
            && self.end.is_none_or(|end| now <= end)
    }

    /// The price a customer pays at `now`.
    pub fn effective(&self, now: DateTime<Utc>) -> f64 {
        match self.sale_price {
            Some(sale) if self.sale_active(now) => sale,
            _ => self.base_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: i64,
    pub name: String,
    /// Path relative to blob storage.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: i64,
    pub name: String,
    pub title: String,
    /// Path relative to blob storage.
    pub path: String,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub enabled: bool,
}

/// An explicit product variation (size, finish, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub pricing: Pricing,
    pub dimensions: Dimensions,
    pub availability: String,
    pub sending: String,
    pub images: Vec<Image>,
    pub files: Vec<File>,
    pub properties: Vec<Property>,
}

/// Lightweight row used to walk the catalog before hydrating.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub id: i64,
    pub enabled: bool,
    pub name: String,
}

/// A fully hydrated product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub enabled: bool,
    pub name: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub pricing: Pricing,
    pub dimensions: Dimensions,
    pub availability: String,
    pub sending: String,
    /// Designated thumbnail; falls back to the first image.
    pub image_id: Option<i64>,
    /// Free text, one `key: value` pair per line.
    pub custom_parameters: String,
    pub images: Vec<Image>,
    pub files: Vec<File>,
    pub parameters: Vec<Parameter>,
    pub tags: Vec<Tag>,
    /// Owning categories in assignment order; the first one is primary.
    pub categories: Vec<Category>,
    /// Properties of the product itself (carried by the default variation).
    pub properties: Vec<Property>,
    pub variations: Vec<Variation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The image used as product thumbnail.
    pub fn thumbnail_image(&self) -> Option<&Image> {
        self.image_id
            .and_then(|id| self.images.iter().find(|image| image.id == id))
            .or_else(|| self.images.first())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub enabled: bool,
}

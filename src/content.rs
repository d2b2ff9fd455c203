//! Content documents written for the site generator.
//!
//! Every page is a JSON front matter document (pretty printed) stored in an
//! `.html` file; the site generator reads JSON front matter natively.
//!
//! | Document | Location | Write rule |
//! |---|---|---|
//! | [`CategoryFile`] | `<crumbs...>/_index<lang>.html` | created once, then facet merges rewrite it when bytes change |
//! | [`ProductFile`] | `<crumbs...>/<product>/index<lang>.html` | rewritten when bytes change |
//! | [`OptionPage`] | `options/<option>/_index<lang>.html` | created once |
//! | [`ValuePage`] | `options/<option>/<value>/index<lang>.html` | created once |
//!
//! Field names are camelCase on disk.

use crate::metadata::KeyValue;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid document {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Running min/max. `None` means no value seen yet, so a real `0.0` is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn include(&mut self, value: Option<f64>) {
        let Some(v) = value else { return };
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionRanges {
    pub width: Range,
    pub height: Range,
    pub depth: Range,
}

/// Facet origin. Ordered so product-level facets sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacetKind {
    Products,
    Variation,
}

/// A filterable option with its values, as aggregated for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOption {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: FacetKind,
    pub name: String,
    pub title: String,
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub id: i64,
    pub thumbnail: String,
    pub title: String,
    pub value: String,
}

/// Category page, one per category and language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFile {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    /// Breadcrumb path, e.g. `products/living-areas/dining-room`.
    pub path: String,
    /// URL override, set when flat URLs are on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub base_price_min: Option<f64>,
    pub base_price_max: Option<f64>,
    /// Effective (sale-aware) price range.
    pub price: Range,
    pub dimensions: DimensionRanges,
    pub weight: Range,
    pub options: Vec<FacetOption>,
}

impl CategoryFile {
    pub const KIND: &'static str = "categories";

    pub fn include_base_price(&mut self, price: f64) {
        let mut range = Range {
            min: self.base_price_min,
            max: self.base_price_max,
        };
        range.include(Some(price));
        self.base_price_min = range.min;
        self.base_price_max = range.max;
    }
}

/// Product page, one per owning category and language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFile {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: i64,
    /// URL of the page under the primary category, the same on every copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Titles of every owning category.
    pub categories: Vec<String>,
    pub thumbnail: String,
    pub base_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub product: ProductView,
}

impl ProductFile {
    pub const KIND: &'static str = "products";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub title: String,
    pub thumbnail: String,
    pub images: Vec<ImageView>,
    pub files: Vec<FileView>,
    pub parameters: Vec<ParameterView>,
    pub custom_parameters: Vec<KeyValue>,
    pub variations: Vec<VariationView>,
    /// Page URL under the owning category.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageView {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// URL plus resized variants.
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileView {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub url: String,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterView {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub value: String,
    pub filterable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionsView {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationView {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub base_price: f64,
    pub dimensions: DimensionsView,
    pub availability: String,
    pub sending: String,
    pub selected: bool,
    pub images: Vec<ImageView>,
    pub files: Vec<FileView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub thumbnail: String,
    pub properties: Vec<PropertyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyView {
    pub id: i64,
    /// Option widget hint.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub title: String,
    pub values: Vec<ValueView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueView {
    pub id: i64,
    pub enabled: bool,
    pub title: String,
    pub value: String,
    pub availability: String,
    pub sending: String,
    pub price: PriceView,
    pub thumbnail: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceView {
    pub id: i64,
    pub price: f64,
    pub availability: String,
    pub sending: String,
}

/// Option description page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionPage {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Widget hint from the catalog.
    pub widget: String,
    pub description: String,
    pub thumbnail: String,
    pub values: Vec<FacetValue>,
}

impl OptionPage {
    pub const KIND: &'static str = "options";
}

/// Value description page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePage {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub option: String,
    pub name: String,
    pub value: String,
    pub description: String,
    pub thumbnail: String,
}

impl ValuePage {
    pub const KIND: &'static str = "values";
}

/// Outcome of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file existed (or already held identical bytes) and was not touched.
    Skipped,
}

fn io_error(path: &Path, source: std::io::Error) -> ContentError {
    ContentError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> ContentError {
    ContentError::Json {
        path: path.display().to_string(),
        source,
    }
}

/// Serialize a document the way it is stored on disk.
pub fn render_document<T: Serialize>(path: &Path, doc: &T) -> Result<String, ContentError> {
    let mut text = serde_json::to_string_pretty(doc).map_err(|e| json_error(path, e))?;
    text.push('\n');
    Ok(text)
}

pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&text).map_err(|e| json_error(path, e))
}

/// Write `doc` only when `path` does not exist yet.
pub fn write_if_absent<T: Serialize>(path: &Path, doc: &T) -> Result<WriteOutcome, ContentError> {
    if path.exists() {
        return Ok(WriteOutcome::Skipped);
    }
    let text = render_document(path, doc)?;
    fs::write(path, text).map_err(|e| io_error(path, e))?;
    Ok(WriteOutcome::Written)
}

/// Write `doc` unless `path` already holds exactly the same bytes.
pub fn write_if_changed<T: Serialize>(path: &Path, doc: &T) -> Result<WriteOutcome, ContentError> {
    let text = render_document(path, doc)?;
    if fs::read(path).is_ok_and(|existing| existing == text.as_bytes()) {
        return Ok(WriteOutcome::Skipped);
    }
    fs::write(path, text).map_err(|e| io_error(path, e))?;
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn category_file() -> CategoryFile {
        CategoryFile {
            id: 3,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: "Dining Tables".into(),
            description: String::new(),
            thumbnail: String::new(),
            path: "products/living-areas/dining-room/dining-tables".into(),
            url: None,
            kind: CategoryFile::KIND.into(),
            content: String::new(),
            base_price_min: None,
            base_price_max: None,
            price: Range::default(),
            dimensions: DimensionRanges::default(),
            weight: Range::default(),
            options: Vec::new(),
        }
    }

    // =========================================================================
    // Range
    // =========================================================================

    #[test]
    fn range_first_value_sets_both_bounds() {
        let mut range = Range::default();
        range.include(Some(10.0));
        assert_eq!(range.min, Some(10.0));
        assert_eq!(range.max, Some(10.0));
    }

    #[test]
    fn range_keeps_zero() {
        let mut range = Range::default();
        range.include(Some(0.0));
        range.include(Some(5.0));
        assert_eq!(range.min, Some(0.0));
        assert_eq!(range.max, Some(5.0));
    }

    #[test]
    fn range_ignores_missing_values() {
        let mut range = Range::default();
        range.include(None);
        assert_eq!(range, Range::default());
        range.include(Some(3.0));
        range.include(None);
        assert_eq!(range.min, Some(3.0));
    }

    #[test]
    fn base_price_bounds() {
        let mut file = category_file();
        file.include_base_price(1000.0);
        file.include_base_price(750.0);
        assert_eq!(file.base_price_min, Some(750.0));
        assert_eq!(file.base_price_max, Some(1000.0));
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn category_file_uses_camel_case_and_type() {
        let mut file = category_file();
        file.include_base_price(1000.0);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "categories");
        assert_eq!(json["basePriceMin"], 1000.0);
        assert!(json.get("url").is_none());
        assert!(json["weight"]["min"].is_null());
    }

    #[test]
    fn facet_kind_serializes_as_tag() {
        assert_eq!(
            serde_json::to_value(FacetKind::Products).unwrap(),
            "Products"
        );
        assert_eq!(
            serde_json::to_value(FacetKind::Variation).unwrap(),
            "Variation"
        );
        assert!(FacetKind::Products < FacetKind::Variation);
    }

    // =========================================================================
    // Conditional writes
    // =========================================================================

    #[test]
    fn write_if_absent_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("_index.html");

        let mut file = category_file();
        assert_eq!(write_if_absent(&path, &file).unwrap(), WriteOutcome::Written);

        file.title = "Changed".into();
        assert_eq!(write_if_absent(&path, &file).unwrap(), WriteOutcome::Skipped);

        let stored: CategoryFile = read_document(&path).unwrap();
        assert_eq!(stored.title, "Dining Tables");
    }

    #[test]
    fn write_if_changed_skips_identical_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.html");
        let mut file = category_file();

        assert_eq!(write_if_changed(&path, &file).unwrap(), WriteOutcome::Written);
        assert_eq!(write_if_changed(&path, &file).unwrap(), WriteOutcome::Skipped);

        file.include_base_price(5.0);
        assert_eq!(write_if_changed(&path, &file).unwrap(), WriteOutcome::Written);
    }

    #[test]
    fn read_document_reports_path_on_bad_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("_index.html");
        fs::write(&path, "<html>").unwrap();
        let err = read_document::<CategoryFile>(&path).unwrap_err();
        assert!(matches!(err, ContentError::Json { .. }));
        assert!(err.to_string().contains("_index.html"));
    }

    #[test]
    fn documents_end_with_newline() {
        let text = render_document(Path::new("x"), &category_file()).unwrap();
        assert!(text.ends_with("}\n"));
    }
}

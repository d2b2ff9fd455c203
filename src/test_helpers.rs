//! Shared test utilities for the catalog-render test suite.
//!
//! Provides the fixture catalog, builders for bare model values, synthetic
//! source images and an [`ExportContext`] rooted in a temp directory.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let fixtures = setup_fixtures();
//! let report = render_with_backend(&fixtures.config, ...).unwrap();
//!
//! let page: CategoryFile = read_document(&fixtures.category_page("dining-tables")).unwrap();
//! let facet = find_facet(&page, "body-color");
//! assert_eq!(facet.values.len(), 2);
//! ```

use crate::breadcrumbs::CategoryTree;
use crate::config::{CatalogConfig, I18nConfig, Language, LanguageConfig};
use crate::content::{CategoryFile, FacetOption};
use crate::imaging::ImageBackend;
use crate::model::{CatalogOption, Category, Dimensions, Pricing, Product, Value};
use crate::render::ExportContext;
use crate::storage::{LocalStorage, Storage};
use crate::store::Store;
use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The fixture catalog, see `fixtures/catalog.sql`.
pub const FIXTURE_SQL: &str = include_str!("../fixtures/catalog.sql");

/// Blob files referenced by the fixture catalog.
const FIXTURE_IMAGES: &[&str] = &[
    "categories/living.jpg",
    "products/table-front.jpg",
    "products/table-side.jpg",
    "products/stool.jpg",
    "values/ral9010.png",
    "values/ral9001.png",
    "values/chrome.png",
    "transports/courier.png",
];

// =========================================================================
// Fixture setup
// =========================================================================

pub fn fixture_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.execute_batch(FIXTURE_SQL).unwrap();
    store
}

/// A seeded catalog on disk with its blob storage, and a config rooted there.
pub struct Fixtures {
    pub tmp: TempDir,
    pub config: CatalogConfig,
}

impl Fixtures {
    /// Path of the default-language page of the category named `name`.
    pub fn category_page(&self, name: &str) -> PathBuf {
        let store = Store::open(&self.config.database_path()).unwrap();
        let tree = CategoryTree::new(store.categories().unwrap(), &self.config.products_root);
        let category = find_category(&tree, name);
        tree.resolve(category.id, None)
            .unwrap()
            .dir(&self.config.content_dir())
            .join("_index.html")
    }
}

pub fn setup_fixtures() -> Fixtures {
    let tmp = TempDir::new().unwrap();
    let config = CatalogConfig::default().rooted_at(tmp.path());

    let store = Store::open(&config.database_path()).unwrap();
    store.execute_batch(FIXTURE_SQL).unwrap();
    write_blobs(&config.storage_dir());

    Fixtures { tmp, config }
}

fn write_blobs(storage_dir: &Path) {
    for name in FIXTURE_IMAGES {
        let path = storage_dir.join(name);
        if name.ends_with(".png") {
            write_test_png(&path, 24, 24);
        } else {
            write_test_jpeg(&path, 48, 32);
        }
    }
    std::fs::create_dir_all(storage_dir.join("files")).unwrap();
    std::fs::write(storage_dir.join("files/assembly.pdf"), b"%PDF-").unwrap();
}

/// Pieces of an [`ExportContext`] over an empty in-memory catalog.
pub struct ContextParts {
    pub tmp: TempDir,
    pub config: CatalogConfig,
    pub store: Store,
    languages: Vec<Language>,
}

/// Context parts rooted in a fresh temp dir; `i18n` adds a German variant.
pub fn context_parts(i18n: bool) -> ContextParts {
    let tmp = TempDir::new().unwrap();
    let mut config = CatalogConfig::default().rooted_at(tmp.path());
    if i18n {
        config.i18n = I18nConfig {
            enabled: true,
            languages: vec![LanguageConfig {
                enabled: true,
                name: "Deutsch".into(),
                code: "de".into(),
            }],
        };
    }
    let languages = config.languages();
    ContextParts {
        tmp,
        config,
        store: Store::open_in_memory().unwrap(),
        languages,
    }
}

impl ContextParts {
    pub fn storage_dir(&self) -> PathBuf {
        self.config.storage_dir()
    }

    pub fn static_dir(&self) -> PathBuf {
        self.config.static_dir()
    }

    pub fn storage<'a, B: ImageBackend>(&self, backend: &'a B) -> LocalStorage<'a, B> {
        LocalStorage::new(
            &self.config.storage_dir(),
            &self.config.static_dir(),
            backend,
            self.config.quality(),
        )
    }

    pub fn context<'a>(
        &'a self,
        storage: &'a dyn Storage,
        tree: &'a CategoryTree,
    ) -> ExportContext<'a> {
        ExportContext {
            config: &self.config,
            store: &self.store,
            storage,
            tree,
            languages: &self.languages,
            content_dir: self.config.content_dir(),
            thumbnail_sizes: self.config.thumbnail_sizes(),
            image_sizes: self.config.image_sizes(),
            now: fixed_time(),
        }
    }
}

// =========================================================================
// Model builders
// =========================================================================

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `"living-areas"` → `"Living Areas"`.
fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn category(id: i64, name: &str, parent: Option<i64>, thumbnail: Option<&str>) -> Category {
    Category {
        id,
        name: name.to_string(),
        title: title_case(name),
        description: String::new(),
        thumbnail: thumbnail.map(str::to_string),
        parent_id: parent,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn option(id: i64, name: &str) -> CatalogOption {
    CatalogOption {
        id,
        name: name.to_string(),
        title: title_case(name),
        kind: "select".to_string(),
        description: String::new(),
        thumbnail: None,
        values: Vec::new(),
        updated_at: fixed_time(),
    }
}

/// A value whose title and raw value are both `raw`.
pub fn value(id: i64, raw: &str, thumbnail: Option<&str>) -> Value {
    Value {
        id,
        option_id: 0,
        name: raw.to_lowercase(),
        title: raw.to_string(),
        description: String::new(),
        thumbnail: thumbnail.map(str::to_string),
        value: raw.to_string(),
    }
}

/// An enabled product with no price, assets, categories or variations.
pub fn bare_product(id: i64, name: &str) -> Product {
    Product {
        id,
        enabled: true,
        name: name.to_string(),
        title: title_case(name),
        description: String::new(),
        content: String::new(),
        pricing: Pricing::default(),
        dimensions: Dimensions::default(),
        availability: String::new(),
        sending: String::new(),
        image_id: None,
        custom_parameters: String::new(),
        images: Vec::new(),
        files: Vec::new(),
        parameters: Vec::new(),
        tags: Vec::new(),
        categories: Vec::new(),
        properties: Vec::new(),
        variations: Vec::new(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

pub fn write_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 255])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find a category by slug. Panics with available names if not found.
pub fn find_category<'a>(tree: &'a CategoryTree, name: &str) -> &'a Category {
    tree.categories()
        .find(|c| c.name == name)
        .unwrap_or_else(|| {
            let available: Vec<&str> = tree.categories().map(|c| c.name.as_str()).collect();
            panic!("category '{name}' not found. Available: {available:?}")
        })
}

/// Find a facet by option name. Panics with available names if not found.
pub fn find_facet<'a>(page: &'a CategoryFile, name: &str) -> &'a FacetOption {
    page.options.iter().find(|o| o.name == name).unwrap_or_else(|| {
        let available: Vec<&str> = page.options.iter().map(|o| o.name.as_str()).collect();
        panic!("facet '{name}' not found. Available: {available:?}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_joins_words() {
        assert_eq!(title_case("living-areas"), "Living Areas");
        assert_eq!(title_case("chair"), "Chair");
    }

    #[test]
    #[should_panic(expected = "not found. Available")]
    fn find_category_panics_with_names() {
        let tree = CategoryTree::new(vec![category(1, "kitchen", None, None)], "");
        find_category(&tree, "bathroom");
    }
}

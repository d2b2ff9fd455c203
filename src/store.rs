//! SQLite catalog store.
//!
//! The store is the only source of catalog data for an export run. It is
//! read-only from the pipeline's point of view, except for the four cache
//! tables, which are truncated at the start of every run and rebuilt as the
//! exporters walk the catalog:
//!
//! | Table | Row | Written by |
//! |---|---|---|
//! | `cache_products` | product × owning category summary | product exporter |
//! | `cache_variations` | one row per exported variation | product exporter |
//! | `cache_values` | processed value thumbnail, keyed by value id | facet thumbnail cache |
//! | `cache_images` | processed product image | product exporter |
//!
//! The schema is created on open when missing. Timestamps are stored as text
//! (`YYYY-MM-DD HH:MM:SS` or RFC 3339) and read as UTC.

use crate::model::{
    CatalogOption, Category, Dimensions, File, Image, Parameter, Price, Pricing, Product,
    ProductSummary, Property, Tag, Transport, Value, Variation,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open catalog {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("product {0} not found")]
    ProductNotFound(i64),
    #[error("option {0} not found")]
    OptionNotFound(i64),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    thumbnail TEXT,
    parent_id INTEGER,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS options (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL DEFAULT 'select',
    description TEXT NOT NULL DEFAULT '',
    thumbnail TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS "values" (
    id INTEGER PRIMARY KEY,
    option_id INTEGER NOT NULL REFERENCES options(id),
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    thumbnail TEXT,
    value TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    enabled INTEGER NOT NULL DEFAULT 1,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    base_price REAL NOT NULL DEFAULT 0,
    sale_price REAL,
    sale_start TEXT,
    sale_end TEXT,
    width REAL,
    height REAL,
    depth REAL,
    weight REAL,
    availability TEXT NOT NULL DEFAULT '',
    sending TEXT NOT NULL DEFAULT '',
    image_id INTEGER,
    custom_parameters TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS product_categories (
    product_id INTEGER NOT NULL REFERENCES products(id),
    category_id INTEGER NOT NULL REFERENCES categories(id),
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (product_id, category_id)
);
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    path TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS product_images (
    product_id INTEGER NOT NULL,
    image_id INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    path TEXT NOT NULL,
    size INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS product_files (
    product_id INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    enabled INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS product_tags (
    product_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS parameters (
    id INTEGER PRIMARY KEY,
    product_id INTEGER NOT NULL REFERENCES products(id),
    name TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    option_id INTEGER,
    value_id INTEGER,
    custom_value TEXT NOT NULL DEFAULT '',
    filterable INTEGER NOT NULL DEFAULT 0,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS variations (
    id INTEGER PRIMARY KEY,
    product_id INTEGER NOT NULL REFERENCES products(id),
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    thumbnail TEXT,
    base_price REAL NOT NULL DEFAULT 0,
    sale_price REAL,
    sale_start TEXT,
    sale_end TEXT,
    width REAL,
    height REAL,
    depth REAL,
    weight REAL,
    availability TEXT NOT NULL DEFAULT '',
    sending TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS variation_images (
    variation_id INTEGER NOT NULL,
    image_id INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS variation_files (
    variation_id INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS properties (
    id INTEGER PRIMARY KEY,
    product_id INTEGER,
    variation_id INTEGER,
    option_id INTEGER NOT NULL REFERENCES options(id),
    name TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    filterable INTEGER NOT NULL DEFAULT 0,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS prices (
    id INTEGER PRIMARY KEY,
    property_id INTEGER NOT NULL REFERENCES properties(id),
    value_id INTEGER NOT NULL REFERENCES "values"(id),
    enabled INTEGER NOT NULL DEFAULT 1,
    price REAL NOT NULL DEFAULT 0,
    availability TEXT NOT NULL DEFAULT '',
    sending TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS transports (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    thumbnail TEXT,
    enabled INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS cache_products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    path TEXT NOT NULL,
    name TEXT NOT NULL,
    title TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    images TEXT NOT NULL,
    variations TEXT NOT NULL,
    base_price REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS cache_variations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    variation_id INTEGER NOT NULL,
    product_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    title TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    base_price REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS cache_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value_id INTEGER NOT NULL UNIQUE,
    title TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS cache_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    thumbnail TEXT NOT NULL
);
"#;

/// Denormalized product summary, one row per owning category.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheProduct {
    pub product_id: i64,
    pub category_id: i64,
    /// Page URL under this category.
    pub path: String,
    pub name: String,
    pub title: String,
    pub thumbnail: String,
    /// Comma-separated image URLs.
    pub images: String,
    /// `;`-separated `id:name:price` descriptors.
    pub variations: String,
    /// Lowest base price across purchasable variations.
    pub base_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheVariation {
    pub variation_id: i64,
    pub product_id: i64,
    pub name: String,
    pub title: String,
    pub thumbnail: String,
    pub base_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheValue {
    pub value_id: i64,
    pub title: String,
    pub thumbnail: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheImage {
    pub image_id: i64,
    pub name: String,
    pub path: String,
    pub thumbnail: String,
}

/// Handle to the catalog database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the catalog at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Empty in-memory catalog, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Run raw SQL (fixtures, external seeding).
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    // =========================================================================
    // Catalog reads
    // =========================================================================

    pub fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, title, description, thumbnail, parent_id, created_at, updated_at
             FROM categories ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn product_summaries(&self) -> Result<Vec<ProductSummary>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, enabled, name FROM products ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProductSummary {
                    id: row.get(0)?,
                    enabled: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Load a product with everything the product exporter needs.
    pub fn product(&self, id: i64) -> Result<Product, StoreError> {
        let mut product = self
            .conn
            .query_row(
                "SELECT id, enabled, name, title, description, content,
                        base_price, sale_price, sale_start, sale_end,
                        width, height, depth, weight, availability, sending,
                        image_id, custom_parameters, created_at, updated_at
                 FROM products WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Product {
                        id: row.get(0)?,
                        enabled: row.get(1)?,
                        name: row.get(2)?,
                        title: row.get(3)?,
                        description: row.get(4)?,
                        content: row.get(5)?,
                        pricing: pricing_from_row(row, 6)?,
                        dimensions: dimensions_from_row(row, 10)?,
                        availability: row.get(14)?,
                        sending: row.get(15)?,
                        image_id: row.get(16)?,
                        custom_parameters: row.get(17)?,
                        created_at: row.get(18)?,
                        updated_at: row.get(19)?,
                        images: Vec::new(),
                        files: Vec::new(),
                        parameters: Vec::new(),
                        tags: Vec::new(),
                        categories: Vec::new(),
                        properties: Vec::new(),
                        variations: Vec::new(),
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::ProductNotFound(id))?;

        product.categories = self.product_categories(id)?;
        product.images = self.images(
            "SELECT i.id, i.name, i.path FROM images i
             JOIN product_images pi ON pi.image_id = i.id
             WHERE pi.product_id = ?1 ORDER BY pi.position, i.id",
            id,
        )?;
        product.files = self.linked_files(
            "SELECT f.id, f.name, f.title, f.path, f.size FROM files f
             JOIN product_files pf ON pf.file_id = f.id
             WHERE pf.product_id = ?1 ORDER BY pf.position, f.id",
            id,
        )?;
        product.tags = self.product_tags(id)?;
        product.parameters = self.parameters(id)?;
        product.properties = self.properties(
            "SELECT id, option_id, name, title, filterable FROM properties
             WHERE product_id = ?1 AND variation_id IS NULL ORDER BY position, id",
            id,
        )?;
        product.variations = self.variations(id)?;
        Ok(product)
    }

    /// All options with their values, ordered for display.
    pub fn options(&self) -> Result<Vec<CatalogOption>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, title, kind, description, thumbnail, updated_at
             FROM options ORDER BY position, id",
        )?;
        let mut options = stmt
            .query_map([], option_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for option in &mut options {
            option.values = self.option_values(option.id)?;
        }
        Ok(options)
    }

    pub fn files(&self) -> Result<Vec<File>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, title, path, size FROM files ORDER BY id")?;
        let rows = stmt
            .query_map([], file_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn transports(&self) -> Result<Vec<Transport>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, title, thumbnail, enabled FROM transports ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Transport {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    title: row.get(2)?,
                    thumbnail: row.get(3)?,
                    enabled: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn product_categories(&self, product_id: i64) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.title, c.description, c.thumbnail, c.parent_id,
                    c.created_at, c.updated_at
             FROM categories c
             JOIN product_categories pc ON pc.category_id = c.id
             WHERE pc.product_id = ?1 ORDER BY pc.position, c.id",
        )?;
        let rows = stmt
            .query_map(params![product_id], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn product_tags(&self, product_id: i64) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.title, t.enabled FROM tags t
             JOIN product_tags pt ON pt.tag_id = t.id
             WHERE pt.product_id = ?1 ORDER BY t.id",
        )?;
        let rows = stmt
            .query_map(params![product_id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    title: row.get(2)?,
                    enabled: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn images(&self, sql: &str, owner_id: i64) -> Result<Vec<Image>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok(Image {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    path: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn linked_files(&self, sql: &str, owner_id: i64) -> Result<Vec<File>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![owner_id], file_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn parameters(&self, product_id: i64) -> Result<Vec<Parameter>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, title, option_id, value_id, custom_value, filterable
             FROM parameters WHERE product_id = ?1 ORDER BY position, id",
        )?;
        let raw = stmt
            .query_map(params![product_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, bool>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut parameters = Vec::with_capacity(raw.len());
        for (id, name, title, option_id, value_id, custom_value, filterable) in raw {
            let option = option_id.map(|id| self.option_header(id)).transpose()?;
            let value = value_id.map(|id| self.value(id)).transpose()?.flatten();
            parameters.push(Parameter {
                id,
                name,
                title,
                option,
                value,
                custom_value,
                filterable,
            });
        }
        Ok(parameters)
    }

    fn properties(&self, sql: &str, owner_id: i64) -> Result<Vec<Property>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(params![owner_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut properties = Vec::with_capacity(raw.len());
        for (id, option_id, name, title, filterable) in raw {
            properties.push(Property {
                id,
                name,
                title,
                option: self.option_header(option_id)?,
                filterable,
                prices: self.prices(id)?,
            });
        }
        Ok(properties)
    }

    fn prices(&self, property_id: i64) -> Result<Vec<Price>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT p.id, p.enabled, p.price, p.availability, p.sending,
                      v.id, v.option_id, v.name, v.title, v.description, v.thumbnail, v.value
               FROM prices p JOIN "values" v ON v.id = p.value_id
               WHERE p.property_id = ?1 ORDER BY p.position, p.id"#,
        )?;
        let rows = stmt
            .query_map(params![property_id], |row| {
                Ok(Price {
                    id: row.get(0)?,
                    enabled: row.get(1)?,
                    price: row.get(2)?,
                    availability: row.get(3)?,
                    sending: row.get(4)?,
                    value: value_from_row(row, 5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn variations(&self, product_id: i64) -> Result<Vec<Variation>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, title, description, thumbnail,
                    base_price, sale_price, sale_start, sale_end,
                    width, height, depth, weight, availability, sending
             FROM variations WHERE product_id = ?1 ORDER BY position, id",
        )?;
        let mut variations = stmt
            .query_map(params![product_id], |row| {
                Ok(Variation {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    thumbnail: row.get(4)?,
                    pricing: pricing_from_row(row, 5)?,
                    dimensions: dimensions_from_row(row, 9)?,
                    availability: row.get(13)?,
                    sending: row.get(14)?,
                    images: Vec::new(),
                    files: Vec::new(),
                    properties: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for variation in &mut variations {
            variation.images = self.images(
                "SELECT i.id, i.name, i.path FROM images i
                 JOIN variation_images vi ON vi.image_id = i.id
                 WHERE vi.variation_id = ?1 ORDER BY vi.position, i.id",
                variation.id,
            )?;
            variation.files = self.linked_files(
                "SELECT f.id, f.name, f.title, f.path, f.size FROM files f
                 JOIN variation_files vf ON vf.file_id = f.id
                 WHERE vf.variation_id = ?1 ORDER BY vf.position, f.id",
                variation.id,
            )?;
            variation.properties = self.properties(
                "SELECT id, option_id, name, title, filterable FROM properties
                 WHERE variation_id = ?1 ORDER BY position, id",
                variation.id,
            )?;
        }
        Ok(variations)
    }

    /// Option row without its values.
    fn option_header(&self, id: i64) -> Result<CatalogOption, StoreError> {
        self.conn
            .query_row(
                "SELECT id, name, title, kind, description, thumbnail, updated_at
                 FROM options WHERE id = ?1",
                params![id],
                option_from_row,
            )
            .optional()?
            .ok_or(StoreError::OptionNotFound(id))
    }

    fn option_values(&self, option_id: i64) -> Result<Vec<Value>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, option_id, name, title, description, thumbnail, value
               FROM "values" WHERE option_id = ?1 ORDER BY position, id"#,
        )?;
        let rows = stmt
            .query_map(params![option_id], |row| value_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn value(&self, id: i64) -> Result<Option<Value>, StoreError> {
        let value = self
            .conn
            .query_row(
                r#"SELECT id, option_id, name, title, description, thumbnail, value
                   FROM "values" WHERE id = ?1"#,
                params![id],
                |row| value_from_row(row, 0),
            )
            .optional()?;
        Ok(value)
    }

    // =========================================================================
    // Cache tables
    // =========================================================================

    /// Truncate every cache table. Called once at the start of a run.
    pub fn clear_cache(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "DELETE FROM cache_products;
             DELETE FROM cache_images;
             DELETE FROM cache_variations;
             DELETE FROM cache_values;",
        )?;
        Ok(())
    }

    pub fn insert_cache_product(&self, row: &CacheProduct) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO cache_products
                (product_id, category_id, path, name, title, thumbnail, images, variations, base_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.product_id,
                row.category_id,
                row.path,
                row.name,
                row.title,
                row.thumbnail,
                row.images,
                row.variations,
                row.base_price
            ],
        )?;
        Ok(())
    }

    pub fn insert_cache_variation(&self, row: &CacheVariation) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO cache_variations (variation_id, product_id, name, title, thumbnail, base_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.variation_id,
                row.product_id,
                row.name,
                row.title,
                row.thumbnail,
                row.base_price
            ],
        )?;
        Ok(())
    }

    /// Record a processed value thumbnail. The first row for a value id wins.
    pub fn insert_cache_value(&self, row: &CacheValue) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO cache_values (value_id, title, thumbnail, value)
             VALUES (?1, ?2, ?3, ?4)",
            params![row.value_id, row.title, row.thumbnail, row.value],
        )?;
        Ok(())
    }

    pub fn cache_value(&self, value_id: i64) -> Result<Option<CacheValue>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT value_id, title, thumbnail, value FROM cache_values WHERE value_id = ?1",
                params![value_id],
                |row| {
                    Ok(CacheValue {
                        value_id: row.get(0)?,
                        title: row.get(1)?,
                        thumbnail: row.get(2)?,
                        value: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn insert_cache_image(&self, row: &CacheImage) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO cache_images (image_id, name, path, thumbnail) VALUES (?1, ?2, ?3, ?4)",
            params![row.image_id, row.name, row.path, row.thumbnail],
        )?;
        Ok(())
    }

    pub fn cache_products(&self) -> Result<Vec<CacheProduct>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id, category_id, path, name, title, thumbnail, images, variations, base_price
             FROM cache_products ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CacheProduct {
                    product_id: row.get(0)?,
                    category_id: row.get(1)?,
                    path: row.get(2)?,
                    name: row.get(3)?,
                    title: row.get(4)?,
                    thumbnail: row.get(5)?,
                    images: row.get(6)?,
                    variations: row.get(7)?,
                    base_price: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Row counts of the cache tables, in `clear_cache` order.
    pub fn cache_counts(&self) -> Result<[i64; 4], StoreError> {
        let mut counts = [0; 4];
        for (slot, table) in counts.iter_mut().zip([
            "cache_products",
            "cache_images",
            "cache_variations",
            "cache_values",
        ]) {
            *slot = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        }
        Ok(counts)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        thumbnail: row.get(4)?,
        parent_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogOption> {
    Ok(CatalogOption {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        kind: row.get(3)?,
        description: row.get(4)?,
        thumbnail: row.get(5)?,
        values: Vec::new(),
        updated_at: row.get(6)?,
    })
}

fn value_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Value> {
    Ok(Value {
        id: row.get(offset)?,
        option_id: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        title: row.get(offset + 3)?,
        description: row.get(offset + 4)?,
        thumbnail: row.get(offset + 5)?,
        value: row.get(offset + 6)?,
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        path: row.get(3)?,
        size: row.get(4)?,
    })
}

/// Reads `base_price, sale_price, sale_start, sale_end` starting at `offset`.
fn pricing_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Pricing> {
    Ok(Pricing {
        base_price: row.get(offset)?,
        sale_price: row.get(offset + 1)?,
        start: row.get::<_, Option<DateTime<Utc>>>(offset + 2)?,
        end: row.get::<_, Option<DateTime<Utc>>>(offset + 3)?,
    })
}

/// Reads `width, height, depth, weight` starting at `offset`.
fn dimensions_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Dimensions> {
    Ok(Dimensions {
        width: row.get(offset)?,
        height: row.get(offset + 1)?,
        depth: row.get(offset + 2)?,
        weight: row.get(offset + 3)?,
    })
}

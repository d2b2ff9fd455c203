//! Per-run caches and cache statistics.
//!
//! # Value thumbnails
//!
//! Option values (colors, finishes, ...) are shared by many products across
//! many categories. Their thumbnails are published and resized once per run:
//! [`ValueThumbnailCache`] keeps a map from value id to the resulting
//! thumbnail string and records each first resolution as a `cache_values`
//! row. A value already present in the table (written earlier in the same
//! run) is served from the table without touching storage.
//!
//! The cache is an explicit object owned by the orchestrator for one run;
//! nothing survives between runs except the files themselves, whose reuse is
//! governed by mtime memoization in [`imaging`](crate::imaging).
//!
//! # Statistics
//!
//! [`CacheStats`] counts asset work: originals and variants already up to
//! date (`hits`), originals copied (`copies`) and variants encoded
//! (`misses`).

use crate::facets::ValueThumbnails;
use crate::imaging::SizeSpec;
use crate::model::Value;
use crate::render::RenderReport;
use crate::storage::Storage;
use crate::store::{CacheValue, Store};
use std::collections::HashMap;
use std::fmt;

/// Destination of value thumbnails inside the static tree.
pub const VALUES_DIR: &str = "images/values";

/// Summary of cache performance for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 || self.copies > 0 {
            if self.copies > 0 {
                write!(
                    f,
                    "{} cached, {} copied, {} encoded ({} total)",
                    self.hits,
                    self.copies,
                    self.misses,
                    self.total()
                )
            } else {
                write!(
                    f,
                    "{} cached, {} encoded ({} total)",
                    self.hits,
                    self.misses,
                    self.total()
                )
            }
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}

/// Run-scoped value id → thumbnail string cache.
pub struct ValueThumbnailCache<'a> {
    store: &'a Store,
    storage: &'a dyn Storage,
    sizes: Vec<SizeSpec>,
    resolved: HashMap<i64, String>,
}

impl<'a> ValueThumbnailCache<'a> {
    pub fn new(store: &'a Store, storage: &'a dyn Storage, sizes: Vec<SizeSpec>) -> Self {
        Self {
            store,
            storage,
            sizes,
            resolved: HashMap::new(),
        }
    }

    /// Number of distinct values resolved so far.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn publish(&self, value: &Value, report: &mut RenderReport) -> String {
        let Some(source) = value.thumbnail.as_deref().filter(|s| !s.is_empty()) else {
            return String::new();
        };
        match self.storage.put_image(source, VALUES_DIR, &self.sizes) {
            Ok(image) => {
                image.record(&mut report.images);
                image.srcset()
            }
            Err(e) => {
                report.warn(format!("value {} thumbnail: {e}", value.id));
                String::new()
            }
        }
    }
}

impl ValueThumbnails for ValueThumbnailCache<'_> {
    fn resolve(&mut self, value: &Value, report: &mut RenderReport) -> String {
        if let Some(thumbnail) = self.resolved.get(&value.id) {
            return thumbnail.clone();
        }

        let thumbnail = match self.store.cache_value(value.id) {
            Ok(Some(row)) => row.thumbnail,
            Ok(None) => {
                let thumbnail = self.publish(value, report);
                let row = CacheValue {
                    value_id: value.id,
                    title: value.title.clone(),
                    thumbnail: thumbnail.clone(),
                    value: value.value.clone(),
                };
                if let Err(e) = self.store.insert_cache_value(&row) {
                    report.warn(format!("value {} cache row: {e}", value.id));
                }
                thumbnail
            }
            Err(e) => {
                report.warn(format!("value {} cache lookup: {e}", value.id));
                self.publish(value, report)
            }
        };

        self.resolved.insert(value.id, thumbnail.clone());
        thumbnail
    }
}

//! Publishing original assets into the static tree.
//!
//! The [`Storage`] trait is the capability the exporters use: `put_file`
//! publishes a download as-is, `put_image` publishes an image under a
//! cache-busting name and asks the asset processor for resized variants.
//! Both are idempotent: a destination whose mtime equals the source's is
//! left alone.
//!
//! [`LocalStorage`] reads from the blob storage directory and writes into
//! the site's static directory. Asset URLs are rooted at that directory.
//!
//! ```text
//! storage/uploads/table.jpg
//!   → static/images/products/table_uploads_1700000000.jpg   /images/products/table_uploads_1700000000.jpg
//!   → static/images/products/resize/table_uploads_1700000000_128x0.jpg
//! ```

use crate::cache::CacheStats;
use crate::imaging::{
    ImageBackend, ImagingError, Quality, SizeSpec, VariantStatus, modified_time, process_image,
    set_modified_time,
};
use crate::naming::cache_busted_name;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("source not found: {0}")]
    MissingSource(String),
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("image processing failed for {path}: {source}")]
    Imaging { path: String, source: ImagingError },
}

/// Whether the published original was written by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    Copied,
    Unchanged,
}

/// A published file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFile {
    /// Root-relative URL, e.g. `/files/manual.pdf`.
    pub url: String,
    pub status: CopyStatus,
}

/// One resized variant of a published image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedVariant {
    pub url: String,
    pub descriptor: String,
    pub status: VariantStatus,
}

/// A published image and its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedImage {
    pub url: String,
    pub status: CopyStatus,
    pub variants: Vec<PublishedVariant>,
}

impl PublishedImage {
    /// The thumbnail string written to content files:
    /// `"<url>, <variant url> <w>w, ..."`. Just the URL without variants.
    pub fn srcset(&self) -> String {
        let mut parts = Vec::with_capacity(self.variants.len() + 1);
        parts.push(self.url.clone());
        parts.extend(
            self.variants
                .iter()
                .map(|v| format!("{} {}", v.url, v.descriptor)),
        );
        parts.join(", ")
    }

    /// Add this image's copy and encode outcomes to `stats`.
    pub fn record(&self, stats: &mut CacheStats) {
        match self.status {
            CopyStatus::Copied => stats.copy(),
            CopyStatus::Unchanged => stats.hit(),
        }
        for variant in &self.variants {
            match variant.status {
                VariantStatus::Cached => stats.hit(),
                VariantStatus::Encoded => stats.miss(),
            }
        }
    }
}

/// Asset publishing capability.
pub trait Storage {
    /// Publish `source` (relative to blob storage) into `dest_dir` (relative
    /// to the static root), keeping its file name.
    fn put_file(&self, source: &str, dest_dir: &str) -> Result<PublishedFile, StorageError>;

    /// Publish an image under a cache-busting name and produce `sizes`
    /// variants in `<dest_dir>/resize/`.
    fn put_image(
        &self,
        source: &str,
        dest_dir: &str,
        sizes: &[SizeSpec],
    ) -> Result<PublishedImage, StorageError>;
}

/// Local filesystem storage.
pub struct LocalStorage<'a, B: ImageBackend> {
    blob_root: PathBuf,
    static_root: PathBuf,
    backend: &'a B,
    quality: Quality,
}

impl<'a, B: ImageBackend> LocalStorage<'a, B> {
    pub fn new(blob_root: &Path, static_root: &Path, backend: &'a B, quality: Quality) -> Self {
        Self {
            blob_root: blob_root.to_path_buf(),
            static_root: static_root.to_path_buf(),
            backend,
            quality,
        }
    }

    fn source_path(&self, source: &str) -> Result<PathBuf, StorageError> {
        let path = self.blob_root.join(source.trim_start_matches('/'));
        if path.is_file() {
            Ok(path)
        } else {
            Err(StorageError::MissingSource(path.display().to_string()))
        }
    }

    fn dest_dir(&self, dest_dir: &str) -> Result<PathBuf, StorageError> {
        let dir = self.static_root.join(dest_dir.trim_matches('/'));
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        Ok(dir)
    }

    /// Copy `source` to `dest` unless `dest` already carries the source mtime.
    fn copy_if_changed(&self, source: &Path, dest: &Path) -> Result<CopyStatus, StorageError> {
        let mtime = modified_time(source).map_err(|e| io_error(source, e))?;
        if modified_time(dest).is_ok_and(|m| m == mtime) {
            return Ok(CopyStatus::Unchanged);
        }
        fs::copy(source, dest).map_err(|e| io_error(dest, e))?;
        set_modified_time(dest, mtime).map_err(|e| io_error(dest, e))?;
        Ok(CopyStatus::Copied)
    }
}

impl<B: ImageBackend> Storage for LocalStorage<'_, B> {
    fn put_file(&self, source: &str, dest_dir: &str) -> Result<PublishedFile, StorageError> {
        let source_path = self.source_path(source)?;
        let dir = self.dest_dir(dest_dir)?;
        let file_name = file_name(&source_path);
        let status = self.copy_if_changed(&source_path, &dir.join(&file_name))?;
        Ok(PublishedFile {
            url: public_url(dest_dir, &file_name),
            status,
        })
    }

    fn put_image(
        &self,
        source: &str,
        dest_dir: &str,
        sizes: &[SizeSpec],
    ) -> Result<PublishedImage, StorageError> {
        let source_path = self.source_path(source)?;
        let dir = self.dest_dir(dest_dir)?;
        let mtime = modified_time(&source_path).map_err(|e| io_error(&source_path, e))?;
        let name = cache_busted_name(source, mtime);
        let status = self.copy_if_changed(&source_path, &dir.join(&name))?;

        let resize_dir = dir.join("resize");
        let variants = process_image(
            self.backend,
            &source_path,
            &resize_dir,
            &name,
            sizes,
            self.quality,
        )
        .map_err(|source| StorageError::Imaging {
            path: source_path.display().to_string(),
            source,
        })?;

        let resize_url_dir = format!("{}/resize", dest_dir.trim_matches('/'));
        Ok(PublishedImage {
            url: public_url(dest_dir, &name),
            status,
            variants: variants
                .into_iter()
                .map(|v| PublishedVariant {
                    url: public_url(&resize_url_dir, &v.filename),
                    descriptor: v.descriptor,
                    status: v.status,
                })
                .collect(),
        })
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `/<dir>/<name>` with no doubled slashes.
fn public_url(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else {
        format!("/{dir}/{name}")
    }
}

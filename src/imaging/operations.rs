//! The asset processor: mtime-memoized resized variants.
//!
//! [`process_image`] turns one source image into a list of resized variants,
//! one per [`SizeSpec`]. A variant is regenerated only when its output is
//! missing or its modification time differs from the source's. After writing,
//! the output's mtime is set to the source's so the next run can compare.
//!
//! The first failure aborts the call. Callers log it and leave the asset out.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{SizeSpec, resolve_dimensions};
use super::params::{Quality, ResizeParams};
use super::rust_backend::is_supported;
use crate::naming::variant_file_name;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Whether a variant was reused or produced by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    Cached,
    Encoded,
}

/// One resized output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// File name inside the resize directory.
    pub filename: String,
    /// Width descriptor, e.g. `128w`.
    pub descriptor: String,
    pub status: VariantStatus,
}

/// Read a file's modification time.
pub fn modified_time(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Set a file's modification time.
pub fn set_modified_time(path: &Path, time: SystemTime) -> std::io::Result<()> {
    fs::OpenOptions::new()
        .write(true)
        .open(path)?
        .set_modified(time)
}

/// Whether `output` exists and carries exactly `source_mtime`.
fn is_current(output: &Path, source_mtime: SystemTime) -> bool {
    modified_time(output).is_ok_and(|mtime| mtime == source_mtime)
}

/// Produce resized variants of `source` in `resize_dir`.
///
/// `target_name` is the file name the original was published under (e.g.
/// `table_1700000000.jpg`); variants are named `<stem>_<w>x<h><ext>` after it.
/// Sources that are not JPEG or PNG yield an empty list.
pub fn process_image(
    backend: &impl ImageBackend,
    source: &Path,
    resize_dir: &Path,
    target_name: &str,
    sizes: &[SizeSpec],
    quality: Quality,
) -> Result<Vec<Variant>, ImagingError> {
    if !is_supported(source) || sizes.is_empty() {
        return Ok(Vec::new());
    }

    let source_mtime = modified_time(source)?;
    fs::create_dir_all(resize_dir)?;

    let mut original: Option<(u32, u32)> = None;
    let mut variants = Vec::with_capacity(sizes.len());

    for &spec in sizes {
        let filename = variant_file_name(target_name, spec.width, spec.height);
        let output = resize_dir.join(&filename);

        let status = if is_current(&output, source_mtime) {
            VariantStatus::Cached
        } else {
            let dims = match original {
                Some(dims) => dims,
                None => {
                    let identified = backend.identify(source)?;
                    let dims = (identified.width, identified.height);
                    original = Some(dims);
                    dims
                }
            };
            let (width, height) = resolve_dimensions(dims, spec);
            backend.resize(&ResizeParams {
                source: source.to_path_buf(),
                output: output.clone(),
                width,
                height,
                quality,
            })?;
            set_modified_time(&output, source_mtime)?;
            VariantStatus::Encoded
        };

        variants.push(Variant {
            filename,
            descriptor: spec.descriptor(),
            status,
        });
    }

    Ok(variants)
}

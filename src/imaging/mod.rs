//! Image processing for catalog assets.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → JPEG/PNG** | Lanczos3 + `image` encoders |
//! | **Memoization** | output mtime == source mtime |
//!
//! The module is split into:
//! - **Calculations**: size-spec parsing and dimension math (unit testable)
//! - **Parameters**: data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`process_image`], the mtime-memoized asset processor

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{SizeSpec, parse_size_specs, resolve_dimensions};
pub use operations::{
    ImagingError, Variant, VariantStatus, modified_time, process_image, set_modified_time,
};
pub use params::{Quality, ResizeParams};
pub use rust_backend::{RustBackend, is_supported};

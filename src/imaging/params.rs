//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. The
//! [`operations`](super::operations) module decides which variants to
//! produce; the [`backend`](super::backend) does the pixel work.
//!
//! - [`Quality`]: JPEG encoding quality (1-100, default 75). Clamped on construction.
//! - [`ResizeParams`]: source, output path, exact target dimensions, quality.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Parameters for a single resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

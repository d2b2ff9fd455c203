//! Pure Rust image processing backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image` crate decoders |
//! | Identify | `image::image_dimensions` (header only) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode PNG | `image::codecs::png::PngEncoder` (lossless, quality ignored) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::BufWriter;
use std::path::Path;

/// Extensions the asset processor accepts. Anything else is skipped.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [supported extensions](supported_input_extensions).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Backend built on the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode `img` according to the output extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let writer = || -> Result<BufWriter<std::fs::File>, BackendError> {
        Ok(BufWriter::new(std::fs::File::create(path)?))
    };

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer()?, quality as u8);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))
        }
        "png" => {
            let encoder = image::codecs::png::PngEncoder::new(writer()?);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {e}")))
        }
        other => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            other
        ))),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{write_test_jpeg, write_test_png};

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported(Path::new("a/photo.JPG")));
        assert!(is_supported(Path::new("a/photo.jpeg")));
        assert!(is_supported(Path::new("swatch.png")));
        assert!(!is_supported(Path::new("manual.pdf")));
        assert!(!is_supported(Path::new("photo.webp")));
        assert!(!is_supported(Path::new("no-extension")));
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn resize_jpeg_to_exact_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        write_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("resized.jpg");
        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 128,
                height: 96,
                quality: Quality::new(75),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (128, 96));
    }

    #[test]
    fn resize_png_keeps_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("swatch.png");
        write_test_png(&source, 64, 64);

        let output = tmp.path().join("swatch_32x32.png");
        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 32,
                height: 32,
                quality: Quality::default(),
            })
            .unwrap();

        let format = image::ImageFormat::from_path(&output).unwrap();
        assert_eq!(format, image::ImageFormat::Png);
        assert_eq!(image::image_dimensions(&output).unwrap(), (32, 32));
    }

    #[test]
    fn resize_unsupported_output_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        write_test_jpeg(&source, 100, 100);

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("output.webp"),
            width: 50,
            height: 50,
            quality: Quality::default(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn resize_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not a jpeg").unwrap();

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("out.jpg"),
            width: 10,
            height: 10,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}

//! Pure functions for size specs and output dimensions.
//!
//! Nothing here touches the filesystem.

use std::fmt;

/// One `WIDTHxHEIGHT` token from a size list. `height == 0` means "keep the
/// source aspect ratio".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
}

impl SizeSpec {
    /// Width descriptor used in `srcset`-style strings, e.g. `128w`.
    pub fn descriptor(&self) -> String {
        format!("{}w", self.width)
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parse a comma-separated size list such as `"64x0,128x0"`.
///
/// Whitespace around tokens is ignored and empty tokens are skipped, so
/// `""` yields an empty list. Returns the offending token on failure.
///
/// ```
/// # use catalog_render::imaging::parse_size_specs;
/// let sizes = parse_size_specs("64x0, 128x96").unwrap();
/// assert_eq!(sizes[1].width, 128);
/// assert_eq!(sizes[1].height, 96);
/// ```
pub fn parse_size_specs(list: &str) -> Result<Vec<SizeSpec>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (w, h) = token
                .split_once(['x', 'X'])
                .ok_or_else(|| token.to_string())?;
            let width: u32 = w.trim().parse().map_err(|_| token.to_string())?;
            let height: u32 = h.trim().parse().map_err(|_| token.to_string())?;
            if width == 0 {
                return Err(token.to_string());
            }
            Ok(SizeSpec { width, height })
        })
        .collect()
}

/// Output dimensions for `spec` applied to an image of `original` size.
///
/// A zero height is derived from the width and the source aspect ratio
/// (never less than 1px).
pub fn resolve_dimensions(original: (u32, u32), spec: SizeSpec) -> (u32, u32) {
    if spec.height > 0 {
        return (spec.width, spec.height);
    }
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return (spec.width, spec.width);
    }
    let height = (orig_h as f64 * spec.width as f64 / orig_w as f64).round() as u32;
    (spec.width, height.max(1))
}

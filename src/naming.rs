//! Naming conventions for published files and URLs.
//!
//! ## Files
//!
//! - Published originals carry their source modification time so browsers
//!   and CDNs never serve a stale copy. The blob directory is folded into the
//!   name so equal file names from different directories never collide:
//!   `uploads/table.jpg` → `table_uploads_1700000000.jpg`.
//! - Resized variants append their size spec to that name:
//!   `table_uploads_1700000000.jpg` → `table_uploads_1700000000_64x0.jpg`.
//! - Content files carry a language suffix before the extension: `""` for the
//!   default language, `".de"` for German (`_index.de.html`).
//!
//! ## URLs
//!
//! Page URLs are slash-delimited slug paths with leading and trailing slashes:
//! `/products/living-areas/dining-room/`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Split a file name into stem and extension (extension includes the dot).
///
/// - `"a.jpg"` → `("a", ".jpg")`
/// - `"archive.tar.gz"` → `("archive.tar", ".gz")`
/// - `"README"` → `("README", "")`
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(pos) => file_name.split_at(pos),
    }
}

/// Name of a resized variant: `<stem>_<w>x<h><ext>`.
pub fn variant_file_name(file_name: &str, width: u32, height: u32) -> String {
    let (stem, ext) = split_extension(file_name);
    format!("{stem}_{width}x{height}{ext}")
}

/// Cache-busting name for a published original:
/// `<stem>_<directory slug>_<unix seconds><ext>`.
///
/// `source` is the blob-relative path. Its directory is slugified into the
/// name; a source without a directory yields `<stem>_<unix seconds><ext>`.
pub fn cache_busted_name(source: &str, modified: SystemTime) -> String {
    let source = source.trim_matches('/');
    let (dir, file_name) = match source.rfind('/') {
        Some(pos) => (&source[..pos], &source[pos + 1..]),
        None => ("", source),
    };
    let (stem, ext) = split_extension(file_name);
    let stamp = unix_seconds(modified);
    let dir = slugify(dir);
    if dir.is_empty() {
        format!("{stem}_{stamp}{ext}")
    } else {
        format!("{stem}_{dir}_{stamp}{ext}")
    }
}

/// Seconds since the Unix epoch. Times before the epoch count as negative.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// Content file suffix for a language code (`""` for the default language).
pub fn language_suffix(code: &str) -> String {
    if code.is_empty() {
        String::new()
    } else {
        format!(".{code}")
    }
}

/// Lowercase URL slug: ASCII alphanumerics kept, runs of anything else
/// collapsed into a single dash, no leading or trailing dashes.
///
/// - `"Products"` → `"products"`
/// - `"Living Areas"` → `"living-areas"`
/// - `"  RAL 9010 / white "` → `"ral-9010-white"`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Join slug segments into a page URL with leading and trailing slashes.
/// Empty segments are skipped; no segments yields `"/"`.
pub fn url_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut url = String::from("/");
    for segment in segments {
        let segment = segment.as_ref().trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push_str(segment);
        url.push('/');
    }
    url
}

//! # Catalog Render
//!
//! Exports an e-commerce catalog stored in SQLite into a content tree for a
//! static site generator: one JSON front matter page per category, product,
//! option and option value, plus published (resized, cache-busted) images and
//! attachments.
//!
//! # Architecture: Staged Export
//!
//! A render run opens the catalog once and walks it in fixed stages:
//!
//! ```text
//! Files        files table       →  static/files/
//! Categories   categories        →  content/<crumbs>/_index.html
//! Products     products          →  content/<crumbs>/<product>/index.html
//!                                   + facets merged into category pages
//!                                   + cache_* tables refreshed
//! Options      options, values   →  content/options/<option>/...
//! Transports   transports        →  static/images/transports/
//! ```
//!
//! Per-item failures (a broken category chain, a missing image) become
//! warnings in the [`render::RenderReport`]; only store and directory errors
//! abort the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`render`] | Pipeline orchestrator, export context, run report |
//! | [`categories`] | Category pages |
//! | [`products`] | Product pages, variations, cache rows |
//! | [`options`] | Option and value pages, transports, global files |
//! | [`facets`] | Facet aggregation into category pages |
//! | [`breadcrumbs`] | Category chain resolution and URL building |
//! | [`cache`] | Image statistics and the per-run value thumbnail cache |
//! | [`storage`] | Asset publishing backends |
//! | [`imaging`] | Size specs, resizing and the mtime-memoized asset processor |
//! | [`content`] | Page documents and their on-disk write policies |
//! | [`store`] | SQLite catalog access |
//! | [`model`] | Catalog records as loaded from the store |
//! | [`config`] | `config.toml` loading and validation |
//! | [`metadata`] | Title/description fallback resolution |
//! | [`naming`] | Slugs, URL paths, cache-busted file names |
//! | [`output`] | CLI output formatting |
//!
//! # Write Policies
//!
//! Category, option and value pages are written once and then left alone,
//! so hand edits survive. Products merge their facets into the existing
//! category page and product pages are rewritten only when their content
//! changes. A second run over an unchanged catalog writes nothing.
//!
//! # Image Memoization
//!
//! A published image keeps the modification time of its source. A variant
//! whose mtime equals the source's is reused without decoding; anything else
//! is re-encoded. See [`imaging::process_image`].

pub mod breadcrumbs;
pub mod cache;
pub mod categories;
pub mod config;
pub mod content;
pub mod facets;
pub mod imaging;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod options;
pub mod output;
pub mod products;
pub mod render;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

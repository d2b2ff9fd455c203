//! Pipeline orchestration.
//!
//! One run walks the whole catalog and writes the content and static trees:
//!
//! ```text
//! open store → clear cache tables → ensure output dirs → languages
//!   → [--remove options/] → global files → categories → products
//!   → options/values → transports
//! ```
//!
//! The run is single-threaded. Products merge their facets into category
//! files with read-modify-write, so exporters must not run concurrently.
//!
//! ## Failure policy
//!
//! Store failures and output directory creation failures abort the run with
//! a [`RenderError`]. Everything else (a missing thumbnail, a broken
//! category chain, an unreadable category file) is recorded as a warning in
//! the [`RenderReport`] and the run continues.
//!
//! Progress is reported through an optional channel of [`RenderEvent`]s so
//! the CLI can print stage banners while the run is in flight.

use crate::breadcrumbs::CategoryTree;
use crate::cache::{CacheStats, VALUES_DIR, ValueThumbnailCache};
use crate::config::{CatalogConfig, Language};
use crate::content::WriteOutcome;
use crate::imaging::{ImageBackend, RustBackend, SizeSpec};
use crate::storage::{CopyStatus, LocalStorage, PublishedFile, PublishedImage, Storage};
use crate::store::{Store, StoreError};
use crate::{categories, options, products};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

pub const CATEGORIES_DIR: &str = "images/categories";
pub const PRODUCTS_DIR: &str = "images/products";
pub const VARIATIONS_DIR: &str = "images/variations";
pub const TRANSPORTS_DIR: &str = "images/transports";
pub const FILES_DIR: &str = "files";

/// Subtree of the content dir holding option and value pages.
pub const OPTIONS_DIR: &str = "options";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Create `dir` and its parents. Failure aborts the run.
pub fn ensure_dir(dir: &Path) -> Result<(), RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Clone)]
pub struct RenderOptions {
    /// Delete the options subtree before exporting.
    pub remove: bool,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Files,
    Categories,
    Products,
    Options,
    Transports,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Files => "Files",
            Stage::Categories => "Categories",
            Stage::Products => "Products",
            Stage::Options => "Options",
            Stage::Transports => "Transports",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    StageStarted(Stage),
    Warning(String),
}

/// Written/skipped counters for one page kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageCounts {
    pub written: u32,
    pub skipped: u32,
}

impl PageCounts {
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub categories: PageCounts,
    pub products: PageCounts,
    pub options: PageCounts,
    pub values: PageCounts,
    /// Attachments published (global and per product).
    pub files: u32,
    pub transports: u32,
    pub images: CacheStats,
    pub warnings: Vec<String>,
    pub elapsed: Duration,
    progress: Option<Sender<RenderEvent>>,
}

impl RenderReport {
    fn with_progress(progress: Option<Sender<RenderEvent>>) -> Self {
        Self {
            progress,
            ..Self::default()
        }
    }

    /// Record a recoverable failure. It is reported once: as a progress
    /// event when someone listens, otherwise as a log line.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.emit(RenderEvent::Warning(message.clone())) {
            warn!("{message}");
        }
        self.warnings.push(message);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn stage(&mut self, stage: Stage) {
        if !self.emit(RenderEvent::StageStarted(stage)) {
            info!(%stage, "stage started");
        }
    }

    /// Send `event` to the listener. False when there is none.
    fn emit(&self, event: RenderEvent) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }
}

/// Everything an exporter needs for one run.
pub struct ExportContext<'a> {
    pub config: &'a CatalogConfig,
    pub store: &'a Store,
    pub storage: &'a dyn Storage,
    pub tree: &'a CategoryTree,
    pub languages: &'a [Language],
    pub content_dir: PathBuf,
    pub thumbnail_sizes: Vec<SizeSpec>,
    pub image_sizes: Vec<SizeSpec>,
    pub now: DateTime<Utc>,
}

impl ExportContext<'_> {
    /// Publish an image, recording cache stats. A missing or empty source
    /// yields `None` silently; a failure yields `None` and a warning.
    pub fn publish_image(
        &self,
        source: Option<&str>,
        dest_dir: &str,
        sizes: &[SizeSpec],
        report: &mut RenderReport,
        owner: &str,
    ) -> Option<PublishedImage> {
        let source = source.filter(|s| !s.trim().is_empty())?;
        match self.storage.put_image(source, dest_dir, sizes) {
            Ok(image) => {
                image.record(&mut report.images);
                Some(image)
            }
            Err(e) => {
                report.warn(format!("{owner}: {e}"));
                None
            }
        }
    }

    /// Publish a download into the files directory.
    pub fn publish_file(
        &self,
        source: &str,
        report: &mut RenderReport,
        owner: &str,
    ) -> Option<PublishedFile> {
        match self.storage.put_file(source, FILES_DIR) {
            Ok(file) => {
                match file.status {
                    CopyStatus::Copied => report.images.copy(),
                    CopyStatus::Unchanged => report.images.hit(),
                }
                report.files += 1;
                Some(file)
            }
            Err(e) => {
                report.warn(format!("{owner}: {e}"));
                None
            }
        }
    }
}

/// Language suffixed page file name, e.g. `_index.de.html`.
pub fn page_name(stem: &str, language: &Language) -> String {
    format!("{stem}{}.html", language.suffix)
}

/// Run the pipeline with the pure-Rust image backend.
pub fn render(
    config: &CatalogConfig,
    options: &RenderOptions,
    progress: Option<Sender<RenderEvent>>,
) -> Result<RenderReport, RenderError> {
    render_with_backend(config, options, &RustBackend::new(), Utc::now(), progress)
}

pub fn render_with_backend(
    config: &CatalogConfig,
    options: &RenderOptions,
    backend: &impl ImageBackend,
    now: DateTime<Utc>,
    progress: Option<Sender<RenderEvent>>,
) -> Result<RenderReport, RenderError> {
    let started = Instant::now();
    let mut report = RenderReport::with_progress(progress);

    let store = Store::open(&config.database_path())?;
    store.clear_cache()?;

    let content_dir = config.content_dir();
    let static_dir = config.static_dir();
    ensure_dir(&content_dir)?;
    for sub in [
        CATEGORIES_DIR,
        PRODUCTS_DIR,
        VARIATIONS_DIR,
        VALUES_DIR,
        TRANSPORTS_DIR,
        FILES_DIR,
    ] {
        ensure_dir(&static_dir.join(sub))?;
    }

    let languages = config.languages();
    info!(
        languages = languages.len(),
        output = %config.output,
        "render started"
    );

    if options.remove {
        remove_subtree(&content_dir.join(OPTIONS_DIR))?;
    }

    let storage = LocalStorage::new(
        &config.storage_dir(),
        &static_dir,
        backend,
        config.quality(),
    );
    let tree = CategoryTree::new(store.categories()?, &config.products_root);
    let ctx = ExportContext {
        config,
        store: &store,
        storage: &storage,
        tree: &tree,
        languages: &languages,
        content_dir,
        thumbnail_sizes: config.thumbnail_sizes(),
        image_sizes: config.image_sizes(),
        now,
    };
    let mut thumbnails = ValueThumbnailCache::new(&store, &storage, config.thumbnail_sizes());

    report.stage(Stage::Files);
    options::export_files(&ctx, &mut report)?;

    report.stage(Stage::Categories);
    categories::export_categories(&ctx, &mut report)?;

    report.stage(Stage::Products);
    products::export_products(&ctx, &mut thumbnails, &mut report)?;

    report.stage(Stage::Options);
    options::export_options(&ctx, &mut thumbnails, &mut report)?;

    report.stage(Stage::Transports);
    options::export_transports(&ctx, &mut report)?;

    report.elapsed = started.elapsed();
    info!(
        elapsed_ms = report.elapsed.as_millis() as u64,
        warnings = report.warnings.len(),
        "render finished"
    );
    report.progress = None;
    Ok(report)
}

fn remove_subtree(dir: &Path) -> Result<(), RenderError> {
    if !dir.exists() {
        return Ok(());
    }
    info!(path = %dir.display(), "removing");
    std::fs::remove_dir_all(dir).map_err(|source| RenderError::Remove {
        path: dir.to_path_buf(),
        source,
    })
}

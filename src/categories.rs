//! Category exporter.
//!
//! Writes one `_index<lang>.html` per category and language under the
//! category's breadcrumb directory. A page that already exists is left
//! untouched: the product exporter merges facets into it afterwards, and a
//! second run must not reset what the first run aggregated.

use crate::breadcrumbs::Breadcrumbs;
use crate::content::{CategoryFile, DimensionRanges, Range, write_if_absent};
use crate::metadata::resolve;
use crate::model::Category;
use crate::render::{
    CATEGORIES_DIR, ExportContext, RenderError, RenderReport, ensure_dir, page_name,
};
use tracing::debug;

pub fn export_categories(
    ctx: &ExportContext<'_>,
    report: &mut RenderReport,
) -> Result<(), RenderError> {
    for category in ctx.tree.categories() {
        let crumbs = match ctx.tree.resolve(category.id, None) {
            Ok(crumbs) => crumbs,
            Err(e) => {
                report.warn(format!("category {} skipped: {e}", category.id));
                continue;
            }
        };

        let dir = crumbs.dir(&ctx.content_dir);
        ensure_dir(&dir)?;

        let thumbnail = ctx
            .publish_image(
                category.thumbnail.as_deref(),
                CATEGORIES_DIR,
                &ctx.thumbnail_sizes,
                report,
                &format!("category {} thumbnail", category.id),
            )
            .map(|image| image.srcset())
            .unwrap_or_default();

        let page = category_page(category, &crumbs, thumbnail, ctx.config.flat_url);
        for language in ctx.languages {
            let path = dir.join(page_name("_index", language));
            match write_if_absent(&path, &page) {
                Ok(outcome) => {
                    debug!(path = %path.display(), ?outcome, "category page");
                    report.categories.record(outcome);
                }
                Err(e) => report.warn(format!("category {}: {e}", category.id)),
            }
        }
    }
    Ok(())
}

/// A fresh category page with empty aggregates.
pub fn category_page(
    category: &Category,
    crumbs: &Breadcrumbs,
    thumbnail: String,
    flat_url: bool,
) -> CategoryFile {
    CategoryFile {
        id: category.id,
        date: category.updated_at,
        title: resolve(&[Some(category.title.as_str()), Some(category.name.as_str())])
            .unwrap_or_default(),
        description: category.description.clone(),
        thumbnail,
        path: crumbs.path(),
        url: flat_url.then(|| crumbs.url(true)),
        kind: CategoryFile::KIND.to_string(),
        content: category.description.clone(),
        base_price_min: None,
        base_price_max: None,
        price: Range::default(),
        dimensions: DimensionRanges::default(),
        weight: Range::default(),
        options: Vec::new(),
    }
}

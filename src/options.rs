//! Option and value pages, transport thumbnails and global attachments.
//!
//! ```text
//! content/options/<option>/_index<lang>.html          OptionPage
//! content/options/<option>/<value>/index<lang>.html   ValuePage
//! static/images/transports/...                        transport thumbnails
//! static/files/...                                    global attachments
//! ```
//!
//! Option and value pages are created once; `render --remove` deletes the
//! whole options subtree first so they are regenerated.

use crate::cache::VALUES_DIR;
use crate::content::{FacetValue, OptionPage, ValuePage, write_if_absent};
use crate::facets::ValueThumbnails;
use crate::metadata::resolve;
use crate::model::{CatalogOption, Value};
use crate::render::{
    ExportContext, OPTIONS_DIR, RenderError, RenderReport, TRANSPORTS_DIR, ensure_dir, page_name,
};

/// Publish every global attachment into the files directory.
pub fn export_files(ctx: &ExportContext<'_>, report: &mut RenderReport) -> Result<(), RenderError> {
    for file in ctx.store.files()? {
        ctx.publish_file(&file.path, report, &format!("file {}", file.id));
    }
    Ok(())
}

/// Publish thumbnails of enabled transport methods.
pub fn export_transports(
    ctx: &ExportContext<'_>,
    report: &mut RenderReport,
) -> Result<(), RenderError> {
    for transport in ctx.store.transports()?.iter().filter(|t| t.enabled) {
        let published = ctx.publish_image(
            transport.thumbnail.as_deref(),
            TRANSPORTS_DIR,
            &ctx.thumbnail_sizes,
            report,
            &format!("transport {} thumbnail", transport.id),
        );
        if published.is_some() {
            report.transports += 1;
        }
    }
    Ok(())
}

pub fn export_options(
    ctx: &ExportContext<'_>,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) -> Result<(), RenderError> {
    let root = ctx.content_dir.join(OPTIONS_DIR);
    for option in ctx.store.options()? {
        let dir = root.join(&option.name);
        ensure_dir(&dir)?;

        let thumbnail = ctx
            .publish_image(
                option.thumbnail.as_deref(),
                VALUES_DIR,
                &ctx.thumbnail_sizes,
                report,
                &format!("option {} thumbnail", option.id),
            )
            .map(|image| image.srcset())
            .unwrap_or_default();

        let mut values = Vec::with_capacity(option.values.len());
        for value in &option.values {
            values.push(FacetValue {
                id: value.id,
                thumbnail: thumbnails.resolve(value, report),
                title: value_title(value),
                value: value.value.clone(),
            });
        }

        let page = option_page(&option, thumbnail, values.clone());
        for language in ctx.languages {
            let path = dir.join(page_name("_index", language));
            match write_if_absent(&path, &page) {
                Ok(outcome) => report.options.record(outcome),
                Err(e) => report.warn(format!("option {}: {e}", option.id)),
            }
        }

        for (value, facet) in option.values.iter().zip(&values) {
            let value_dir = dir.join(&value.name);
            ensure_dir(&value_dir)?;
            let page = ValuePage {
                id: value.id,
                date: option.updated_at,
                title: facet.title.clone(),
                kind: ValuePage::KIND.to_string(),
                option: option.name.clone(),
                name: value.name.clone(),
                value: value.value.clone(),
                description: value.description.clone(),
                thumbnail: facet.thumbnail.clone(),
            };
            for language in ctx.languages {
                let path = value_dir.join(page_name("index", language));
                match write_if_absent(&path, &page) {
                    Ok(outcome) => report.values.record(outcome),
                    Err(e) => report.warn(format!("value {}: {e}", value.id)),
                }
            }
        }
    }
    Ok(())
}

fn value_title(value: &Value) -> String {
    resolve(&[
        Some(value.title.as_str()),
        Some(value.name.as_str()),
        Some(value.value.as_str()),
    ])
    .unwrap_or_default()
}

fn option_page(option: &CatalogOption, thumbnail: String, values: Vec<FacetValue>) -> OptionPage {
    OptionPage {
        id: option.id,
        date: option.updated_at,
        title: resolve(&[Some(option.title.as_str()), Some(option.name.as_str())])
            .unwrap_or_default(),
        kind: OptionPage::KIND.to_string(),
        name: option.name.clone(),
        widget: option.kind.clone(),
        description: option.description.clone(),
        thumbnail,
        values,
    }
}

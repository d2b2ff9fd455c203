//! Product exporter.
//!
//! For every enabled product:
//!
//! 1. resolve the trail of each owning category (broken trails are skipped
//!    with a warning; a product with none left writes nothing)
//! 2. publish images, files and variation thumbnails once
//! 3. per owning category: merge facets into the category page of every
//!    language (a page without a thumbnail inherits the trail's), write `<crumbs...>/<product>/index<lang>.html` and a
//!    `cache_products` row
//!
//! The first owning category is the primary one. Its page URL becomes the
//! canonical URL that every page of the product points to.
//!
//! ## Variations
//!
//! The view always starts with the synthetic `default` variation (id 0),
//! built from the product's own price, dimensions, images and properties.
//! Explicit variations follow in store order. The first explicit variation
//! is pre-selected when there is one, otherwise the default is. The headline
//! price follows the same rule, while the cache row keeps the lowest base
//! price across purchasable variations.

use crate::breadcrumbs::Breadcrumbs;
use crate::content::{
    CategoryFile, DimensionsView, FileView, ImageView, ParameterView, PriceView, ProductFile,
    ProductView, PropertyView, ValueView, VariationView, read_document, write_if_changed,
};
use crate::facets::{ValueThumbnails, merge_facets, priced_variants};
use crate::metadata::{parse_custom_parameters, resolve};
use crate::model::{Dimensions, File, Image, Pricing, Product, Property};
use crate::render::{
    CATEGORIES_DIR, ExportContext, PRODUCTS_DIR, RenderError, RenderReport, VARIATIONS_DIR,
    ensure_dir, page_name,
};
use crate::store::{CacheImage, CacheProduct, CacheVariation};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the synthetic variation.
pub const DEFAULT_VARIATION: &str = "default";

pub fn export_products(
    ctx: &ExportContext<'_>,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) -> Result<(), RenderError> {
    for summary in ctx.store.product_summaries()? {
        if !summary.enabled {
            continue;
        }
        let product = ctx.store.product(summary.id)?;
        export_product(ctx, &product, thumbnails, report)?;
    }
    Ok(())
}

/// A category the product is listed in.
struct Placement {
    category_id: i64,
    crumbs: Breadcrumbs,
}

impl Placement {
    fn category_dir(&self, content_dir: &Path) -> PathBuf {
        self.crumbs.dir(content_dir)
    }

    fn url(&self, product: &Product, flat: bool) -> String {
        format!("{}{}/", self.crumbs.url(flat), product.name)
    }
}

pub fn export_product(
    ctx: &ExportContext<'_>,
    product: &Product,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) -> Result<(), RenderError> {
    let fallback = product.thumbnail_image().map(|image| image.path.as_str());
    let mut placements = Vec::with_capacity(product.categories.len());
    for category in &product.categories {
        match ctx.tree.resolve(category.id, fallback) {
            Ok(crumbs) => placements.push(Placement {
                category_id: category.id,
                crumbs,
            }),
            Err(e) => report.warn(format!(
                "product {} in category {}: {e}",
                product.id, category.id
            )),
        }
    }
    let Some(primary) = placements.first() else {
        debug!(product = product.id, "no resolvable category");
        return Ok(());
    };

    let flat = ctx.config.flat_url;
    let canonical = primary.url(product, flat);
    let mut view = build_view(ctx, product, thumbnails, report);
    let headline = headline_pricing(product);
    let min_price = priced_variants(product)
        .iter()
        .map(|(pricing, _)| pricing.base_price)
        .fold(f64::INFINITY, f64::min);
    let titles: Vec<String> = placements
        .iter()
        .map(|p| p.crumbs.leaf().title.clone())
        .collect();
    let tags: Vec<String> = product
        .tags
        .iter()
        .filter(|t| t.enabled)
        .filter_map(|t| resolve(&[Some(t.title.as_str()), Some(t.name.as_str())]))
        .collect();

    for placement in &placements {
        let category_dir = placement.category_dir(&ctx.content_dir);
        let dir = category_dir.join(&product.name);
        ensure_dir(&dir)?;

        let inherited = placement.crumbs.leaf().thumbnail.as_deref();
        for language in ctx.languages {
            let path = category_dir.join(page_name("_index", language));
            merge_into_category(ctx, &path, product, inherited, thumbnails, report);
        }

        let url = placement.url(product, flat);
        view.category_id = placement.category_id;
        view.path = url.clone();
        let page = ProductFile {
            id: product.id,
            date: product.created_at,
            title: view.title.clone(),
            kind: ProductFile::KIND.to_string(),
            category_id: placement.category_id,
            canonical: Some(canonical.clone()),
            categories: titles.clone(),
            thumbnail: view.thumbnail.clone(),
            base_price: headline.base_price,
            sale_price: headline.sale_price,
            start: headline.start,
            end: headline.end,
            content: product.content.clone(),
            tags: tags.clone(),
            url: flat.then(|| url.clone()),
            product: view.clone(),
        };
        for language in ctx.languages {
            let path = dir.join(page_name("index", language));
            match write_if_changed(&path, &page) {
                Ok(outcome) => {
                    debug!(path = %path.display(), ?outcome, "product page");
                    report.products.record(outcome);
                }
                Err(e) => report.warn(format!("product {}: {e}", product.id)),
            }
        }

        ctx.store.insert_cache_product(&CacheProduct {
            product_id: product.id,
            category_id: placement.category_id,
            path: url,
            name: product.name.clone(),
            title: view.title.clone(),
            thumbnail: view.thumbnail.clone(),
            images: view
                .images
                .iter()
                .map(|i| i.url.as_str())
                .collect::<Vec<_>>()
                .join(","),
            variations: variation_descriptors(&view.variations),
            base_price: min_price,
        })?;
    }

    for variation in &view.variations {
        ctx.store.insert_cache_variation(&CacheVariation {
            variation_id: variation.id,
            product_id: product.id,
            name: variation.name.clone(),
            title: variation.title.clone(),
            thumbnail: variation.thumbnail.clone(),
            base_price: variation.base_price,
        })?;
    }
    for image in &view.images {
        ctx.store.insert_cache_image(&CacheImage {
            image_id: image.id,
            name: image.name.clone(),
            path: image.url.clone(),
            thumbnail: image.thumbnail.clone(),
        })?;
    }
    Ok(())
}

/// Read a category page, merge `product` into it and write it back when
/// it changed. The page must have been written by the category exporter.
///
/// A page without a thumbnail takes `inherited`, the resolved crumb
/// thumbnail, which falls back to the product's image.
fn merge_into_category(
    ctx: &ExportContext<'_>,
    path: &Path,
    product: &Product,
    inherited: Option<&str>,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) {
    let mut file: CategoryFile = match read_document(path) {
        Ok(file) => file,
        Err(e) => {
            report.warn(format!("product {} facets: {e}", product.id));
            return;
        }
    };
    if file.thumbnail.is_empty() {
        if let Some(image) = ctx.publish_image(
            inherited,
            CATEGORIES_DIR,
            &ctx.thumbnail_sizes,
            report,
            &format!("category {} thumbnail", file.id),
        ) {
            file.thumbnail = image.srcset();
        }
    }
    merge_facets(&mut file, product, thumbnails, report, ctx.now);
    if let Err(e) = write_if_changed(path, &file) {
        report.warn(format!("product {} facets: {e}", product.id));
    }
}

/// Pricing shown on the page: the first explicit variation, else the product.
pub fn headline_pricing(product: &Product) -> &Pricing {
    product
        .variations
        .first()
        .map(|v| &v.pricing)
        .unwrap_or(&product.pricing)
}

fn variation_descriptors(variations: &[VariationView]) -> String {
    variations
        .iter()
        .map(|v| format!("{}:{}:{}", v.id, v.name, v.base_price))
        .collect::<Vec<_>>()
        .join(";")
}

/// Build the product view with published assets and the default variation.
pub fn build_view(
    ctx: &ExportContext<'_>,
    product: &Product,
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) -> ProductView {
    let owner = format!("product {}", product.id);
    let images = image_views(ctx, &product.images, PRODUCTS_DIR, report, &owner);
    let files = file_views(ctx, &product.files, report, &owner);
    let thumbnail = product
        .thumbnail_image()
        .and_then(|image| images.iter().find(|v| v.id == image.id))
        .map(|v| v.thumbnail.clone())
        .unwrap_or_default();
    let title = resolve(&[Some(product.title.as_str()), Some(product.name.as_str())])
        .unwrap_or_default();

    let mut variations = Vec::with_capacity(product.variations.len() + 1);
    variations.push(VariationView {
        id: 0,
        name: DEFAULT_VARIATION.to_string(),
        title: title.clone(),
        description: product.description.clone(),
        base_price: product.pricing.base_price,
        dimensions: dimensions_view(&product.dimensions),
        availability: product.availability.clone(),
        sending: product.sending.clone(),
        selected: product.variations.is_empty(),
        images: images.clone(),
        files: files.clone(),
        sale_price: product.pricing.sale_price,
        start: product.pricing.start,
        end: product.pricing.end,
        thumbnail: thumbnail.clone(),
        properties: property_views(&product.properties, thumbnails, report),
    });

    for (index, variation) in product.variations.iter().enumerate() {
        let owner = format!("variation {}", variation.id);
        let variation_thumbnail = ctx
            .publish_image(
                variation.thumbnail.as_deref(),
                VARIATIONS_DIR,
                &ctx.thumbnail_sizes,
                report,
                &owner,
            )
            .map(|image| image.srcset())
            .unwrap_or_default();
        variations.push(VariationView {
            id: variation.id,
            name: variation.name.clone(),
            title: resolve(&[Some(variation.title.as_str()), Some(variation.name.as_str())])
                .unwrap_or_default(),
            description: variation.description.clone(),
            base_price: variation.pricing.base_price,
            dimensions: dimensions_view(&variation.dimensions),
            availability: variation.availability.clone(),
            sending: variation.sending.clone(),
            selected: index == 0,
            images: image_views(ctx, &variation.images, VARIATIONS_DIR, report, &owner),
            files: file_views(ctx, &variation.files, report, &owner),
            sale_price: variation.pricing.sale_price,
            start: variation.pricing.start,
            end: variation.pricing.end,
            thumbnail: variation_thumbnail,
            properties: property_views(&variation.properties, thumbnails, report),
        });
    }

    let parameters = product
        .parameters
        .iter()
        .map(|p| {
            let option = p.option.as_ref();
            let value = p.value.as_ref();
            ParameterView {
                id: p.id,
                name: resolve(&[Some(p.name.as_str()), option.map(|o| o.name.as_str())])
                    .unwrap_or_default(),
                title: resolve(&[
                    Some(p.title.as_str()),
                    option.map(|o| o.title.as_str()),
                    Some(p.name.as_str()),
                ])
                .unwrap_or_default(),
                value: resolve(&[
                    value.map(|v| v.title.as_str()),
                    value.map(|v| v.name.as_str()),
                    Some(p.custom_value.as_str()),
                ])
                .unwrap_or_default(),
                filterable: p.filterable,
            }
        })
        .collect();

    ProductView {
        id: product.id,
        category_id: 0,
        name: product.name.clone(),
        title,
        thumbnail,
        images,
        files,
        parameters,
        custom_parameters: parse_custom_parameters(&product.custom_parameters),
        variations,
        path: String::new(),
    }
}

fn image_views(
    ctx: &ExportContext<'_>,
    images: &[Image],
    dest_dir: &str,
    report: &mut RenderReport,
    owner: &str,
) -> Vec<ImageView> {
    let mut views = Vec::with_capacity(images.len());
    for image in images {
        let label = format!("{owner} image {}", image.id);
        if let Some(published) =
            ctx.publish_image(Some(image.path.as_str()), dest_dir, &ctx.image_sizes, report, &label)
        {
            views.push(ImageView {
                id: image.id,
                name: image.name.clone(),
                url: published.url.clone(),
                thumbnail: published.srcset(),
            });
        }
    }
    views
}

fn file_views(
    ctx: &ExportContext<'_>,
    files: &[File],
    report: &mut RenderReport,
    owner: &str,
) -> Vec<FileView> {
    let mut views = Vec::with_capacity(files.len());
    for file in files {
        let label = format!("{owner} file {}", file.id);
        if let Some(published) = ctx.publish_file(&file.path, report, &label) {
            views.push(FileView {
                id: file.id,
                name: file.name.clone(),
                title: resolve(&[Some(file.title.as_str()), Some(file.name.as_str())])
                    .unwrap_or_default(),
                url: published.url,
                size: file.size,
            });
        }
    }
    views
}

fn dimensions_view(dimensions: &Dimensions) -> DimensionsView {
    DimensionsView {
        width: dimensions.width,
        height: dimensions.height,
        depth: dimensions.depth,
        weight: dimensions.weight,
    }
}

/// Property views; the first value of each property is pre-selected.
/// Disabled values are listed without a thumbnail.
fn property_views(
    properties: &[Property],
    thumbnails: &mut dyn ValueThumbnails,
    report: &mut RenderReport,
) -> Vec<PropertyView> {
    let mut views = Vec::with_capacity(properties.len());
    for property in properties {
        let option = &property.option;
        let mut values = Vec::with_capacity(property.prices.len());
        for (index, price) in property.prices.iter().enumerate() {
            let value = &price.value;
            let thumbnail = if price.enabled {
                thumbnails.resolve(value, report)
            } else {
                String::new()
            };
            values.push(ValueView {
                id: value.id,
                enabled: price.enabled,
                title: resolve(&[Some(value.title.as_str()), Some(value.name.as_str())])
                    .unwrap_or_default(),
                value: value.value.clone(),
                availability: price.availability.clone(),
                sending: price.sending.clone(),
                price: PriceView {
                    id: price.id,
                    price: price.price,
                    availability: price.availability.clone(),
                    sending: price.sending.clone(),
                },
                thumbnail,
                selected: index == 0,
            });
        }
        views.push(PropertyView {
            id: property.id,
            kind: option.kind.clone(),
            name: resolve(&[Some(property.name.as_str()), Some(option.name.as_str())])
                .unwrap_or_default(),
            title: resolve(&[
                Some(property.title.as_str()),
                Some(option.title.as_str()),
                Some(property.name.as_str()),
            ])
            .unwrap_or_default(),
            values,
        });
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breadcrumbs::CategoryTree;
    use crate::categories::export_categories;
    use crate::imaging::backend::tests::MockBackend;
    use crate::model::{Category, Price, Variation};
    use crate::render::PageCounts;
    use crate::test_helpers::{
        bare_product, category, context_parts, option, value, write_test_jpeg,
    };
    use std::collections::HashMap;

    #[derive(Default)]
    struct CountingThumbnails {
        calls: HashMap<i64, usize>,
    }

    impl ValueThumbnails for CountingThumbnails {
        fn resolve(&mut self, value: &crate::model::Value, _: &mut RenderReport) -> String {
            *self.calls.entry(value.id).or_default() += 1;
            format!("thumb-{}", value.id)
        }
    }

    fn tree() -> CategoryTree {
        CategoryTree::new(
            vec![
                category(1, "living-areas", None, None),
                category(2, "dining-room", Some(1), None),
                category(3, "kitchen", Some(1), None),
                category(4, "loop", Some(4), None),
            ],
            "Products",
        )
    }

    fn placed(mut product: Product, ids: &[i64]) -> Product {
        let tree = tree();
        product.categories = ids
            .iter()
            .map(|&id| {
                tree.get(id)
                    .cloned()
                    .unwrap_or_else(|| category(id, "missing", None, None))
            })
            .collect::<Vec<Category>>();
        product
    }

    fn variation(id: i64, name: &str, base_price: f64) -> Variation {
        Variation {
            id,
            name: name.to_string(),
            title: String::new(),
            description: String::new(),
            thumbnail: None,
            pricing: Pricing {
                base_price,
                ..Pricing::default()
            },
            dimensions: Dimensions::default(),
            availability: String::new(),
            sending: String::new(),
            images: Vec::new(),
            files: Vec::new(),
            properties: Vec::new(),
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    #[test]
    fn default_variation_is_always_present() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        let mut product = bare_product(7, "chair");
        product.pricing.base_price = 120.0;

        let view = build_view(&ctx, &product, &mut CountingThumbnails::default(), &mut report);

        assert_eq!(view.variations.len(), 1);
        assert_eq!(view.variations[0].id, 0);
        assert_eq!(view.variations[0].name, "default");
        assert_eq!(view.variations[0].base_price, 120.0);
        assert!(view.variations[0].selected);
    }

    #[test]
    fn first_explicit_variation_is_selected_and_headline() {
        let mut product = bare_product(7, "chair");
        product.pricing.base_price = 50.0;
        product.variations = vec![variation(10, "small", 80.0), variation(11, "large", 60.0)];

        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let view = build_view(
            &ctx,
            &product,
            &mut CountingThumbnails::default(),
            &mut RenderReport::default(),
        );

        let selected: Vec<(i64, bool)> = view.variations.iter().map(|v| (v.id, v.selected)).collect();
        assert_eq!(selected, vec![(0, false), (10, true), (11, false)]);
        assert_eq!(headline_pricing(&product).base_price, 80.0);
    }

    #[test]
    fn default_variation_reuses_product_images() {
        let parts = context_parts(false);
        write_test_jpeg(&parts.storage_dir().join("products/chair.jpg"), 40, 30);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut product = bare_product(7, "chair");
        product.images = vec![Image {
            id: 3,
            name: "chair".into(),
            path: "products/chair.jpg".into(),
        }];

        let view = build_view(
            &ctx,
            &product,
            &mut CountingThumbnails::default(),
            &mut RenderReport::default(),
        );

        assert_eq!(view.images.len(), 1);
        assert!(view.images[0].url.starts_with("/images/products/chair_"));
        assert_eq!(view.thumbnail, view.images[0].thumbnail);
        assert_eq!(view.variations[0].images, view.images);
        // 3 image sizes, published once.
        assert_eq!(backend.resize_count(), 3);
    }

    #[test]
    fn property_values_preselect_first_and_skip_disabled_thumbnails() {
        let color = option(5, "body-color");
        let mut product = bare_product(7, "chair");
        product.properties = vec![Property {
            id: 1,
            name: String::new(),
            title: String::new(),
            option: color.clone(),
            filterable: true,
            prices: vec![
                Price {
                    id: 1,
                    enabled: true,
                    price: 0.0,
                    availability: String::new(),
                    sending: String::new(),
                    value: value(1, "RAL9010", None),
                },
                Price {
                    id: 2,
                    enabled: false,
                    price: 25.0,
                    availability: String::new(),
                    sending: String::new(),
                    value: value(2, "RAL9001", None),
                },
            ],
        }];
        let mut thumbs = CountingThumbnails::default();

        let views = property_views(&product.properties, &mut thumbs, &mut RenderReport::default());

        assert_eq!(views[0].name, "body-color");
        let values = &views[0].values;
        assert!(values[0].selected);
        assert!(!values[1].selected);
        assert_eq!(values[0].thumbnail, "thumb-1");
        assert_eq!(values[1].thumbnail, "");
        assert_eq!(thumbs.calls.get(&2), None);
    }

    #[test]
    fn custom_parameters_and_enabled_tags() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();

        let mut product = placed(bare_product(7, "chair"), &[2]);
        product.custom_parameters = "Seat height: 45 cm\nnonsense\nLegs: 4".into();
        product.tags = vec![
            crate::model::Tag {
                id: 1,
                name: "new".into(),
                title: "New".into(),
                enabled: true,
            },
            crate::model::Tag {
                id: 2,
                name: "hidden".into(),
                title: "Hidden".into(),
                enabled: false,
            },
        ];

        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        let page: ProductFile = read_document(
            &ctx.content_dir
                .join("products/living-areas/dining-room/chair/index.html"),
        )
        .unwrap();
        assert_eq!(page.tags, vec!["New"]);
        let keys: Vec<&str> = page
            .product
            .custom_parameters
            .iter()
            .map(|kv| kv.key.as_str())
            .collect();
        assert_eq!(keys, vec!["Seat height", "Legs"]);
    }

    // =========================================================================
    // Placement
    // =========================================================================

    #[test]
    fn canonical_points_at_primary_category() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();

        let product = placed(bare_product(7, "chair"), &[2, 3]);
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        let base = ctx.content_dir.join("products/living-areas");
        let primary: ProductFile = read_document(&base.join("dining-room/chair/index.html")).unwrap();
        let secondary: ProductFile = read_document(&base.join("kitchen/chair/index.html")).unwrap();
        let canonical = "/products/living-areas/dining-room/chair/";
        assert_eq!(primary.canonical.as_deref(), Some(canonical));
        assert_eq!(secondary.canonical.as_deref(), Some(canonical));
        assert_eq!(secondary.category_id, 3);
        assert_eq!(secondary.product.path, "/products/living-areas/kitchen/chair/");
        assert_eq!(secondary.categories, vec!["Dining Room", "Kitchen"]);
        assert_eq!(ctx.store.cache_products().unwrap().len(), 2);
    }

    #[test]
    fn flat_urls_drop_the_root_crumb() {
        let mut parts = context_parts(false);
        parts.config.flat_url = true;
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();

        let product = placed(bare_product(7, "chair"), &[2, 3]);
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        let base = ctx.content_dir.join("products/living-areas");
        let primary: ProductFile = read_document(&base.join("dining-room/chair/index.html")).unwrap();
        let secondary: ProductFile = read_document(&base.join("kitchen/chair/index.html")).unwrap();
        assert_eq!(primary.url.as_deref(), Some("/living-areas/dining-room/chair/"));
        assert_eq!(secondary.url.as_deref(), Some("/living-areas/kitchen/chair/"));
        assert_eq!(
            secondary.canonical.as_deref(),
            Some("/living-areas/dining-room/chair/")
        );
        assert_eq!(secondary.product.path, "/living-areas/kitchen/chair/");
    }

    #[test]
    fn nested_urls_leave_page_url_unset() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();

        let product = placed(bare_product(7, "chair"), &[2]);
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        let page: ProductFile = read_document(
            &ctx.content_dir
                .join("products/living-areas/dining-room/chair/index.html"),
        )
        .unwrap();
        assert_eq!(page.url, None);
    }

    #[test]
    fn category_without_thumbnail_inherits_product_image() {
        let parts = context_parts(false);
        write_test_jpeg(&parts.storage_dir().join("products/chair.jpg"), 40, 30);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();

        let mut product = placed(bare_product(7, "chair"), &[2]);
        product.images = vec![Image {
            id: 3,
            name: "chair".into(),
            path: "products/chair.jpg".into(),
        }];
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        let page: CategoryFile = read_document(
            &ctx.content_dir
                .join("products/living-areas/dining-room/_index.html"),
        )
        .unwrap();
        assert!(page.thumbnail.starts_with("/images/categories/chair_"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn broken_category_is_skipped_with_warning() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();
        let before = report.warnings.len();

        let product = placed(bare_product(7, "chair"), &[4, 3]);
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        assert_eq!(report.warnings.len(), before + 1);
        let page: ProductFile = read_document(
            &ctx.content_dir.join("products/living-areas/kitchen/chair/index.html"),
        )
        .unwrap();
        assert_eq!(
            page.canonical.as_deref(),
            Some("/products/living-areas/kitchen/chair/")
        );
    }

    #[test]
    fn product_without_categories_writes_nothing() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();

        export_product(
            &ctx,
            &bare_product(7, "chair"),
            &mut CountingThumbnails::default(),
            &mut report,
        )
        .unwrap();

        assert_eq!(report.products, PageCounts::default());
        assert!(report.warnings.is_empty());
        assert!(ctx.store.cache_products().unwrap().is_empty());
    }

    #[test]
    fn missing_category_page_is_a_warning() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();

        let product = placed(bare_product(7, "chair"), &[2]);
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("facets"));
        assert_eq!(report.products.written, 1);
    }

    #[test]
    fn unchanged_product_page_is_not_rewritten() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();
        let product = placed(bare_product(7, "chair"), &[2]);

        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();
        let mut again = RenderReport::default();
        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut again).unwrap();

        assert_eq!(again.products.written, 0);
        assert_eq!(again.products.skipped, 1);
    }

    #[test]
    fn cache_row_keeps_lowest_variation_price() {
        let parts = context_parts(false);
        let backend = MockBackend::new();
        let storage = parts.storage(&backend);
        let tree = tree();
        let ctx = parts.context(&storage, &tree);
        let mut report = RenderReport::default();
        export_categories(&ctx, &mut report).unwrap();
        let mut product = placed(bare_product(7, "chair"), &[2]);
        product.variations = vec![variation(10, "small", 80.0), variation(11, "large", 60.0)];

        export_product(&ctx, &product, &mut CountingThumbnails::default(), &mut report).unwrap();

        let rows = ctx.store.cache_products().unwrap();
        assert_eq!(rows[0].base_price, 60.0);
        assert_eq!(rows[0].variations, "0:default:0;10:small:80;11:large:60");
        let page: ProductFile = read_document(
            &ctx.content_dir
                .join("products/living-areas/dining-room/chair/index.html"),
        )
        .unwrap();
        assert_eq!(page.base_price, 80.0);
    }
}

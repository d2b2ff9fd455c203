//! Breadcrumb resolution.
//!
//! A breadcrumb trail is the ordered ancestor chain of a category, root
//! first. It drives output paths (`content/<names...>/`) and page URLs.
//!
//! ## Walk
//!
//! Parents are followed iteratively from the leaf with a visited set, so a
//! parent cycle in the catalog yields [`BreadcrumbError::CyclicCategoryGraph`]
//! instead of an endless loop. A parent id that does not exist yields
//! [`BreadcrumbError::UnknownCategory`]. Parent `0` is treated as "no parent".
//!
//! ## Root crumb
//!
//! When `products_root` is configured, a synthetic crumb (id 0, slug of the
//! configured title) is prepended. Flat URLs leave it out of the URL but
//! keep it in the output path.
//!
//! ## Thumbnail inheritance
//!
//! Walking leaf to root, a crumb without its own thumbnail takes the one of
//! the crumb resolved just before it (the more specific one). The leaf falls
//! back to the thumbnail passed by the caller, typically a product image.

use crate::model::Category;
use crate::naming::{slugify, url_path};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BreadcrumbError {
    #[error("category {category_id} is part of a parent cycle")]
    CyclicCategoryGraph { category_id: i64 },
    #[error("category {0} does not exist")]
    UnknownCategory(i64),
}

/// One step of a trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// Category id, `0` for the synthetic root.
    pub id: i64,
    /// Slug, used as directory name and URL segment.
    pub name: String,
    pub title: String,
    /// Own or inherited thumbnail, relative to blob storage.
    pub thumbnail: Option<String>,
}

/// A resolved trail, root first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumbs {
    crumbs: Vec<Crumb>,
    has_root: bool,
}

impl Breadcrumbs {
    pub fn crumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    /// The category the trail was resolved for.
    pub fn leaf(&self) -> &Crumb {
        // Construction guarantees at least the leaf.
        &self.crumbs[self.crumbs.len() - 1]
    }

    /// Slash-joined names, e.g. `products/living-areas/dining-room`.
    pub fn path(&self) -> String {
        self.crumbs
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Output directory for this trail under `content_dir`.
    pub fn dir(&self, content_dir: &Path) -> PathBuf {
        self.crumbs
            .iter()
            .fold(content_dir.to_path_buf(), |dir, c| dir.join(&c.name))
    }

    /// Page URL. Flat URLs omit the synthetic root segment.
    pub fn url(&self, flat: bool) -> String {
        let skip = usize::from(flat && self.has_root);
        let names: Vec<&str> = self.crumbs[skip..].iter().map(|c| c.name.as_str()).collect();
        url_path(&names)
    }

    pub fn titles(&self) -> Vec<String> {
        self.crumbs.iter().map(|c| c.title.clone()).collect()
    }
}

/// Category lookup built once per run.
pub struct CategoryTree {
    categories: HashMap<i64, Category>,
    order: Vec<i64>,
    root: Option<Crumb>,
}

impl CategoryTree {
    /// Index `categories`; a non-empty `products_root` enables the root crumb.
    pub fn new(categories: Vec<Category>, products_root: &str) -> Self {
        let order = categories.iter().map(|c| c.id).collect();
        let root = (!products_root.trim().is_empty()).then(|| Crumb {
            id: 0,
            name: slugify(products_root),
            title: products_root.trim().to_string(),
            thumbnail: None,
        });
        Self {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            order,
            root,
        }
    }

    pub fn get(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Categories in store order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.order.iter().filter_map(|id| self.categories.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve the trail of `category_id`, root first.
    pub fn resolve(
        &self,
        category_id: i64,
        fallback_thumbnail: Option<&str>,
    ) -> Result<Breadcrumbs, BreadcrumbError> {
        let mut visited = HashSet::new();
        let mut reversed: Vec<Crumb> = Vec::new();
        let mut inherited = fallback_thumbnail.map(str::to_string);
        let mut current = Some(category_id);

        while let Some(id) = current {
            let category = self
                .categories
                .get(&id)
                .ok_or(BreadcrumbError::UnknownCategory(id))?;
            if !visited.insert(id) {
                return Err(BreadcrumbError::CyclicCategoryGraph { category_id });
            }
            let thumbnail = category
                .thumbnail
                .clone()
                .filter(|t| !t.is_empty())
                .or(inherited);
            inherited = thumbnail.clone();
            reversed.push(Crumb {
                id: category.id,
                name: category.name.clone(),
                title: category.title.clone(),
                thumbnail,
            });
            current = category.parent_id.filter(|&p| p != 0);
        }

        if let Some(root) = &self.root {
            reversed.push(Crumb {
                thumbnail: inherited,
                ..root.clone()
            });
        }
        reversed.reverse();

        Ok(Breadcrumbs {
            crumbs: reversed,
            has_root: self.root.is_some(),
        })
    }

    /// Resolve every category and collect the failures.
    pub fn check_all(&self) -> Vec<(i64, BreadcrumbError)> {
        self.categories()
            .filter_map(|c| self.resolve(c.id, None).err().map(|e| (c.id, e)))
            .collect()
    }
}

//! Export configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! database = "database.sqlite"   # SQLite catalog
//! storage = "storage"            # Blob storage root (original uploads)
//! output = "hugo"                # Site root: content/ and static/ live here
//! products_root = "Products"     # Synthetic root crumb ("" disables it)
//! flat_url = false               # Omit the root crumb from URLs
//!
//! [resize]
//! enabled = true
//! quality = 75                   # JPEG quality (1-100)
//!
//! [resize.thumbnail]
//! enabled = true
//! size = "64x0,128x0"            # WIDTHxHEIGHT list, height 0 keeps aspect
//!
//! [resize.image]
//! enabled = true
//! size = "128x0,256x0,512x0"
//!
//! [i18n]
//! enabled = false
//!
//! [[i18n.languages]]
//! enabled = true
//! name = "Deutsch"
//! code = "de"
//! ```
//!
//! Relative paths are resolved against the directory holding `config.toml`
//! (see [`CatalogConfig::rooted_at`]). Unknown keys are rejected to catch
//! typos early.

use crate::imaging::{Quality, SizeSpec, parse_size_specs};
use crate::naming::language_suffix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Path to the SQLite catalog.
    pub database: String,
    /// Blob storage root. Image and file paths in the catalog are relative to it.
    pub storage: String,
    /// Site generator root. Pages go to `content/`, assets to `static/`.
    pub output: String,
    /// Title of the synthetic root crumb. Empty disables the root crumb.
    pub products_root: String,
    /// Build URLs without the root crumb segment.
    pub flat_url: bool,
    pub resize: ResizeConfig,
    pub i18n: I18nConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: "database.sqlite".to_string(),
            storage: "storage".to_string(),
            output: "hugo".to_string(),
            products_root: "Products".to_string(),
            flat_url: false,
            resize: ResizeConfig::default(),
            i18n: I18nConfig::default(),
        }
    }
}

/// Resized variant settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Master switch. When off, originals are still published.
    pub enabled: bool,
    /// JPEG quality (1-100). PNG output is lossless.
    pub quality: u32,
    /// Sizes for category, variation and value thumbnails.
    pub thumbnail: SizeListConfig,
    /// Sizes for product gallery images.
    pub image: SizeListConfig,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: 75,
            thumbnail: SizeListConfig {
                enabled: true,
                size: "64x0,128x0".to_string(),
            },
            image: SizeListConfig {
                enabled: true,
                size: "128x0,256x0,512x0".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeListConfig {
    pub enabled: bool,
    /// Comma-separated `WIDTHxHEIGHT` list.
    pub size: String,
}

impl Default for SizeListConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    pub enabled: bool,
    /// Additional languages. The default language is implicit.
    pub languages: Vec<LanguageConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub name: String,
    pub code: String,
}

fn default_true() -> bool {
    true
}

/// An active output language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Empty for the default language.
    pub code: String,
    pub name: String,
    /// Content file suffix: `""` or `".<code>"`.
    pub suffix: String,
}

impl CatalogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.resize.quality) {
            return Err(ConfigError::Validation(
                "resize.quality must be 1-100".into(),
            ));
        }
        for (key, list) in [
            ("resize.thumbnail.size", &self.resize.thumbnail.size),
            ("resize.image.size", &self.resize.image.size),
        ] {
            parse_size_specs(list).map_err(|token| {
                ConfigError::Validation(format!(
                    "{key}: invalid size '{token}', expected WIDTHxHEIGHT"
                ))
            })?;
        }
        let mut seen = HashSet::new();
        for language in &self.i18n.languages {
            if language.code.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "i18n.languages: language '{}' has an empty code",
                    language.name
                )));
            }
            if !seen.insert(language.code.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "i18n.languages: duplicate code '{}'",
                    language.code
                )));
            }
        }
        Ok(())
    }

    /// Resolve relative paths against `base`. Absolute paths are kept.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        let root = |p: &str| base.join(p).to_string_lossy().into_owned();
        self.database = root(&self.database);
        self.storage = root(&self.storage);
        self.output = root(&self.output);
        self
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database)
    }

    pub fn storage_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage)
    }

    /// Where page documents are written.
    pub fn content_dir(&self) -> PathBuf {
        Path::new(&self.output).join("content")
    }

    /// Where published assets are written. Asset URLs are rooted here.
    pub fn static_dir(&self) -> PathBuf {
        Path::new(&self.output).join("static")
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.resize.quality)
    }

    /// Thumbnail sizes, empty when thumbnail resizing is off.
    pub fn thumbnail_sizes(&self) -> Vec<SizeSpec> {
        enabled_sizes(self.resize.enabled, &self.resize.thumbnail)
    }

    /// Gallery image sizes, empty when image resizing is off.
    pub fn image_sizes(&self) -> Vec<SizeSpec> {
        enabled_sizes(self.resize.enabled, &self.resize.image)
    }

    /// The default language followed by every enabled configured language
    /// when i18n is on.
    pub fn languages(&self) -> Vec<Language> {
        let mut languages = vec![Language {
            code: String::new(),
            name: "default".to_string(),
            suffix: String::new(),
        }];
        if self.i18n.enabled {
            languages.extend(
                self.i18n
                    .languages
                    .iter()
                    .filter(|l| l.enabled)
                    .map(|l| Language {
                        code: l.code.clone(),
                        name: l.name.clone(),
                        suffix: language_suffix(&l.code),
                    }),
            );
        }
        languages
    }
}

fn enabled_sizes(master: bool, list: &SizeListConfig) -> Vec<SizeSpec> {
    if !master || !list.enabled {
        return Vec::new();
    }
    // Validated at load time.
    parse_size_specs(&list.size).unwrap_or_default()
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CatalogConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CatalogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path` and root its relative paths at the file's
/// directory. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    let config = resolve_config(stock_defaults_value()?, overlay)?;
    let base = path.parent().unwrap_or(Path::new(""));
    Ok(config.rooted_at(base))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Catalog Render Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# SQLite catalog database.
database = "database.sqlite"

# Blob storage root. Image and file paths in the catalog are relative to it.
storage = "storage"

# Site generator root. Pages are written to <output>/content,
# published assets to <output>/static.
output = "hugo"

# Title of the synthetic root breadcrumb. Set to "" to disable it.
products_root = "Products"

# Build page URLs without the root breadcrumb segment.
flat_url = false

# ---------------------------------------------------------------------------
# Resized variants
# ---------------------------------------------------------------------------
[resize]
# Master switch. Originals are always published.
enabled = true

# JPEG encoding quality (1 = worst, 100 = best). PNG output is lossless.
quality = 75

# Thumbnails for categories, variations and option values.
# Comma-separated WIDTHxHEIGHT list; a height of 0 keeps the aspect ratio.
[resize.thumbnail]
enabled = true
size = "64x0,128x0"

# Product gallery images.
[resize.image]
enabled = true
size = "128x0,256x0,512x0"

# ---------------------------------------------------------------------------
# Languages
# ---------------------------------------------------------------------------
[i18n]
# When enabled, every enabled language below gets its own content files
# (_index.<code>.html, index.<code>.html) next to the default language.
enabled = false

# [[i18n.languages]]
# enabled = true
# name = "Deutsch"
# code = "de"
"##
}

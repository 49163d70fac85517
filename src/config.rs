//! Generator configuration.
//!
//! Everything that used to be a hard-wired constant of the scan (the URL
//! prefix, reserved directory names, candidate widths, recognized encodings,
//! the location display labels) lives in [`ManifestConfig`] and is handed to
//! the [`Assembler`](crate::manifest::Assembler) at construction. Building two
//! manifests with different settings in one process needs nothing more than
//! two configs.
//!
//! ## Config File Location
//!
//! `manifest.toml` in the content root, or any file passed with `--config`:
//!
//! ```text
//! images/
//! ├── manifest.toml            # Optional, overrides stock defaults
//! ├── Toya/
//! ├── Otaru/
//! ├── food/
//! ├── gallery/
//! └── friends/
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! web_base = "/trip/images"
//!
//! [variants]
//! widths = [400, 800, 1600]
//! ```
//!
//! Tables merge key by key onto the stock defaults. The `collections` table
//! is the exception: when present it replaces the stock labels entirely, so a
//! site about another trip does not inherit them. Unknown keys are rejected
//! to catch typos early.

use crate::types::{Bucket, CollectionLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name inside the content root.
pub const CONFIG_FILENAME: &str = "manifest.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `manifest.toml`.
///
/// All fields have defaults; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// URL prefix for every emitted image path (e.g. `images` or `/trip/images`).
    pub web_base: String,
    /// Name of the per-entity sidecar metadata file.
    pub sidecar: String,
    /// Top-level directories starting with this prefix are skipped.
    pub reserved_prefix: String,
    /// Top-level directory holding food items.
    pub food_dir: String,
    /// Top-level directory of the open photo gallery.
    pub gallery_dir: String,
    /// Top-level directory of the friends-only photo set.
    pub friends_dir: String,
    /// Embed a generation timestamp in the output header.
    pub timestamp: bool,
    /// Variant discovery settings.
    pub variants: VariantsConfig,
    /// Display labels for known location keys.
    pub collections: BTreeMap<String, CollectionLabel>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            web_base: "images".to_string(),
            sidecar: "info.json".to_string(),
            reserved_prefix: "_".to_string(),
            food_dir: "food".to_string(),
            gallery_dir: "gallery".to_string(),
            friends_dir: "friends".to_string(),
            timestamp: true,
            variants: VariantsConfig::default(),
            collections: default_collections(),
        }
    }
}

fn default_collections() -> BTreeMap<String, CollectionLabel> {
    [("Toya", "洞爺湖"), ("Otaru", "小樽"), ("Sapporo", "札幌")]
        .into_iter()
        .map(|(en, zh)| {
            (
                en.to_string(),
                CollectionLabel {
                    en: en.to_string(),
                    zh: zh.to_string(),
                },
            )
        })
        .collect()
}

impl ManifestConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sidecar.trim().is_empty() {
            return Err(ConfigError::Validation("sidecar must not be empty".into()));
        }
        for (key, dir) in [
            ("food_dir", &self.food_dir),
            ("gallery_dir", &self.gallery_dir),
            ("friends_dir", &self.friends_dir),
        ] {
            if dir.is_empty() || dir.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a single directory name, got {dir:?}"
                )));
            }
        }
        self.variants.validate()
    }

    /// Lowercase extensions recognized as images.
    pub fn image_extensions(&self) -> impl Iterator<Item = &str> {
        self.variants.formats.iter().map(|f| f.ext.as_str())
    }

    /// True if `name` has one of the configured image extensions
    /// (case-insensitive).
    pub fn is_image_name(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.image_extensions()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }
}

/// Variant discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantsConfig {
    /// Candidate widths tried as `{stem}-{width}.{ext}`.
    pub widths: Vec<u32>,
    /// Layout hint copied into every descriptor (`sizes` attribute).
    pub sizes: String,
    /// Recognized extensions and the bucket each maps to, in lookup order.
    pub formats: Vec<FormatRule>,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            widths: vec![320, 480, 640, 800, 960, 1200, 1600, 1920, 2400],
            sizes: "(max-width: 768px) 100vw, 50vw".to_string(),
            formats: vec![
                FormatRule::new("avif", Bucket::Avif),
                FormatRule::new("webp", Bucket::Webp),
                FormatRule::new("jpg", Bucket::Jpeg),
                FormatRule::new("jpeg", Bucket::Jpeg),
                FormatRule::new("png", Bucket::Jpeg),
            ],
        }
    }
}

impl VariantsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.widths.is_empty() {
            return Err(ConfigError::Validation(
                "variants.widths must not be empty".into(),
            ));
        }
        // Width markers are recognized as 2-5 digit suffixes
        if let Some(w) = self.widths.iter().find(|w| !(10..=99_999).contains(*w)) {
            return Err(ConfigError::Validation(format!(
                "variants.widths must be between 10 and 99999, got {w}"
            )));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::Validation(
                "variants.formats must not be empty".into(),
            ));
        }
        for rule in &self.formats {
            if rule.ext.is_empty()
                || !rule
                    .ext
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            {
                return Err(ConfigError::Validation(format!(
                    "variants.formats ext must be lowercase alphanumeric, got {:?}",
                    rule.ext
                )));
            }
        }
        Ok(())
    }
}

/// Maps a file extension onto an encoding bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatRule {
    pub ext: String,
    pub bucket: Bucket,
}

impl FormatRule {
    pub fn new(ext: &str, bucket: Bucket) -> Self {
        Self {
            ext: ext.to_string(),
            bucket,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ManifestConfig::default()).expect("default config must serialize")
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
/// Returns `Err` if the file exists but contains invalid TOML.
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
) -> Result<ManifestConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => {
            let base = match (base, ov.get("collections").is_some()) {
                (toml::Value::Table(mut table), true) => {
                    table.remove("collections");
                    toml::Value::Table(table)
                }
                (base, _) => base,
            };
            merge_toml(base, ov)
        }
        None => base,
    };
    let config: ManifestConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to stock defaults when
/// the file does not exist.
pub fn load_config(path: &Path) -> Result<ManifestConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `manifest.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-manifest configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# URL prefix for every image path written to the manifest.
web_base = "images"

# Per-entity metadata file looked up in every spot and food directory.
sidecar = "info.json"

# Top-level directories starting with this prefix are ignored.
reserved_prefix = "_"

# Top-level directories with special meaning. Every other top-level
# directory is scanned as a location.
food_dir = "food"
gallery_dir = "gallery"
friends_dir = "friends"

# Embed the generation time in the output header. Disable for
# byte-identical output across runs.
timestamp = true

# ---------------------------------------------------------------------------
# Responsive variants
# ---------------------------------------------------------------------------
[variants]
# Widths tried as {stem}-{width}.{ext}. Must be 10-99999.
widths = [320, 480, 640, 800, 960, 1200, 1600, 1920, 2400]

# Layout hint copied into every descriptor.
sizes = "(max-width: 768px) 100vw, 50vw"

# Recognized extensions and the encoding bucket each maps to.
# Buckets: avif (next-gen), webp (intermediate), jpeg (baseline).
formats = [
    { ext = "avif", bucket = "avif" },
    { ext = "webp", bucket = "webp" },
    { ext = "jpg", bucket = "jpeg" },
    { ext = "jpeg", bucket = "jpeg" },
    { ext = "png", bucket = "jpeg" },
]

# ---------------------------------------------------------------------------
# Location display labels
# ---------------------------------------------------------------------------
# Replaces the whole table when present. Location directories without an
# entry are still scanned.
[collections.Otaru]
en = "Otaru"
zh = "小樽"

[collections.Sapporo]
en = "Sapporo"
zh = "札幌"

[collections.Toya]
en = "Toya"
zh = "洞爺湖"
"##
}

//! Manifest assembly, rendering, and writing.
//!
//! The [`Assembler`] owns a [`ManifestConfig`] and a [`DirSource`] and walks
//! the content root once:
//!
//! ```text
//! images/
//! ├── _drafts/        # Reserved prefix → skipped
//! ├── Toya/           # Location  → CITY_META key, toyaSpots
//! ├── Otaru/          # Location  → otaruSpots
//! ├── food/           # Food      → foodItems
//! ├── gallery/        # Loose     → galleryImages + galleryImagesMeta
//! └── friends/        # Loose     → friendsPhotos + friendsPhotosMeta
//! ```
//!
//! The resulting [`Manifest`] is rendered either as an ES module (the shape
//! the presentation layer imports) or as plain JSON.
//!
//! Output is deterministic: keyed data lives in `BTreeMap`s, every sort has a
//! full tie-break, and ids are unique per collection. The optional generation
//! timestamp is the only part that changes between runs over the same tree.

use crate::config::ManifestConfig;
use crate::scan::{ScanError, scan_food, scan_location, scan_loose_folder};
use crate::source::DirSource;
use crate::types::{CollectionLabel, FoodItem, Photos, Spot};
use crate::variants::web_join;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything the presentation layer needs, computed fresh from the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// RFC 3339 UTC time of the run, when timestamps are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Display labels per location key, straight from config.
    pub city_meta: BTreeMap<String, CollectionLabel>,
    /// Spots per location key, each list sorted and id-unique.
    pub locations: BTreeMap<String, Vec<Spot>>,
    pub food_items: Vec<FoodItem>,
    pub gallery: Photos,
    pub friends: Photos,
}

impl Manifest {
    /// Total number of photographs across every collection.
    pub fn photo_count(&self) -> usize {
        let spots: usize = self
            .locations
            .values()
            .flatten()
            .map(|s| s.photos.len())
            .sum();
        let food: usize = self.food_items.iter().map(|f| f.photos.len()).sum();
        spots + food + self.gallery.len() + self.friends.len()
    }
}

/// Builds a [`Manifest`] from a content root.
pub struct Assembler<'a> {
    config: ManifestConfig,
    source: &'a dyn DirSource,
}

impl<'a> Assembler<'a> {
    pub fn new(config: ManifestConfig, source: &'a dyn DirSource) -> Self {
        Self { config, source }
    }

    /// True if a top-level directory name is a location collection.
    fn is_location_dir(&self, name: &str) -> bool {
        let reserved =
            !self.config.reserved_prefix.is_empty() && name.starts_with(&self.config.reserved_prefix);
        !reserved
            && !name.starts_with('.')
            && name != self.config.food_dir
            && name != self.config.gallery_dir
            && name != self.config.friends_dir
    }

    /// Location keys: every configured collection plus every location
    /// directory present under `root`, in key order.
    pub fn location_keys(&self, root: &Path) -> Result<Vec<String>, ScanError> {
        let mut keys: BTreeSet<String> = self.config.collections.keys().cloned().collect();
        let entries = self.source.entries(root).map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        keys.extend(
            entries
                .into_iter()
                .filter(|e| e.is_dir() && self.is_location_dir(&e.name))
                .map(|e| e.name),
        );
        Ok(keys.into_iter().collect())
    }

    /// Scan every collection under `root`.
    pub fn assemble(&self, root: &Path) -> Result<Manifest, ManifestError> {
        let config = &self.config;
        let source = self.source;

        let mut locations = BTreeMap::new();
        for key in self.location_keys(root)? {
            let web_base = web_join(&config.web_base, &key);
            let spots = scan_location(source, &root.join(&key), &web_base, config)?;
            info!(location = %key, spots = spots.len(), "scanned location");
            locations.insert(key, spots);
        }

        let food_items = scan_food(
            source,
            &root.join(&config.food_dir),
            &web_join(&config.web_base, &config.food_dir),
            config,
        )?;
        info!(items = food_items.len(), "scanned food");

        let gallery = scan_loose_folder(
            source,
            &root.join(&config.gallery_dir),
            &web_join(&config.web_base, &config.gallery_dir),
            config,
        )?;
        let friends = scan_loose_folder(
            source,
            &root.join(&config.friends_dir),
            &web_join(&config.web_base, &config.friends_dir),
            config,
        )?;
        info!(
            gallery = gallery.len(),
            friends = friends.len(),
            "scanned loose folders"
        );

        let generated_at = config
            .timestamp
            .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        Ok(Manifest {
            generated_at,
            city_meta: config.collections.clone(),
            locations,
            food_items,
            gallery,
            friends,
        })
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Serialization format of the written manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// ES module with named exports.
    #[default]
    Js,
    /// The [`Manifest`] as a pretty-printed JSON document.
    Json,
}

impl OutputFormat {
    /// `.json` → [`OutputFormat::Json`]; anything else → [`OutputFormat::Js`].
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Js,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "js" | "mjs" => Ok(Self::Js),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected js or json)")),
        }
    }
}

const HEADER: &str = "// Auto-generated by gallery-manifest. Do not edit by hand.";

/// Render a manifest in the given format.
pub fn render(manifest: &Manifest, format: OutputFormat) -> Result<String, ManifestError> {
    match format {
        OutputFormat::Js => render_js(manifest),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(manifest)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_js(manifest: &Manifest) -> Result<String, ManifestError> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    if let Some(ts) = &manifest.generated_at {
        out.push_str(&format!("// Generated at {ts}\n"));
    }

    push_export(&mut out, "CITY_META", &manifest.city_meta)?;

    let idents = location_identifiers(manifest.locations.keys().map(String::as_str));
    for (key, spots) in &manifest.locations {
        push_export(&mut out, &idents[key], spots)?;
    }

    out.push_str("\nexport const LOCATIONS = {\n");
    for key in manifest.locations.keys() {
        let quoted = serde_json::to_string(key)?;
        out.push_str(&format!("  {quoted}: {},\n", idents[key]));
    }
    out.push_str("};\n");

    push_export(&mut out, "foodItems", &manifest.food_items)?;
    push_export(&mut out, "galleryImages", &manifest.gallery.urls())?;
    push_export(&mut out, "galleryImagesMeta", &manifest.gallery.metas())?;
    push_export(&mut out, "friendsPhotos", &manifest.friends.urls())?;
    push_export(&mut out, "friendsPhotosMeta", &manifest.friends.metas())?;
    Ok(out)
}

fn push_export<T: Serialize + ?Sized>(
    out: &mut String,
    name: &str,
    value: &T,
) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(value)?;
    out.push_str(&format!("\nexport const {name} = {json};\n"));
    Ok(())
}

/// JavaScript export name for each location key: `Toya` → `toyaSpots`,
/// `lake district` → `lakeDistrictSpots`.
///
/// Keys that map to the same name get numeric suffixes in key order.
pub fn location_identifiers<'k>(keys: impl IntoIterator<Item = &'k str>) -> BTreeMap<String, String> {
    let mut used = BTreeSet::new();
    let mut idents = BTreeMap::new();
    for key in keys {
        let base = format!("{}Spots", camel_case(key));
        let mut ident = base.clone();
        let mut n = 2;
        while used.contains(&ident) {
            ident = format!("{base}{n}");
            n += 1;
        }
        used.insert(ident.clone());
        idents.insert(key.to_string(), ident);
    }
    idents
}

/// Characters kept in an export name. Keys are NFKC-folded first, so `²`
/// arrives here as `2`; numbers with no ASCII form are dropped.
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_digit() || c == '_' || c == '$' || (c.is_alphabetic() && !is_combining_mark(c))
}

fn camel_case(key: &str) -> String {
    let folded: String = key.nfkc().collect();
    let mut out = String::new();
    let words = folded
        .split(|c: char| !is_identifier_char(c))
        .filter(|w| !w.is_empty());
    for (i, word) in words.enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    match out.chars().next() {
        None => "location".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{out}"),
        Some(_) => out,
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Render and write a manifest, creating parent directories as needed.
pub fn write_manifest(
    manifest: &Manifest,
    path: &Path,
    format: OutputFormat,
) -> Result<(), ManifestError> {
    let rendered = render(manifest, format)?;
    let write_err = |source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, rendered).map_err(write_err)?;
    debug!(path = %path.display(), ?format, "wrote manifest");
    Ok(())
}

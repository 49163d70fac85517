//! Entity discovery and metadata merging.
//!
//! Turns directories of photographs into manifest entities. Works in two
//! phases so each can be tested on its own:
//!
//! 1. **Discover** ([`discover_entity_dirs`], [`discover_photos`]): read-only.
//!    Lists a root, resolves every stem to its variants, loads the optional
//!    sidecar. Produces [`Candidate`]s.
//! 2. **Merge** ([`merge_spot`], [`merge_food`], [`spot_from_photo`]): pure.
//!    Applies sidecar overrides, image ordering and cover promotion, fills in
//!    defaults, drops entities left without photos.
//!
//! ## Directory Structure
//!
//! ```text
//! images/Toya/                     # Location root
//! ├── lake_view/                   # Entity directory → one spot
//! │   ├── info.json                # Sidecar (optional)
//! │   ├── dawn.jpg
//! │   ├── dawn-800.webp
//! │   └── dusk.jpg
//! ├── onsen/
//! │   └── bath.jpg
//! ├── empty/                       # No images → dropped
//! └── blue-pond.jpg                # Stray image → its own spot
//! ```
//!
//! ## Ordering
//!
//! - Photos inside an entity: stem order. A sidecar `images` list selects
//!   the listed files that exist, in listed order, and drops the rest. Then
//!   sidecar `cover` moves to the front.
//! - Spots: by `order` then `nameZh` when any spot declares `order`;
//!   otherwise by `nameZh` alone.
//! - Food items: by `title`.
//!
//! Every sort breaks remaining ties on `id`, and ids are made unique per
//! collection by [`dedupe_ids`], so repeated runs produce identical output.

use crate::config::ManifestConfig;
use crate::metadata::{Sidecar, load_sidecar, resolve};
use crate::naming::{slugify, titleize};
use crate::source::DirSource;
use crate::types::{FoodItem, Photo, Photos, Spot};
use crate::variants::{canonical_stem, collect_variants, discover_stems, web_join};
use rayon::prelude::*;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> ScanError + '_ {
        move |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Rating given to food items whose sidecar does not set one.
pub const DEFAULT_FOOD_RATING: u64 = 2;

/// Id given to entities whose name slugifies to nothing.
const FALLBACK_ID: &str = "item";

/// Sidecar keys that would collide with generated fields.
const RESERVED_KEYS: &[&str] = &["images", "imagesMeta"];

/// A discovered entity before metadata is merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Directory name on disk.
    pub name: String,
    /// URL base of the entity directory.
    pub web_base: String,
    /// Photos in stem order.
    pub photos: Vec<Photo>,
    pub sidecar: Option<Sidecar>,
}

// ============================================================================
// Phase 1: discovery
// ============================================================================

/// Resolve every stem directly inside `dir` to a [`Photo`], in stem order.
pub fn discover_photos(
    source: &dyn DirSource,
    dir: &Path,
    web_base: &str,
    config: &ManifestConfig,
) -> Result<Vec<Photo>, ScanError> {
    let stems = discover_stems(source, dir, config).map_err(ScanError::io(dir))?;
    Ok(stems
        .into_iter()
        .map(|stem| {
            let meta = collect_variants(source, dir, web_base, &stem, config);
            Photo { stem, meta }
        })
        .collect())
}

/// Discover one [`Candidate`] per immediate subdirectory of `root`.
///
/// Hidden directories are skipped. Directories are scanned in parallel; the
/// result keeps directory-name order.
pub fn discover_entity_dirs(
    source: &dyn DirSource,
    root: &Path,
    web_base: &str,
    config: &ManifestConfig,
) -> Result<Vec<Candidate>, ScanError> {
    let dirs: Vec<String> = source
        .entries(root)
        .map_err(ScanError::io(root))?
        .into_iter()
        .filter(|e| e.is_dir() && !e.name.starts_with('.'))
        .map(|e| e.name)
        .collect();

    dirs.into_par_iter()
        .map(|name| -> Result<Candidate, ScanError> {
            let dir = root.join(&name);
            let entity_base = web_join(web_base, &name);
            let photos = discover_photos(source, &dir, &entity_base, config)?;
            let sidecar = load_sidecar(source, &dir.join(&config.sidecar));
            Ok(Candidate {
                name,
                web_base: entity_base,
                photos,
                sidecar,
            })
        })
        .collect()
}

// ============================================================================
// Phase 2: merge
// ============================================================================

/// Apply sidecar `images` ordering and `cover` promotion.
///
/// A non-empty `images` list selects photos: listed files are matched by URL
/// or canonical stem and kept in listed order. Names with no matching photo
/// are ignored, and photos the list does not name are dropped. The cover is
/// promoted only if it survived the selection.
pub fn arrange_photos(mut photos: Vec<Photo>, sidecar: &Sidecar, web_base: &str) -> Vec<Photo> {
    if let Some(listed) = sidecar.images.as_ref().filter(|l| !l.is_empty()) {
        let mut selected = Vec::with_capacity(listed.len());
        for name in listed {
            if let Some(idx) = find_photo(&photos, name, web_base) {
                selected.push(photos.remove(idx));
            }
        }
        photos = selected;
    }

    if let Some(cover) = sidecar.cover.as_deref()
        && let Some(idx) = find_photo(&photos, cover, web_base)
        && idx > 0
    {
        let photo = photos.remove(idx);
        photos.insert(0, photo);
    }

    photos
}

fn find_photo(photos: &[Photo], filename: &str, web_base: &str) -> Option<usize> {
    let url = web_join(web_base, filename);
    photos.iter().position(|p| p.src() == url).or_else(|| {
        let stem = canonical_stem(filename);
        photos.iter().position(|p| p.stem == stem)
    })
}

/// Merge a discovered spot directory with its sidecar.
///
/// Returns `None` when no photos remain after arranging.
pub fn merge_spot(candidate: Candidate) -> Option<Spot> {
    let sidecar = candidate.sidecar.unwrap_or_default();
    let photos = arrange_photos(candidate.photos, &sidecar, &candidate.web_base);
    if photos.is_empty() {
        debug!(entity = %candidate.web_base, "no images, skipping spot");
        return None;
    }

    let fallback_name = titleize(&candidate.name);
    let name_en =
        resolve(&[sidecar.name_en.as_deref(), Some(fallback_name.as_str())]).unwrap_or_default();
    let name_zh =
        resolve(&[sidecar.name_zh.as_deref(), Some(fallback_name.as_str())]).unwrap_or_default();
    let id = resolve(&[sidecar.id.as_deref()]).unwrap_or_else(|| {
        let basis = resolve(&[
            Some(name_en.as_str()),
            Some(name_zh.as_str()),
            Some(candidate.name.as_str()),
        ]);
        slugify(&basis.unwrap_or_default())
    });

    let Sidecar {
        tags,
        rating,
        blurb,
        order,
        title,
        note,
        details,
        mut extra,
        ..
    } = sidecar;

    // Food-only keys are not recognized on spots
    passthrough(&mut extra, "title", title);
    passthrough(&mut extra, "note", note);
    strip_reserved(&mut extra);

    Some(Spot {
        id,
        name_en,
        name_zh,
        tags: tags.unwrap_or_default(),
        rating,
        blurb: blurb.unwrap_or_default(),
        order,
        photos: Photos(photos),
        details,
        extra,
    })
}

/// Merge a discovered food directory with its sidecar.
///
/// Returns `None` when no photos remain after arranging.
pub fn merge_food(candidate: Candidate) -> Option<FoodItem> {
    let sidecar = candidate.sidecar.unwrap_or_default();
    let photos = arrange_photos(candidate.photos, &sidecar, &candidate.web_base);
    if photos.is_empty() {
        debug!(entity = %candidate.web_base, "no images, skipping food item");
        return None;
    }

    let id = resolve(&[sidecar.id.as_deref()]).unwrap_or_else(|| slugify(&candidate.name));
    let fallback_title = titleize(&candidate.name);
    let title =
        resolve(&[sidecar.title.as_deref(), Some(fallback_title.as_str())]).unwrap_or_default();

    let Sidecar {
        name_en,
        name_zh,
        tags,
        rating,
        blurb,
        note,
        order,
        details,
        mut extra,
        ..
    } = sidecar;

    // Spot-only keys are not recognized on food items
    passthrough(&mut extra, "nameEn", name_en);
    passthrough(&mut extra, "nameZh", name_zh);
    passthrough(&mut extra, "blurb", blurb);
    passthrough(&mut extra, "order", order);
    strip_reserved(&mut extra);

    Some(FoodItem {
        id,
        title,
        note: note.unwrap_or_default(),
        rating: rating.unwrap_or_else(|| Number::from(DEFAULT_FOOD_RATING)),
        tags: tags.unwrap_or_default(),
        photos: Photos(photos),
        details,
        extra,
    })
}

/// A spot for an image placed directly in a location root.
pub fn spot_from_photo(photo: Photo) -> Spot {
    let name = titleize(&photo.stem);
    Spot {
        id: slugify(&name),
        name_en: name.clone(),
        name_zh: name,
        tags: Vec::new(),
        rating: None,
        blurb: String::new(),
        order: None,
        photos: Photos(vec![photo]),
        details: Default::default(),
        extra: BTreeMap::new(),
    }
}

fn passthrough(extra: &mut BTreeMap<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        extra.insert(key.to_string(), value.into());
    }
}

fn strip_reserved(extra: &mut BTreeMap<String, Value>) {
    for key in RESERVED_KEYS {
        extra.remove(*key);
    }
}

// ============================================================================
// Ordering and identity
// ============================================================================

/// Sort spots by explicit `order` (unordered last) then `nameZh`, or by
/// `nameZh` alone when no spot declares an order.
pub fn sort_spots(spots: &mut [Spot]) {
    let any_ordered = spots.iter().any(|s| s.order.is_some());
    let order_key = |spot: &Spot| {
        spot.order
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(f64::INFINITY)
    };
    spots.sort_by(|a, b| {
        let by_order = if any_ordered {
            order_key(a).total_cmp(&order_key(b))
        } else {
            std::cmp::Ordering::Equal
        };
        by_order
            .then_with(|| a.name_zh.cmp(&b.name_zh))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Sort food items by title.
pub fn sort_food(items: &mut [FoodItem]) {
    items.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
}

/// Make ids unique within one collection.
///
/// An empty id becomes `item`. The first occurrence of an id keeps it; later
/// ones get `-2`, `-3`, … skipping suffixes that another entity already uses.
pub fn dedupe_ids<'a>(ids: impl IntoIterator<Item = &'a mut String>) {
    let mut ids: Vec<&mut String> = ids.into_iter().collect();
    let taken: BTreeSet<String> = ids.iter().map(|id| id.to_string()).collect();
    let mut used = BTreeSet::new();

    for id in ids.iter_mut() {
        if id.is_empty() {
            **id = FALLBACK_ID.to_string();
        }
        if used.contains(id.as_str()) {
            let mut n = 2;
            let unique = loop {
                let candidate = format!("{id}-{n}");
                if !used.contains(&candidate) && !taken.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            **id = unique;
        }
        used.insert(id.to_string());
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Scan one location root: one spot per entity directory plus one per stray
/// image in the root itself. Sorted and de-duplicated.
pub fn scan_location(
    source: &dyn DirSource,
    root: &Path,
    web_base: &str,
    config: &ManifestConfig,
) -> Result<Vec<Spot>, ScanError> {
    let mut spots: Vec<Spot> = discover_entity_dirs(source, root, web_base, config)?
        .into_iter()
        .filter_map(merge_spot)
        .collect();
    spots.extend(
        discover_photos(source, root, web_base, config)?
            .into_iter()
            .map(spot_from_photo),
    );
    sort_spots(&mut spots);
    dedupe_ids(spots.iter_mut().map(|s| &mut s.id));
    Ok(spots)
}

/// Scan the food root: one item per entity directory. Stray images in the
/// root are ignored.
pub fn scan_food(
    source: &dyn DirSource,
    root: &Path,
    web_base: &str,
    config: &ManifestConfig,
) -> Result<Vec<FoodItem>, ScanError> {
    let mut items: Vec<FoodItem> = discover_entity_dirs(source, root, web_base, config)?
        .into_iter()
        .filter_map(merge_food)
        .collect();
    sort_food(&mut items);
    dedupe_ids(items.iter_mut().map(|f| &mut f.id));
    Ok(items)
}

/// Scan a loose folder: every stem in the root becomes one photo.
/// Subdirectories are ignored.
pub fn scan_loose_folder(
    source: &dyn DirSource,
    root: &Path,
    web_base: &str,
    config: &ManifestConfig,
) -> Result<Photos, ScanError> {
    discover_photos(source, root, web_base, config).map(Photos)
}

//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity leads
//! with its positional index and display name; ids and cover URLs follow as
//! indented context lines so a reader can trace an entry back to the tree.
//!
//! # Output Format
//!
//! ```text
//! Locations
//! 001 Otaru 小樽 (1 spot)
//!     001 Canal (1 photo)
//!         Id: canal
//!         Cover: images/Otaru/canal.jpg
//! 002 Sapporo 札幌 (0 spots)
//!
//! Food
//! 001 Miso Ramen (2 photos)
//!     Id: miso-ramen
//!
//! Gallery: 12 photos
//! Friends: 3 photos
//! ```
//!
//! followed, after a write, by:
//!
//! ```text
//! Wrote src/data.js (3 locations, 14 spots, 6 food items, 97 photos)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::manifest::Manifest;
use crate::types::CollectionLabel;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 photo`, `3 photos`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Format an entity header: positional index + title + count.
///
/// ```text
/// 001 Toya 洞爺湖 (4 spots)
/// 001 Lake View (3 photos)
/// ```
fn entity_header(index: usize, title: &str, count: usize, noun: &str) -> String {
    format!("{} {} ({})", format_index(index), title, plural(count, noun))
}

/// Display title of a location: key plus localized label when configured.
fn location_title(key: &str, label: Option<&CollectionLabel>) -> String {
    match label {
        Some(l) if l.zh != key => format!("{} {}", key, l.zh),
        _ => key.to_string(),
    }
}

// ============================================================================
// Manifest summary
// ============================================================================

/// Format the scanned collections as an indented inventory.
pub fn format_manifest_summary(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Locations".to_string());
    for (i, (key, spots)) in manifest.locations.iter().enumerate() {
        let title = location_title(key, manifest.city_meta.get(key));
        lines.push(entity_header(i + 1, &title, spots.len(), "spot"));
        for (j, spot) in spots.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &spot.name_en, spot.photos.len(), "photo")
            ));
            lines.push(format!("{}Id: {}", indent(2), spot.id));
            if let Some(cover) = spot.photos.iter().next() {
                lines.push(format!("{}Cover: {}", indent(2), cover.src()));
            }
        }
    }

    if !manifest.food_items.is_empty() {
        lines.push(String::new());
        lines.push("Food".to_string());
        for (i, item) in manifest.food_items.iter().enumerate() {
            lines.push(entity_header(i + 1, &item.title, item.photos.len(), "photo"));
            lines.push(format!("{}Id: {}", indent(1), item.id));
        }
    }

    lines.push(String::new());
    lines.push(format!("Gallery: {}", plural(manifest.gallery.len(), "photo")));
    lines.push(format!("Friends: {}", plural(manifest.friends.len(), "photo")));

    lines
}

/// Print the manifest summary to stdout.
pub fn print_manifest_summary(manifest: &Manifest) {
    for line in format_manifest_summary(manifest) {
        println!("{}", line);
    }
}

/// One-line totals after writing the manifest.
pub fn format_write_summary(manifest: &Manifest, path: &Path) -> String {
    let spots: usize = manifest.locations.values().map(Vec::len).sum();
    format!(
        "Wrote {} ({}, {}, {}, {})",
        path.display(),
        plural(manifest.locations.len(), "location"),
        plural(spots, "spot"),
        plural(manifest.food_items.len(), "food item"),
        plural(manifest.photo_count(), "photo"),
    )
}

/// Print the write summary to stdout.
pub fn print_write_summary(manifest: &Manifest, path: &Path) {
    println!("{}", format_write_summary(manifest, path));
}

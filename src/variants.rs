//! Responsive variant discovery.
//!
//! A photograph usually exists on disk several times: an original plus
//! pre-resized copies in modern encodings, all sharing one *stem*:
//!
//! ```text
//! lake/
//! ├── sunset.jpg          # original, no width marker
//! ├── sunset-800.avif
//! ├── sunset-800.webp
//! ├── sunset-1600.avif
//! └── sunset-1600.webp
//! ```
//!
//! [`canonical_stem`] maps every one of those names to `sunset`;
//! [`collect_variants`] rebuilds the full [`VariantSet`] for a stem by probing
//! a bounded candidate set (configured widths × configured formats) rather
//! than re-listing the directory, so each stem costs O(widths × formats)
//! existence checks.
//!
//! ## Fallback selection
//!
//! The `fallback` URL is what a client shows when it cannot use any `<source>`:
//!
//! 1. take the first non-empty bucket of `jpeg` → `webp` → `avif`
//! 2. within it, the widest entry that carries a width, else its first entry
//! 3. if every bucket is empty, `{web_base}/{stem}.jpg`: a best guess that
//!    may not exist, because the field is never omitted
//!
//! A widthless baseline original therefore beats widthed modern variants.
//!
//! Widthed entries are left in lookup order; consumers sort before building a
//! srcset.

use crate::config::ManifestConfig;
use crate::naming::strip_extension;
use crate::source::DirSource;
use crate::types::{Bucket, Sources, VariantSet, VariantSource};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

/// Logical base name of an image, shared by all its width/format variants.
///
/// The extension is stripped; a trailing `-` plus 2–5 ASCII digits is treated
/// as a width marker and stripped too.
///
/// - `cover-800.webp` → `cover`
/// - `cover.jpg` → `cover`
/// - `img-12.png` → `img`
/// - `shot-1.jpg` → `shot-1` (one digit is not a width)
/// - `2024-123456.jpg` → `2024-123456` (six digits is not a width)
pub fn canonical_stem(filename: &str) -> String {
    let base = strip_extension(filename);
    match base.rsplit_once('-') {
        Some((stem, digits))
            if (2..=5).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            stem.to_string()
        }
        _ => base.to_string(),
    }
}

/// Join a URL base and a path segment with exactly one `/`.
pub fn web_join(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_start_matches('/');
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}/{segment}")
    }
}

/// Canonical stems of every image file directly inside `dir`, sorted.
///
/// A missing directory has no stems.
pub fn discover_stems(
    source: &dyn DirSource,
    dir: &Path,
    config: &ManifestConfig,
) -> io::Result<BTreeSet<String>> {
    Ok(source
        .entries(dir)?
        .into_iter()
        .filter(|e| e.is_file() && config.is_image_name(&e.name))
        .map(|e| canonical_stem(&e.name))
        .collect())
}

/// Find every variant file of `stem` in `dir` and select a fallback.
///
/// URLs are `{web_base}/{filename}`.
pub fn collect_variants(
    source: &dyn DirSource,
    dir: &Path,
    web_base: &str,
    stem: &str,
    config: &ManifestConfig,
) -> VariantSet {
    let variants = &config.variants;
    let mut sources = Sources::default();

    for &width in &variants.widths {
        for rule in &variants.formats {
            let name = format!("{stem}-{width}.{}", rule.ext);
            if source.is_file(&dir.join(&name)) {
                sources.bucket_mut(rule.bucket).push(VariantSource {
                    src: web_join(web_base, &name),
                    w: Some(width),
                });
            }
        }
    }

    for rule in &variants.formats {
        let name = format!("{stem}.{}", rule.ext);
        if !source.is_file(&dir.join(&name)) {
            continue;
        }
        let suffix = format!("/{name}");
        let bucket = sources.bucket_mut(rule.bucket);
        if bucket
            .iter()
            .any(|v| v.src == name || v.src.ends_with(&suffix))
        {
            continue;
        }
        bucket.push(VariantSource {
            src: web_join(web_base, &name),
            w: None,
        });
    }

    let fallback =
        select_fallback(&sources).unwrap_or_else(|| web_join(web_base, &format!("{stem}.jpg")));

    VariantSet {
        fallback,
        sizes: variants.sizes.clone(),
        sources,
    }
}

/// Pick the fallback URL from discovered sources, or `None` if there are none.
pub fn select_fallback(sources: &Sources) -> Option<String> {
    let bucket = Bucket::FALLBACK_PRIORITY
        .iter()
        .map(|&b| sources.bucket(b))
        .find(|entries| !entries.is_empty())?;
    bucket
        .iter()
        .filter(|v| v.w.is_some())
        // max_by_key keeps the last maximum; reverse so the first wins
        .rev()
        .max_by_key(|v| v.w)
        .or_else(|| bucket.first())
        .map(|v| v.src.clone())
}

//! Shared test utilities for the gallery-manifest test suite.
//!
//! Provides lookup helpers and small builders that work with scan-phase data
//! structures (`Spot`, `FoodItem`, `Photo`, `Candidate`).
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let spots = scan_location(&tree, Path::new("Toya"), "images/Toya", &config)?;
//! let lake = find_spot(&spots, "lake");
//! assert_eq!(urls(&lake.photos.0), ["images/Toya/lake/a.jpg"]);
//! ```

use crate::metadata::Sidecar;
use crate::scan::Candidate;
use crate::types::{FoodItem, Photo, Sources, Spot, VariantSet, VariantSource};
use crate::variants::web_join;

// =========================================================================
// Builders
// =========================================================================

/// A photo with a single baseline variant at `{web_base}/{stem}.jpg`.
pub fn photo(web_base: &str, stem: &str) -> Photo {
    let src = web_join(web_base, &format!("{stem}.jpg"));
    Photo {
        stem: stem.to_string(),
        meta: VariantSet {
            fallback: src.clone(),
            sizes: "100vw".to_string(),
            sources: Sources {
                jpeg: vec![VariantSource { src, w: None }],
                ..Sources::default()
            },
        },
    }
}

/// One [`photo`] per stem, in the given order.
pub fn photos_for(web_base: &str, stems: &[&str]) -> Vec<Photo> {
    stems.iter().map(|stem| photo(web_base, stem)).collect()
}

/// A discovered entity directory named `name` under `images/Toya`.
pub fn candidate(name: &str, stems: &[&str], sidecar: Option<Sidecar>) -> Candidate {
    let web_base = web_join("images/Toya", name);
    Candidate {
        name: name.to_string(),
        photos: photos_for(&web_base, stems),
        web_base,
        sidecar,
    }
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a spot by id. Panics if not found.
pub fn find_spot<'a>(spots: &'a [Spot], id: &str) -> &'a Spot {
    spots.iter().find(|s| s.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = spots.iter().map(|s| s.id.as_str()).collect();
        panic!("spot '{id}' not found. Available: {ids:?}")
    })
}

/// Find a food item by id. Panics if not found.
pub fn find_food<'a>(items: &'a [FoodItem], id: &str) -> &'a FoodItem {
    items.iter().find(|f| f.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = items.iter().map(|f| f.id.as_str()).collect();
        panic!("food item '{id}' not found. Available: {ids:?}")
    })
}

// =========================================================================
// Extractors
// =========================================================================

/// Fallback URLs of `photos`, in order.
pub fn urls(photos: &[Photo]) -> Vec<&str> {
    photos.iter().map(Photo::src).collect()
}

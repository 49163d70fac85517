//! # Gallery Manifest
//!
//! A build-time generator for a photo travel journal. Your filesystem is the
//! data source: location directories become collections of spots, a food
//! directory becomes a list of dishes, and two loose folders become plain
//! photo sets. The result is one manifest the presentation layer imports.
//!
//! # Architecture: Discover, Merge, Render
//!
//! ```text
//! 1. Discover  images/    →  candidates     (directory listing + variants + sidecars)
//! 2. Merge     candidates →  entities       (sidecar overrides, ordering, ids)
//! 3. Render    Manifest   →  src/data.js    (ES module, or JSON)
//! ```
//!
//! Discovery is the only phase that reads the tree, and it does so through
//! the [`source::DirSource`] trait. Merging and rendering are pure, so unit
//! tests run against an in-memory [`source::MemoryTree`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Assembler: walks the root, builds the [`manifest::Manifest`], renders and writes it |
//! | [`scan`] | Entity scanner: spots, food items, loose folders (discover + merge) |
//! | [`variants`] | Groups `{stem}-{width}.{ext}` files into responsive descriptors |
//! | [`metadata`] | `info.json` sidecar parsing with lenient loading |
//! | [`naming`] | Display titles and URL slugs from directory and file names |
//! | [`source`] | Read-only directory access: real filesystem or in-memory tree |
//! | [`config`] | `manifest.toml` loading, layering onto stock defaults, validation |
//! | [`types`] | Types serialized into the manifest (`Spot`, `FoodItem`, `VariantSet`) |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## One Record Per Photograph
//!
//! The consumer wants two index-aligned arrays per entity, `images` and
//! `imagesMeta`. Internally each photograph is a single [`types::Photo`]
//! holding its URL and descriptor together; the two arrays only exist at
//! serialization time. Cover promotion and explicit ordering move whole
//! records, so the arrays cannot drift apart.
//!
//! ## Filenames Carry Widths
//!
//! Variants are found by probing `{stem}-{width}.{ext}` for each configured
//! width and format instead of decoding images. The binary has no imaging
//! dependency and a scan of thousands of photos is a directory listing plus
//! a few thousand `stat` calls.
//!
//! ## Lenient Sidecars
//!
//! A malformed `info.json` is logged and ignored rather than failing the
//! build. Recognized keys are typed; everything else passes through to the
//! output unchanged, so new display fields need no generator release.
//!
//! ## Determinism
//!
//! Two runs over the same tree produce byte-identical output once the
//! timestamp is disabled: keyed data lives in `BTreeMap`s, every sort has a
//! full tie-break, and ids are de-duplicated in a fixed order.

pub mod config;
pub mod manifest;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod source;
pub mod types;
pub mod variants;

#[cfg(test)]
pub(crate) mod test_helpers;

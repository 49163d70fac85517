//! Shared types serialized into the manifest.
//!
//! Field names on the wire are camelCase because the consumer is a JavaScript
//! presentation layer. Everything here is produced fresh on every run; none
//! of it is read back.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Encoding family of a variant file.
///
/// Extensions map many-to-one onto buckets (`jpg`, `jpeg` and `png` all land
/// in [`Bucket::Jpeg`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Next-generation lossy (AVIF).
    Avif,
    /// Intermediate (WebP).
    Webp,
    /// Baseline, universally decodable (JPEG; PNG as a fallback-only format).
    Jpeg,
}

impl Bucket {
    /// Order in which buckets are consulted when picking a fallback URL.
    pub const FALLBACK_PRIORITY: [Bucket; 3] = [Bucket::Jpeg, Bucket::Webp, Bucket::Avif];
}

/// Display pair for a location collection: untranslated and localized label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionLabel {
    pub en: String,
    pub zh: String,
}

/// One physical file of a photograph: its URL and, when the filename carries
/// a width marker, that width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSource {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
}

/// Variant files grouped by encoding bucket.
///
/// Entries keep discovery order; they are not sorted by width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sources {
    pub avif: Vec<VariantSource>,
    pub webp: Vec<VariantSource>,
    pub jpeg: Vec<VariantSource>,
}

impl Sources {
    pub fn bucket(&self, bucket: Bucket) -> &[VariantSource] {
        match bucket {
            Bucket::Avif => &self.avif,
            Bucket::Webp => &self.webp,
            Bucket::Jpeg => &self.jpeg,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<VariantSource> {
        match bucket {
            Bucket::Avif => &mut self.avif,
            Bucket::Webp => &mut self.webp,
            Bucket::Jpeg => &mut self.jpeg,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.avif.is_empty() && self.webp.is_empty() && self.jpeg.is_empty()
    }

    pub fn len(&self) -> usize {
        self.avif.len() + self.webp.len() + self.jpeg.len()
    }
}

/// Responsive variant descriptor for one photograph.
///
/// `fallback` is always present, even when no file was found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSet {
    pub fallback: String,
    pub sizes: String,
    pub sources: Sources,
}

/// One logical photograph: its canonical stem plus every variant found.
///
/// The image URL and its descriptor live in the same record so reordering
/// (cover promotion, explicit ordering) can never split them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub stem: String,
    pub meta: VariantSet,
}

impl Photo {
    /// URL emitted in the entity's `images` list.
    pub fn src(&self) -> &str {
        &self.meta.fallback
    }
}

/// Ordered photographs of an entity or loose collection.
///
/// Serializes as two index-aligned arrays, `images` and `imagesMeta`, which
/// is the shape the presentation layer consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Photos(pub Vec<Photo>);

impl Photos {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Photo> {
        self.0.iter()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.0.iter().map(Photo::src).collect()
    }

    pub fn metas(&self) -> Vec<&VariantSet> {
        self.0.iter().map(|p| &p.meta).collect()
    }
}

impl From<Vec<Photo>> for Photos {
    fn from(photos: Vec<Photo>) -> Self {
        Self(photos)
    }
}

impl Serialize for Photos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("images", &self.urls())?;
        map.serialize_entry("imagesMeta", &self.metas())?;
        map.end()
    }
}

/// Optional display fields shared by spots and food items.
///
/// Every field stays a raw JSON value. Authors write these however they like
/// (an address as text or as an object, a visit date as a string or a Unix
/// timestamp) and the page renders whatever it is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited_at: Option<Value>,
}

/// A sightseeing spot within a location collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub name_en: String,
    pub name_zh: String,
    pub tags: Vec<String>,
    /// `null` on the wire when unrated.
    pub rating: Option<Number>,
    pub blurb: String,
    /// Any JSON number; fractional orders slot between integer ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Number>,
    #[serde(flatten)]
    pub photos: Photos,
    #[serde(flatten)]
    pub details: Details,
    /// Sidecar keys this entity kind does not recognize, passed through.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A food item from the global food category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub title: String,
    pub note: String,
    pub rating: Number,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub photos: Photos,
    #[serde(flatten)]
    pub details: Details,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

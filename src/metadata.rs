//! Sidecar metadata: optional hand-authored `info.json` per entity directory.
//!
//! A sidecar overrides or extends what the scan derives from the filesystem:
//!
//! ```json
//! {
//!   "nameZh": "洞爺湖展望台",
//!   "order": 1,
//!   "cover": "view.jpg",
//!   "tags": ["viewpoint"],
//!   "rating": 4.5,
//!   "mapUrl": "https://maps.example/toya",
//!   "season": "winter"
//! }
//! ```
//!
//! ## Boundary validation
//!
//! Recognized keys are parsed into typed fields ([`Sidecar`], [`Details`]).
//! Display-only details keep whatever JSON shape the author wrote. `rating`
//! and `order` accept any JSON number; any other shape drops just that field
//! with a warning. Names, tags and image lists must have their documented
//! shape: a numeric `tags` makes the whole file invalid. Unrecognized keys
//! land in [`Sidecar::extra`] untouched and are emitted alongside the entity.
//!
//! ## Failure policy
//!
//! A missing sidecar is normal. An unreadable or malformed one is logged as a
//! warning and treated as missing: one typo in one directory must never sink
//! the whole manifest.
//!
//! ## Images
//!
//! `images` *selects* and orders photos the scan found, and `cover` moves one
//! of them to the front. A sidecar can never add an image that is not on
//! disk.

use crate::source::DirSource;
use crate::types::Details;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Parsed sidecar metadata. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidecar {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name_zh: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<Number>,
    #[serde(default)]
    pub blurb: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub order: Option<Number>,
    /// Explicit image ordering, as file names inside the entity directory.
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// File name of the image to show first.
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(flatten)]
    pub details: Details,
    /// Everything not recognized above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Sidecar {
    /// Parse sidecar JSON. The top level must be an object.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Any JSON number, or `None` for `null` and every other shape.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(other) => {
            warn!(value = %other, "ignoring non-numeric sidecar field");
            Ok(None)
        }
    }
}

/// Load the sidecar at `path`.
///
/// Returns `None` when the file is absent, unreadable, or invalid; the last
/// two cases are logged as warnings.
pub fn load_sidecar(source: &dyn DirSource, path: &Path) -> Option<Sidecar> {
    let content = match source.read_to_string(path) {
        Ok(Some(content)) => content,
        Ok(None) => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable sidecar, using defaults");
            return None;
        }
    };
    match Sidecar::parse(&content) {
        Ok(sidecar) => Some(sidecar),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid sidecar JSON, using defaults");
            None
        }
    }
}

/// Resolve a field from multiple sources.
///
/// Takes optional values in priority order and returns the first non-None,
/// non-empty (after trimming) value.
///
/// ```text
/// spot nameEn: resolve(&[sidecar.nameEn, titleized dirname])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

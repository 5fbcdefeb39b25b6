//! Shared types used by the reconciler, the pipeline, and the report writer.
//!
//! Entries are round-tripped verbatim: whatever fields a manifest carries
//! beyond `title`, `url` included, are kept in [`ImageEntry::extra`] and
//! written back into the report untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One image in a gallery manifest.
///
/// `title` is the join key between the target and base manifests. It is
/// assumed (not enforced) to be unique within a single manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub title: String,
    /// Every other field on the manifest entry, `url` included, exactly as
    /// it was read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("url".to_string(), Value::String(url.into()));
        Self {
            title: title.into(),
            extra,
        }
    }

    /// Where the image can be downloaded from. Only required for entries
    /// that end up being compared; a missing, `null` or non-string `url`
    /// reads as `None`.
    pub fn url(&self) -> Option<&str> {
        self.extra.get("url").and_then(Value::as_str)
    }
}

/// A target entry and the base entry it was matched with by title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPair {
    pub target: ImageEntry,
    pub base: ImageEntry,
}

/// Final result of a gallery diff.
///
/// `changed` and `new` follow target manifest order, `removed` follows base
/// manifest order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub changed: Vec<ComparisonPair>,
    pub new: Vec<ImageEntry>,
    pub removed: Vec<ImageEntry>,
}

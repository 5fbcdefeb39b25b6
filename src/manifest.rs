//! Loading the two gallery manifests.
//!
//! The target and base files have different shapes:
//!
//! ```text
//! target.json   { "images": [ {title, url}, ... ] }
//! base.json     [ { "contents": { "images": [ {title, url}, ... ] } }, ... ]
//! ```
//!
//! The base file is a list of published snapshots. Only the first element is
//! read; later snapshots are never parsed, so a malformed history entry past
//! index 0 does not break a run.

use crate::types::ImageEntry;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Base manifest has no snapshots")]
    EmptyBase,
}

#[derive(Debug, Deserialize)]
struct TargetManifest {
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    contents: SnapshotContents,
}

#[derive(Debug, Deserialize)]
struct SnapshotContents {
    images: Vec<ImageEntry>,
}

/// Parse a target manifest document.
pub fn parse_target(json: &str) -> Result<Vec<ImageEntry>, ManifestError> {
    let manifest: TargetManifest = serde_json::from_str(json)?;
    Ok(manifest.images)
}

/// Parse a base manifest document, returning the images of snapshot 0.
pub fn parse_base(json: &str) -> Result<Vec<ImageEntry>, ManifestError> {
    let snapshots: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let first = snapshots
        .into_iter()
        .next()
        .ok_or(ManifestError::EmptyBase)?;
    let snapshot: Snapshot = serde_json::from_value(first)?;
    Ok(snapshot.contents.images)
}

pub fn load_target(path: &Path) -> Result<Vec<ImageEntry>, ManifestError> {
    parse_target(&std::fs::read_to_string(path)?)
}

pub fn load_base(path: &Path) -> Result<Vec<ImageEntry>, ManifestError> {
    parse_base(&std::fs::read_to_string(path)?)
}

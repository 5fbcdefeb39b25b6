//! Title-keyed matching between the target and base manifests.
//!
//! Two independent linear scans, no index:
//!
//! 1. Every target entry is looked up in base. The first base entry with the
//!    same title becomes its comparison partner; no partner means `new`.
//! 2. Every base entry is looked up in target. No match means `removed`.
//!
//! Manifests are gallery-sized, so the quadratic scans are fine. First-match
//! is load-bearing: with duplicate base titles the earliest one wins, and a
//! single base entry can pair with several target entries that share its
//! title.

use crate::types::{ComparisonPair, ImageEntry};

/// Partition of two manifests by title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub new: Vec<ImageEntry>,
    pub removed: Vec<ImageEntry>,
    pub to_compare: Vec<ComparisonPair>,
}

pub fn reconcile(target: &[ImageEntry], base: &[ImageEntry]) -> Reconciliation {
    let mut result = Reconciliation::default();

    for image in target {
        match base.iter().find(|b| b.title == image.title) {
            Some(base_image) => result.to_compare.push(ComparisonPair {
                target: image.clone(),
                base: base_image.clone(),
            }),
            None => result.new.push(image.clone()),
        }
    }

    for image in base {
        if !target.iter().any(|t| t.title == image.title) {
            result.removed.push(image.clone());
        }
    }

    result
}

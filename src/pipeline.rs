//! Reconcile two manifests and pixel-diff every matched pair.
//!
//! A run moves strictly forward through these stages:
//!
//! ```text
//! Idle → Reconciling → Comparing(0..N) → Reporting → Done
//! ```
//!
//! Pairs are processed one at a time, in reconciliation order: fetch target,
//! fetch base, decode both, compare. Only one pair's images are held in memory
//! at once, and `changed` comes out in the same order as the target manifest.
//!
//! There is no recovery. The first fetch, decode, or dimension failure aborts
//! the run and no report is returned.

use crate::config::DiffConfig;
use crate::fetch::{FetchError, Fetcher, HttpFetcher};
use crate::imaging::{self, CompareError, CompareOptions, DecodeError, PixelBuffer};
use crate::reconcile::reconcile;
use crate::types::{ComparisonPair, ImageEntry, Report};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to fetch '{title}': {source}")]
    Fetch { title: String, source: FetchError },
    #[error("Failed to decode '{title}' from {url}: {source}")]
    Decode {
        title: String,
        url: String,
        source: DecodeError,
    },
    #[error("Cannot compare '{title}': {source}")]
    Compare { title: String, source: CompareError },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write diff image {}: {source}", .path.display())]
    DiffImage {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Progress reported while a diff runs.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEvent {
    Reconciled {
        to_compare: usize,
        new: usize,
        removed: usize,
    },
    /// One pair finished. `index` is 1-based.
    Compared {
        index: usize,
        total: usize,
        title: String,
        diff_pixels: u64,
        diff_image: Option<PathBuf>,
    },
}

/// Settings for a single run.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub compare: CompareOptions,
    /// Write a diff visualisation PNG here for every changed pair.
    pub diff_dir: Option<PathBuf>,
}

/// Run a diff over HTTP using settings from `config`.
pub fn run(
    config: &DiffConfig,
    target: &[ImageEntry],
    base: &[ImageEntry],
    diff_dir: Option<PathBuf>,
    events: Option<Sender<DiffEvent>>,
) -> Result<Report, DiffError> {
    let fetcher = HttpFetcher::new(config.fetch.timeout());
    let options = DiffOptions {
        compare: config.compare.options(),
        diff_dir,
    };
    run_with_fetcher(&fetcher, target, base, &options, events)
}

/// Run a diff with a specific fetcher (allows testing with mock).
pub fn run_with_fetcher(
    fetcher: &impl Fetcher,
    target: &[ImageEntry],
    base: &[ImageEntry],
    options: &DiffOptions,
    events: Option<Sender<DiffEvent>>,
) -> Result<Report, DiffError> {
    let emit = |event: DiffEvent| {
        if let Some(tx) = &events {
            // A gone printer must not abort the diff.
            let _ = tx.send(event);
        }
    };

    let reconciled = reconcile(target, base);
    emit(DiffEvent::Reconciled {
        to_compare: reconciled.to_compare.len(),
        new: reconciled.new.len(),
        removed: reconciled.removed.len(),
    });

    if let Some(dir) = &options.diff_dir {
        std::fs::create_dir_all(dir)?;
    }

    let total = reconciled.to_compare.len();
    let mut changed = Vec::new();

    for (i, pair) in reconciled.to_compare.into_iter().enumerate() {
        let index = i + 1;
        let target_image = load(fetcher, &pair.target)?;
        let base_image = load(fetcher, &pair.base)?;

        let (diff_pixels, diff_image) = match &options.diff_dir {
            Some(dir) => {
                let mut canvas = PixelBuffer::blank(target_image.width(), target_image.height());
                let count = imaging::compare_into(
                    &target_image,
                    &base_image,
                    &options.compare,
                    &mut canvas,
                )
                .map_err(|source| compare_error(&pair, source))?;

                let written = if count > 0 {
                    let path = diff_image_path(dir, index, &pair.target.title);
                    imaging::save_png(&canvas, &path).map_err(|source| {
                        DiffError::DiffImage {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    Some(path)
                } else {
                    None
                };
                (count, written)
            }
            None => {
                let count = imaging::compare(&target_image, &base_image, &options.compare)
                    .map_err(|source| compare_error(&pair, source))?;
                (count, None)
            }
        };

        emit(DiffEvent::Compared {
            index,
            total,
            title: pair.target.title.clone(),
            diff_pixels,
            diff_image,
        });

        if diff_pixels > 0 {
            changed.push(pair);
        }
    }

    Ok(Report {
        changed,
        new: reconciled.new,
        removed: reconciled.removed,
    })
}

fn compare_error(pair: &ComparisonPair, source: CompareError) -> DiffError {
    DiffError::Compare {
        title: pair.target.title.clone(),
        source,
    }
}

/// Fetch and decode one entry's image.
fn load(fetcher: &impl Fetcher, entry: &ImageEntry) -> Result<PixelBuffer, DiffError> {
    let url = entry.url().ok_or_else(|| DiffError::Fetch {
        title: entry.title.clone(),
        source: FetchError::MissingUrl(entry.title.clone()),
    })?;

    let bytes = fetcher.fetch(url).map_err(|source| DiffError::Fetch {
        title: entry.title.clone(),
        source,
    })?;

    imaging::decode(&bytes).map_err(|source| DiffError::Decode {
        title: entry.title.clone(),
        url: url.to_string(),
        source,
    })
}

/// `NNN-<title>.png`, with anything outside `[A-Za-z0-9_-]` replaced so the
/// title cannot escape the diff directory.
fn diff_image_name(index: usize, title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{:0>3}-{}.png", index, slug)
}

/// Where a diff image for the given pair index would be written.
pub fn diff_image_path(dir: &Path, index: usize, title: &str) -> PathBuf {
    dir.join(diff_image_name(index, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::MockFetcher;
    use crate::test_helpers::{entry, png_with_square, solid_png};
    use tempfile::TempDir;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    fn white() -> Vec<u8> {
        solid_png(8, 8, WHITE)
    }

    fn with_dot() -> Vec<u8> {
        png_with_square(8, 8, WHITE, RED, (3, 3, 2))
    }

    #[test]
    fn identical_images_are_not_changed() {
        let fetcher = MockFetcher::new()
            .with("t/a", white())
            .with("b/a", white());
        let target = vec![entry("A", "t/a")];
        let base = vec![entry("A", "b/a")];

        let report =
            run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None).unwrap();

        assert!(report.changed.is_empty());
        assert!(report.new.is_empty());
        assert!(report.removed.is_empty());
    }

    #[test]
    fn differing_images_are_changed() {
        let fetcher = MockFetcher::new()
            .with("t/a", with_dot())
            .with("b/a", white());
        let target = vec![entry("A", "t/a")];
        let base = vec![entry("A", "b/a")];

        let report =
            run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None).unwrap();

        assert_eq!(
            report.changed,
            vec![ComparisonPair {
                target: entry("A", "t/a"),
                base: entry("A", "b/a"),
            }]
        );
    }

    #[test]
    fn fetches_target_then_base_in_pair_order() {
        let fetcher = MockFetcher::new()
            .with("t/a", white())
            .with("b/a", white())
            .with("t/b", white())
            .with("b/b", white());
        let target = vec![entry("A", "t/a"), entry("New", "t/new"), entry("B", "t/b")];
        let base = vec![entry("B", "b/b"), entry("A", "b/a")];

        run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None).unwrap();

        assert_eq!(fetcher.get_requests(), vec!["t/a", "b/a", "t/b", "b/b"]);
    }

    #[test]
    fn changed_follows_target_order() {
        let fetcher = MockFetcher::new()
            .with("t/a", with_dot())
            .with("b/a", white())
            .with("t/b", white())
            .with("b/b", white())
            .with("t/c", with_dot())
            .with("b/c", white());
        let target = vec![entry("C", "t/c"), entry("B", "t/b"), entry("A", "t/a")];
        let base = vec![entry("A", "b/a"), entry("B", "b/b"), entry("C", "b/c")];

        let report =
            run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None).unwrap();

        let titles: Vec<&str> = report.changed.iter().map(|p| p.target.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[test]
    fn new_and_removed_need_no_fetching() {
        let fetcher = MockFetcher::new();
        let target = vec![entry("A", "t/a"), entry("B", "t/b")];
        let base = vec![entry("X", "b/x")];

        let report =
            run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None).unwrap();

        assert_eq!(report.new.len(), 2);
        assert_eq!(report.removed, vec![entry("X", "b/x")]);
        assert!(fetcher.get_requests().is_empty());
    }

    #[test]
    fn fetch_failure_aborts_the_run() {
        let fetcher = MockFetcher::new()
            .with("t/a", white())
            .with("b/a", white())
            .with("t/b", white());
        let target = vec![entry("B", "t/b"), entry("A", "t/a")];
        let base = vec![entry("A", "b/a"), entry("B", "b/missing")];

        let result = run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None);

        assert!(matches!(
            result,
            Err(DiffError::Fetch { ref title, source: FetchError::Status { code: 404, .. } }) if title == "B"
        ));
        // Stopped at the first failure: pair A was never fetched.
        assert_eq!(fetcher.get_requests(), vec!["t/b", "b/missing"]);
    }

    #[test]
    fn decode_failure_aborts_the_run() {
        let fetcher = MockFetcher::new()
            .with("t/a", b"<html>oops</html>".to_vec())
            .with("b/a", white());
        let target = vec![entry("A", "t/a")];
        let base = vec![entry("A", "b/a")];

        let result = run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None);

        assert!(matches!(result, Err(DiffError::Decode { ref url, .. }) if url == "t/a"));
    }

    #[test]
    fn dimension_mismatch_aborts_the_run() {
        let fetcher = MockFetcher::new()
            .with("t/a", solid_png(8, 8, WHITE))
            .with("b/a", solid_png(8, 9, WHITE));
        let target = vec![entry("A", "t/a")];
        let base = vec![entry("A", "b/a")];

        let result = run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None);

        assert!(matches!(
            result,
            Err(DiffError::Compare {
                source: CompareError::DimensionMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn missing_url_on_matched_entry_is_a_fetch_error() {
        let fetcher = MockFetcher::new().with("t/a", white());
        let target = vec![entry("A", "t/a")];
        let base: Vec<ImageEntry> =
            vec![serde_json::from_str(r#"{"title":"A"}"#).unwrap()];

        let result = run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None);

        assert!(matches!(
            result,
            Err(DiffError::Fetch {
                source: FetchError::MissingUrl(_),
                ..
            })
        ));
    }

    #[test]
    fn null_url_on_matched_entry_is_a_fetch_error() {
        let fetcher = MockFetcher::new().with("t/a", white());
        let target = vec![entry("A", "t/a")];
        let base: Vec<ImageEntry> =
            vec![serde_json::from_str(r#"{"title":"A","url":null}"#).unwrap()];

        let result = run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None);

        assert!(matches!(
            result,
            Err(DiffError::Fetch {
                source: FetchError::MissingUrl(_),
                ..
            })
        ));
    }

    #[test]
    fn threshold_controls_what_counts_as_changed() {
        let fetcher = MockFetcher::new()
            .with("t/a", solid_png(4, 4, [100, 100, 100, 255]))
            .with("b/a", solid_png(4, 4, [104, 100, 100, 255]));
        let target = vec![entry("A", "t/a")];
        let base = vec![entry("A", "b/a")];

        let lenient = run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), None)
            .unwrap();
        assert!(lenient.changed.is_empty());

        let strict = DiffOptions {
            compare: CompareOptions {
                threshold: 0.0,
                ..Default::default()
            },
            diff_dir: None,
        };
        let report = run_with_fetcher(&fetcher, &target, &base, &strict, None).unwrap();
        assert_eq!(report.changed.len(), 1);
    }

    #[test]
    fn emits_progress_events() {
        let fetcher = MockFetcher::new()
            .with("t/a", with_dot())
            .with("b/a", white());
        let target = vec![entry("A", "t/a"), entry("B", "t/b")];
        let base = vec![entry("A", "b/a")];
        let (tx, rx) = std::sync::mpsc::channel();

        run_with_fetcher(&fetcher, &target, &base, &DiffOptions::default(), Some(tx)).unwrap();

        let events: Vec<DiffEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                DiffEvent::Reconciled {
                    to_compare: 1,
                    new: 1,
                    removed: 0,
                },
                DiffEvent::Compared {
                    index: 1,
                    total: 1,
                    title: "A".to_string(),
                    diff_pixels: 4,
                    diff_image: None,
                },
            ]
        );
    }

    #[test]
    fn dropped_receiver_does_not_abort() {
        let fetcher = MockFetcher::new()
            .with("t/a", white())
            .with("b/a", white());
        let (tx, rx) = std::sync::mpsc::channel();
        drop(rx);

        let result = run_with_fetcher(
            &fetcher,
            &[entry("A", "t/a")],
            &[entry("A", "b/a")],
            &DiffOptions::default(),
            Some(tx),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn diff_dir_gets_images_for_changed_pairs_only() {
        let tmp = TempDir::new().unwrap();
        let diff_dir = tmp.path().join("diffs");
        let fetcher = MockFetcher::new()
            .with("t/a", white())
            .with("b/a", white())
            .with("t/b", with_dot())
            .with("b/b", white());
        let target = vec![entry("A", "t/a"), entry("Sunset / Pier", "t/b")];
        let base = vec![entry("A", "b/a"), entry("Sunset / Pier", "b/b")];
        let options = DiffOptions {
            diff_dir: Some(diff_dir.clone()),
            ..Default::default()
        };

        let report = run_with_fetcher(&fetcher, &target, &base, &options, None).unwrap();

        assert_eq!(report.changed.len(), 1);
        let expected = diff_image_path(&diff_dir, 2, "Sunset / Pier");
        assert_eq!(expected, diff_dir.join("002-Sunset---Pier.png"));
        assert!(expected.exists());
        assert!(!diff_image_path(&diff_dir, 1, "A").exists());

        let diff = imaging::decode(&std::fs::read(&expected).unwrap()).unwrap();
        assert_eq!(diff.dimensions(), (8, 8));
        // The red dot is painted with the diff colour.
        let pos = (3 * 8 + 3) * 4;
        assert_eq!(&diff.data()[pos..pos + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn diff_image_name_is_path_safe() {
        assert_eq!(diff_image_name(1, "Dawn"), "001-Dawn.png");
        assert_eq!(diff_image_name(12, "../etc/passwd"), "012----etc-passwd.png");
        assert_eq!(diff_image_name(3, "café_2"), "003-caf-_2.png");
    }
}

//! # imagegallery-diff
//!
//! Compares two snapshots of an image gallery and reports which images are
//! new, which were removed, and which changed visually.
//!
//! # Architecture: Reconcile, Then Compare
//!
//! ```text
//! target.json ─┐
//!              ├─ reconcile ─┬─ new, removed ───────────────────────┐
//! base.json ───┘             └─ pairs ─ fetch ─ decode ─ pixelmatch ┴─ report.json
//! ```
//!
//! 1. **Reconcile** matches entries by title with a first-match linear scan.
//!    Unmatched target entries are *new*, unmatched base entries *removed*.
//! 2. **Compare** downloads each matched pair, decodes both to RGBA, and counts
//!    differing pixels. Any non-zero count marks the pair *changed*.
//!
//! Comparison is strictly sequential: one pair is fetched, decoded, and
//! compared before the next begins, so `changed` always comes out in target
//! manifest order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Parses the target (`{images}`) and base (`[{contents: {images}}]`) files |
//! | [`reconcile`] | Title-keyed partition into new / removed / pairs to compare |
//! | [`fetch`] | [`Fetcher`](fetch::Fetcher) trait and the blocking HTTP implementation |
//! | [`imaging`] | Decoding and the pixelmatch comparator |
//! | [`pipeline`] | Drives reconcile → fetch → decode → compare and builds the [`Report`](types::Report) |
//! | [`config`] | Optional TOML settings layered over stock defaults |
//! | [`types`] | Entries, pairs, and the report, as serialized to JSON |
//! | [`output`] | CLI progress and summary formatting |
//!
//! # Design Decisions
//!
//! ## Fail Whole, Never Partial
//!
//! A fetch, decode, or dimension error anywhere aborts the run and no report
//! is written. A report that silently skipped a broken pair would claim that
//! image was unchanged.
//!
//! ## Base Snapshot Zero
//!
//! The base file is a list of published snapshots, newest first. Only element
//! 0 is read; the rest of the history is never parsed.
//!
//! ## Key-Based Matching
//!
//! Entries are matched by `title` alone. A moved image (same title, new URL)
//! is compared, not reported as removed-and-added.

pub mod config;
pub mod fetch;
pub mod imaging;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

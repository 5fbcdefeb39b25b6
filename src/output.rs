//! CLI output formatting.
//!
//! Each piece of output has a `format_*` function (returns `Vec<String>`) for
//! testability and, where it is printed directly, a `print_*` wrapper that
//! writes to stdout. Format functions are pure: no I/O, no side effects.
//!
//! ```text
//! Reconciled: 3 to compare, 1 new, 0 removed
//! [001/003] Dawn: unchanged
//! [002/003] Dusk: changed (1532 pixels)
//!     Diff: diffs/002-Dusk.png
//! [003/003] Harbor: unchanged
//! Image comparison results:
//! Found 1 changed image(s)
//! Found 1 new image(s)
//! Found 0 removed image(s)
//! ```

use crate::pipeline::DiffEvent;
use crate::types::Report;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Format a single pipeline progress event as display lines.
pub fn format_diff_event(event: &DiffEvent) -> Vec<String> {
    match event {
        DiffEvent::Reconciled {
            to_compare,
            new,
            removed,
        } => vec![format!(
            "Reconciled: {} to compare, {} new, {} removed",
            to_compare, new, removed
        )],
        DiffEvent::Compared {
            index,
            total,
            title,
            diff_pixels,
            diff_image,
        } => {
            let status = if *diff_pixels > 0 {
                format!("changed ({} pixels)", diff_pixels)
            } else {
                "unchanged".to_string()
            };
            let mut lines = vec![format!(
                "[{}/{}] {}: {}",
                format_index(*index),
                format_index(*total),
                title,
                status
            )];
            if let Some(path) = diff_image {
                lines.push(format!("    Diff: {}", path.display()));
            }
            lines
        }
    }
}

/// Format the end-of-run summary.
pub fn format_summary(report: &Report) -> Vec<String> {
    vec![
        "Image comparison results:".to_string(),
        format!("Found {} changed image(s)", report.changed.len()),
        format!("Found {} new image(s)", report.new.len()),
        format!("Found {} removed image(s)", report.removed.len()),
    ]
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(report: &Report) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

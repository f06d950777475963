//! CLI output formatting.
//!
//! Every item outcome gets one header line, followed by indented context lines.
//! The header of a written item leads with its output id, so the console reads
//! as the numbered inventory of the output directory.
//!
//! # Output Format
//!
//! ```text
//! Normalizing 3 images (folder order)
//! 001 → out/1.png
//!     Source: photos/cat.jpg
//!     Caption: out/1.txt
//! FAILED photos/broken.png
//!     decode error: failed to decode photos/broken.png: ...
//! 002 → out/2.png
//!     Source: photos/dog.jpg
//! Removed stale out/3.png
//!
//! Wrote 2 images, 1 caption, 1 failed, 1 stale output removed
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and does no I/O; the
//! `print_*` wrappers write to stdout.

use crate::process::{ProcessEvent, RunSummary};

/// Format a 1-based id as 3-digit zero-padded.
fn format_index(id: u32) -> String {
    format!("{:0>3}", id)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Format one progress event.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::RunStarted { total, order } => {
            vec![format!(
                "Normalizing {} ({} order)",
                plural(*total, "image", "images"),
                order
            )]
        }
        ProcessEvent::ItemWritten {
            id,
            source,
            output,
            caption,
        } => {
            let mut lines = vec![
                format!("{} \u{2192} {}", format_index(*id), output.display()),
                format!("{}Source: {}", indent(1), source.display()),
            ];
            if let Some(caption) = caption {
                lines.push(format!("{}Caption: {}", indent(1), caption.display()));
            }
            lines
        }
        ProcessEvent::CaptionFailed { reason, .. } => {
            vec![format!("{}Caption FAILED: {}", indent(1), reason)]
        }
        ProcessEvent::ItemFailed {
            source,
            kind,
            reason,
        } => vec![
            format!("FAILED {}", source.display()),
            format!("{}{}: {}", indent(1), kind, reason),
        ],
        ProcessEvent::StaleRemoved { path } => {
            vec![format!("Removed stale {}", path.display())]
        }
        ProcessEvent::StaleKept { path, reason } => vec![
            format!("Could not remove stale {}", path.display()),
            format!("{}{}", indent(1), reason),
        ],
    }
}

/// Format the closing summary of a run.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut line = format!(
        "Wrote {}, {}, {} failed",
        plural(summary.processed.len(), "image", "images"),
        plural(summary.captions_copied(), "caption", "captions"),
        summary.failures.len()
    );
    if !summary.stale_removed.is_empty() {
        line.push_str(&format!(
            ", {} removed",
            plural(
                summary.stale_removed.len(),
                "stale output",
                "stale outputs"
            )
        ));
    }
    let caption_failures = summary.caption_failures();
    if caption_failures > 0 {
        line.push_str(&format!(" ({caption_failures} caption copies failed)"));
    }
    vec![String::new(), line]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

//! Result reporting: live per-file lines, the final summary, and the
//! `logs.txt` record written next to the converted files.
//!
//! Format functions are pure — no I/O, no side effects — so tests assert on
//! strings directly. [`save_logs`] is the one exception: it stats the source
//! and output files to report sizes, then writes `jpegs/logs.txt`.
//!
//! ```text
//! IMG_0001.heic 2.4MB > converted > jpegs/IMG_0001.jpg 1.1MB
//! IMG_0002.heic > failed: decode: invalid HEIC bitstream
//!
//! 2 files
//! Total time: 1.8s
//! Average per file: 900ms
//! Total HEIC size: 4.1MB
//! Total JPEG size: 1.1MB
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::BatchEvent;
use crate::convert::Outcome;
use crate::layout::{OUTPUT_SUBDIR, WorkingContext};

/// Format bytes into a human-readable size (`500B`, `1.5KB`, `2.4MB`).
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{size:.1}{}", UNITS[unit])
    }
}

/// One live line per finished file, printed by the printer thread.
pub fn format_event(event: &BatchEvent) -> String {
    match &event.outcome {
        Outcome::Converted => {
            let stem = Path::new(&event.name)
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy();
            format!("{} > converted > {OUTPUT_SUBDIR}/{stem}.jpg", event.name)
        }
        Outcome::Failed(reason) => format!("{} > failed: {}", event.name, reason),
    }
}

/// Final one-line summary with counts and elapsed time.
pub fn format_summary(results: &BTreeMap<String, Outcome>, elapsed: Duration) -> String {
    let converted = results.values().filter(|o| o.is_converted()).count();
    let failed = results.len() - converted;
    format!("Done: {converted} converted, {failed} failed, took {elapsed:?}")
}

/// One logs.txt line for a finished file, sizes included.
fn format_log_line(name: &str, outcome: &Outcome, source_size: u64, output_size: u64) -> String {
    match outcome {
        Outcome::Converted => {
            let stem = Path::new(name).file_stem().unwrap_or_default().to_string_lossy();
            format!(
                "{name} {} > converted > {OUTPUT_SUBDIR}/{stem}.jpg {}",
                human_readable_size(source_size),
                human_readable_size(output_size)
            )
        }
        Outcome::Failed(reason) => format!("{name} > failed: {reason}"),
    }
}

/// Trailer lines: counts, timing, aggregate sizes.
fn format_log_trailer(
    file_count: usize,
    elapsed: Duration,
    total_source: u64,
    total_output: u64,
) -> Vec<String> {
    let average = if file_count > 0 {
        elapsed / file_count as u32
    } else {
        elapsed
    };
    vec![
        String::new(),
        format!("{file_count} files"),
        format!("Total time: {elapsed:?}"),
        format!("Average per file: {average:?}"),
        format!("Total HEIC size: {}", human_readable_size(total_source)),
        format!("Total JPEG size: {}", human_readable_size(total_output)),
    ]
}

/// Write the batch record to `jpegs/logs.txt` and return its path.
pub fn save_logs(
    ctx: &WorkingContext,
    results: &BTreeMap<String, Outcome>,
    elapsed: Duration,
) -> std::io::Result<PathBuf> {
    let mut lines = Vec::with_capacity(results.len() + 6);
    let mut total_source = 0u64;
    let mut total_output = 0u64;

    for (name, outcome) in results {
        let source_size = file_size(&ctx.source_dir.join(name));
        total_source += source_size;

        let output_size = if outcome.is_converted() {
            let size = file_size(&ctx.output_path(name));
            total_output += size;
            size
        } else {
            0
        };

        lines.push(format_log_line(name, outcome, source_size, output_size));
    }

    lines.extend(format_log_trailer(
        results.len(),
        elapsed,
        total_source,
        total_output,
    ));

    let path = ctx.output_dir.join("logs.txt");
    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

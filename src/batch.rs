//! Batch orchestration: dispatch eligible files to the converter in parallel
//! and collect one outcome per file.
//!
//! Work is spread across rayon's global pool — one task per eligible file,
//! bounded by the pool size, so a 2,000-photo import does not hold 2,000
//! decoded pixel buffers at once. Workers share nothing mutable: results
//! flow back through rayon's collect (each filename is a unique key) and
//! progress flows out through an mpsc channel drained by a single printer
//! thread. A failed file never disturbs its in-flight siblings; [`run`]
//! returns only after every dispatched conversion has finished.

use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

use rayon::prelude::*;

use crate::backend::ConvertBackend;
use crate::convert::{self, Outcome};
use crate::layout::WorkingContext;
use crate::resolve::Candidate;

/// Progress notification emitted as each file finishes.
#[derive(Debug, Clone)]
pub struct BatchEvent {
    pub name: String,
    pub outcome: Outcome,
}

/// Number of worker threads to use: available cores, optionally capped.
///
/// The user can constrain down, not up.
pub fn effective_workers(requested: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// Filter candidates down to convertible files.
///
/// Directories and unsupported extensions drop out entirely — they get no
/// result entry, matching the converter's own skip behavior.
pub fn eligible_files(candidates: &[Candidate]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| !c.is_dir() && convert::is_eligible(c.name()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Convert every eligible candidate, in parallel, and report per-file results.
///
/// The returned map holds exactly one entry per eligible file, keyed by the
/// source filename (original extension included). Completion order is
/// non-deterministic; the map itself is sorted by key.
pub fn run(
    backend: &impl ConvertBackend,
    ctx: &WorkingContext,
    candidates: &[Candidate],
    progress: Option<Sender<BatchEvent>>,
) -> BTreeMap<String, Outcome> {
    eligible_files(candidates)
        .into_par_iter()
        .map_with(progress, |progress, name| {
            let outcome = match convert::convert_file(backend, ctx, &name) {
                Ok(()) => Outcome::Converted,
                Err(e) => Outcome::Failed(e.to_string()),
            };
            if let Some(tx) = progress {
                // Receiver may have hung up; progress is best-effort
                let _ = tx.send(BatchEvent {
                    name: name.clone(),
                    outcome: outcome.clone(),
                });
            }
            (name, outcome)
        })
        .collect()
}

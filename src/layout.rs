//! Output directory layout.
//!
//! Converted JPEGs land in a `jpegs/` subdirectory next to the source files:
//!
//! ```text
//! Photos/
//! ├── IMG_0001.heic
//! ├── IMG_0002.heic
//! └── jpegs/
//!     ├── IMG_0001.jpg
//!     ├── IMG_0002.jpg
//!     └── logs.txt
//! ```
//!
//! [`WorkingContext`] pins down both directories once, up front. Creating the
//! output directory is the only filesystem write that happens before workers
//! are dispatched, and its failure aborts the whole run — there is nowhere to
//! put results without it.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the subdirectory that receives converted files.
pub const OUTPUT_SUBDIR: &str = "jpegs";

#[derive(Error, Debug)]
#[error("cannot create output directory {path}: {source}")]
pub struct OutputDirError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Resolved source and output directories for one run.
///
/// Computed once before dispatch and read-only afterwards.
#[derive(Debug, Clone)]
pub struct WorkingContext {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl WorkingContext {
    /// Compute `source_dir/jpegs` and make sure it exists.
    ///
    /// Idempotent — an existing directory is left alone.
    pub fn prepare(source_dir: &Path) -> Result<Self, OutputDirError> {
        let output_dir = source_dir.join(OUTPUT_SUBDIR);
        fs::create_dir_all(&output_dir).map_err(|source| OutputDirError {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self {
            source_dir: source_dir.to_path_buf(),
            output_dir,
        })
    }

    /// Map a source filename to its output path: `IMG_0001.heic` → `jpegs/IMG_0001.jpg`.
    pub fn output_path(&self, source_name: &str) -> PathBuf {
        let stem = Path::new(source_name).file_stem().unwrap_or_default();
        self.output_dir
            .join(format!("{}.jpg", stem.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prepare_creates_output_dir() {
        let tmp = TempDir::new().unwrap();
        let ctx = WorkingContext::prepare(tmp.path()).unwrap();

        assert!(ctx.output_dir.is_dir());
        assert_eq!(ctx.output_dir, tmp.path().join("jpegs"));
        assert_eq!(ctx.source_dir, tmp.path());
    }

    #[test]
    fn prepare_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        WorkingContext::prepare(tmp.path()).unwrap();
        let ctx = WorkingContext::prepare(tmp.path()).unwrap();

        assert!(ctx.output_dir.is_dir());
    }

    #[test]
    fn prepare_fails_when_blocked_by_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("jpegs"), "not a directory").unwrap();

        let result = WorkingContext::prepare(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn output_path_replaces_extension() {
        let tmp = TempDir::new().unwrap();
        let ctx = WorkingContext::prepare(tmp.path()).unwrap();

        assert_eq!(
            ctx.output_path("IMG_0001.heic"),
            ctx.output_dir.join("IMG_0001.jpg")
        );
        assert_eq!(
            ctx.output_path("vacation.HEIF"),
            ctx.output_dir.join("vacation.jpg")
        );
    }

    #[test]
    fn output_path_handles_dotted_stems() {
        let tmp = TempDir::new().unwrap();
        let ctx = WorkingContext::prepare(tmp.path()).unwrap();

        assert_eq!(
            ctx.output_path("2024.06.01.heic"),
            ctx.output_dir.join("2024.06.01.jpg")
        );
    }
}

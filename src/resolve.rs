//! Input resolution: turn the CLI path argument into a source directory plus
//! a candidate list.
//!
//! Three invocation shapes, one output:
//!
//! | Argument      | `source_dir`       | Candidates                       |
//! |---------------|--------------------|----------------------------------|
//! | directory     | that directory     | its full non-recursive listing   |
//! | regular file  | the file's parent  | one synthetic entry for the file |
//! | none          | current directory  | its full non-recursive listing   |
//!
//! Resolution is read-only — no directory is created here, and candidates are
//! not filtered by extension (that is the orchestrator's job, so the same
//! predicate governs both dispatch and reporting).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("input path not found: {0}")]
    NotFound(PathBuf),
    #[error("cannot inspect {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A directory entry under consideration for conversion.
///
/// Two variants: entries backed by a real directory listing, and the
/// synthetic entry produced when the user names a single file directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Came from a `read_dir` listing of the source directory.
    Listed { name: String, is_dir: bool },
    /// Synthesized for a single-file invocation. Never a directory.
    Single { name: String },
}

impl Candidate {
    pub fn name(&self) -> &str {
        match self {
            Candidate::Listed { name, .. } | Candidate::Single { name } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        match self {
            Candidate::Listed { is_dir, .. } => *is_dir,
            Candidate::Single { .. } => false,
        }
    }
}

/// Result of input resolution: where to work, and what to consider.
#[derive(Debug)]
pub struct Resolved {
    pub source_dir: PathBuf,
    pub candidates: Vec<Candidate>,
}

/// Resolve the optional CLI path into a working directory and candidate set.
pub fn resolve(input: Option<&Path>) -> Result<Resolved, ResolveError> {
    let path = input.unwrap_or(Path::new("."));

    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ResolveError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ResolveError::Stat {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if metadata.is_dir() {
        Ok(Resolved {
            source_dir: path.to_path_buf(),
            candidates: list_dir(path)?,
        })
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Resolved {
            source_dir: parent_dir(path),
            candidates: vec![Candidate::Single { name }],
        })
    }
}

/// Parent directory of a single-file argument.
///
/// `parent()` yields "" for bare filenames like `photo.heic`; fall back to
/// the current directory so joins against it stay valid.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// List a directory's entries, sorted by name for stable processing order.
fn list_dir(dir: &Path) -> Result<Vec<Candidate>, ResolveError> {
    let stat_err = |source| ResolveError::Stat {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(stat_err)? {
        let entry = entry.map_err(stat_err)?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        candidates.push(Candidate::Listed {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    candidates.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(candidates)
}

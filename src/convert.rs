//! Per-file conversion pipeline: read → decode → encode → transplant → write.
//!
//! Each stage maps to one [`ConvertError`] variant so a failure message names
//! where the pipeline broke (`read:`, `decode:`, `encode:`, `metadata:`,
//! `write:`) along with the underlying error. A file's failure is always
//! contained here — the orchestrator records it as an [`Outcome`] and moves
//! on.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::backend::{BackendError, ConvertBackend};
use crate::exif::{self, MetadataError};
use crate::layout::WorkingContext;

/// Source extensions eligible for conversion (matched case-insensitively).
///
/// AVIF is deliberately absent: same container family, but conversion is
/// scoped to camera HEIC/HEIF output.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Shared eligibility predicate.
///
/// Both the orchestrator (what gets dispatched) and the converter (what gets
/// reported) go through this one function, so the two can never diverge.
pub fn is_eligible(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("read: {0}")]
    Read(std::io::Error),
    #[error("decode: {0}")]
    Decode(BackendError),
    #[error("encode: {0}")]
    Encode(BackendError),
    #[error("metadata: {0}")]
    Metadata(#[from] MetadataError),
    #[error("write: {0}")]
    Write(std::io::Error),
}

/// Result of converting one file, as recorded in the batch report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted,
    Failed(String),
}

impl Outcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, Outcome::Converted)
    }
}

/// Run the full pipeline for one eligible file.
///
/// Writes `ctx.output_path(name)`, overwriting any previous output. The
/// source bytes are handed to the EXIF transplanter alongside the encoded
/// JPEG so metadata survives the container switch.
pub fn convert_file(
    backend: &impl ConvertBackend,
    ctx: &WorkingContext,
    name: &str,
) -> Result<(), ConvertError> {
    let source = fs::read(ctx.source_dir.join(name)).map_err(ConvertError::Read)?;
    let pixels = backend.decode(&source).map_err(ConvertError::Decode)?;
    let encoded = backend.encode_jpeg(&pixels).map_err(ConvertError::Encode)?;
    let final_bytes = exif::transplant(&source, encoded)?;
    fs::write(ctx.output_path(name), final_bytes).map_err(ConvertError::Write)?;
    Ok(())
}

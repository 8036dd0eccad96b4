//! # heic2jpeg
//!
//! Convert HEIC/HEIF photos to JPEG — a directory at a time or a single file —
//! preserving EXIF metadata across the container switch.
//!
//! # Architecture: One Pipeline, Five Seams
//!
//! ```text
//! resolve    path argument   →  source dir + candidate list
//! layout     source dir      →  jpegs/ output dir (created once, up front)
//! batch      candidates      →  parallel per-file dispatch, result map
//! convert    one file        →  read → decode → encode → transplant → write
//! exif       source bytes    →  EXIF payload spliced into the JPEG
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolve`] | Turns the CLI path into a source directory and candidate entries |
//! | [`layout`] | Output directory convention (`<source>/jpegs`) and path mapping |
//! | [`batch`] | Parallel orchestration over eligible files, one outcome per file |
//! | [`convert`] | The per-file pipeline and its stage-named error taxonomy |
//! | [`exif`] | ISO-BMFF metadata walk + JPEG APP1 splice |
//! | [`backend`] | Decode/encode trait seam: libheif in production, a mock in tests |
//! | [`report`] | Live progress lines, the final summary, and `jpegs/logs.txt` |
//!
//! # Design Decisions
//!
//! ## Failures Are Data
//!
//! A corrupt file in a 500-photo import must not cost the other 499. Per-file
//! errors never propagate past [`convert`]: the orchestrator records them as
//! [`convert::Outcome::Failed`] entries in the result map and keeps going.
//! Only two things abort a run, both before any worker starts: an input path
//! that cannot be resolved, and an output directory that cannot be created.
//!
//! ## Bounded Parallelism
//!
//! Decoding holds a full pixel buffer per file, so the batch runs on rayon's
//! fixed-size pool (available cores by default, `--workers` to constrain
//! down). Workers share no mutable state — results are collected by rayon,
//! progress flows through an mpsc channel to a single printer thread.
//!
//! ## EXIF Without Re-encoding
//!
//! The EXIF block is lifted straight out of the HEIC container's item table
//! and spliced into the JPEG as an APP1 segment via `img-parts`. Pixel data
//! is encoded exactly once; metadata never passes through the decoder at all,
//! so orientation, capture time and camera settings survive byte-for-byte.
//!
//! ## Decoding Behind a Trait
//!
//! HEIC decoding needs libheif; everything else here is pure Rust. The
//! [`backend::ConvertBackend`] trait keeps that boundary explicit and lets
//! the entire pipeline — filtering, dispatch, transplant, reporting — run
//! under tests with a mock backend and synthetic containers.

pub mod backend;
pub mod batch;
pub mod convert;
pub mod exif;
pub mod layout;
pub mod report;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_helpers;

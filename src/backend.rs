//! Decode/encode seam between the pipeline and the image libraries.
//!
//! The [`ConvertBackend`] trait isolates the two operations the converter
//! delegates: HEIC bitstream decoding and JPEG encoding. The production
//! implementation is [`LibheifBackend`] — libheif for decode, the `image`
//! crate's JPEG encoder for encode. Tests swap in a mock
//! ([`tests::MockBackend`]) so the whole batch pipeline runs without libheif
//! or real camera files.

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Default JPEG quality, matching what Photos.app exports.
pub const DEFAULT_QUALITY: u8 = 95;

/// Decoding and encoding operations the converter delegates.
///
/// `Sync` because workers share one backend across rayon tasks.
pub trait ConvertBackend: Sync {
    /// Decode a HEIC/HEIF byte stream into an interleaved RGB buffer.
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError>;

    /// Encode an RGB buffer as JPEG bytes.
    fn encode_jpeg(&self, image: &RgbImage) -> Result<Vec<u8>, BackendError>;
}

/// Production backend: libheif decode + `image` crate JPEG encode.
pub struct LibheifBackend {
    quality: u8,
}

impl LibheifBackend {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl Default for LibheifBackend {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl ConvertBackend for LibheifBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError> {
        let decode_err = |e: &dyn std::fmt::Display| BackendError::Decode(e.to_string());

        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes).map_err(|e| decode_err(&e))?;
        let handle = ctx.primary_image_handle().map_err(|e| decode_err(&e))?;
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| decode_err(&e))?;

        let width = decoded.width();
        let height = decoded.height();
        let planes = decoded.planes();
        let interleaved = planes
            .interleaved
            .ok_or_else(|| BackendError::Decode("no interleaved RGB plane".to_string()))?;

        // Rows may carry stride padding; copy them into a contiguous buffer
        let row_bytes = width as usize * 3;
        let mut rgb = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * interleaved.stride;
            rgb.extend_from_slice(&interleaved.data[start..start + row_bytes]);
        }

        RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| BackendError::Decode("decoded buffer has wrong size".to_string()))
    }

    fn encode_jpeg(&self, image: &RgbImage) -> Result<Vec<u8>, BackendError> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        image
            .write_with_encoder(encoder)
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(out)
    }
}

//! EXIF transplantation: HEIC/HEIF container → JPEG APP1 segment.
//!
//! HEIF stores EXIF as a metadata *item* inside the ISO-BMFF container: the
//! `meta` box holds an item list (`iinf`) naming an item of type `Exif`, and
//! an item location table (`iloc`) pointing at its bytes elsewhere in the
//! file. JPEG instead carries EXIF in an APP1 marker segment right after the
//! start-of-image marker. Transplanting means walking the boxes on one side
//! and splicing a marker segment on the other.
//!
//! The box walk is hand-rolled over the raw bytes — the container structure
//! needed here is a few fixed-layout tables, not a general BMFF library. The
//! JPEG side goes through `img-parts`, which rewrites the segment list
//! without touching entropy-coded image data.
//!
//! Absence of EXIF is normal (screenshots, edited exports) and yields `None`;
//! only a container that cannot be parsed at all is an error.

use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("not an ISO-BMFF container (missing ftyp box)")]
    NotIsobmff,
    #[error("truncated container: {0}")]
    Truncated(&'static str),
    #[error("malformed {0} box")]
    Malformed(&'static str),
    #[error("JPEG rewrite failed: {0}")]
    Jpeg(#[from] img_parts::Error),
}

/// Splice the source container's EXIF block into an encoded JPEG.
///
/// Returns `jpeg` unchanged when the source carries no EXIF. The output is a
/// structurally valid JPEG either way — `img-parts` re-emits the full marker
/// sequence, inserting the APP1 segment directly after start-of-image.
pub fn transplant(source: &[u8], jpeg: Vec<u8>) -> Result<Vec<u8>, MetadataError> {
    match extract(source)? {
        None => Ok(jpeg),
        Some(payload) => {
            let mut parsed = Jpeg::from_bytes(jpeg.into())?;
            parsed.set_exif(Some(payload.into()));
            Ok(parsed.encoder().bytes().to_vec())
        }
    }
}

/// Extract the EXIF payload (raw TIFF bytes) from a HEIC/HEIF/AVIF container.
///
/// `Ok(None)` when the container parses but has no `Exif` item.
pub fn extract(source: &[u8]) -> Result<Option<Vec<u8>>, MetadataError> {
    let mut s = Scanner::new(source);

    let (kind, _) = next_box(&mut s).map_err(|_| MetadataError::NotIsobmff)?;
    if &kind != b"ftyp" {
        return Err(MetadataError::NotIsobmff);
    }

    let mut meta_body = None;
    while s.remaining() >= 8 {
        let (kind, body) = next_box(&mut s)?;
        if &kind == b"meta" {
            meta_body = Some(body);
            break;
        }
    }
    let Some(meta) = meta_body else {
        return Ok(None);
    };

    // meta is a full box: 1 byte version + 3 bytes flags before children
    let mut m = Scanner::new(meta);
    m.skip(4, "meta")?;

    let mut exif_item = None;
    let mut locations = Vec::new();
    let mut idat = None;
    while m.remaining() >= 8 {
        let (kind, body) = next_box(&mut m)?;
        match &kind {
            b"iinf" => exif_item = parse_iinf(body)?,
            b"iloc" => locations = parse_iloc(body)?,
            b"idat" => idat = Some(body),
            _ => {}
        }
    }

    let Some(item_id) = exif_item else {
        return Ok(None);
    };
    let Some(location) = locations.into_iter().find(|l| l.item_id == item_id) else {
        return Ok(None);
    };

    let payload = match location.construction {
        // Method 0: extents are absolute file offsets
        0 => read_extents(source, &location)?,
        // Method 1: extents are relative to the meta box's idat payload
        1 => {
            let Some(idat) = idat else {
                return Err(MetadataError::Malformed("iloc"));
            };
            read_extents(idat, &location)?
        }
        // Method 2 (item-relative) never shows up in camera output; the
        // container is still parseable, so convert without EXIF
        _ => return Ok(None),
    };

    strip_exif_header(payload).map(Some)
}

/// Concatenate an item's extents out of its backing byte range.
fn read_extents(data: &[u8], location: &ItemLocation) -> Result<Vec<u8>, MetadataError> {
    let mut payload = Vec::new();
    for (offset, length) in &location.extents {
        let start = usize::try_from(*offset).map_err(|_| MetadataError::Truncated("exif extent"))?;
        let end = start
            .checked_add(usize::try_from(*length).map_err(|_| MetadataError::Truncated("exif extent"))?)
            .filter(|&e| e <= data.len())
            .ok_or(MetadataError::Truncated("exif extent"))?;
        payload.extend_from_slice(&data[start..end]);
    }
    Ok(payload)
}

/// Strip the HEIF `ExifDataBlock` framing, leaving raw TIFF bytes.
///
/// Layout: a 4-byte big-endian offset to the TIFF header, usually spanning an
/// `Exif\0\0` identifier. Some writers set the offset to 0 and keep the
/// identifier inline, so it is stripped separately if still present.
fn strip_exif_header(payload: Vec<u8>) -> Result<Vec<u8>, MetadataError> {
    if payload.len() < 4 {
        return Err(MetadataError::Truncated("exif payload"));
    }
    let offset = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
    let start = 4usize
        .checked_add(offset)
        .filter(|&s| s <= payload.len())
        .ok_or(MetadataError::Truncated("exif payload"))?;

    let mut tiff = payload[start..].to_vec();
    if tiff.starts_with(b"Exif\x00\x00") {
        tiff.drain(..6);
    }
    Ok(tiff)
}

// ---------------------------------------------------------------------------
// Box scanning
// ---------------------------------------------------------------------------

struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], MetadataError> {
        if self.remaining() < n {
            return Err(MetadataError::Truncated(what));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize, what: &'static str) -> Result<(), MetadataError> {
        self.take(n, what).map(|_| ())
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, MetadataError> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &'static str) -> Result<u16, MetadataError> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, MetadataError> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self, what: &'static str) -> Result<u64, MetadataError> {
        let b = self.take(8, what)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn fourcc(&mut self, what: &'static str) -> Result<[u8; 4], MetadataError> {
        let b = self.take(4, what)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Read a big-endian unsigned integer of `size` bytes (0 reads nothing).
    fn sized_uint(&mut self, size: usize, what: &'static str) -> Result<u64, MetadataError> {
        if size > 8 {
            return Err(MetadataError::Malformed(what));
        }
        let bytes = self.take(size, what)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }
}

/// Read one box header and return its type plus body slice.
fn next_box<'a>(s: &mut Scanner<'a>) -> Result<([u8; 4], &'a [u8]), MetadataError> {
    let size = s.u32("box header")? as u64;
    let kind = s.fourcc("box header")?;

    let body_len = match size {
        // size 0: box extends to end of enclosing container
        0 => s.remaining() as u64,
        // size 1: 64-bit largesize follows the type field
        1 => s
            .u64("box largesize")?
            .checked_sub(16)
            .ok_or(MetadataError::Malformed("box"))?,
        2..=7 => return Err(MetadataError::Malformed("box")),
        _ => size - 8,
    };

    let body_len = usize::try_from(body_len).map_err(|_| MetadataError::Malformed("box"))?;
    Ok((kind, s.take(body_len, "box body")?))
}

/// Find the item ID of the `Exif` item, if the item list declares one.
fn parse_iinf(body: &[u8]) -> Result<Option<u32>, MetadataError> {
    let mut s = Scanner::new(body);
    let version = s.u8("iinf")?;
    s.skip(3, "iinf")?;
    let entry_count = if version == 0 {
        s.u16("iinf")? as u32
    } else {
        s.u32("iinf")?
    };

    for _ in 0..entry_count {
        if s.remaining() < 8 {
            break;
        }
        let (kind, entry) = next_box(&mut s)?;
        if &kind != b"infe" {
            continue;
        }
        if let Some(id) = parse_infe(entry)? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Parse one item info entry; returns the item ID when its type is `Exif`.
fn parse_infe(body: &[u8]) -> Result<Option<u32>, MetadataError> {
    let mut s = Scanner::new(body);
    let version = s.u8("infe")?;
    s.skip(3, "infe")?;

    // Versions 0/1 predate typed items and cannot declare Exif
    if version < 2 {
        return Ok(None);
    }

    let item_id = if version == 2 {
        s.u16("infe")? as u32
    } else {
        s.u32("infe")?
    };
    s.skip(2, "infe")?; // item_protection_index
    let item_type = s.fourcc("infe")?;

    Ok((&item_type == b"Exif").then_some(item_id))
}

struct ItemLocation {
    item_id: u32,
    construction: u8,
    /// (offset, length) per extent; offsets are file-absolute for
    /// construction method 0, idat-relative for method 1
    extents: Vec<(u64, u64)>,
}

/// Parse the item location table (iloc versions 0, 1 and 2).
fn parse_iloc(body: &[u8]) -> Result<Vec<ItemLocation>, MetadataError> {
    let mut s = Scanner::new(body);
    let version = s.u8("iloc")?;
    s.skip(3, "iloc")?;

    let sizes = s.u8("iloc")?;
    let offset_size = (sizes >> 4) as usize;
    let length_size = (sizes & 0x0F) as usize;
    let sizes = s.u8("iloc")?;
    let base_offset_size = (sizes >> 4) as usize;
    let index_size = if version >= 1 {
        (sizes & 0x0F) as usize
    } else {
        0
    };

    let item_count = if version < 2 {
        s.u16("iloc")? as u32
    } else {
        s.u32("iloc")?
    };

    let mut items = Vec::new();
    for _ in 0..item_count {
        let item_id = if version < 2 {
            s.u16("iloc")? as u32
        } else {
            s.u32("iloc")?
        };
        let construction = if version >= 1 {
            (s.u16("iloc")? & 0x000F) as u8
        } else {
            0
        };
        s.skip(2, "iloc")?; // data_reference_index
        let base_offset = s.sized_uint(base_offset_size, "iloc")?;
        let extent_count = s.u16("iloc")?;

        let mut extents = Vec::new();
        for _ in 0..extent_count {
            if index_size > 0 {
                s.skip(index_size, "iloc")?;
            }
            let extent_offset = s.sized_uint(offset_size, "iloc")?;
            let extent_length = s.sized_uint(length_size, "iloc")?;
            let position = base_offset
                .checked_add(extent_offset)
                .ok_or(MetadataError::Malformed("iloc"))?;
            extents.push((position, extent_length));
        }

        items.push(ItemLocation {
            item_id,
            construction,
            extents,
        });
    }
    Ok(items)
}

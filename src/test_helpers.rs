//! Shared test fixtures.
//!
//! [`minimal_heic`] builds a structurally honest ISO-BMFF byte stream — real
//! box headers, a real item table, absolute file offsets that resolve — so
//! the EXIF walker is exercised against the same layout camera files use,
//! without shipping binary fixtures. [`tiny_jpeg`] encodes a genuine 1×1
//! JPEG so segment surgery operates on a real marker stream.

/// A minimal HEIC container: `ftyp`, optionally `meta` (hdlr/iinf/iloc)
/// pointing at an EXIF payload inside `mdat`.
///
/// When `exif_tiff` is given, the payload is framed the way HEIF stores it:
/// a 4-byte TIFF-header offset followed by `Exif\0\0` and the TIFF bytes.
pub(crate) fn minimal_heic(exif_tiff: Option<&[u8]>) -> Vec<u8> {
    let mut ftyp_body = Vec::new();
    ftyp_body.extend_from_slice(b"heic"); // major brand
    ftyp_body.extend_from_slice(&0u32.to_be_bytes()); // minor version
    ftyp_body.extend_from_slice(b"mif1"); // compatible brand
    let ftyp = bmff_box(b"ftyp", &ftyp_body);

    let Some(tiff) = exif_tiff else {
        let mut out = ftyp;
        out.extend_from_slice(&bmff_box(b"mdat", &[0, 0]));
        return out;
    };

    let payload = exif_block(tiff);

    // The iloc extent offset is absolute, so size the meta box first with a
    // placeholder, then rebuild with the real offset.
    let probe = meta_box(0, payload.len() as u32);
    let extent_offset = (ftyp.len() + probe.len() + 8) as u32;
    let meta = meta_box(extent_offset, payload.len() as u32);

    let mut out = ftyp;
    out.extend_from_slice(&meta);
    out.extend_from_slice(&bmff_box(b"mdat", &payload));
    out
}

/// Bytes that fail HEIC decoding (and are not a BMFF container at all).
pub(crate) fn corrupt_heic() -> Vec<u8> {
    b"corrupt heic payload that no decoder accepts".to_vec()
}

/// A real, decodable 1×1 JPEG.
pub(crate) fn tiny_jpeg() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(1, 1, image::Rgb([128, 128, 128]));
    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 90);
    image.write_with_encoder(encoder).unwrap();
    out
}

/// Frame raw TIFF bytes the way HEIF stores an EXIF item payload.
pub(crate) fn exif_block(tiff: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&6u32.to_be_bytes()); // exif_tiff_header_offset
    payload.extend_from_slice(b"Exif\x00\x00");
    payload.extend_from_slice(tiff);
    payload
}

pub(crate) fn bmff_box(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + body.len());
    out.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    out
}

pub(crate) fn full_box(kind: &[u8; 4], version: u8, body: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(4 + body.len());
    full.push(version);
    full.extend_from_slice(&[0, 0, 0]); // flags
    full.extend_from_slice(body);
    bmff_box(kind, &full)
}

/// The `meta` box: handler, item info declaring item 1 as `Exif`, and an
/// item location pointing at `extent_offset..extent_offset+extent_length`.
fn meta_box(extent_offset: u32, extent_length: u32) -> Vec<u8> {
    let mut hdlr_body = vec![0u8; 4]; // pre_defined
    hdlr_body.extend_from_slice(b"pict");
    hdlr_body.extend_from_slice(&[0u8; 12]); // reserved
    hdlr_body.push(0); // empty name
    let hdlr = full_box(b"hdlr", 0, &hdlr_body);

    let mut infe_body = Vec::new();
    infe_body.extend_from_slice(&1u16.to_be_bytes()); // item_ID
    infe_body.extend_from_slice(&0u16.to_be_bytes()); // item_protection_index
    infe_body.extend_from_slice(b"Exif");
    infe_body.push(0); // empty item_name
    let infe = full_box(b"infe", 2, &infe_body);

    let mut iinf_body = Vec::new();
    iinf_body.extend_from_slice(&1u16.to_be_bytes()); // entry_count
    iinf_body.extend_from_slice(&infe);
    let iinf = full_box(b"iinf", 0, &iinf_body);

    // iloc v0: 4-byte offsets and lengths, no base offset
    let mut iloc_body = Vec::new();
    iloc_body.push(0x44);
    iloc_body.push(0x00);
    iloc_body.extend_from_slice(&1u16.to_be_bytes()); // item_count
    iloc_body.extend_from_slice(&1u16.to_be_bytes()); // item_ID
    iloc_body.extend_from_slice(&0u16.to_be_bytes()); // data_reference_index
    iloc_body.extend_from_slice(&1u16.to_be_bytes()); // extent_count
    iloc_body.extend_from_slice(&extent_offset.to_be_bytes());
    iloc_body.extend_from_slice(&extent_length.to_be_bytes());
    let iloc = full_box(b"iloc", 0, &iloc_body);

    let mut meta_body = Vec::new();
    meta_body.extend_from_slice(&hdlr);
    meta_body.extend_from_slice(&iinf);
    meta_body.extend_from_slice(&iloc);
    full_box(b"meta", 0, &meta_body)
}

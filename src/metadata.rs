//! Byte-level metadata stripping for encoded images.
//!
//! Persisted output must carry no information beyond pixel data, so the
//! save path runs the encoded bytes through the matching stripper before
//! writing. Both strippers walk the container format directly and return
//! the input unchanged whenever the structure is not recognized —
//! stripping never corrupts and never fails.

/// JPEG markers that carry metadata: APP1..APP15 (EXIF, XMP, ICC, maker
/// notes) and COM (comments). APP0/JFIF stays; it only describes pixel
/// density and never identifies a camera or location.
fn is_jpeg_metadata_marker(marker: u8) -> bool {
    matches!(marker, 0xE1..=0xEF | 0xFE)
}

/// Remove metadata segments from a JPEG byte stream.
///
/// Walks the marker segments between SOI and SOS, dropping APP1–APP15 and
/// COM. Everything from SOS onward (the entropy-coded pixel data) is copied
/// verbatim. Returns the input unchanged if:
/// - The data does not start with an SOI marker
/// - A segment header is malformed or overruns the buffer
/// - No SOS marker is found
#[must_use]
pub fn strip_jpeg_metadata(data: &[u8]) -> Vec<u8> {
    if data.len() < 4 || data[0..2] != [0xFF, 0xD8] {
        return data.to_vec();
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[0..2]);

    let mut offset = 2;
    while offset + 2 <= data.len() {
        if data[offset] != 0xFF {
            return data.to_vec();
        }
        let marker = data[offset + 1];

        // Fill bytes between segments are permitted; skip without emitting.
        if marker == 0xFF {
            offset += 1;
            continue;
        }

        // SOS: the rest of the stream is entropy-coded data, copy verbatim.
        if marker == 0xDA {
            out.extend_from_slice(&data[offset..]);
            return out;
        }

        // Standalone markers carry no length field.
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            out.extend_from_slice(&data[offset..offset + 2]);
            offset += 2;
            continue;
        }

        if offset + 4 > data.len() {
            return data.to_vec();
        }
        let length = u16::from_be_bytes([data[offset + 2], data[offset + 3]]) as usize;
        if length < 2 || offset + 2 + length > data.len() {
            return data.to_vec();
        }

        if !is_jpeg_metadata_marker(marker) {
            out.extend_from_slice(&data[offset..offset + 2 + length]);
        }
        offset += 2 + length;
    }

    // Never reached SOS — not a stream we understand.
    data.to_vec()
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG ancillary chunks that carry text, timestamps, or EXIF payloads.
const STRIPPED_PNG_CHUNKS: [&[u8; 4]; 5] = [b"tEXt", b"zTXt", b"iTXt", b"eXIf", b"tIME"];

/// Remove metadata chunks from a PNG byte stream.
///
/// Walks the chunk list, dropping `tEXt`, `zTXt`, `iTXt`, `eXIf`, and
/// `tIME`. All other chunks are copied with their CRCs untouched. Returns
/// the input unchanged if the signature is missing or a chunk overruns
/// the buffer.
#[must_use]
pub fn strip_png_metadata(data: &[u8]) -> Vec<u8> {
    if data.len() < PNG_SIGNATURE.len() + 12 || data[..8] != PNG_SIGNATURE {
        return data.to_vec();
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..8]);

    let mut offset = 8;
    while offset + 12 <= data.len() {
        let length = u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        let chunk_end = offset + 12 + length;
        if chunk_end > data.len() {
            return data.to_vec();
        }

        let chunk_type = &data[offset + 4..offset + 8];
        let strip = STRIPPED_PNG_CHUNKS.iter().any(|t| *t == chunk_type);
        if !strip {
            out.extend_from_slice(&data[offset..chunk_end]);
        }

        if chunk_type == b"IEND" {
            return out;
        }
        offset = chunk_end;
    }

    // Never reached IEND — not a stream we understand.
    data.to_vec()
}

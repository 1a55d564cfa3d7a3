//! # Framer
//!
//! Canonical JSON payloads are wrapped in a small binary frame before
//! encryption so that the zero-padding added for traffic-shape uniformity
//! can be stripped back off exactly on the way out: a 4-byte little-endian
//! length prefix followed by the payload, followed by zero bytes padding
//! the whole thing out to the next 64-byte boundary.
//!
//! Older blobs predate framing entirely — their plaintext is raw UTF-8 JSON
//! with no prefix at all. [`unframe`] tells the two apart with a single
//! heuristic: interpret the first four bytes as a length; if that length
//! could plausibly describe the remaining bytes, treat the payload as
//! framed, otherwise treat it as legacy raw JSON.

use crate::config::{FRAME_ALIGNMENT, FRAME_PREFIX_LEN};

/// Wraps `payload` in a length-prefixed frame, zero-padded to the next
/// [`FRAME_ALIGNMENT`]-byte boundary.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    let total = FRAME_PREFIX_LEN + payload.len();
    let padded_total = total.div_ceil(FRAME_ALIGNMENT) * FRAME_ALIGNMENT;

    let mut out = Vec::with_capacity(padded_total.max(total));
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    out.resize(padded_total.max(total), 0);
    out
}

/// Recovers the original payload from `data`, whether it is a frame
/// produced by [`frame`] or a legacy unframed JSON document.
///
/// The heuristic: read the first 4 bytes as a little-endian length `L`. If
/// `L <= data.len() - 4`, this is a framed payload and the result is
/// `data[4..4+L]`. Otherwise `data` is treated as legacy raw JSON and
/// returned unchanged.
pub fn unframe(data: &[u8]) -> &[u8] {
    if data.len() < FRAME_PREFIX_LEN {
        return data;
    }
    let mut len_bytes = [0u8; FRAME_PREFIX_LEN];
    len_bytes.copy_from_slice(&data[..FRAME_PREFIX_LEN]);
    let claimed_len = u32::from_le_bytes(len_bytes) as usize;

    let remaining = data.len() - FRAME_PREFIX_LEN;
    if claimed_len <= remaining {
        &data[FRAME_PREFIX_LEN..FRAME_PREFIX_LEN + claimed_len]
    } else {
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_short_payload() {
        let payload = br#"{"a":1}"#;
        let framed = frame(payload);
        assert_eq!(framed.len() % FRAME_ALIGNMENT, 0);
        assert_eq!(unframe(&framed), payload);
    }

    #[test]
    fn roundtrip_payload_past_one_alignment_boundary() {
        let payload = vec![b'x'; 200];
        let framed = frame(&payload);
        assert_eq!(framed.len() % FRAME_ALIGNMENT, 0);
        assert_eq!(unframe(&framed), payload.as_slice());
    }

    #[test]
    fn legacy_unframed_json_passes_through() {
        let legacy = br#"{"entropy":"deadbeef","version":1}"#;
        assert_eq!(unframe(legacy), legacy.as_slice());
    }

    #[test]
    fn legacy_json_starting_with_brace_is_never_mistaken_for_a_frame() {
        // '{' = 0x7B; as the low byte of a little-endian u32 this can only
        // produce a claimed length of at least 0x7B, almost always larger
        // than the remaining bytes for any realistic short legacy document.
        let legacy = br#"{}"#;
        assert_eq!(unframe(legacy), legacy.as_slice());
    }

    #[test]
    fn empty_payload_frames_and_unframes() {
        let framed = frame(&[]);
        assert_eq!(framed.len(), FRAME_ALIGNMENT);
        assert_eq!(unframe(&framed), b"");
    }
}

//! ID3v2 tag parsing
//!
//! Only text frames (ids starting with `T`) are harvested; they are stored
//! under their raw four-character id. See <https://id3.org/id3v2.3.0>.

use crate::buffer::ByteBuffer;
use crate::error::{MetadataError, Result};
use rawtag_core::TagMap;
use tracing::debug;

/// Leading bytes of every ID3v2 tag
pub const ID3_SIGNATURE: &[u8; 3] = b"ID3";

const HEADER_LEN: usize = 10;
const EXTENDED_HEADER_FLAG: u8 = 0x40;

const ENCODING_LATIN1: u8 = 0;
const ENCODING_UTF16_BOM: u8 = 1;
const ENCODING_UTF16_BE: u8 = 2;
const ENCODING_UTF8: u8 = 3;

/// Decode a 28-bit synchsafe integer (low 7 bits of each byte, big-endian)
pub fn decode_synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Encode the low 28 bits of `value` as a synchsafe integer
#[cfg(test)]
pub fn encode_synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Parse an ID3v2 tag at the start of `bytes` into `tags`
///
/// Returns the number of bytes the tag occupies: the 10-byte header, the
/// extended header when flagged, and the declared frame area. Frames are
/// read through a child view over the frame area, so a bad frame size
/// can never reach past the tag.
pub fn parse_id3v2(bytes: &[u8], tags: &mut TagMap) -> Result<usize> {
    let mut buf = ByteBuffer::new(bytes);
    let header: [u8; HEADER_LEN] = buf.take_array()?;
    if &header[..3] != ID3_SIGNATURE {
        return Err(MetadataError::MalformedMagic { format: "ID3v2" });
    }

    let flags = header[5];
    let area_len = decode_synchsafe([header[6], header[7], header[8], header[9]]) as usize;

    if flags & EXTENDED_HEADER_FLAG != 0 {
        let extended: [u8; 4] = buf.take_array()?;
        buf.skip(usize::from(extended[3]))?;
    }

    let mut frames = buf.carve(area_len)?;
    parse_frames(&mut frames, tags)?;

    Ok(buf.position())
}

fn parse_frames(frames: &mut ByteBuffer<'_>, tags: &mut TagMap) -> Result<()> {
    while frames.remaining() > 0 {
        // A zero id byte means we've run into padding
        if frames.peek()? == 0 {
            break;
        }
        let id: [u8; 4] = frames.take_array()?;
        let size = frames.read_u32_be()? as usize;
        frames.skip(2)?;
        let body = frames.read(size)?;

        if id[0] != b'T' {
            continue;
        }
        let key = String::from_utf8_lossy(&id).into_owned();
        match decode_text(body) {
            Some(value) => {
                tags.insert(key, value);
            }
            None => debug!("Skipping ID3 frame {} with unreadable text", key),
        }
    }
    Ok(())
}

/// Decode a text frame body: one encoding byte, then the text
fn decode_text(body: &[u8]) -> Option<String> {
    let (&encoding, text) = body.split_first()?;
    let value = match encoding {
        ENCODING_LATIN1 => text.iter().map(|&b| char::from(b)).collect(),
        ENCODING_UTF16_BOM => match text {
            [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
            [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
            _ => utf16(text, u16::from_be_bytes),
        },
        ENCODING_UTF16_BE => utf16(text, u16::from_be_bytes),
        ENCODING_UTF8 => String::from_utf8_lossy(text).into_owned(),
        _ => return None,
    };

    // Some taggers pad with a NUL to reach an even length
    Some(match value.strip_suffix('\0') {
        Some(stripped) => stripped.to_string(),
        None => value,
    })
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(body);
        out
    }

    fn tag(flags: u8, extended: &[u8], area: &[u8]) -> Vec<u8> {
        let mut out = b"ID3".to_vec();
        out.extend_from_slice(&[3, 0, flags]);
        out.extend_from_slice(&encode_synchsafe(area.len() as u32));
        out.extend_from_slice(extended);
        out.extend_from_slice(area);
        out
    }

    #[test]
    fn synchsafe_boundaries() {
        assert_eq!(decode_synchsafe([0, 0, 0, 0]), 0);
        assert_eq!(decode_synchsafe([0, 0, 0, 0x7F]), 127);
        assert_eq!(decode_synchsafe([0, 0, 1, 0]), 128);
        assert_eq!(decode_synchsafe([0, 0, 2, 1]), 257);
        assert_eq!(decode_synchsafe([0x7F, 0x7F, 0x7F, 0x7F]), (1 << 28) - 1);
        // The high bit of each byte is ignored
        assert_eq!(decode_synchsafe([0xFF, 0xFF, 0xFF, 0xFF]), (1 << 28) - 1);
        assert_eq!(encode_synchsafe(128), [0, 0, 1, 0]);
        assert_eq!(encode_synchsafe((1 << 28) - 1), [0x7F; 4]);
    }

    proptest! {
        #[test]
        fn synchsafe_round_trips(value in 0u32..(1 << 28)) {
            let encoded = encode_synchsafe(value);
            prop_assert!(encoded.iter().all(|b| b & 0x80 == 0));
            prop_assert_eq!(decode_synchsafe(encoded), value);
        }
    }

    #[test]
    fn reads_text_frames_in_each_encoding() {
        let mut area = frame(b"TIT2", b"\x00Caf\xe9");
        area.extend(frame(b"TPE1", b"\x03Bj\xc3\xb6rk\x00"));
        area.extend(frame(b"TALB", b"\x01\xff\xfeH\x00i\x00\x00\x00"));
        area.extend(frame(b"TRCK", b"\x01\xfe\xff\x007"));
        area.extend(frame(b"TPOS", b"\x02\x001"));
        let bytes = tag(0, &[], &area);

        let mut tags = TagMap::new();
        let len = parse_id3v2(&bytes, &mut tags).unwrap();

        assert_eq!(len, bytes.len());
        assert_eq!(tags["TIT2"], "Café");
        assert_eq!(tags["TPE1"], "Björk");
        assert_eq!(tags["TALB"], "Hi");
        assert_eq!(tags["TRCK"], "7");
        assert_eq!(tags["TPOS"], "1");
    }

    #[test]
    fn strips_only_one_trailing_nul() {
        assert_eq!(decode_text(b"\x03ab\x00\x00").as_deref(), Some("ab\0"));
        assert_eq!(decode_text(b"\x03ab").as_deref(), Some("ab"));
        assert_eq!(decode_text(b"\x03").as_deref(), Some(""));
        assert_eq!(decode_text(b""), None);
        assert_eq!(decode_text(b"\x07abc"), None);
    }

    #[test]
    fn non_text_frames_are_skipped() {
        let mut area = frame(b"APIC", &[0xFF; 32]);
        area.extend(frame(b"TIT2", b"\x00Title"));
        let bytes = tag(0, &[], &area);

        let mut tags = TagMap::new();
        parse_id3v2(&bytes, &mut tags).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["TIT2"], "Title");
    }

    #[test]
    fn padding_ends_frame_scan() {
        let mut area = frame(b"TIT2", b"\x00Title");
        area.extend_from_slice(&[0u8; 64]);
        let bytes = tag(0, &[], &area);

        let mut tags = TagMap::new();
        assert_eq!(parse_id3v2(&bytes, &mut tags).unwrap(), bytes.len());
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn extended_header_is_skipped() {
        let area = frame(b"TIT2", b"\x00Title");
        let extended = [0, 0, 0, 6, 0, 0, 0, 0, 0, 0];
        let bytes = tag(EXTENDED_HEADER_FLAG, &extended, &area);

        let mut tags = TagMap::new();
        let len = parse_id3v2(&bytes, &mut tags).unwrap();
        assert_eq!(len, bytes.len());
        assert_eq!(tags["TIT2"], "Title");
    }

    #[test]
    fn frames_past_declared_area_are_ignored() {
        let inside = frame(b"TIT2", b"\x00Inside");
        let mut bytes = tag(0, &[], &inside);
        bytes.extend(frame(b"TPE1", b"\x00Outside"));

        let mut tags = TagMap::new();
        let len = parse_id3v2(&bytes, &mut tags).unwrap();
        assert_eq!(len, 10 + inside.len());
        assert!(!tags.contains_key("TPE1"));
    }

    #[test]
    fn frame_overrunning_area_is_underrun() {
        let mut area = frame(b"TIT2", b"\x00Title");
        // Claim a body far larger than the area
        area[4..8].copy_from_slice(&1000u32.to_be_bytes());
        let bytes = tag(0, &[], &area);

        let mut tags = TagMap::new();
        assert!(matches!(
            parse_id3v2(&bytes, &mut tags),
            Err(MetadataError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn truncated_tag_is_underrun() {
        let bytes = tag(0, &[], &frame(b"TIT2", b"\x00Title"));
        let mut tags = TagMap::new();
        assert!(matches!(
            parse_id3v2(&bytes[..bytes.len() - 3], &mut tags),
            Err(MetadataError::BufferUnderrun { .. })
        ));
        assert!(parse_id3v2(b"ID3", &mut tags).is_err());
    }

    #[test]
    fn rejects_missing_signature() {
        let mut tags = TagMap::new();
        assert!(matches!(
            parse_id3v2(&[0u8; 16], &mut tags),
            Err(MetadataError::MalformedMagic { format: "ID3v2" })
        ));
    }
}

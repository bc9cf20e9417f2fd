//! FLAC metadata block reader
//!
//! Walks the metadata blocks at the head of the stream for STREAMINFO
//! (duration) and VORBIS_COMMENT (tags). Format reference:
//! <https://xiph.org/flac/format.html>

use crate::buffer::ByteBuffer;
use crate::error::{MetadataError, Result};
use crate::id3::{self, ID3_SIGNATURE};
use rawtag_core::{set_duration, StandardKey, TagMap, TagMapExt};
use tracing::{debug, warn};

/// `fLaC`
pub const FLAC_MAGIC: u32 = 0x664C_6143;

const ID3_MAGIC: u32 = u32::from_be_bytes([ID3_SIGNATURE[0], ID3_SIGNATURE[1], ID3_SIGNATURE[2], 0]);

const STREAMINFO: u8 = 0;
const VORBIS_COMMENT: u8 = 4;

const LAST_BLOCK_FLAG: u32 = 0x8000_0000;

/// Read tags and duration from a FLAC stream into `tags`
///
/// An ID3v2 tag in front of the `fLaC` marker is parsed for whatever text
/// frames it holds before the blocks are walked.
pub fn read_flac(bytes: &[u8], tags: &mut TagMap) -> Result<()> {
    let mut buf = ByteBuffer::new(bytes);

    let magic = buf.read_u32_be()?;
    if magic != FLAC_MAGIC {
        if magic & 0xFFFF_FF00 != ID3_MAGIC {
            return Err(MetadataError::MalformedMagic { format: "flac" });
        }
        buf.rewind();
        let id3_len = id3::parse_id3v2(buf.rest(), tags)?;
        buf.skip(id3_len + 4)?;
    }

    let mut have_stream_info = false;
    let mut have_comments = false;
    loop {
        let header = buf.read_u32_be()?;
        let last = header & LAST_BLOCK_FLAG != 0;
        let block_type = (header >> 24) as u8 & 0x7F;
        let len = (header & 0x00FF_FFFF) as usize;

        match block_type {
            STREAMINFO => {
                let mut block = buf.carve(len)?;
                read_stream_info(&mut block, tags)?;
                have_stream_info = true;
            }
            VORBIS_COMMENT => {
                let mut block = buf.carve(len)?;
                read_vorbis_comments(&mut block, tags)?;
                have_comments = true;
            }
            _ => buf.skip(len)?,
        }

        if (have_stream_info && have_comments) || last {
            break;
        }
    }

    tags.set_standard(StandardKey::Mime, "audio/flac");
    tags.set_standard(StandardKey::Extension, "flac");
    tags.set_standard(StandardKey::EncodedExtension, "mp3");
    tags.set_standard(StandardKey::IsEncoded, "false");
    Ok(())
}

fn read_stream_info(block: &mut ByteBuffer<'_>, tags: &mut TagMap) -> Result<()> {
    // min/max block size and min/max frame size
    block.skip(10)?;
    // Sample rate is the top 20 bits. The low bits hold channels, bits per
    // sample and the top 4 bits of the 36-bit sample count, which we take
    // to be zero (true for anything under ~750 minutes).
    let sample_rate = block.read_u32_be()? >> 12;
    let total_samples = block.read_u32_be()?;

    if sample_rate == 0 {
        warn!("FLAC STREAMINFO declares a zero sample rate, duration omitted");
        return Ok(());
    }
    set_duration(tags, f64::from(total_samples) / f64::from(sample_rate));
    Ok(())
}

fn read_vorbis_comments(block: &mut ByteBuffer<'_>, tags: &mut TagMap) -> Result<()> {
    let vendor_len = block.read_u32_le()? as usize;
    block.skip(vendor_len)?;

    let count = block.read_u32_le()?;
    for _ in 0..count {
        let len = block.read_u32_le()? as usize;
        let comment = String::from_utf8_lossy(block.read(len)?);
        match comment.split_once('=') {
            Some((key, value)) => {
                tags.insert(key.to_string(), value.to_string());
            }
            None => debug!("Skipping Vorbis comment without '=': {}", comment),
        }
    }
    Ok(())
}

//! MPEG audio frame scanner
//!
//! The duration of an MP3 is the sum of its frame durations, so the whole
//! file is walked frame by frame. ID3v2 tags met along the way are parsed
//! for text frames and stepped over.
//!
//! Frame header layout: <http://www.mp3-tech.org/programmer/frame_header.html>

use crate::error::{MetadataError, Result};
use crate::id3::{self, ID3_SIGNATURE};
use rawtag_core::{set_duration, StandardKey, TagMap, TagMapExt};

const FRAME_SYNC: u32 = 0x7FF;

/// Samples per frame used for every layer (exact for Layer III)
const SAMPLES_PER_FRAME: f64 = 1152.0;

// Bit rates in bits per second, indexed by the 4-bit bit-rate index.
// Index 15 ("bad") is rejected before lookup.
const V1_L1_BIT_RATES: [u32; 15] = [
    0, 32_000, 64_000, 96_000, 128_000, 160_000, 192_000, 224_000, 256_000, 288_000, 320_000,
    352_000, 384_000, 416_000, 448_000,
];
const V1_L2_BIT_RATES: [u32; 15] = [
    0, 32_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000, 128_000, 160_000, 192_000,
    224_000, 256_000, 320_000, 384_000,
];
const V1_L3_BIT_RATES: [u32; 15] = [
    0, 32_000, 40_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000, 128_000, 160_000,
    192_000, 224_000, 256_000, 320_000,
];
const V2_L1_BIT_RATES: [u32; 15] = [
    0, 32_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000, 128_000, 144_000, 160_000,
    176_000, 192_000, 224_000, 256_000,
];
const V2_L23_BIT_RATES: [u32; 15] = [
    0, 8_000, 16_000, 24_000, 32_000, 40_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000,
    128_000, 144_000, 160_000,
];

const V1_SAMPLE_RATES: [u32; 3] = [44_100, 48_000, 32_000];
const V2_SAMPLE_RATES: [u32; 3] = [22_050, 24_000, 16_000];
const V25_SAMPLE_RATES: [u32; 3] = [11_025, 12_000, 8_000];

// Raw 2-bit field values as they appear in the header
const VERSION_2_5: u8 = 0b00;
const VERSION_RESERVED: u8 = 0b01;
const VERSION_2: u8 = 0b10;
const VERSION_1: u8 = 0b11;

const LAYER_RESERVED: u8 = 0b00;
const LAYER_III: u8 = 0b01;
const LAYER_II: u8 = 0b10;
const LAYER_I: u8 = 0b11;

/// A validated MPEG audio frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    version: u8,
    layer: u8,
    bit_rate_index: u8,
    sample_rate_index: u8,
    padding: bool,
    has_crc: bool,
}

impl FrameHeader {
    /// Validate a 32-bit header word
    ///
    /// Returns `None` unless the sync bits are set and version, layer,
    /// bit-rate index and sample-rate index are all usable values.
    pub fn parse(word: u32) -> Option<Self> {
        if word >> 21 != FRAME_SYNC {
            return None;
        }
        let version = ((word >> 19) & 0x03) as u8;
        let layer = ((word >> 17) & 0x03) as u8;
        let bit_rate_index = ((word >> 12) & 0x0F) as u8;
        let sample_rate_index = ((word >> 10) & 0x03) as u8;

        if version == VERSION_RESERVED
            || layer == LAYER_RESERVED
            || bit_rate_index == 0
            || bit_rate_index == 0x0F
            || sample_rate_index == 0x03
        {
            return None;
        }

        Some(Self {
            version,
            layer,
            bit_rate_index,
            sample_rate_index,
            padding: (word >> 9) & 0x01 == 0x01,
            // The protection bit is cleared when a 16-bit CRC follows the header
            has_crc: word & 0x0001_0000 == 0,
        })
    }

    /// Bit rate in bits per second
    pub fn bit_rate(&self) -> Result<u32> {
        let table = match (self.version, self.layer) {
            (VERSION_1, LAYER_I) => &V1_L1_BIT_RATES,
            (VERSION_1, LAYER_II) => &V1_L2_BIT_RATES,
            (VERSION_1, LAYER_III) => &V1_L3_BIT_RATES,
            (VERSION_2 | VERSION_2_5, LAYER_I) => &V2_L1_BIT_RATES,
            (VERSION_2 | VERSION_2_5, LAYER_II | LAYER_III) => &V2_L23_BIT_RATES,
            (version, layer) => {
                return Err(MetadataError::UnsupportedFrameLayout { version, layer })
            }
        };
        Ok(table[usize::from(self.bit_rate_index)])
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> Result<u32> {
        let table = match self.version {
            VERSION_1 => &V1_SAMPLE_RATES,
            VERSION_2 => &V2_SAMPLE_RATES,
            VERSION_2_5 => &V25_SAMPLE_RATES,
            version => {
                return Err(MetadataError::UnsupportedFrameLayout {
                    version,
                    layer: self.layer,
                })
            }
        };
        Ok(table[usize::from(self.sample_rate_index)])
    }

    /// Frame length in bytes, header included
    pub fn frame_len(&self) -> Result<usize> {
        let bit_rate = u64::from(self.bit_rate()?);
        let sample_rate = u64::from(self.sample_rate()?);
        let mut len = (144 * bit_rate / sample_rate) as usize;
        if self.padding {
            len += 1;
        }
        if self.has_crc {
            len += 2;
        }
        Ok(len)
    }

    /// Seconds of audio this frame carries
    pub fn duration(&self) -> Result<f64> {
        Ok(SAMPLES_PER_FRAME / f64::from(self.sample_rate()?))
    }
}

/// Total playing time in seconds, summed over every valid frame
///
/// Also collects ID3v2 text frames into `tags` as tags are passed.
pub fn scan_frames(bytes: &[u8], tags: &mut TagMap) -> Result<f64> {
    let mut duration = 0.0;
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &bytes[pos..];
        let mut step = 1;

        if rest[0] == 0xFF {
            let Some(word) = rest.get(..4) else {
                break;
            };
            let word = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
            if let Some(header) = FrameHeader::parse(word) {
                step = header.frame_len()?;
                duration += header.duration()?;
            }
        } else if rest.starts_with(ID3_SIGNATURE) {
            step = id3::parse_id3v2(rest, tags)?;
        }

        pos += step.max(1);
    }

    Ok(duration)
}

/// Read tags and duration from an MP3 stream into `tags`
pub fn read_mp3(bytes: &[u8], tags: &mut TagMap) -> Result<()> {
    let duration = scan_frames(bytes, tags)?;
    set_duration(tags, duration);
    tags.set_standard(StandardKey::Mime, "audio/mp3");
    tags.set_standard(StandardKey::Extension, "mp3");
    tags.set_standard(StandardKey::EncodedExtension, "mp3");
    tags.set_standard(StandardKey::IsEncoded, "true");
    Ok(())
}

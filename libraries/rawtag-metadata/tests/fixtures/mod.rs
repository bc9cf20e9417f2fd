//! Synthetic container builders shared by the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write fixture");
    path
}

/// Seven significant bits per byte, high bit clear
pub fn encode_synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

// ---- FLAC ----

pub const STREAMINFO: u8 = 0;
pub const PADDING: u8 = 1;
pub const APPLICATION: u8 = 2;
pub const VORBIS_COMMENT: u8 = 4;
pub const PICTURE: u8 = 6;

pub fn flac_block(block_type: u8, last: bool, body: &[u8]) -> Vec<u8> {
    let mut out = vec![block_type | if last { 0x80 } else { 0 }];
    out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(body);
    out
}

pub fn stream_info(sample_rate: u32, total_samples: u32) -> Vec<u8> {
    let mut body = vec![0x10, 0x00, 0x10, 0x00, 0, 0, 0x0E, 0, 0x3A, 0x98];
    body.extend_from_slice(&((sample_rate << 12) | (1 << 9) | (15 << 4)).to_be_bytes());
    body.extend_from_slice(&total_samples.to_be_bytes());
    body.extend_from_slice(&[0u8; 16]);
    body
}

pub fn vorbis_comments(entries: &[&str]) -> Vec<u8> {
    let vendor = b"reference libFLAC 1.3.2 20170101";
    let mut body = (vendor.len() as u32).to_le_bytes().to_vec();
    body.extend_from_slice(vendor);
    body.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        body.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        body.extend_from_slice(entry.as_bytes());
    }
    body
}

/// `fLaC` followed by the blocks, the last one flagged, then fake audio
pub fn flac_file(blocks: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut out = b"fLaC".to_vec();
    for (i, (block_type, body)) in blocks.iter().enumerate() {
        out.extend(flac_block(*block_type, i + 1 == blocks.len(), body));
    }
    out.extend_from_slice(&[0xFF, 0xF8, 0x69, 0x18, 0x00, 0x00]);
    out
}

// ---- ID3v2 / MP3 ----

/// ID3v2.3 tag with UTF-8 text frames and some trailing padding
pub fn id3_tag(frames: &[(&[u8; 4], &str)]) -> Vec<u8> {
    let mut area = Vec::new();
    for (id, text) in frames {
        let mut body = vec![3u8];
        body.extend_from_slice(text.as_bytes());
        area.extend_from_slice(*id);
        area.extend_from_slice(&(body.len() as u32).to_be_bytes());
        area.extend_from_slice(&[0, 0]);
        area.extend_from_slice(&body);
    }
    area.extend_from_slice(&[0u8; 32]);

    let mut out = b"ID3\x03\x00\x00".to_vec();
    out.extend_from_slice(&encode_synchsafe(area.len() as u32));
    out.extend(area);
    out
}

/// MPEG1 Layer III, 128 kbps, 44.1 kHz: 417 bytes per frame
pub const MP3_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
pub const MP3_FRAME_LEN: usize = 417;
pub const MP3_FRAME_SECONDS: f64 = 1152.0 / 44_100.0;

pub fn mp3_frames(count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count * MP3_FRAME_LEN);
    for _ in 0..count {
        out.extend_from_slice(&MP3_HEADER);
        out.resize(out.len() + MP3_FRAME_LEN - 4, 0x55);
    }
    out
}

// ---- MP4 ----

pub fn atom(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = ((body.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    out
}

pub fn data_atom(type_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = type_code.to_be_bytes().to_vec();
    body.extend_from_slice(&[0, 0, 0, 0]);
    body.extend_from_slice(payload);
    atom(b"data", &body)
}

pub fn text_item(kind: &[u8; 4], text: &str) -> Vec<u8> {
    atom(kind, &data_atom(1, text.as_bytes()))
}

pub fn track_item(track: u16, total: u16) -> Vec<u8> {
    let mut payload = vec![0, 0];
    payload.extend_from_slice(&track.to_be_bytes());
    payload.extend_from_slice(&total.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    atom(b"trkn", &data_atom(0, &payload))
}

pub fn disk_item(disk: u16, total: u16) -> Vec<u8> {
    let mut payload = vec![0, 0];
    payload.extend_from_slice(&disk.to_be_bytes());
    payload.extend_from_slice(&total.to_be_bytes());
    atom(b"disk", &data_atom(0, &payload))
}

pub fn m4a_file(items: &[Vec<u8>], time_scale: u32, units: u32) -> Vec<u8> {
    let mut mvhd = vec![0u8; 12];
    mvhd.extend_from_slice(&time_scale.to_be_bytes());
    mvhd.extend_from_slice(&units.to_be_bytes());
    mvhd.extend_from_slice(&[0u8; 80]);

    let mut meta = vec![0, 0, 0, 0];
    meta.extend(atom(b"hdlr", &[0u8; 25]));
    meta.extend(atom(b"ilst", &items.concat()));

    let mut moov = atom(b"mvhd", &mvhd);
    moov.extend(atom(b"trak", &[0u8; 40]));
    moov.extend(atom(b"udta", &atom(b"meta", &meta)));

    let mut out = atom(b"ftyp", b"M4A \x00\x00\x02\x00isomiso2");
    out.extend(atom(b"moov", &moov));
    out.extend(atom(b"mdat", &[0xAB; 128]));
    out
}

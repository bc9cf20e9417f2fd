//! MP4/M4A atom walker
//!
//! Tags live at `moov/udta/meta/ilst`, duration in `moov/mvhd`. Atom layout:
//! <https://developer.apple.com/library/archive/documentation/QuickTime/QTFF/QTFFChap2/qtff2.html>

use crate::buffer::ByteBuffer;
use crate::error::{MetadataError, Result};
use rawtag_core::{set_duration, StandardKey, TagMap, TagMapExt};
use tracing::{debug, warn};

const HEADER_LEN: u64 = 8;
const LARGE_HEADER_LEN: u64 = 16;

const MOOV: &[u8; 4] = b"moov";
const MVHD: &[u8; 4] = b"mvhd";
const UDTA: &[u8; 4] = b"udta";
const META: &[u8; 4] = b"meta";
const ILST: &[u8; 4] = b"ilst";

const TRACK: &[u8; 4] = b"trkn";
const DISK: &[u8; 4] = b"disk";

/// ilst items holding a single UTF-8 string
const TEXT_ITEMS: [&[u8; 4]; 5] = [b"\xa9nam", b"\xa9ART", b"\xa9alb", b"soar", b"soal"];

// Inner `data` atom: size, type, type code and locale
const DATA_PREFIX_LEN: usize = 16;
// ...plus two reserved bytes in front of a track or disc number
const NUMBER_PREFIX_LEN: usize = DATA_PREFIX_LEN + 2;

/// Name an atom type the way it is stored in a tag map (`©nam`, `trkn`, ...)
///
/// Atom types are Mac Roman in practice; the only non-ASCII byte in use is
/// 0xA9, which Latin-1 maps to the same `©`.
pub fn atom_name(kind: &[u8; 4]) -> String {
    kind.iter().map(|&b| char::from(b)).collect()
}

/// Read the next atom header and carve a child view over its payload
fn next_atom<'a>(buf: &mut ByteBuffer<'a>) -> Result<([u8; 4], ByteBuffer<'a>)> {
    let size = buf.read_u32_be()?;
    let kind: [u8; 4] = buf.take_array()?;

    let payload_len = match size {
        // Extends to the end of the enclosing atom
        0 => buf.remaining() as u64,
        1 => {
            let large = buf.read_u64_be()?;
            large
                .checked_sub(LARGE_HEADER_LEN)
                .ok_or_else(|| invalid_size(&kind, large))?
        }
        n => u64::from(n)
            .checked_sub(HEADER_LEN)
            .ok_or_else(|| invalid_size(&kind, u64::from(n)))?,
    };

    let payload_len = usize::try_from(payload_len).map_err(|_| MetadataError::BufferUnderrun {
        requested: usize::MAX,
        remaining: buf.remaining(),
    })?;
    Ok((kind, buf.carve(payload_len)?))
}

fn invalid_size(kind: &[u8; 4], size: u64) -> MetadataError {
    MetadataError::InvalidAtomSize {
        atom: atom_name(kind),
        size,
    }
}

/// Scan sibling atoms for `kind`, returning a view over its payload
///
/// Atoms before the match are skipped by their declared size. `None` when
/// the level is exhausted without a match.
pub fn find_atom<'a>(buf: &mut ByteBuffer<'a>, kind: &[u8; 4]) -> Result<Option<ByteBuffer<'a>>> {
    while buf.remaining() > 0 {
        let (found, payload) = next_atom(buf)?;
        if &found == kind {
            return Ok(Some(payload));
        }
    }
    Ok(None)
}

/// Read tags and duration from an MP4 audio file into `tags`
pub fn read_m4a(bytes: &[u8], tags: &mut TagMap) -> Result<()> {
    let mut file = ByteBuffer::new(bytes);
    let Some(mut moov) = find_atom(&mut file, MOOV)? else {
        return Err(MetadataError::MalformedMagic { format: "m4a" });
    };

    match find_ilst(&mut moov)? {
        Some(mut ilst) => read_items(&mut ilst, tags)?,
        None => debug!("No moov/udta/meta/ilst atom, file carries no tags"),
    }

    moov.rewind();
    read_duration(&mut moov, tags)?;

    tags.set_standard(StandardKey::Mime, "audio/aac");
    tags.set_standard(StandardKey::Extension, "m4a");
    tags.set_standard(StandardKey::EncodedExtension, "m4a");
    tags.set_standard(StandardKey::IsEncoded, "true");
    Ok(())
}

fn find_ilst<'a>(moov: &mut ByteBuffer<'a>) -> Result<Option<ByteBuffer<'a>>> {
    let Some(mut udta) = find_atom(moov, UDTA)? else {
        return Ok(None);
    };
    let Some(mut meta) = find_atom(&mut udta, META)? else {
        return Ok(None);
    };
    // meta is a full atom: version and flags come before its children
    meta.skip(4)?;
    find_atom(&mut meta, ILST)
}

fn read_items(ilst: &mut ByteBuffer<'_>, tags: &mut TagMap) -> Result<()> {
    while ilst.remaining() > 0 {
        let (kind, mut item) = next_atom(ilst)?;

        if TEXT_ITEMS.contains(&&kind) {
            item.skip(DATA_PREFIX_LEN)?;
            let text = item.read(item.remaining())?;
            tags.insert(atom_name(&kind), String::from_utf8_lossy(text).into_owned());
        } else if &kind == TRACK || &kind == DISK {
            item.skip(NUMBER_PREFIX_LEN)?;
            let number = item.read_u16_be()?;
            tags.insert(atom_name(&kind), number.to_string());
        }
    }
    Ok(())
}

fn read_duration(moov: &mut ByteBuffer<'_>, tags: &mut TagMap) -> Result<()> {
    let Some(mut mvhd) = find_atom(moov, MVHD)? else {
        debug!("No mvhd atom, duration omitted");
        return Ok(());
    };

    let version = mvhd.read_u8()?;
    // flags
    mvhd.skip(3)?;
    let (time_scale, units) = if version == 1 {
        // 64-bit creation and modification times
        mvhd.skip(16)?;
        let time_scale = mvhd.read_u32_be()?;
        (time_scale, mvhd.read_u64_be()?)
    } else {
        mvhd.skip(8)?;
        let time_scale = mvhd.read_u32_be()?;
        (time_scale, u64::from(mvhd.read_u32_be()?))
    };

    if time_scale == 0 {
        warn!("mvhd declares a zero time scale, duration omitted");
        return Ok(());
    }
    set_duration(tags, units as f64 / f64::from(time_scale));
    Ok(())
}

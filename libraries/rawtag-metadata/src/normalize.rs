//! Native tag keys to standard keys
//!
//! Each container names the same concepts differently (`TIT2`, `©nam`,
//! `TITLE`). Normalization rewrites a decoder's map in place so consumers
//! only ever see [`StandardKey`] names, and cleans up track and disc numbers.

use crate::error::MetadataError;
use rawtag_core::{StandardKey, TagMap, TagMapExt};
use tracing::warn;

/// Native key to the standard key it becomes
///
/// When several native keys for one concept are present, the one listed
/// last wins.
pub const KEY_TRANSLATIONS: &[(&str, StandardKey)] = &[
    // MP4 ilst items
    ("\u{a9}nam", StandardKey::Title),
    ("\u{a9}ART", StandardKey::Artist),
    ("\u{a9}alb", StandardKey::Album),
    ("soar", StandardKey::ArtistSort),
    ("soal", StandardKey::AlbumSort),
    ("trkn", StandardKey::TrackNumber),
    ("disk", StandardKey::DiscNumber),
    // Vorbis comments
    ("ALBUM", StandardKey::Album),
    ("ARTIST", StandardKey::Artist),
    ("TITLE", StandardKey::Title),
    ("ARTISTSORT", StandardKey::ArtistSort),
    ("ALBUMSORT", StandardKey::AlbumSort),
    ("tracknumber", StandardKey::TrackNumber),
    ("TRACKNUMBER", StandardKey::TrackNumber),
    ("discnumber", StandardKey::DiscNumber),
    ("DISCNUMBER", StandardKey::DiscNumber),
    // ID3v2 text frames
    ("TIT2", StandardKey::Title),
    ("TPE1", StandardKey::Artist),
    ("TALB", StandardKey::Album),
    ("TSOP", StandardKey::ArtistSort),
    ("TSOA", StandardKey::AlbumSort),
];

/// ID3 "track/total", consulted only when no track number was translated
const TRACK_FALLBACK: &str = "TRCK";
/// ID3 "disc/total", consulted only when no disc number was translated
const DISC_FALLBACK: &str = "TPOS";

/// Rewrite native keys to standard keys and clean up numbering
///
/// A missing disc number defaults to `"1"`. A track number that cannot be
/// determined is logged and returned as [`MetadataError::MissingField`];
/// the map is fully normalized either way.
pub fn normalize(tags: &mut TagMap) -> Option<MetadataError> {
    for (native, standard) in KEY_TRANSLATIONS {
        if let Some(value) = tags.remove(*native) {
            tags.set_standard(*standard, value);
        }
    }

    let mut gap = None;
    match numbering(tags, StandardKey::TrackNumber, TRACK_FALLBACK) {
        Some(track) => tags.set_standard(StandardKey::TrackNumber, track),
        None => {
            let path = tags
                .standard(StandardKey::RelativePath)
                .unwrap_or_default()
                .to_string();
            warn!("Can't get track number for '{}'", path);
            gap = Some(MetadataError::MissingField {
                field: StandardKey::TrackNumber.as_str(),
                path,
            });
        }
    }

    let disc = numbering(tags, StandardKey::DiscNumber, DISC_FALLBACK)
        .unwrap_or_else(|| "1".to_string());
    tags.set_standard(StandardKey::DiscNumber, disc);

    gap
}

fn numbering(tags: &TagMap, key: StandardKey, fallback: &str) -> Option<String> {
    tags.standard(key)
        .or_else(|| tags.get(fallback).map(String::as_str))
        .map(clean_up_number)
}

/// Keep the part before any `/` and drop one leading zero
///
/// A lone `"0"` is left alone.
pub fn clean_up_number(value: &str) -> String {
    let number = value.split('/').next().unwrap_or_default();
    match number.strip_prefix('0') {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => number.to_string(),
    }
}

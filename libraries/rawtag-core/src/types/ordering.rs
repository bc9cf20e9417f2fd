/// Presentation order for many tag maps
use super::tags::{StandardKey, TagMap, TagMapExt};
use std::cmp::Ordering;

fn text(tags: &TagMap, key: StandardKey) -> &str {
    tags.standard(key).unwrap_or("")
}

// Disc and track numbers are expected to be clean decimal strings by now;
// anything else sorts as 0.
fn number(tags: &TagMap, key: StandardKey) -> u32 {
    tags.standard(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Total order over normalized tag maps
///
/// Compares artistSort, then albumSort (both as plain strings, a missing
/// key counting as empty), then discNumber and trackNumber numerically.
pub fn compare_tag_maps(a: &TagMap, b: &TagMap) -> Ordering {
    text(a, StandardKey::ArtistSort)
        .cmp(text(b, StandardKey::ArtistSort))
        .then_with(|| text(a, StandardKey::AlbumSort).cmp(text(b, StandardKey::AlbumSort)))
        .then_with(|| number(a, StandardKey::DiscNumber).cmp(&number(b, StandardKey::DiscNumber)))
        .then_with(|| {
            number(a, StandardKey::TrackNumber).cmp(&number(b, StandardKey::TrackNumber))
        })
}

/// Sort tag maps in place by [`compare_tag_maps`]
pub fn sort_tag_maps(maps: &mut [TagMap]) {
    maps.sort_by(compare_tag_maps);
}

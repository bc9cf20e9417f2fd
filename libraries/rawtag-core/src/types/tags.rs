/// Tag map and the standard key vocabulary
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tag key to tag value, one map per decoded file
///
/// Decoders fill it with native keys (`TIT2`, `©nam`, `TRACKNUMBER`, ...);
/// normalization rewrites those to [`StandardKey`] names.
pub type TagMap = HashMap<String, String>;

/// The closed set of keys a normalized tag map may carry
///
/// Decoders populate the title/artist/album, sort, track/disc, duration and
/// encoding keys. `Id`, the path keys, `Flags`, `Md5`, `SizeAndTime` and
/// `EncodedSource` belong to whoever manages the library on top of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StandardKey {
    /// Library-assigned identifier
    Id,
    /// Path relative to the music root
    RelativePath,
    /// Relative path with the extension removed, trailing period kept
    BasePath,
    /// Track title
    Title,
    /// Performing artist
    Artist,
    /// Album name
    Album,
    /// Track number, digits only
    TrackNumber,
    /// Disc number, digits only, `1` when absent
    DiscNumber,
    /// Artist name used for ordering
    ArtistSort,
    /// Album name used for ordering
    AlbumSort,
    /// `M:SS` or `H:MM:SS`
    Duration,
    /// MIME type of the container
    Mime,
    /// Suffix of the file as found
    Extension,
    /// Suffix an encoded copy gets
    EncodedExtension,
    /// `true` or `false`
    IsEncoded,
    /// Library bookkeeping flags
    Flags,
    /// Content hash of the file
    Md5,
    /// Size and modification time of the file
    SizeAndTime,
    /// Size and time of the file an encoding was made from
    EncodedSource,
}

impl StandardKey {
    /// Every standard key, in declaration order
    pub const ALL: [Self; 19] = [
        Self::Id,
        Self::RelativePath,
        Self::BasePath,
        Self::Title,
        Self::Artist,
        Self::Album,
        Self::TrackNumber,
        Self::DiscNumber,
        Self::ArtistSort,
        Self::AlbumSort,
        Self::Duration,
        Self::Mime,
        Self::Extension,
        Self::EncodedExtension,
        Self::IsEncoded,
        Self::Flags,
        Self::Md5,
        Self::SizeAndTime,
        Self::EncodedSource,
    ];

    /// The key as it appears in a tag map
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::RelativePath => "relativePath",
            Self::BasePath => "basePath",
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::TrackNumber => "trackNumber",
            Self::DiscNumber => "discNumber",
            Self::ArtistSort => "artistSort",
            Self::AlbumSort => "albumSort",
            Self::Duration => "duration",
            Self::Mime => "mime",
            Self::Extension => "extension",
            Self::EncodedExtension => "encodedExtension",
            Self::IsEncoded => "isEncoded",
            Self::Flags => "flags",
            Self::Md5 => "md5",
            Self::SizeAndTime => "sizeAndTime",
            Self::EncodedSource => "encodedSource",
        }
    }
}

impl fmt::Display for StandardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed access to the standard keys of a [`TagMap`]
pub trait TagMapExt {
    /// Value stored under a standard key
    fn standard(&self, key: StandardKey) -> Option<&str>;

    /// Store a value under a standard key, replacing any previous value
    fn set_standard(&mut self, key: StandardKey, value: impl Into<String>);
}

impl TagMapExt for TagMap {
    fn standard(&self, key: StandardKey) -> Option<&str> {
        self.get(key.as_str()).map(String::as_str)
    }

    fn set_standard(&mut self, key: StandardKey, value: impl Into<String>) {
        self.insert(key.as_str().to_string(), value.into());
    }
}

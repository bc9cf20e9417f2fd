/// Format dispatch and the native tag reader
use crate::error::{DecodeFailure, MetadataError};
use crate::normalize::normalize;
use crate::{flac, m4a, mp3};
use rawtag_core::{TagError, TagMap, TagReader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Outcome of decoding one file
pub type DecodeResult = std::result::Result<TagMap, DecodeFailure>;

/// Containers with a native decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Flac,
    Mp3,
    M4a,
}

impl ContainerFormat {
    /// Pick a format from the file name suffix
    ///
    /// Matching is on the raw suffix and case-sensitive: `song.flac`
    /// matches, `song.FLAC` does not.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy();
        if name.ends_with("flac") {
            Some(Self::Flac)
        } else if name.ends_with("mp3") {
            Some(Self::Mp3)
        } else if name.ends_with("m4a") {
            Some(Self::M4a)
        } else {
            None
        }
    }
}

/// Reader configuration
///
/// With `flac_prefix_len` set, a FLAC file is first decoded from that many
/// leading bytes. If the metadata runs past the prefix the whole file is
/// loaded and decoded again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Leading FLAC bytes to try first (default: `None`, whole file)
    pub flac_prefix_len: Option<usize>,
}

/// Normalized tags together with what normalization could not fill in
#[derive(Debug, Default)]
pub struct StandardTags {
    pub tags: TagMap,

    /// Set when no track number could be derived
    pub missing: Option<MetadataError>,
}

/// Decode already-loaded bytes with one format's decoder
///
/// Returns the native (unnormalized) tags. On failure the tags gathered so
/// far travel with the cause.
pub fn decode(format: ContainerFormat, bytes: &[u8]) -> DecodeResult {
    let mut tags = TagMap::new();
    let outcome = match format {
        ContainerFormat::Flac => flac::read_flac(bytes, &mut tags),
        ContainerFormat::Mp3 => mp3::read_mp3(bytes, &mut tags),
        ContainerFormat::M4a => m4a::read_m4a(bytes, &mut tags),
    };
    match outcome {
        Ok(()) => Ok(tags),
        Err(cause) => Err(DecodeFailure::new(tags, cause)),
    }
}

/// Native tags for one file, chosen by suffix
///
/// Files with an unrecognized suffix yield an empty map.
pub fn get_tags_from_file(path: impl AsRef<Path>) -> DecodeResult {
    NativeTagReader::new().native_tags(path.as_ref())
}

/// Standard tags for one file: [`get_tags_from_file`] plus normalization
///
/// Normalization is skipped when the native map is empty.
pub fn get_standard_tags_from_file(path: impl AsRef<Path>) -> DecodeResult {
    NativeTagReader::new().standard_tags(path.as_ref())
}

/// Tag reader backed by the built-in container decoders
#[derive(Debug, Clone, Default)]
pub struct NativeTagReader {
    config: ReaderConfig,
}

impl NativeTagReader {
    /// Create a reader with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom configuration
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Native tags for one file
    pub fn native_tags(&self, path: &Path) -> DecodeResult {
        let Some(format) = ContainerFormat::from_path(path) else {
            return Ok(TagMap::new());
        };
        let io_failure = |e: std::io::Error| DecodeFailure::new(TagMap::new(), e.into());

        if let (ContainerFormat::Flac, Some(limit)) = (format, self.config.flac_prefix_len) {
            let prefix = read_prefix(path, limit).map_err(io_failure)?;
            match decode(format, &prefix) {
                Err(failure)
                    if prefix.len() == limit
                        && matches!(failure.cause, MetadataError::BufferUnderrun { .. }) =>
                {
                    debug!(
                        "Metadata of {} extends past {} bytes, loading whole file",
                        path.display(),
                        limit
                    );
                }
                outcome => return outcome,
            }
        }

        let bytes = std::fs::read(path).map_err(io_failure)?;
        decode(format, &bytes)
    }

    /// Normalized tags for one file
    ///
    /// A missing track number is logged and not fatal; use
    /// [`Self::standard_tags_detailed`] to see it.
    pub fn standard_tags(&self, path: &Path) -> DecodeResult {
        self.standard_tags_detailed(path).map(|standard| standard.tags)
    }

    /// Normalized tags for one file, along with any normalization gap
    pub fn standard_tags_detailed(&self, path: &Path) -> Result<StandardTags, DecodeFailure> {
        let mut tags = self.native_tags(path)?;
        let missing = if tags.is_empty() {
            None
        } else {
            normalize(&mut tags)
        };
        Ok(StandardTags { tags, missing })
    }
}

fn read_prefix(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)?.take(limit as u64).read_to_end(&mut bytes)?;
    Ok(bytes)
}

impl TagReader for NativeTagReader {
    fn read(&self, path: &Path) -> rawtag_core::Result<TagMap> {
        if !self.supports(path) {
            return Err(TagError::unsupported_format(path.display().to_string()));
        }
        Ok(self.standard_tags(path)?)
    }

    fn supports(&self, path: &Path) -> bool {
        ContainerFormat::from_path(path).is_some()
    }
}

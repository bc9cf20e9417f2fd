/// Metadata-specific errors
use rawtag_core::TagMap;
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A read or skip reached past the end of its buffer
    #[error("Buffer underrun: requested {requested} bytes with {remaining} remaining")]
    BufferUnderrun { requested: usize, remaining: usize },

    /// The file does not start with a signature for its claimed format
    #[error("Missing or malformed {format} signature")]
    MalformedMagic { format: &'static str },

    /// No bit-rate table exists for this MPEG version/layer pair
    #[error("Unsupported MPEG frame layout: version bits {version:#04b}, layer bits {layer:#04b}")]
    UnsupportedFrameLayout { version: u8, layer: u8 },

    /// A field normalization expects could not be determined
    #[error("Can't get {field} for '{path}'")]
    MissingField { field: &'static str, path: String },

    /// An MP4 atom declares a size smaller than its own header
    #[error("Atom '{atom}' declares invalid size {size}")]
    InvalidAtomSize { atom: String, size: u64 },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MetadataError> for rawtag_core::TagError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Io(io) => rawtag_core::TagError::Io(io),
            other => rawtag_core::TagError::metadata(other.to_string()),
        }
    }
}

/// A file that could not be decoded completely
///
/// Carries whatever tags were collected before the failure so batch callers
/// can decide whether a partial result is still useful.
#[derive(Error, Debug)]
#[error("{cause}")]
pub struct DecodeFailure {
    /// Tags gathered before the failure (possibly empty)
    pub tags: TagMap,

    /// Why decoding stopped
    #[source]
    pub cause: MetadataError,
}

impl DecodeFailure {
    /// Wrap a cause with the partial tags
    pub fn new(tags: TagMap, cause: MetadataError) -> Self {
        Self { tags, cause }
    }
}

impl From<DecodeFailure> for rawtag_core::TagError {
    fn from(failure: DecodeFailure) -> Self {
        failure.cause.into()
    }
}

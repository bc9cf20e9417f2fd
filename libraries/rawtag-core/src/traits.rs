/// Core traits for rawtag
use crate::error::Result;
use crate::types::TagMap;
use std::path::Path;

/// Tag reader trait
///
/// Implementers turn one audio file into a `TagMap` keyed by
/// `StandardKey` names. Each call is independent: no state is shared
/// between files, so a caller may run one reader per worker thread.
pub trait TagReader: Send + Sync {
    /// Read normalized tags from an audio file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its container is malformed
    fn read(&self, path: &Path) -> Result<TagMap>;

    /// Check if the reader handles the given file
    fn supports(&self, path: &Path) -> bool;
}

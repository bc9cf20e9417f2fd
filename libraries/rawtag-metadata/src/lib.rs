//! Rawtag Metadata
//!
//! Tag and duration extraction straight from the bytes of FLAC, MP3 and
//! M4A files, without an external decoding library.
//!
//! This crate provides:
//! - Structural decoders for FLAC metadata blocks, MPEG frames with ID3v2
//!   tags, and the MP4 atom tree, all reading through a bounds-checked
//!   byte cursor
//! - Normalization of native keys (`TIT2`, `©nam`, `TITLE`, ...) to
//!   `StandardKey` names
//! - Batch scanning that skips files which fail to decode
//!
//! # Example
//!
//! ```rust,no_run
//! use rawtag_metadata::{get_standard_tags_from_file, TagScanner};
//! use std::path::PathBuf;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Read tags from one file
//! let tags = get_standard_tags_from_file("/music/song.flac")?;
//! println!("{:?}", tags.get("title"));
//!
//! // Decode many files, skipping the broken ones
//! let scanner = TagScanner::new();
//! let report = scanner.scan(&[PathBuf::from("/music/a.mp3")], None);
//! println!("{} failed", report.stats.errors.len());
//! # Ok(())
//! # }
//! ```

mod buffer;
mod error;
mod flac;
mod id3;
mod m4a;
mod mp3;
mod normalize;
mod reader;
mod scanner;

pub use error::{DecodeFailure, MetadataError, Result};
pub use normalize::{clean_up_number, normalize};
pub use reader::{
    decode, get_standard_tags_from_file, get_tags_from_file, ContainerFormat, DecodeResult,
    NativeTagReader, ReaderConfig, StandardTags,
};
pub use scanner::{ScanConfig, ScanProgress, ScanReport, ScanStats, TagScanner};

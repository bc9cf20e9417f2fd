//! Rawtag Core
//!
//! Shared data model for the rawtag metadata readers.
//!
//! This crate provides the pieces every consumer of decoded tags needs,
//! independent of how the tags were pulled out of a container:
//! - **Tag maps**: `TagMap` and the closed set of `StandardKey`s
//! - **Presentation**: duration formatting and the tag map ordering
//! - **Core Traits**: `TagReader`
//! - **Error Handling**: Unified `TagError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use rawtag_core::{sort_tag_maps, StandardKey, TagMap};
//!
//! let mut first = TagMap::new();
//! first.insert(StandardKey::ArtistSort.to_string(), "Beatles".to_string());
//! first.insert(StandardKey::TrackNumber.to_string(), "2".to_string());
//!
//! let mut second = first.clone();
//! second.insert(StandardKey::TrackNumber.to_string(), "1".to_string());
//!
//! let mut maps = vec![first, second];
//! sort_tag_maps(&mut maps);
//! assert_eq!(maps[0]["trackNumber"], "1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Error type shared by tag readers
pub mod error;
/// The reader abstraction
pub mod traits;
/// Tag maps, standard keys, durations and ordering
pub mod types;

pub use error::{Result, TagError};
pub use traits::TagReader;
pub use types::{
    compare_tag_maps, format_duration, set_duration, sort_tag_maps, StandardKey, TagMap,
    TagMapExt,
};

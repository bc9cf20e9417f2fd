mod duration;
mod ordering;
mod tags;

pub use duration::{format_duration, set_duration};
pub use ordering::{compare_tag_maps, sort_tag_maps};
pub use tags::{StandardKey, TagMap, TagMapExt};

//! Subtitle templating around the alignment: an empty timing skeleton built
//! from a label track, and the merge of marker blocks into it.

pub mod merge;
pub mod skeleton;

pub use merge::merge_into_skeleton;
pub use skeleton::{format_srt_timestamp, parse_label_track, render_empty_srt, TimeRange};

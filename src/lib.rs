pub mod alignment;
pub mod config;
pub mod error;
pub mod fragments;
pub mod pipeline;
pub mod subtitles;
pub mod text;
pub mod types;

pub use alignment::markers::{split_marker_blocks, strip_markers};
pub use alignment::normalization::CorrectionTable;
pub use alignment::report::{build_report, render_summary, Meta, SegmentationReport};
pub use config::SegmenterConfig;
pub use error::SegmentationError;
pub use pipeline::builder::ChapterSegmenterBuilder;
pub use pipeline::runtime::ChapterSegmenter;
pub use pipeline::traits::{BoundaryRefiner, FragmentLocator, TextNormalizer};
pub use types::{
    FragmentOutcome, InsertionPlan, MatchResult, RejectReason, SegmentationOutput,
    SequenceOutcome, TranscriptFragment,
};

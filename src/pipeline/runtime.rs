use std::sync::Arc;

use crate::alignment::markers;
use crate::alignment::sequencer::Sequencer;
use crate::config::SegmenterConfig;
use crate::error::SegmentationError;
use crate::pipeline::traits::{BoundaryRefiner, FragmentLocator, TextNormalizer};
use crate::types::{FragmentOutcome, SegmentationOutput, SequenceOutcome, TranscriptFragment};

/// Aligns transcript fragments against one chapter at a time.
pub struct ChapterSegmenter {
    config: SegmenterConfig,
    normalizer: Arc<dyn TextNormalizer>,
    locator: Box<dyn FragmentLocator>,
    refiner: Box<dyn BoundaryRefiner>,
}

pub(crate) struct ChapterSegmenterParts {
    pub config: SegmenterConfig,
    pub normalizer: Arc<dyn TextNormalizer>,
    pub locator: Box<dyn FragmentLocator>,
    pub refiner: Box<dyn BoundaryRefiner>,
}

impl ChapterSegmenter {
    pub(crate) fn from_parts(parts: ChapterSegmenterParts) -> Self {
        Self {
            config: parts.config,
            normalizer: parts.normalizer,
            locator: parts.locator,
            refiner: parts.refiner,
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Sequences `fragments` and splices the accepted markers into a copy of
    /// `chapter`. Rejected fragments are reported, never raised.
    pub fn segment(
        &self,
        chapter: &str,
        fragments: &[TranscriptFragment],
    ) -> Result<SegmentationOutput, SegmentationError> {
        self.segment_with_observer(chapter, fragments, |_| {})
    }

    pub fn segment_with_observer(
        &self,
        chapter: &str,
        fragments: &[TranscriptFragment],
        observer: impl FnMut(&FragmentOutcome),
    ) -> Result<SegmentationOutput, SegmentationError> {
        let outcome = self.sequence_with_observer(chapter, fragments, observer);
        let annotated_text = markers::apply(chapter, &outcome.plan)?;
        Ok(SegmentationOutput {
            outcome,
            annotated_text,
        })
    }

    /// Builds the insertion plan without touching the text.
    pub fn sequence(&self, chapter: &str, fragments: &[TranscriptFragment]) -> SequenceOutcome {
        self.sequence_with_observer(chapter, fragments, |_| {})
    }

    pub fn sequence_with_observer(
        &self,
        chapter: &str,
        fragments: &[TranscriptFragment],
        observer: impl FnMut(&FragmentOutcome),
    ) -> SequenceOutcome {
        if chapter.trim().is_empty() && !fragments.is_empty() {
            tracing::warn!(
                fragments = fragments.len(),
                "chapter text is empty; every fragment will be rejected"
            );
        }
        let sequencer = Sequencer {
            normalizer: self.normalizer.as_ref(),
            locator: self.locator.as_ref(),
            refiner: self.refiner.as_ref(),
            fallbacks: &self.config.fallbacks,
            min_fragment_words: self.config.min_fragment_words,
            marker: &self.config.marker,
        };
        sequencer.sequence_with_observer(chapter, fragments, self.config.score_threshold, observer)
    }
}

use std::sync::Arc;

use crate::config::SegmenterConfig;
use crate::error::SegmentationError;
use crate::pipeline::defaults::{
    CorrectingNormalizer, PriorityBoundaryRefiner, SlidingWindowLocator,
};
use crate::pipeline::runtime::{ChapterSegmenter, ChapterSegmenterParts};
use crate::pipeline::traits::{BoundaryRefiner, FragmentLocator, TextNormalizer};

pub struct ChapterSegmenterBuilder {
    config: SegmenterConfig,
    normalizer: Option<Arc<dyn TextNormalizer>>,
    locator: Option<Box<dyn FragmentLocator>>,
    refiner: Option<Box<dyn BoundaryRefiner>>,
}

impl ChapterSegmenterBuilder {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            normalizer: None,
            locator: None,
            refiner: None,
        }
    }

    /// Replaces the correction-table normalizer. The default locator picks
    /// up the replacement too.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_locator(mut self, locator: Box<dyn FragmentLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_refiner(mut self, refiner: Box<dyn BoundaryRefiner>) -> Self {
        self.refiner = Some(refiner);
        self
    }

    pub fn build(self) -> Result<ChapterSegmenter, SegmentationError> {
        self.config.validate()?;

        let normalizer = self.normalizer.unwrap_or_else(|| {
            Arc::new(CorrectingNormalizer::new(self.config.corrections.clone()))
        });
        let locator = self.locator.unwrap_or_else(|| {
            Box::new(SlidingWindowLocator::new(
                normalizer.clone(),
                self.config.locator.clone(),
            ))
        });
        let refiner = self
            .refiner
            .unwrap_or_else(|| Box::new(PriorityBoundaryRefiner::new(self.config.boundary.clone())));

        tracing::debug!(
            score_threshold = self.config.score_threshold,
            fallbacks = self.config.fallbacks.len(),
            corrections = self.config.corrections.entries().len(),
            "segmenter built"
        );
        Ok(ChapterSegmenter::from_parts(ChapterSegmenterParts {
            config: self.config,
            normalizer,
            locator,
            refiner,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{MatchResult, TranscriptFragment};

    use super::*;

    struct FixedLocator(usize);

    impl FragmentLocator for FixedLocator {
        fn locate(
            &self,
            haystack: &str,
            _needle: &str,
            _search_from: usize,
            _score_threshold: f64,
        ) -> MatchResult {
            let position = self.0.min(haystack.len());
            MatchResult::found_at(position, 100.0, String::new())
        }
    }

    struct Identity;

    impl BoundaryRefiner for Identity {
        fn refine(&self, _text: &str, approx: usize, _floor: Option<usize>) -> usize {
            approx
        }
    }

    struct Uppercase;

    impl TextNormalizer for Uppercase {
        fn normalize(&self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    #[test]
    fn build_with_defaults() {
        let segmenter = ChapterSegmenterBuilder::new(SegmenterConfig::default())
            .build()
            .expect("build should succeed");
        assert_eq!(segmenter.normalize("— Nell!"), "nel");
        assert_eq!(segmenter.config().score_threshold, 70.0);
    }

    #[test]
    fn build_fails_on_invalid_config() {
        let config = SegmenterConfig {
            score_threshold: -1.0,
            ..SegmenterConfig::default()
        };
        assert!(ChapterSegmenterBuilder::new(config).build().is_err());
    }

    #[test]
    fn custom_locator_and_refiner_are_used() {
        let segmenter = ChapterSegmenterBuilder::new(SegmenterConfig::default())
            .with_locator(Box::new(FixedLocator(4)))
            .with_refiner(Box::new(Identity))
            .build()
            .unwrap();
        let fragments = vec![TranscriptFragment::new(1, "a", "cokolwiek")];
        let out = segmenter.segment("Ala ma kota", &fragments).unwrap();
        assert_eq!(out.outcome.accepted[0].insert_position, 4);
        assert!(out.annotated_text.starts_with("Ala \n\n[1]"));
    }

    #[test]
    fn custom_normalizer_is_used() {
        let segmenter = ChapterSegmenterBuilder::new(SegmenterConfig::default())
            .with_normalizer(Arc::new(Uppercase))
            .build()
            .unwrap();
        assert_eq!(segmenter.normalize("Nel"), "NEL");
    }
}

use std::sync::Arc;

use crate::alignment::boundary::refine_after;
use crate::alignment::locator::locate;
use crate::alignment::normalization::{normalize, CorrectionTable};
use crate::config::{BoundarySettings, LocatorSettings};
use crate::pipeline::traits::{BoundaryRefiner, FragmentLocator, TextNormalizer};
use crate::types::MatchResult;

pub struct CorrectingNormalizer {
    corrections: CorrectionTable,
}

impl CorrectingNormalizer {
    pub fn new(corrections: CorrectionTable) -> Self {
        Self { corrections }
    }
}

impl TextNormalizer for CorrectingNormalizer {
    fn normalize(&self, text: &str) -> String {
        normalize(text, &self.corrections)
    }
}

pub struct SlidingWindowLocator {
    normalizer: Arc<dyn TextNormalizer>,
    settings: LocatorSettings,
}

impl SlidingWindowLocator {
    pub fn new(normalizer: Arc<dyn TextNormalizer>, settings: LocatorSettings) -> Self {
        Self {
            normalizer,
            settings,
        }
    }
}

impl FragmentLocator for SlidingWindowLocator {
    fn locate(
        &self,
        haystack: &str,
        needle: &str,
        search_from: usize,
        score_threshold: f64,
    ) -> MatchResult {
        let normalize_text = |text: &str| self.normalizer.normalize(text);
        locate(
            haystack,
            needle,
            search_from,
            score_threshold,
            &self.settings,
            &normalize_text,
        )
    }
}

pub struct PriorityBoundaryRefiner {
    settings: BoundarySettings,
}

impl PriorityBoundaryRefiner {
    pub fn new(settings: BoundarySettings) -> Self {
        Self { settings }
    }
}

impl BoundaryRefiner for PriorityBoundaryRefiner {
    fn refine(&self, text: &str, approx: usize, floor: Option<usize>) -> usize {
        refine_after(text, approx, floor, &self.settings)
    }
}

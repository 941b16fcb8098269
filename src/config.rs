use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::normalization::CorrectionTable;
use crate::error::SegmentationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Minimum locator score (0-100) for the first attempt.
    pub score_threshold: f64,
    /// Fragments with fewer normalized words are skipped without searching.
    pub min_fragment_words: usize,
    pub locator: LocatorSettings,
    pub boundary: BoundarySettings,
    /// Ordered attempts per fragment; the first one that matches wins.
    pub fallbacks: Vec<FallbackAttempt>,
    pub marker: MarkerStyle,
    pub corrections: CorrectionTable,
}

impl SegmenterConfig {
    pub const DEFAULT_SCORE_THRESHOLD: f64 = 70.0;

    pub fn load(path: &Path) -> Result<Self, SegmentationError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SegmentationError::io("read segmenter config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| SegmentationError::json("parse segmenter config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SegmentationError> {
        if !(0.0..=100.0).contains(&self.score_threshold) {
            return Err(SegmentationError::invalid_config(
                "score_threshold",
                format!("must be within 0..=100, got {}", self.score_threshold),
            ));
        }
        if self.locator.window_scale < 1.0 {
            return Err(SegmentationError::invalid_config(
                "locator.window_scale",
                format!("must be >= 1.0, got {}", self.locator.window_scale),
            ));
        }
        if !(self.locator.step_fraction > 0.0 && self.locator.step_fraction <= 1.0) {
            return Err(SegmentationError::invalid_config(
                "locator.step_fraction",
                format!("must be within (0, 1], got {}", self.locator.step_fraction),
            ));
        }
        if self.fallbacks.iter().any(|attempt| attempt.max_words == Some(0)) {
            return Err(SegmentationError::invalid_config(
                "fallbacks",
                "max_words must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            score_threshold: Self::DEFAULT_SCORE_THRESHOLD,
            min_fragment_words: 1,
            locator: LocatorSettings::default(),
            boundary: BoundarySettings::default(),
            fallbacks: FallbackAttempt::default_cascade(),
            marker: MarkerStyle::default(),
            corrections: CorrectionTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    /// Needles shorter than this (raw or normalized) are never searched.
    pub min_needle_chars: usize,
    /// Window length as a multiple of the raw needle length.
    pub window_scale: f64,
    pub min_window_chars: usize,
    /// Step between windows as a fraction of the window length.
    pub step_fraction: f64,
    pub partial_weight: f64,
    pub token_set_weight: f64,
    /// Added when the needle's first word occurs as a whole word in the window.
    pub anchor_bonus: f64,
    pub early_exit_score: f64,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            min_needle_chars: 3,
            window_scale: 2.0,
            min_window_chars: 24,
            step_fraction: 0.25,
            partial_weight: 0.7,
            token_set_weight: 0.3,
            anchor_bonus: 10.0,
            early_exit_score: 95.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundarySettings {
    /// How far back (in chars) the refiner looks for a better cut point.
    pub scan_chars: usize,
    /// Bonus for a candidate at the approximate position, fading to zero
    /// at the far end of the scan.
    pub proximity_weight: f64,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            scan_chars: 180,
            proximity_weight: 25.0,
        }
    }
}

/// One step of the fallback cascade: which part of the snippet to search
/// for and how much to lower the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackAttempt {
    /// `None` searches for the whole snippet.
    #[serde(default)]
    pub max_words: Option<usize>,
    #[serde(default)]
    pub relax_by: f64,
}

impl FallbackAttempt {
    pub fn default_cascade() -> Vec<Self> {
        vec![
            Self {
                max_words: None,
                relax_by: 0.0,
            },
            Self {
                max_words: Some(4),
                relax_by: 10.0,
            },
            Self {
                max_words: Some(2),
                relax_by: 20.0,
            },
        ]
    }

    pub fn threshold(&self, base: f64) -> f64 {
        (base - self.relax_by).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Zero-padding width for the ordinal; 0 disables padding.
    pub pad_width: usize,
}

impl MarkerStyle {
    pub const ARROWS: &'static str = ">>>>>>>>>>>>";

    /// A blank-line-delimited marker block such as `\n\n[3] >>>>>>>>>>>>\n\n`.
    pub fn render(&self, ordinal: usize) -> String {
        format!(
            "\n\n[{ordinal:0width$}] {arrows}\n\n",
            width = self.pad_width,
            arrows = Self::ARROWS
        )
    }
}

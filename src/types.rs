use serde::{Deserialize, Serialize};

use crate::error::SegmentationError;

/// One transcribed audio clip.
///
/// `ordinal` is 1-based and is the only correlation between the clip and the
/// chapter text: clips are recorded in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    pub source_id: String,
    pub snippet: String,
    pub ordinal: usize,
}

impl TranscriptFragment {
    pub fn new(ordinal: usize, source_id: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            snippet: snippet.into(),
            ordinal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub found: bool,
    /// Byte offset of the needle's first word in the raw haystack.
    pub position: Option<usize>,
    /// Confidence in [0, 100]. For misses this is the best score observed.
    pub score: f64,
    pub matched_span: Option<String>,
}

impl MatchResult {
    pub fn not_found(score: f64) -> Self {
        Self {
            found: false,
            position: None,
            score,
            matched_span: None,
        }
    }

    pub fn found_at(position: usize, score: f64, matched_span: String) -> Self {
        Self {
            found: true,
            position: Some(position),
            score,
            matched_span: Some(matched_span),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMarker {
    pub ordinal: usize,
    /// Byte offset in the original chapter text where `marker_text` is spliced.
    pub position: usize,
    pub marker_text: String,
}

/// Insertion points in ordinal order. Positions are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsertionPlan {
    entries: Vec<PlannedMarker>,
}

impl InsertionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PlannedMarker) -> Result<(), SegmentationError> {
        if let Some(last) = self.entries.last() {
            if entry.position <= last.position || entry.ordinal <= last.ordinal {
                return Err(SegmentationError::MarkerOrder {
                    ordinal: entry.ordinal,
                    position: entry.position,
                    previous_ordinal: last.ordinal,
                    previous_position: last.position,
                });
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[PlannedMarker] {
        &self.entries
    }

    pub fn last_position(&self) -> Option<usize> {
        self.entries.last().map(|entry| entry.position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    /// Below threshold after every fallback attempt.
    #[serde(rename = "not_found")]
    FragmentNotFound,
    /// Best match does not move past the cursor.
    #[serde(rename = "out_of_order")]
    OutOfOrderMatch,
    /// Empty or too few words; never searched.
    #[serde(rename = "degenerate_fragment")]
    DegenerateFragment,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FragmentNotFound => "not_found",
            Self::OutOfOrderMatch => "out_of_order",
            Self::DegenerateFragment => "degenerate_fragment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedFragment {
    pub ordinal: usize,
    pub source_id: String,
    pub raw_position: usize,
    pub insert_position: usize,
    pub score: f64,
    pub matched_span: Option<String>,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedFragment {
    pub ordinal: usize,
    pub source_id: String,
    pub reason: RejectReason,
    pub best_score: f64,
    pub raw_position: Option<usize>,
    pub attempts: usize,
}

/// Per-fragment outcome, reported as the sequencer finishes each fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FragmentOutcome {
    Accepted(AcceptedFragment),
    Rejected(RejectedFragment),
}

impl FragmentOutcome {
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Accepted(accepted) => accepted.ordinal,
            Self::Rejected(rejected) => rejected.ordinal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SequenceOutcome {
    pub plan: InsertionPlan,
    pub accepted: Vec<AcceptedFragment>,
    pub rejected: Vec<RejectedFragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOutput {
    pub outcome: SequenceOutcome,
    pub annotated_text: String,
}

use crate::alignment::offsets::advance_chars;
use crate::config::{FallbackAttempt, MarkerStyle};
use crate::fragments::head_words;
use crate::pipeline::traits::{BoundaryRefiner, FragmentLocator, TextNormalizer};
use crate::types::{
    AcceptedFragment, FragmentOutcome, MatchResult, PlannedMarker, RejectReason,
    RejectedFragment, SequenceOutcome, TranscriptFragment,
};

const FULL_SNIPPET: FallbackAttempt = FallbackAttempt {
    max_words: None,
    relax_by: 0.0,
};

/// Drives the locator and refiner over fragments in ordinal order.
///
/// Holds no state between calls: the search start, acceptance cursor and
/// plan live inside one [`Sequencer::sequence`] run.
pub struct Sequencer<'a> {
    pub normalizer: &'a dyn TextNormalizer,
    pub locator: &'a dyn FragmentLocator,
    pub refiner: &'a dyn BoundaryRefiner,
    pub fallbacks: &'a [FallbackAttempt],
    pub min_fragment_words: usize,
    pub marker: &'a MarkerStyle,
}

/// Where the next fragment is searched from and what it has to beat.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    search_from: usize,
    bound: Option<usize>,
}

enum Search {
    Found {
        result: MatchResult,
        position: usize,
        attempts: usize,
    },
    Missed {
        best_score: f64,
        attempts: usize,
    },
}

impl Sequencer<'_> {
    pub fn sequence(
        &self,
        chapter: &str,
        fragments: &[TranscriptFragment],
        score_threshold: f64,
    ) -> SequenceOutcome {
        self.sequence_with_observer(chapter, fragments, score_threshold, |_| {})
    }

    /// Like [`Sequencer::sequence`], calling `observer` once per fragment as
    /// soon as its outcome is known. Outcomes arrive in ordinal order.
    pub fn sequence_with_observer(
        &self,
        chapter: &str,
        fragments: &[TranscriptFragment],
        score_threshold: f64,
        mut observer: impl FnMut(&FragmentOutcome),
    ) -> SequenceOutcome {
        let mut ordered: Vec<&TranscriptFragment> = fragments.iter().collect();
        ordered.sort_by_key(|fragment| fragment.ordinal);

        let mut outcome = SequenceOutcome::default();
        let mut cursor = Cursor::default();
        for fragment in ordered {
            let fragment_outcome =
                self.place(chapter, fragment, score_threshold, &mut cursor, &mut outcome);
            observer(&fragment_outcome);
            match fragment_outcome {
                FragmentOutcome::Accepted(accepted) => outcome.accepted.push(accepted),
                FragmentOutcome::Rejected(rejected) => outcome.rejected.push(rejected),
            }
        }

        tracing::debug!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "sequencer: done"
        );
        outcome
    }

    fn place(
        &self,
        chapter: &str,
        fragment: &TranscriptFragment,
        score_threshold: f64,
        cursor: &mut Cursor,
        outcome: &mut SequenceOutcome,
    ) -> FragmentOutcome {
        let required_words = self.min_fragment_words.max(1);
        let word_count = self
            .normalizer
            .normalize(&fragment.snippet)
            .split_whitespace()
            .count();
        if word_count < required_words {
            return self.reject(fragment, RejectReason::DegenerateFragment, 0.0, None, 0);
        }

        let (result, position, attempts) =
            match self.search(chapter, fragment, cursor.search_from, score_threshold) {
                Search::Found {
                    result,
                    position,
                    attempts,
                } => (result, position, attempts),
                Search::Missed {
                    best_score,
                    attempts,
                } => {
                    return self.reject(
                        fragment,
                        RejectReason::FragmentNotFound,
                        best_score,
                        None,
                        attempts,
                    );
                }
            };

        // A hit inside the previous fragment's text gets one more search
        // that starts past it; only a hit beyond the cursor is kept.
        let (result, position, attempts) = match cursor.bound {
            Some(bound) if position <= bound => {
                tracing::debug!(
                    ordinal = fragment.ordinal,
                    position,
                    bound,
                    "sequencer: hit behind cursor, searching past it"
                );
                match self.search(chapter, fragment, bound, score_threshold) {
                    Search::Found {
                        result: retry,
                        position: retry_position,
                        attempts: retry_attempts,
                    } if retry_position > bound => {
                        (retry, retry_position, attempts + retry_attempts)
                    }
                    Search::Found {
                        attempts: retry_attempts,
                        ..
                    }
                    | Search::Missed {
                        attempts: retry_attempts,
                        ..
                    } => {
                        return self.reject(
                            fragment,
                            RejectReason::OutOfOrderMatch,
                            result.score,
                            Some(position),
                            attempts + retry_attempts,
                        );
                    }
                }
            }
            _ => (result, position, attempts),
        };

        let insert_position = self
            .refiner
            .refine(chapter, position, outcome.plan.last_position());
        let planned = PlannedMarker {
            ordinal: fragment.ordinal,
            position: insert_position,
            marker_text: self.marker.render(fragment.ordinal),
        };
        if let Err(err) = outcome.plan.push(planned) {
            // Only reachable with a duplicate ordinal or a refiner that
            // ignores its floor.
            tracing::warn!(
                ordinal = fragment.ordinal,
                error = %err,
                "sequencer: plan rejected marker"
            );
            return self.reject(
                fragment,
                RejectReason::OutOfOrderMatch,
                result.score,
                Some(position),
                attempts,
            );
        }

        let snippet_chars = fragment.snippet.trim().chars().count();
        *cursor = Cursor {
            search_from: position,
            bound: Some(advance_chars(chapter, position, snippet_chars)),
        };

        tracing::info!(
            ordinal = fragment.ordinal,
            source_id = %fragment.source_id,
            raw_position = position,
            insert_position,
            score = format!("{:.1}", result.score),
            attempts,
            "sequencer: accepted"
        );
        FragmentOutcome::Accepted(AcceptedFragment {
            ordinal: fragment.ordinal,
            source_id: fragment.source_id.clone(),
            raw_position: position,
            insert_position,
            score: result.score,
            matched_span: result.matched_span,
            attempts,
        })
    }

    /// Runs the fallback cascade until one attempt is found.
    fn search(
        &self,
        chapter: &str,
        fragment: &TranscriptFragment,
        search_from: usize,
        score_threshold: f64,
    ) -> Search {
        let cascade = if self.fallbacks.is_empty() {
            std::slice::from_ref(&FULL_SNIPPET)
        } else {
            self.fallbacks
        };

        let mut tried: Vec<(String, f64)> = Vec::new();
        let mut best_score = 0.0f64;
        let mut attempts = 0usize;
        for attempt in cascade {
            let needle = match attempt.max_words {
                Some(words) => head_words(&fragment.snippet, words),
                None => fragment.snippet.trim().to_string(),
            };
            let threshold = attempt.threshold(score_threshold);
            if tried
                .iter()
                .any(|(prev, prev_threshold)| *prev == needle && *prev_threshold == threshold)
            {
                continue;
            }

            attempts += 1;
            let result = self.locator.locate(chapter, &needle, search_from, threshold);
            tracing::debug!(
                ordinal = fragment.ordinal,
                attempt = attempts,
                needle = %needle,
                threshold,
                score = format!("{:.1}", result.score),
                found = result.found,
                "sequencer: attempt"
            );
            best_score = best_score.max(result.score);
            if let (true, Some(position)) = (result.found, result.position) {
                return Search::Found {
                    result,
                    position,
                    attempts,
                };
            }
            tried.push((needle, threshold));
        }
        Search::Missed {
            best_score,
            attempts,
        }
    }

    fn reject(
        &self,
        fragment: &TranscriptFragment,
        reason: RejectReason,
        best_score: f64,
        raw_position: Option<usize>,
        attempts: usize,
    ) -> FragmentOutcome {
        tracing::warn!(
            ordinal = fragment.ordinal,
            source_id = %fragment.source_id,
            reason = reason.as_str(),
            best_score = format!("{best_score:.1}"),
            raw_position = ?raw_position,
            "sequencer: rejected"
        );
        FragmentOutcome::Rejected(RejectedFragment {
            ordinal: fragment.ordinal,
            source_id: fragment.source_id.clone(),
            reason,
            best_score,
            raw_position,
            attempts,
        })
    }
}

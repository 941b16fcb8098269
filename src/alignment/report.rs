use std::fmt::Write as _;

use serde::Serialize;

use crate::types::{RejectReason, SequenceOutcome};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    pub schema_version: u32,
    pub meta: Meta,
    pub fragments: Vec<FragmentRow>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub chapter_path: String,
    pub chapter_chars: usize,
    pub score_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct FragmentRow {
    pub ordinal: usize,
    pub source_id: String,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    pub score: f64,
    pub raw_position: Option<usize>,
    pub insert_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_span: Option<String>,
    pub attempts: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub fragment_count: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub not_found: usize,
    pub out_of_order: usize,
    pub degenerate_fragment: usize,
    pub accepted_score_mean: Option<f64>,
    pub accepted_score_min: Option<f64>,
}

/// Flattens a sequencing outcome into per-fragment rows in ordinal order.
pub fn build_report(outcome: &SequenceOutcome, meta: Meta) -> SegmentationReport {
    let mut fragments: Vec<FragmentRow> = outcome
        .accepted
        .iter()
        .map(|accepted| FragmentRow {
            ordinal: accepted.ordinal,
            source_id: accepted.source_id.clone(),
            status: RowStatus::Accepted,
            reason: None,
            score: accepted.score,
            raw_position: Some(accepted.raw_position),
            insert_position: Some(accepted.insert_position),
            matched_span: accepted.matched_span.clone(),
            attempts: accepted.attempts,
        })
        .chain(outcome.rejected.iter().map(|rejected| FragmentRow {
            ordinal: rejected.ordinal,
            source_id: rejected.source_id.clone(),
            status: RowStatus::Rejected,
            reason: Some(rejected.reason),
            score: rejected.best_score,
            raw_position: rejected.raw_position,
            insert_position: None,
            matched_span: None,
            attempts: rejected.attempts,
        }))
        .collect();
    fragments.sort_by_key(|row| row.ordinal);

    SegmentationReport {
        schema_version: REPORT_SCHEMA_VERSION,
        meta,
        summary: summarize(outcome),
        fragments,
    }
}

fn summarize(outcome: &SequenceOutcome) -> Summary {
    let count_reason = |reason: RejectReason| {
        outcome
            .rejected
            .iter()
            .filter(|rejected| rejected.reason == reason)
            .count()
    };
    let scores: Vec<f64> = outcome.accepted.iter().map(|a| a.score).collect();
    let accepted_score_mean =
        (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
    let accepted_score_min = scores.iter().copied().reduce(f64::min);

    Summary {
        fragment_count: outcome.accepted.len() + outcome.rejected.len(),
        accepted: outcome.accepted.len(),
        rejected: outcome.rejected.len(),
        not_found: count_reason(RejectReason::FragmentNotFound),
        out_of_order: count_reason(RejectReason::OutOfOrderMatch),
        degenerate_fragment: count_reason(RejectReason::DegenerateFragment),
        accepted_score_mean,
        accepted_score_min,
    }
}

/// Human-readable counts followed by one line per rejected fragment.
pub fn render_summary(report: &SegmentationReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "fragments: {}  accepted: {}  rejected: {}",
        summary.fragment_count, summary.accepted, summary.rejected
    );
    if let (Some(mean), Some(min)) = (summary.accepted_score_mean, summary.accepted_score_min) {
        let _ = writeln!(out, "accepted score: mean {mean:.1}  min {min:.1}");
    }
    if summary.rejected > 0 {
        let _ = writeln!(
            out,
            "rejected by reason: not_found {}  out_of_order {}  degenerate_fragment {}",
            summary.not_found, summary.out_of_order, summary.degenerate_fragment
        );
    }
    for row in report
        .fragments
        .iter()
        .filter(|row| row.status == RowStatus::Rejected)
    {
        let reason = row.reason.map_or("unknown", RejectReason::as_str);
        let _ = writeln!(
            out,
            "  [{}] {} {} (best score {:.1}, {} attempt(s))",
            row.ordinal, row.source_id, reason, row.score, row.attempts
        );
    }
    out
}

use std::fmt::Write as _;

/// One clip's time span in seconds, as exported from an audio editor's
/// label track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// Reads lines holding at least two decimal numbers (`,` or `.` as the
/// separator). The first two numbers are start and end; any label after them
/// is ignored. Lines without two numbers are skipped and reversed pairs are
/// swapped, both with a warning.
pub fn parse_label_track(text: &str) -> Vec<TimeRange> {
    let mut ranges = Vec::new();
    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let numbers: Vec<f64> = line
            .split_whitespace()
            .filter_map(|token| token.replace(',', ".").parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .take(2)
            .collect();
        if numbers.len() < 2 {
            tracing::warn!(
                line = line_no + 1,
                content = line,
                "label track: skipping line without two numbers"
            );
            continue;
        }
        let (mut start, mut end) = (numbers[0], numbers[1]);
        if end < start {
            tracing::warn!(
                line = line_no + 1,
                start,
                end,
                "label track: end before start, swapping"
            );
            std::mem::swap(&mut start, &mut end);
        }
        ranges.push(TimeRange {
            start_secs: start,
            end_secs: end,
        });
    }
    ranges
}

/// `HH:MM:SS,mmm`, rounded to the nearest millisecond. Negative input
/// clamps to zero.
pub fn format_srt_timestamp(secs: f64) -> String {
    let total_ms = if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// SRT entries with timings and no text, numbered from 1.
pub fn render_empty_srt(ranges: &[TimeRange]) -> String {
    let mut out = String::new();
    for (idx, range) in ranges.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n\n",
            idx + 1,
            format_srt_timestamp(range.start_secs),
            format_srt_timestamp(range.end_secs)
        );
    }
    out
}

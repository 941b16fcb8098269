use crate::alignment::normalization::{is_dash, is_word_char};
use crate::alignment::offsets::ceil_char_boundary;
use crate::config::BoundarySettings;

const SENTENCE_END: [char; 4] = ['.', '!', '?', '…'];
const CLOSING_QUOTES: [char; 6] = ['"', '\'', '”', '’', '»', ')'];

/// Kinds of natural cut points, lowest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundaryKind {
    WordStart,
    LineStart,
    SentenceLineStart,
    ParagraphStart,
    DialogueDash,
}

impl BoundaryKind {
    pub fn priority(self) -> f64 {
        match self {
            Self::DialogueDash => 50.0,
            Self::ParagraphStart => 40.0,
            Self::SentenceLineStart => 30.0,
            Self::LineStart => 20.0,
            Self::WordStart => 10.0,
        }
    }
}

/// Snaps `approx` back to the best nearby cut point.
pub fn refine(text: &str, approx: usize, settings: &BoundarySettings) -> usize {
    refine_after(text, approx, None, settings)
}

/// Like [`refine`] but never returns a position `<= floor`.
///
/// Candidates are scored by kind priority plus a proximity bonus that is
/// full at `approx` and zero `scan_chars` chars before it. The backward scan
/// keeps the first candidate with the highest score, so equal scores resolve
/// toward `approx`, and it stops at the first paragraph start: a cut point
/// never moves into the previous paragraph. With no candidate in range
/// `approx` is returned as is.
pub fn refine_after(
    text: &str,
    approx: usize,
    floor: Option<usize>,
    settings: &BoundarySettings,
) -> usize {
    let approx = ceil_char_boundary(text, approx);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let approx_idx = chars.partition_point(|&(byte, _)| byte < approx);
    let lowest_idx = approx_idx.saturating_sub(settings.scan_chars);
    let span = settings.scan_chars.max(1) as f64;

    let mut best: Option<(f64, usize, BoundaryKind)> = None;
    for idx in (lowest_idx..=approx_idx).rev() {
        let byte = chars.get(idx).map_or(text.len(), |&(byte, _)| byte);
        if floor.is_some_and(|floor| byte <= floor) {
            break;
        }
        let Some(kind) = classify(text, &chars, idx) else {
            continue;
        };
        let distance = (approx_idx - idx) as f64;
        let score = kind.priority() + settings.proximity_weight * (1.0 - distance / span);
        if best.map_or(true, |(current, _, _)| score > current) {
            best = Some((score, byte, kind));
        }
        if line_start_kind(&text[..byte]) == Some(BoundaryKind::ParagraphStart) {
            break;
        }
    }

    match best {
        Some((score, position, kind)) => {
            tracing::trace!(
                approx,
                position,
                kind = ?kind,
                score = format!("{score:.1}"),
                "boundary: refined"
            );
            position
        }
        None => approx,
    }
}

/// What kind of cut point the char at `idx` starts, if any.
pub(crate) fn classify(text: &str, chars: &[(usize, char)], idx: usize) -> Option<BoundaryKind> {
    let &(byte, current) = chars.get(idx)?;
    if current.is_whitespace() {
        return None;
    }
    let prev = idx.checked_sub(1).map(|i| chars[i].1);
    let next = chars.get(idx + 1).map(|&(_, c)| c);
    let line_kind = line_start_kind(&text[..byte]);

    if is_dash(current)
        && prev.map_or(true, char::is_whitespace)
        && (next.map_or(true, char::is_whitespace) || line_kind.is_some())
    {
        return Some(BoundaryKind::DialogueDash);
    }
    if line_kind.is_some() {
        return line_kind;
    }
    if is_word_char(current) && prev.is_some_and(char::is_whitespace) {
        return Some(BoundaryKind::WordStart);
    }
    None
}

/// Kind of line start at the end of `before`, or `None` if `before` does
/// not end a line (ignoring trailing spaces and tabs).
fn line_start_kind(before: &str) -> Option<BoundaryKind> {
    let line_prefix = before.trim_end_matches([' ', '\t']);
    if line_prefix.is_empty() {
        return Some(BoundaryKind::ParagraphStart);
    }
    let rest = line_prefix.strip_suffix('\n')?;
    let rest = rest.strip_suffix('\r').unwrap_or(rest);
    let previous_line = rest.trim_end_matches([' ', '\t']);
    if previous_line.is_empty() || previous_line.ends_with('\n') {
        return Some(BoundaryKind::ParagraphStart);
    }
    if previous_line
        .trim_end_matches(CLOSING_QUOTES)
        .ends_with(SENTENCE_END)
    {
        Some(BoundaryKind::SentenceLineStart)
    } else {
        Some(BoundaryKind::LineStart)
    }
}

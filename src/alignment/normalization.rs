use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const DASH_CHARS: [char; 8] = [
    '-', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
];

/// Upper bound on correction passes; a table whose replacements feed each
/// other in a cycle stops here instead of looping.
const MAX_CORRECTION_PASSES: usize = 8;

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]+").expect("static punctuation regex"))
}

pub fn is_dash(c: char) -> bool {
    DASH_CHARS.contains(&c)
}

/// Matches `\w` for the characters that occur in prose: letters (accented
/// included), digits, combining marks and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_combining_mark(c)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF)
}

/// Ordered ASR misrecognition fixes, applied as literal substring
/// replacements over already-canonicalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct CorrectionTable {
    entries: Vec<(String, String)>,
}

impl CorrectionTable {
    /// Keys and replacements are canonicalized so they line up with
    /// normalized text. Entries with an empty key are dropped, and so are
    /// entries whose replacement contains their own key (`a -> aa`): those
    /// grow the text on every pass and never settle.
    ///
    /// Entries that only feed each other across the table still stop after
    /// a fixed number of passes; normalization is idempotent only for tables
    /// that settle within it.
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|(from, to)| {
                let from = canonicalize(&from);
                if from.is_empty() {
                    tracing::warn!("correction table: dropping entry with empty key");
                    return None;
                }
                let to = canonicalize(&to);
                if to != from && to.contains(from.as_str()) {
                    tracing::warn!(
                        from = %from,
                        to = %to,
                        "correction table: dropping entry whose replacement contains its key"
                    );
                    return None;
                }
                Some((from, to))
            })
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies every entry in order, repeating until the text stops
    /// changing so the result is a fixed point of the table.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        if self.entries.is_empty() {
            return current;
        }
        for _ in 0..MAX_CORRECTION_PASSES {
            let mut next = current.clone();
            for (from, to) in &self.entries {
                if next.contains(from.as_str()) {
                    next = next.replace(from.as_str(), to);
                }
            }
            let next = collapse_whitespace(&next);
            if next == current {
                return current;
            }
            current = next;
        }
        current
    }
}

impl Default for CorrectionTable {
    /// Proper nouns and archaic forms from Polish adventure prose that
    /// Whisper-class recognizers reliably get wrong.
    fn default() -> Self {
        Self::new(
            [
                ("stas", "staś"),
                ("nell", "nel"),
                ("idris", "idrys"),
                ("rawlinson", "rawlison"),
                ("chamiss", "chamis"),
                ("rzekl", "rzekł"),
                ("po czym", "poczem"),
            ]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string())),
        )
    }
}

impl From<Vec<(String, String)>> for CorrectionTable {
    fn from(entries: Vec<(String, String)>) -> Self {
        Self::new(entries)
    }
}

impl From<CorrectionTable> for Vec<(String, String)> {
    fn from(table: CorrectionTable) -> Self {
        table.entries
    }
}

/// Lowercase, dashes to spaces, punctuation removed, whitespace collapsed.
pub fn canonicalize(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_dash(c) { ' ' } else { c })
        .collect();
    let stripped = punctuation_re().replace_all(&lowered, "");
    collapse_whitespace(&stripped)
}

/// Full normalization: [`canonicalize`] followed by the correction table.
pub fn normalize(text: &str, corrections: &CorrectionTable) -> String {
    corrections.apply(&canonicalize(text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

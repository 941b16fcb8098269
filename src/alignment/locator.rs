use std::sync::OnceLock;

use regex::Regex;

use crate::alignment::normalization::is_word_char;
use crate::alignment::offsets::{advance_chars, ceil_char_boundary, char_boundaries};
use crate::alignment::similarity::{partial_ratio, ratio, token_set_ratio};
use crate::config::LocatorSettings;
use crate::types::MatchResult;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static word regex"))
}

/// Sliding-window fuzzy search for `needle` in `haystack`, starting at byte
/// offset `search_from`.
///
/// On success the position is the byte offset of the raw token that carries
/// the needle's first normalized word. On failure the best score seen is
/// still reported.
pub fn locate(
    haystack: &str,
    needle: &str,
    search_from: usize,
    score_threshold: f64,
    settings: &LocatorSettings,
    normalize: &dyn Fn(&str) -> String,
) -> MatchResult {
    let needle_raw = needle.trim();
    let needle_chars = needle_raw.chars().count();
    if needle_chars < settings.min_needle_chars {
        tracing::debug!(needle = needle_raw, "locator: needle too short");
        return MatchResult::not_found(0.0);
    }
    let needle_norm = normalize(needle_raw);
    if needle_norm.chars().count() < settings.min_needle_chars {
        tracing::debug!(needle = needle_raw, "locator: needle empty after normalization");
        return MatchResult::not_found(0.0);
    }
    let first_word = needle_norm.split(' ').next().unwrap_or_default();

    let bounds = char_boundaries(haystack);
    let total_chars = bounds.len() - 1;
    let start_char = bounds.partition_point(|&byte| byte < search_from);
    if start_char >= total_chars {
        return MatchResult::not_found(0.0);
    }

    let window_chars = ((needle_chars as f64 * settings.window_scale).ceil() as usize)
        .max(settings.min_window_chars)
        .max(needle_chars);
    let step_chars = ((window_chars as f64 * settings.step_fraction) as usize).max(1);

    let mut best_score = 0.0f64;
    let mut best_window: Option<(usize, usize)> = None;
    let mut windows_scanned = 0usize;
    let mut start = start_char;
    loop {
        let end = (start + window_chars).min(total_chars);
        let window_norm = normalize(&haystack[bounds[start]..bounds[end]]);
        windows_scanned += 1;
        if !window_norm.is_empty() {
            let score = score_window(&needle_norm, first_word, &window_norm, settings);
            tracing::trace!(
                window_start = bounds[start],
                score = format!("{score:.1}"),
                "locator: window scored"
            );
            if score > best_score {
                best_score = score;
                best_window = Some((bounds[start], bounds[end]));
            }
            if best_score >= settings.early_exit_score {
                break;
            }
        }
        if end >= total_chars {
            break;
        }
        start += step_chars;
    }

    let Some((window_start, window_end)) = best_window else {
        return MatchResult::not_found(0.0);
    };
    if best_score < score_threshold {
        tracing::debug!(
            needle = needle_raw,
            best_score = format!("{best_score:.1}"),
            threshold = score_threshold,
            windows_scanned,
            "locator: below threshold"
        );
        return MatchResult::not_found(best_score);
    }

    let position = anchor_position(
        haystack,
        window_start,
        window_end,
        &needle_norm,
        needle_chars,
        normalize,
    );
    let span_end = advance_chars(haystack, position, needle_chars);
    tracing::debug!(
        needle = needle_raw,
        position,
        score = format!("{best_score:.1}"),
        windows_scanned,
        "locator: match"
    );
    MatchResult::found_at(position, best_score, haystack[position..span_end].to_string())
}

/// Weighted blend of partial and token-set similarity, plus a bonus when the
/// needle's first word is present verbatim. Capped at 100.
pub fn score_window(
    needle_norm: &str,
    first_word: &str,
    window_norm: &str,
    settings: &LocatorSettings,
) -> f64 {
    let partial = partial_ratio(needle_norm, window_norm);
    let token_set = token_set_ratio(needle_norm, window_norm);
    let mut score = partial * settings.partial_weight + token_set * settings.token_set_weight;
    if !first_word.is_empty() && window_norm.split(' ').any(|word| word == first_word) {
        score += settings.anchor_bonus;
    }
    score.min(100.0)
}

/// Maps a matched window back to the raw token where the needle begins.
///
/// Every whole `\w+` token of the raw window is a candidate. For each one the
/// raw text from that token on is normalized and its first words compared to
/// the needle. Tokens whose normalized form equals the needle's first word
/// win over fuzzy ones; within a group the best continuation wins, earliest
/// on ties.
fn anchor_position(
    haystack: &str,
    window_start: usize,
    window_end: usize,
    needle_norm: &str,
    needle_chars: usize,
    normalize: &dyn Fn(&str) -> String,
) -> usize {
    let needle_word_count = needle_norm.split(' ').count();
    let first_word = needle_norm.split(' ').next().unwrap_or_default();
    let continuation_chars = needle_chars + needle_chars / 2 + 8;
    let starts_mid_word = haystack[..window_start]
        .chars()
        .next_back()
        .is_some_and(is_word_char);

    let mut exact: Option<(f64, usize)> = None;
    let mut fuzzy: Option<(f64, usize)> = None;
    for token in word_re().find_iter(&haystack[window_start..window_end]) {
        if token.start() == 0 && starts_mid_word {
            continue;
        }
        let token_norm = normalize(token.as_str());
        let Some(token_first) = token_norm.split(' ').next().filter(|w| !w.is_empty()) else {
            continue;
        };
        let token_start = window_start + token.start();
        let continuation_end = advance_chars(haystack, token_start, continuation_chars);
        let continuation = normalize(&haystack[token_start..continuation_end]);
        let head = continuation
            .split(' ')
            .take(needle_word_count)
            .collect::<Vec<_>>()
            .join(" ");
        let score = ratio(needle_norm, &head);

        let slot = if token_first == first_word {
            &mut exact
        } else {
            &mut fuzzy
        };
        if slot.map_or(true, |(best, _)| score > best) {
            *slot = Some((score, token_start));
        }
    }

    exact
        .or(fuzzy)
        .map(|(_, position)| position)
        .unwrap_or_else(|| ceil_char_boundary(haystack, window_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::normalization::{normalize, CorrectionTable};

    fn plain(text: &str) -> String {
        normalize(text, &CorrectionTable::empty())
    }

    fn run(haystack: &str, needle: &str, from: usize, threshold: f64) -> MatchResult {
        locate(
            haystack,
            needle,
            from,
            threshold,
            &LocatorSettings::default(),
            &plain,
        )
    }

    const SCENE: &str = "Ala ma kota. — Tak, kota. — powiedział Marek.";

    #[test]
    fn finds_dash_led_clause() {
        let result = run(SCENE, "tak kota", 0, 40.0);
        assert!(result.found);
        assert_eq!(result.position, SCENE.find("Tak"));
        assert!(result.score >= 95.0);
        assert_eq!(result.matched_span.as_deref(), Some("Tak, kot"));
    }

    #[test]
    fn short_needle_is_not_searched() {
        let result = run(SCENE, "ab", 0, 0.0);
        assert!(!result.found);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.position, None);
    }

    #[test]
    fn needle_short_after_normalization_is_not_searched() {
        let result = run(SCENE, "— a —", 0, 0.0);
        assert!(!result.found);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn absent_phrase_reports_low_best_score() {
        let result = run(SCENE, "zzzz qqqq xxxx", 0, 70.0);
        assert!(!result.found);
        assert!(result.score < 70.0, "score {}", result.score);
    }

    #[test]
    fn search_starts_at_offset() {
        let text = "Kali poszedł do lasu. Potem długo nic. Kali poszedł do rzeki.";
        let second = text.rfind("Kali").unwrap();
        let result = run(text, "kali poszedł do", 1, 60.0);
        assert!(result.found);
        assert_eq!(result.position, Some(second));
    }

    #[test]
    fn offset_past_end_is_not_found() {
        let result = run(SCENE, "tak kota", SCENE.len(), 0.0);
        assert!(!result.found);
    }

    #[test]
    fn position_maps_through_deleted_tokens() {
        let text = "Rzekł — i po chwili — „Tak, tak” — dodał Staś.";
        let result = run(text, "tak tak dodał", 0, 60.0);
        assert!(result.found);
        assert_eq!(result.position, text.find("Tak"));
    }

    #[test]
    fn tolerates_asr_misspelling() {
        let text = "Wtem Saba zaczął szczekać. Nel schowała się za Stasia, który chwycił strzelbę.";
        let result = run(text, "nell schowała się za stasia", 0, 70.0);
        assert!(result.found);
        assert_eq!(result.position, text.find("Nel"));
    }

    #[test]
    fn tie_keeps_first_window() {
        let text = "raz dwa trzy cztery pięć sześć siedem osiem dziewięć dziesięć raz dwa trzy";
        let result = run(text, "raz dwa trzy", 0, 50.0);
        assert_eq!(result.position, Some(0));
    }

    #[test]
    fn score_window_adds_anchor_bonus() {
        let settings = LocatorSettings::default();
        let with = score_window("tak psa", "tak", "no tak kota", &settings);
        let without = score_window("tak psa", "", "no tak kota", &settings);
        assert!((with - without - settings.anchor_bonus).abs() < 1e-9);
    }
}

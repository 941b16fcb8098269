//! String similarity metrics on a 0-100 scale.
//!
//! All inputs are expected to be normalized (single-spaced, lowercase).

use std::collections::BTreeSet;

/// Whole-string similarity based on normalized Levenshtein distance.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best [`ratio`] between the shorter string and an equally long slice of
/// the longer one.
///
/// Slices are aligned to word starts of the longer string, plus one slice
/// flush with its end. Aligning to words keeps the cost linear in the number
/// of words rather than characters.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 0.0;
    }
    let long_chars: Vec<char> = long.chars().collect();
    if short_len == long_chars.len() {
        return ratio(short, long);
    }

    let mut starts: Vec<usize> = std::iter::once(0)
        .chain(
            long_chars
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == ' ')
                .map(|(idx, _)| idx + 1),
        )
        .filter(|&start| start < long_chars.len())
        .collect();
    starts.push(long_chars.len() - short_len);

    let mut best = 0.0f64;
    for start in starts {
        let end = (start + short_len).min(long_chars.len());
        let slice: String = long_chars[start..end].iter().collect();
        let score = ratio(short, &slice);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Set-based token comparison that ignores word order and duplicates.
///
/// When one side's words are a subset of the other's the score is 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_a.is_empty() || diff_b.is_empty()) {
        return 100.0;
    }

    let sect = intersection.join(" ");
    let combined_a = join_nonempty(&sect, &diff_a.join(" "));
    let combined_b = join_nonempty(&sect, &diff_b.join(" "));

    let mut best = ratio(&combined_a, &combined_b);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_a))
            .max(ratio(&sect, &combined_b));
    }
    best
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_bounds() {
        assert_eq!(ratio("kota", "kota"), 100.0);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn partial_ratio_finds_embedded_phrase() {
        let score = partial_ratio("tak kota", "ala ma kota tak kota powiedział");
        assert_eq!(score, 100.0);
    }

    #[test]
    fn partial_ratio_is_symmetric_in_argument_order() {
        let a = "tak kota";
        let b = "ala ma kota tak kota";
        assert_eq!(partial_ratio(a, b), partial_ratio(b, a));
    }

    #[test]
    fn partial_ratio_tolerates_single_typo() {
        let score = partial_ratio("tak kotu", "ala ma kota tak kota");
        assert!(score >= 85.0, "score {score}");
    }

    #[test]
    fn partial_ratio_of_empty_needle_is_zero() {
        assert_eq!(partial_ratio("", "ala ma kota"), 0.0);
    }

    #[test]
    fn token_set_ratio_subset_is_full_score() {
        assert_eq!(token_set_ratio("kota tak", "ala ma tak kota"), 100.0);
    }

    #[test]
    fn token_set_ratio_disjoint_is_low() {
        let score = token_set_ratio("zzzz qqqq", "ala ma kota");
        assert!(score < 30.0, "score {score}");
    }

    #[test]
    fn token_set_ratio_empty_side_is_zero() {
        assert_eq!(token_set_ratio("", "ala"), 0.0);
    }
}

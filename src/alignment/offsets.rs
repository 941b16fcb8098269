//! Byte/char offset helpers. Positions in this crate are byte offsets that
//! always sit on char boundaries; window sizes are counted in chars.

/// Byte offset of every char start, followed by `text.len()`.
pub(crate) fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Byte offset reached by moving `chars` characters forward from `from`,
/// clamped to the end of the text.
pub(crate) fn advance_chars(text: &str, from: usize, chars: usize) -> usize {
    let from = ceil_char_boundary(text, from);
    text[from..]
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| from + idx)
        .unwrap_or(text.len())
}

/// Smallest char boundary `>= offset`, clamped to the text length.
pub(crate) fn ceil_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    (offset..=text.len())
        .find(|&idx| text.is_char_boundary(idx))
        .unwrap_or(text.len())
}

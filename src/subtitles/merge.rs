use crate::alignment::markers::split_marker_blocks;

/// Fills an empty SRT skeleton with the text blocks of a marker-annotated
/// chapter, pairing them up in file order. Entries beyond the last block get
/// empty text; blocks beyond the last entry are dropped.
pub fn merge_into_skeleton(skeleton: &str, annotated: &str) -> String {
    let skeleton = skeleton.replace("\r\n", "\n");
    let entries: Vec<&str> = skeleton
        .trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    let blocks = split_marker_blocks(annotated);

    if entries.len() != blocks.len() {
        tracing::warn!(
            entries = entries.len(),
            blocks = blocks.len(),
            "subtitle entry count does not match marker block count"
        );
    }

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let text = blocks.get(idx).map(String::as_str).unwrap_or_default();
            format!("{entry}\n{text}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

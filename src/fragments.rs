//! Loading transcript fragments produced by the external transcription step.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SegmentationError;
use crate::types::TranscriptFragment;

#[derive(Debug, Deserialize)]
struct FragmentRecord {
    source_id: String,
    snippet: String,
}

/// First `max_words` whitespace-separated words of `text`, single-spaced.
pub fn head_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads a JSON array of `{ "source_id": ..., "snippet": ... }` records.
/// Ordinals follow array order, starting at 1.
pub fn load_fragments_json(path: &Path) -> Result<Vec<TranscriptFragment>, SegmentationError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| SegmentationError::io("read fragments file", e))?;
    parse_fragments_json(&data)
}

pub fn parse_fragments_json(data: &str) -> Result<Vec<TranscriptFragment>, SegmentationError> {
    let records: Vec<FragmentRecord> = serde_json::from_str(data)
        .map_err(|e| SegmentationError::json("parse fragments file", e))?;
    Ok(records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| TranscriptFragment::new(idx + 1, record.source_id, record.snippet))
        .collect())
}

/// Reads one `.txt` transcript per clip from `dir`, ordered by file name.
/// The source id is the file stem, matching the clip it was transcribed from.
pub fn load_fragments_dir(dir: &Path) -> Result<Vec<TranscriptFragment>, SegmentationError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| SegmentationError::io("list transcript directory", e))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| SegmentationError::io("list transcript directory", e))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut fragments = Vec::with_capacity(paths.len());
    for (idx, path) in paths.iter().enumerate() {
        let snippet = std::fs::read_to_string(path)
            .map_err(|e| SegmentationError::io("read transcript file", e))?;
        let source_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        fragments.push(TranscriptFragment::new(idx + 1, source_id, snippet.trim()));
    }
    tracing::debug!(count = fragments.len(), dir = %dir.display(), "loaded transcripts");
    Ok(fragments)
}

/// Cuts every snippet down to its first `max_words` words.
pub fn truncate_to_anchors(fragments: &mut [TranscriptFragment], max_words: usize) {
    for fragment in fragments {
        fragment.snippet = head_words(&fragment.snippet, max_words);
    }
}

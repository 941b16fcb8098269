use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chapter_sync::SegmentationReport;

/// Writes the per-fragment segmentation report as pretty JSON.
pub fn write_report(path: &Path, report: &SegmentationReport) -> Result<(), String> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|err| {
            format!("Cannot create directory '{}' for the fragment report: {err}", dir.display())
        })?;
    }

    let file = File::create(path).map_err(|err| {
        format!("Cannot open fragment report '{}' for writing: {err}", path.display())
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|err| {
        format!(
            "Cannot encode report for {} fragment(s) into '{}': {err}",
            report.fragments.len(),
            path.display()
        )
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|err| format!("Cannot flush fragment report '{}': {err}", path.display()))
}

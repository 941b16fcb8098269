use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chapter_sync::fragments::{load_fragments_dir, load_fragments_json, truncate_to_anchors};
use chapter_sync::subtitles::{merge_into_skeleton, parse_label_track, render_empty_srt};
use chapter_sync::text::{
    find_chapter_stem, separate_dialogue_lines, split_chapters, split_subchapters,
};
use chapter_sync::{
    build_report, render_summary, ChapterSegmenterBuilder, CorrectionTable, Meta, SegmenterConfig,
    TranscriptFragment,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[path = "chapter_sync/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "chapter_sync")]
#[command(about = "Align audiobook clip transcripts with chapter text and build subtitles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert `[n] >>>>>>>>>>>>` markers where each clip's text begins.
    Align(AlignArgs),
    /// Build an empty SRT from a label track of clip start/end times.
    Skeleton(SkeletonArgs),
    /// Fill an empty SRT with the text blocks of an annotated chapter.
    Merge(MergeArgs),
    /// List or extract chapters from a whole book.
    Chapters(ChaptersArgs),
}

#[derive(Debug, Args)]
struct AlignArgs {
    #[arg(long, env = "CHAPTER_SYNC_CHAPTER")]
    chapter: PathBuf,
    /// JSON array of `{source_id, snippet}` or a directory of `.txt` transcripts.
    #[arg(long, env = "CHAPTER_SYNC_FRAGMENTS")]
    fragments: PathBuf,
    /// Annotated text destination; stdout when omitted.
    #[arg(long, env = "CHAPTER_SYNC_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "CHAPTER_SYNC_REPORT")]
    report: Option<PathBuf>,
    #[arg(long, env = "CHAPTER_SYNC_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "CHAPTER_SYNC_THRESHOLD")]
    threshold: Option<f64>,
    #[arg(long, env = "CHAPTER_SYNC_MIN_WORDS")]
    min_words: Option<usize>,
    /// Search with only the first N words of every transcript.
    #[arg(long, env = "CHAPTER_SYNC_ANCHOR_WORDS")]
    anchor_words: Option<usize>,
    #[arg(long, env = "CHAPTER_SYNC_PAD_WIDTH")]
    pad_width: Option<usize>,
    /// Put dash-led dialogue lines in their own paragraphs after inserting markers.
    #[arg(long, env = "CHAPTER_SYNC_SEPARATE_DIALOGUE", default_value_t = false)]
    separate_dialogue: bool,
    #[arg(long, env = "CHAPTER_SYNC_NO_CORRECTIONS", default_value_t = false)]
    no_corrections: bool,
}

#[derive(Debug, Args)]
struct SkeletonArgs {
    #[arg(long, env = "CHAPTER_SYNC_LABELS")]
    labels: PathBuf,
    #[arg(long, env = "CHAPTER_SYNC_SKELETON_OUT")]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MergeArgs {
    #[arg(long, env = "CHAPTER_SYNC_SKELETON")]
    skeleton: PathBuf,
    #[arg(long, env = "CHAPTER_SYNC_ANNOTATED")]
    annotated: PathBuf,
    /// Merged SRT destination. Defaults to `<out-dir>/ROZDZIAŁ_<n>.srt` when
    /// the annotated text names its chapter, stdout otherwise.
    #[arg(long, env = "CHAPTER_SYNC_SRT_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "CHAPTER_SYNC_SRT_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Debug, Args)]
struct ChaptersArgs {
    #[arg(long, env = "CHAPTER_SYNC_BOOK")]
    book: PathBuf,
    /// 1-based chapter to extract; only lists chapters when omitted.
    #[arg(long)]
    chapter: Option<usize>,
    /// 1-based subchapter of the selected chapter.
    #[arg(long, requires = "chapter")]
    subchapter: Option<usize>,
    /// Print the chapter listing as JSON.
    #[arg(long, conflicts_with = "chapter", default_value_t = false)]
    json: bool,
    #[arg(long, env = "CHAPTER_SYNC_CHAPTERS_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chapter_sync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Align(args) => run_align(args),
        Command::Skeleton(args) => run_skeleton(args),
        Command::Merge(args) => run_merge(args),
        Command::Chapters(args) => run_chapters(args),
    }
}

fn run_align(args: AlignArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => SegmenterConfig::load(path).map_err(|err| err.to_string())?,
        None => SegmenterConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.score_threshold = threshold;
    }
    if let Some(min_words) = args.min_words {
        config.min_fragment_words = min_words;
    }
    if let Some(pad_width) = args.pad_width {
        config.marker.pad_width = pad_width;
    }
    if args.no_corrections {
        config.corrections = CorrectionTable::empty();
    }

    let chapter = read_text(&args.chapter)?;
    let mut fragments = load_fragments(&args.fragments)?;
    if let Some(words) = args.anchor_words {
        if words == 0 {
            return Err("--anchor-words must be >= 1.".to_string());
        }
        truncate_to_anchors(&mut fragments, words);
    }

    let segmenter = ChapterSegmenterBuilder::new(config)
        .build()
        .map_err(|err| err.to_string())?;

    let progress = ProgressBar::new(fragments.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("aligning...");
    let output = segmenter
        .segment_with_observer(&chapter, &fragments, |outcome| {
            progress.set_message(format!("fragment {}", outcome.ordinal()));
            progress.inc(1);
        })
        .map_err(|err| err.to_string())?;
    progress.finish_with_message("done");

    let annotated = if args.separate_dialogue {
        separate_dialogue_lines(&output.annotated_text)
    } else {
        output.annotated_text
    };
    write_output(args.out.as_deref(), &annotated)?;

    let report = build_report(
        &output.outcome,
        Meta {
            generated_at: Utc::now().to_rfc3339(),
            chapter_path: args.chapter.display().to_string(),
            chapter_chars: chapter.chars().count(),
            score_threshold: segmenter.config().score_threshold,
        },
    );
    eprint!("{}", render_summary(&report));
    if let Some(path) = &args.report {
        json_report_formatter::write_report(path, &report)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_skeleton(args: SkeletonArgs) -> Result<(), String> {
    let labels = read_text(&args.labels)?;
    let ranges = parse_label_track(&labels);
    if ranges.is_empty() {
        tracing::warn!(path = %args.labels.display(), "no time ranges found in label track");
    }
    write_output(args.out.as_deref(), &render_empty_srt(&ranges))?;
    tracing::info!(entries = ranges.len(), "skeleton written");
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), String> {
    let skeleton = read_text(&args.skeleton)?;
    let annotated = read_text(&args.annotated)?;
    let merged = merge_into_skeleton(&skeleton, &annotated);
    let out = args.out.or_else(|| {
        find_chapter_stem(&annotated).map(|stem| args.out_dir.join(format!("{stem}.srt")))
    });
    write_output(out.as_deref(), &merged)?;
    if let Some(path) = &out {
        tracing::info!(path = %path.display(), "subtitles written");
    }
    Ok(())
}

fn run_chapters(args: ChaptersArgs) -> Result<(), String> {
    let book = read_text(&args.book)?;
    let chapters = split_chapters(&book);
    if chapters.is_empty() {
        return Err(format!("No chapters found in '{}'.", args.book.display()));
    }

    let Some(number) = args.chapter else {
        if args.json {
            let listing = serde_json::to_string_pretty(&chapters)
                .map_err(|err| format!("Cannot encode chapter listing: {err}"))?;
            println!("{listing}");
            return Ok(());
        }
        for (idx, chapter) in chapters.iter().enumerate() {
            println!("{}. {} - {}", idx + 1, chapter.header, chapter.title);
        }
        return Ok(());
    };
    let chosen = number
        .checked_sub(1)
        .and_then(|idx| chapters.get(idx))
        .ok_or_else(|| format!("No chapter {number}; {} available.", chapters.len()))?;
    let chapter_text = chosen.text(&book);

    let (stem, content) = match args.subchapter {
        Some(sub_number) => {
            let subchapters = split_subchapters(chapter_text);
            let sub = sub_number
                .checked_sub(1)
                .and_then(|idx| subchapters.get(idx))
                .ok_or_else(|| {
                    format!(
                        "No subchapter {sub_number} in {}; {} available.",
                        chosen.header,
                        subchapters.len()
                    )
                })?;
            (
                format!("{}_{}", chosen.file_stem(), sub.roman),
                sub.text(chapter_text),
            )
        }
        None => (chosen.file_stem(), chapter_text),
    };

    let path = args.out_dir.join(format!("{stem}.txt"));
    write_output(Some(&path), content)?;
    println!("{}", path.display());
    Ok(())
}

fn load_fragments(path: &Path) -> Result<Vec<TranscriptFragment>, String> {
    let fragments = if path.is_dir() {
        load_fragments_dir(path)
    } else {
        load_fragments_json(path)
    };
    fragments.map_err(|err| format!("Failed to load fragments '{}': {err}", path.display()))
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), String> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        return stdout
            .write_all(content.as_bytes())
            .map_err(|err| format!("Failed to write to stdout: {err}"));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, content).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

use chapter_sync::alignment::boundary::refine;
use chapter_sync::alignment::normalization::{is_word_char, normalize};
use chapter_sync::config::BoundarySettings;
use chapter_sync::{
    strip_markers, ChapterSegmenterBuilder, CorrectionTable, SegmenterConfig, TranscriptFragment,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SEED: u64 = 42;
const CASES: usize = 24;

const VOCABULARY: [&str; 48] = [
    "pustynia", "wielbłąd", "namiot", "strzelba", "karawana", "słońce", "piasek", "oaza",
    "studnia", "palma", "lew", "słoń", "dżungla", "rzeka", "łódź", "wiatr", "burza", "noc",
    "gwiazdy", "ognisko", "latarnia", "kamień", "wąwóz", "skała", "ścieżka", "droga", "dziecko",
    "chłopiec", "dziewczynka", "przewodnik", "żołnierz", "derwisz", "szejk", "murzyn",
    "pies", "koń", "woda", "chleb", "daktyle", "mapa", "kompas", "list", "ojciec", "miasto",
    "statek", "kanał", "pociąg", "stacja",
];

const NOISE_ALPHABET: [&str; 30] = [
    "a", "Ą", "ś", "Ź", "ż", "O", "ł", " ", "  ", "\n", "\t", ".", ",", "—", "-", "–", "!", "?",
    "…", "\"", "»", "«", "(", ")", "_", "7", "stas", "Nell", "po czym", "PO  CZYM",
];

struct GeneratedChapter {
    text: String,
    fragments: Vec<TranscriptFragment>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sentence(rng: &mut StdRng, words: &mut Vec<&'static str>) -> String {
    let len = rng.gen_range(5..=11);
    let picked: Vec<&str> = (0..len)
        .map(|_| *VOCABULARY.choose(rng).unwrap_or(&"woda"))
        .collect();
    words.extend(picked.iter().copied());
    let mut out = String::new();
    for (idx, word) in picked.iter().enumerate() {
        if idx == 0 {
            out.push_str(&capitalize(word));
        } else {
            out.push(' ');
            out.push_str(word);
            if idx + 1 < picked.len() && rng.gen_bool(0.15) {
                out.push(',');
            }
        }
    }
    out.push(*['.', '!', '?'].choose(rng).unwrap_or(&'.'));
    out
}

/// Paragraphs of random prose, some of them dialogue lines; every other
/// paragraph opens a clip whose transcript is its first five words.
fn generate_chapter(rng: &mut StdRng) -> GeneratedChapter {
    let paragraph_count = rng.gen_range(6..=12);
    let mut paragraphs = Vec::with_capacity(paragraph_count);
    let mut fragments = Vec::new();
    for idx in 0..paragraph_count {
        let mut words = Vec::new();
        let sentences: Vec<String> = (0..rng.gen_range(2..=3))
            .map(|_| sentence(rng, &mut words))
            .collect();
        let separator = if rng.gen_bool(0.2) { "\n" } else { " " };
        let mut paragraph = sentences.join(separator);
        if rng.gen_bool(0.4) {
            paragraph = format!("— {paragraph}");
        }
        if idx % 2 == 0 {
            let ordinal = fragments.len() + 1;
            let snippet = words[..5].join(" ");
            fragments.push(TranscriptFragment::new(
                ordinal,
                format!("{ordinal:03}.mp3"),
                snippet,
            ));
        }
        paragraphs.push(paragraph);
    }
    GeneratedChapter {
        text: paragraphs.join("\n\n"),
        fragments,
    }
}

fn noise(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..40);
    (0..len)
        .map(|_| *NOISE_ALPHABET.choose(rng).unwrap_or(&" "))
        .collect()
}

fn splits_word(text: &str, position: usize) -> bool {
    let before = text[..position].chars().next_back();
    let after = text[position..].chars().next();
    matches!((before, after), (Some(b), Some(a)) if is_word_char(b) && is_word_char(a))
}

#[test]
fn normalization_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let tables = [CorrectionTable::empty(), CorrectionTable::default()];
    for _ in 0..500 {
        let input = noise(&mut rng);
        for table in &tables {
            let once = normalize(&input, table);
            assert_eq!(normalize(&once, table), once, "input {input:?}");
        }
    }
}

#[test]
fn accepted_positions_strictly_increase() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let segmenter = ChapterSegmenterBuilder::new(SegmenterConfig::default())
        .build()
        .expect("default config is valid");
    for case in 0..CASES {
        let chapter = generate_chapter(&mut rng);
        let outcome = segmenter.sequence(&chapter.text, &chapter.fragments);

        assert_eq!(
            outcome.accepted.len(),
            chapter.fragments.len(),
            "case {case}: rejected {:?}",
            outcome.rejected
        );
        let inserts: Vec<usize> = outcome.plan.entries().iter().map(|e| e.position).collect();
        assert!(
            inserts.windows(2).all(|pair| pair[0] < pair[1]),
            "case {case}: {inserts:?}"
        );
        let raws: Vec<usize> = outcome.accepted.iter().map(|a| a.raw_position).collect();
        assert!(raws.windows(2).all(|pair| pair[0] < pair[1]), "case {case}: {raws:?}");
        for accepted in &outcome.accepted {
            assert!(accepted.insert_position <= accepted.raw_position);
            assert!(!splits_word(&chapter.text, accepted.insert_position));
        }
    }
}

#[test]
fn stripping_markers_restores_chapter() {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    let config = SegmenterConfig {
        marker: chapter_sync::config::MarkerStyle { pad_width: 2 },
        ..SegmenterConfig::default()
    };
    let segmenter = ChapterSegmenterBuilder::new(config)
        .build()
        .expect("config is valid");
    for _ in 0..CASES {
        let mut chapter = generate_chapter(&mut rng);
        chapter.fragments.shuffle(&mut rng);
        let output = segmenter
            .segment(&chapter.text, &chapter.fragments)
            .expect("segment should succeed");
        assert_eq!(strip_markers(&output.annotated_text), chapter.text);
        assert_eq!(
            output.annotated_text.matches(">>>>>>>>>>>>").count(),
            output.outcome.plan.len()
        );
    }
}

#[test]
fn refine_never_splits_words() {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    let settings = BoundarySettings::default();
    for _ in 0..CASES {
        let chapter = generate_chapter(&mut rng);
        let text = &chapter.text;
        for _ in 0..50 {
            let approx = rng.gen_range(0..=text.len());
            let refined = refine(text, approx, &settings);
            assert!(text.is_char_boundary(refined));
            let ceiling = (approx..=text.len())
                .find(|&idx| text.is_char_boundary(idx))
                .unwrap_or(text.len());
            assert!(refined <= ceiling, "approx {approx} refined {refined}");
            assert!(
                !splits_word(text, refined),
                "approx {approx} refined {refined} in {text:?}"
            );
        }
    }
}

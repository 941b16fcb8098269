use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

fn chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(ROZDZIAŁ\s+[IVXLCDM]+)\s*\n([^\n]+)").expect("static chapter regex")
    })
}

fn chapter_stem_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ROZDZIAŁ[_\s]+([IVXLCDM]+)\b").expect("static chapter stem regex"))
}

fn subchapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n([IVXLCDM]+)\s*\n([^\n]+)").expect("static subchapter regex"))
}

/// A `ROZDZIAŁ <roman>` heading and the text it owns, as byte offsets into
/// the book. A chapter ends where the next one starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub header: String,
    pub title: String,
    pub start: usize,
    pub end: usize,
}

impl Chapter {
    pub fn text<'a>(&self, book: &'a str) -> &'a str {
        &book[self.start..self.end]
    }

    /// `ROZDZIAŁ I` becomes `ROZDZIAŁ_I`.
    pub fn file_stem(&self) -> String {
        self.header.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

/// A bare roman-numeral line followed by a title line, inside one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subchapter {
    pub roman: String,
    pub title: String,
    pub start: usize,
    pub end: usize,
}

impl Subchapter {
    pub fn text<'a>(&self, chapter: &'a str) -> &'a str {
        &chapter[self.start..self.end]
    }
}

/// File stem (`ROZDZIAŁ_IV`) of the first chapter heading found anywhere in
/// `text`, written either with a space or with an underscore.
pub fn find_chapter_stem(text: &str) -> Option<String> {
    chapter_stem_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|roman| format!("ROZDZIAŁ_{}", roman.as_str()))
}

pub fn split_chapters(book: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = chapter_re()
        .captures_iter(book)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Chapter {
                header: normalize_header(caps.get(1)?.as_str()),
                title: caps.get(2)?.as_str().trim().to_string(),
                start: whole.start(),
                end: book.len(),
            })
        })
        .collect();
    close_ranges(&mut chapters, book.len(), |c| c.start, |c, end| c.end = end);
    tracing::debug!(count = chapters.len(), "chapters found");
    chapters
}

pub fn split_subchapters(chapter: &str) -> Vec<Subchapter> {
    let mut subchapters: Vec<Subchapter> = subchapter_re()
        .captures_iter(chapter)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Subchapter {
                roman: caps.get(1)?.as_str().to_string(),
                title: caps.get(2)?.as_str().trim().to_string(),
                start: whole.start(),
                end: chapter.len(),
            })
        })
        .collect();
    close_ranges(&mut subchapters, chapter.len(), |s| s.start, |s, end| s.end = end);
    subchapters
}

fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn close_ranges<T>(
    items: &mut [T],
    text_len: usize,
    start_of: impl Fn(&T) -> usize,
    mut set_end: impl FnMut(&mut T, usize),
) {
    let starts: Vec<usize> = items.iter().map(&start_of).collect();
    for (idx, item) in items.iter_mut().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(text_len);
        set_end(item, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = "Przedmowa wydawcy.\n\n\
ROZDZIAŁ I\nKrasnoludki\n\nByło to dawno.\n\n\
ROZDZIAŁ  II\n\nSierotka Marysia\n\nMarysia pasła gęsi.\n";

    #[test]
    fn chapter_stem_found_in_annotated_text() {
        let annotated = "\n\n[1] >>>>>>>>>>>>\n\nROZDZIAŁ IV\nW pustyni";
        assert_eq!(find_chapter_stem(annotated).as_deref(), Some("ROZDZIAŁ_IV"));
        assert_eq!(
            find_chapter_stem("ROZDZIAŁ_XII.txt").as_deref(),
            Some("ROZDZIAŁ_XII")
        );
        assert_eq!(find_chapter_stem("Przedmowa."), None);
    }

    #[test]
    fn chapter_listing_serializes_offsets() {
        let chapters = split_chapters(BOOK);
        let json = serde_json::to_value(&chapters[0]).unwrap();
        assert_eq!(json["header"], "ROZDZIAŁ I");
        assert_eq!(json["title"], "Krasnoludki");
        assert_eq!(json["start"], chapters[0].start);
    }

    #[test]
    fn finds_chapters_with_titles() {
        let chapters = split_chapters(BOOK);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].header, "ROZDZIAŁ I");
        assert_eq!(chapters[0].title, "Krasnoludki");
        assert_eq!(chapters[1].header, "ROZDZIAŁ II");
        assert_eq!(chapters[1].title, "Sierotka Marysia");
    }

    #[test]
    fn chapter_ends_where_next_starts() {
        let chapters = split_chapters(BOOK);
        assert_eq!(chapters[0].end, chapters[1].start);
        assert_eq!(chapters[1].end, BOOK.len());
        assert!(chapters[0].text(BOOK).starts_with("ROZDZIAŁ I\nKrasnoludki"));
        assert!(chapters[0].text(BOOK).ends_with("Było to dawno.\n\n"));
        assert!(chapters[1].text(BOOK).ends_with("Marysia pasła gęsi.\n"));
    }

    #[test]
    fn file_stem_joins_header_words() {
        let chapters = split_chapters(BOOK);
        assert_eq!(chapters[1].file_stem(), "ROZDZIAŁ_II");
    }

    #[test]
    fn no_headings_means_no_chapters() {
        assert!(split_chapters("Zwykły tekst bez rozdziałów.").is_empty());
    }

    #[test]
    fn finds_subchapters() {
        let chapter = "ROZDZIAŁ I\nKrasnoludki\n\nI\nW górach\nTekst pierwszy.\nII\nW dolinie\nTekst drugi.";
        let subs = split_subchapters(chapter);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].roman, "I");
        assert_eq!(subs[0].title, "W górach");
        assert_eq!(subs[1].roman, "II");
        assert_eq!(subs[0].end, subs[1].start);
        assert_eq!(subs[1].text(chapter), "\nII\nW dolinie\nTekst drugi.");
    }
}

pub mod chapters;
pub mod dialogue;

pub use chapters::{find_chapter_stem, split_chapters, split_subchapters, Chapter, Subchapter};
pub use dialogue::separate_dialogue_lines;

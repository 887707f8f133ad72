//! Fixed-size lesson slicing of a level's word list.

use crate::types::{HskLevel, VocabularyWord};

/// Default number of words per lesson.
pub const WORDS_PER_LESSON: usize = 15;

/// Words of a 1-based lesson: `words[(lesson-1)*size .. lesson*size]`.
///
/// Lessons past the end, lesson 0 and a zero page size give an empty slice.
pub fn words_for_lesson(words: &[VocabularyWord], lesson: usize, page_size: usize) -> &[VocabularyWord] {
    if lesson == 0 || page_size == 0 {
        return &[];
    }

    let start = (lesson - 1).saturating_mul(page_size).min(words.len());
    let end = start.saturating_add(page_size).min(words.len());
    &words[start..end]
}

/// Number of lessons needed to cover `total_words`.
pub fn number_of_lessons(total_words: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_words.div_ceil(page_size)
}

/// Lessons open to every user; later lessons of HSK 2 and up need VIP access.
pub fn free_lessons(level: HskLevel, lessons: usize) -> usize {
    if level.value() < 2 {
        lessons
    } else {
        lessons.div_ceil(2)
    }
}

pub fn requires_vip(level: HskLevel, lesson: usize, lessons: usize) -> bool {
    lesson > free_lessons(level, lessons)
}

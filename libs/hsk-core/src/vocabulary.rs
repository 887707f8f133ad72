//! Static vocabulary tables partitioned by HSK level.

use crate::lessons::{free_lessons, number_of_lessons, words_for_lesson};
use crate::search;
use crate::types::{HskLevel, LeveledWord, VocabularyWord};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Vocabulary bundled with the crate.
const BUNDLED: &str = include_str!("../data/vocabulary.json");

/// Level overview for lesson pickers.
#[derive(Debug, Clone, Serialize)]
pub struct LevelInfo {
    pub level: HskLevel,
    pub total_words: usize,
    pub lessons: usize,
    /// Lessons available without VIP access.
    pub free_lessons: usize,
}

/// All vocabulary, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    levels: BTreeMap<HskLevel, Vec<VocabularyWord>>,
}

impl Vocabulary {
    /// Parse a JSON table of the form `{ "1": [words...], ..., "6": [...] }`.
    ///
    /// Characters key mastery progress and matching cards, so a character
    /// may appear only once per level.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: BTreeMap<String, Vec<VocabularyWord>> = serde_json::from_str(json)?;
        let mut levels = BTreeMap::new();
        for (key, words) in raw {
            let level = key
                .parse::<u8>()
                .ok()
                .and_then(HskLevel::new)
                .ok_or_else(|| {
                    <serde_json::Error as serde::de::Error>::custom(format!(
                        "invalid HSK level key: {}",
                        key
                    ))
                })?;

            let mut seen = HashSet::new();
            if let Some(word) = words.iter().find(|w| !seen.insert(w.character.as_str())) {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "duplicate character {} in {}",
                    word.character, level
                )));
            }
            levels.insert(level, words);
        }
        Ok(Self { levels })
    }

    /// The vocabulary shipped with the crate.
    pub fn bundled() -> serde_json::Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn words(&self, level: HskLevel) -> &[VocabularyWord] {
        self.levels.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_words(&self, level: HskLevel) -> usize {
        self.words(level).len()
    }

    pub fn number_of_lessons(&self, level: HskLevel, page_size: usize) -> usize {
        number_of_lessons(self.total_words(level), page_size)
    }

    pub fn words_for_lesson(&self, level: HskLevel, lesson: usize, page_size: usize) -> &[VocabularyWord] {
        words_for_lesson(self.words(level), lesson, page_size)
    }

    /// Look up a word by character, searching levels in ascending order.
    pub fn find(&self, character: &str) -> Option<LeveledWord> {
        self.iter()
            .find(|(_, w)| w.character == character)
            .map(|(level, word)| LeveledWord {
                word: word.clone(),
                level,
            })
    }

    /// Every word with its level, level 1 first.
    pub fn iter(&self) -> impl Iterator<Item = (HskLevel, &VocabularyWord)> {
        self.levels
            .iter()
            .flat_map(|(level, words)| words.iter().map(move |w| (*level, w)))
    }

    pub fn search(&self, query: &str) -> Vec<LeveledWord> {
        search::search(self.iter(), query)
    }

    pub fn level_info(&self, page_size: usize) -> Vec<LevelInfo> {
        HskLevel::all()
            .map(|level| {
                let lessons = self.number_of_lessons(level, page_size);
                LevelInfo {
                    level,
                    total_words: self.total_words(level),
                    lessons,
                    free_lessons: free_lessons(level, lessons),
                }
            })
            .collect()
    }
}

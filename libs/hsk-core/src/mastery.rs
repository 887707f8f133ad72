//! Per-word mastery scores.
//!
//! Every practice outcome moves a word's score one step toward 0 or
//! [`MAX_MASTERY_SCORE`]. A word counts as mastered at the maximum.

use crate::error::Result;
use crate::store::ProgressStore;
use crate::types::{Outcome, ProgressData, VocabularyWord, WordProgress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_MASTERY_SCORE: u8 = 5;
pub const MIN_MASTERY_SCORE: u8 = 0;

/// Score a word has after applying `outcome` to its current progress.
///
/// Missing progress counts as score 0.
pub fn apply_outcome(
    current: Option<&WordProgress>,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> WordProgress {
    let score = current.map(|p| p.score).unwrap_or(MIN_MASTERY_SCORE);
    let score = match outcome {
        Outcome::Correct => score.saturating_add(1).min(MAX_MASTERY_SCORE),
        Outcome::Incorrect => score.saturating_sub(1).max(MIN_MASTERY_SCORE),
    };

    WordProgress {
        score,
        last_reviewed: now,
    }
}

/// Apply a practice outcome for `character`, persist the user's full map and return it.
///
/// An empty username or character changes nothing and returns the stored map.
pub fn update_word_mastery<S: ProgressStore + ?Sized>(
    store: &S,
    username: &str,
    character: &str,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Result<ProgressData> {
    if username.is_empty() {
        return Ok(ProgressData::new());
    }

    let mut progress = store.load_progress(username)?;
    if character.is_empty() {
        return Ok(progress);
    }

    let updated = apply_outcome(progress.get(character), outcome, now);
    progress.insert(character.to_string(), updated);
    store.save_progress(username, &progress)?;

    Ok(progress)
}

/// Current progress for a user. Empty username yields an empty map.
pub fn get_progress<S: ProgressStore + ?Sized>(store: &S, username: &str) -> Result<ProgressData> {
    if username.is_empty() {
        return Ok(ProgressData::new());
    }
    store.load_progress(username)
}

pub fn is_mastered(progress: &WordProgress) -> bool {
    progress.score >= MAX_MASTERY_SCORE
}

/// Number of words the user has scored at least once above zero.
pub fn learned_count(words: &[VocabularyWord], progress: &ProgressData) -> usize {
    words
        .iter()
        .filter(|w| progress.get(&w.character).map_or(0, |p| p.score) > 0)
        .count()
}

/// Progress breakdown for a word list (typically one level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterySummary {
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
    pub new_words: usize,
    /// Practiced words still at score 0 or 1.
    pub struggling: Vec<VocabularyWord>,
}

impl MasterySummary {
    pub fn for_words(words: &[VocabularyWord], progress: &ProgressData) -> Self {
        let mut mastered = 0;
        let mut learning = 0;
        let mut struggling = Vec::new();

        for word in words {
            let Some(p) = progress.get(&word.character) else {
                continue;
            };
            if is_mastered(p) {
                mastered += 1;
            } else if p.score > 0 {
                learning += 1;
                if p.score <= 1 {
                    struggling.push(word.clone());
                }
            } else {
                struggling.push(word.clone());
            }
        }

        Self {
            total: words.len(),
            mastered,
            learning,
            new_words: words.len() - mastered - learning,
            struggling,
        }
    }
}

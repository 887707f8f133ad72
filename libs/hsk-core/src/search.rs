//! Tone-insensitive vocabulary search.

use crate::error::Result;
use crate::store::RecentSearchStore;
use crate::types::{HskLevel, LeveledWord, RecentSearch, VocabularyWord};
use chrono::{DateTime, Utc};

/// Maximum number of remembered search results per user.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Map a tonal pinyin vowel to its base letter. `ü` in any tone becomes `v`.
fn base_letter(c: char) -> char {
    match c {
        'ā' | 'á' | 'ǎ' | 'à' => 'a',
        'ō' | 'ó' | 'ǒ' | 'ò' => 'o',
        'ē' | 'é' | 'ě' | 'è' => 'e',
        'ī' | 'í' | 'ǐ' | 'ì' => 'i',
        'ū' | 'ú' | 'ǔ' | 'ù' => 'u',
        'ǖ' | 'ǘ' | 'ǚ' | 'ǜ' | 'ü' => 'v',
        other => other,
    }
}

/// Replace tone-marked vowels with base letters. Other characters pass through.
pub fn strip_tones(s: &str) -> String {
    s.chars().map(base_letter).collect()
}

/// Lowercase and strip tones. Idempotent.
pub fn normalize(s: &str) -> String {
    strip_tones(&s.to_lowercase())
}

/// Whether `word` matches a query that has already been trimmed and lowercased.
fn matches(word: &VocabularyWord, lower_query: &str, toneless_query: &str) -> bool {
    let pinyin_lower = word.pinyin.to_lowercase();

    word.character.contains(lower_query)
        || pinyin_lower.contains(lower_query)
        || strip_tones(&pinyin_lower).contains(toneless_query)
        || word.translation.to_lowercase().contains(lower_query)
}

/// Search a leveled corpus by character, pinyin (with or without tones) or translation.
///
/// An empty or whitespace-only query yields no results. Matches are returned
/// in corpus order without ranking.
pub fn search<'a, I>(corpus: I, query: &str) -> Vec<LeveledWord>
where
    I: IntoIterator<Item = (HskLevel, &'a VocabularyWord)>,
{
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let lower_query = trimmed.to_lowercase();
    let toneless_query = strip_tones(&lower_query);

    corpus
        .into_iter()
        .filter(|(_, word)| matches(word, &lower_query, &toneless_query))
        .map(|(level, word)| LeveledWord {
            word: word.clone(),
            level,
        })
        .collect()
}

/// Record an opened search result at the front of `recent`.
///
/// An existing entry for the same character and level is moved rather than
/// duplicated; the list is capped at [`MAX_RECENT_SEARCHES`].
pub fn record_recent_search(
    recent: &mut Vec<RecentSearch>,
    word: LeveledWord,
    now: DateTime<Utc>,
) {
    recent.retain(|r| !(r.word.word.character == word.word.character && r.word.level == word.level));
    recent.insert(
        0,
        RecentSearch {
            word,
            searched_at: now,
        },
    );
    recent.truncate(MAX_RECENT_SEARCHES);
}

/// Load, update and persist a user's recent searches.
pub fn remember_search<S: RecentSearchStore + ?Sized>(
    store: &S,
    username: &str,
    word: LeveledWord,
    now: DateTime<Utc>,
) -> Result<Vec<RecentSearch>> {
    if username.is_empty() {
        return Ok(Vec::new());
    }
    let mut recent = store.load_recent_searches(username)?;
    record_recent_search(&mut recent, word, now);
    store.save_recent_searches(username, &recent)?;
    Ok(recent)
}

//! Core types shared by the library and the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HSK proficiency level (1-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HskLevel(u8);

impl HskLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Create from a numeric level.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// All levels in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HskLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("invalid HSK level: {}", value))
    }
}

impl From<HskLevel> for u8 {
    fn from(level: HskLevel) -> Self {
        level.0
    }
}

impl fmt::Display for HskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HSK {}", self.0)
    }
}

/// A vocabulary entry. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub character: String,
    pub pinyin: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Vocabulary word tagged with the level it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledWord {
    #[serde(flatten)]
    pub word: VocabularyWord,
    pub level: HskLevel,
}

/// Outcome of a single practice attempt on a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Mastery state of one word for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProgress {
    pub score: u8,
    pub last_reviewed: DateTime<Utc>,
}

/// Per-user progress keyed by character.
pub type ProgressData = BTreeMap<String, WordProgress>;

/// Practice and quiz modes, used to tag activity entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
    Example,
    Correction,
    Scramble,
    Building,
    Writing,
    Ordering,
    Conjunction,
    TranslationChoice,
    BuildFromTranslation,
    Matching,
}

impl PracticeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Example => "example",
            Self::Correction => "correction",
            Self::Scramble => "scramble",
            Self::Building => "building",
            Self::Writing => "writing",
            Self::Ordering => "ordering",
            Self::Conjunction => "conjunction",
            Self::TranslationChoice => "translation_choice",
            Self::BuildFromTranslation => "build_from_translation",
            Self::Matching => "matching",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "example" => Some(Self::Example),
            "correction" => Some(Self::Correction),
            "scramble" => Some(Self::Scramble),
            "building" => Some(Self::Building),
            "writing" => Some(Self::Writing),
            "ordering" => Some(Self::Ordering),
            "conjunction" => Some(Self::Conjunction),
            "translation_choice" => Some(Self::TranslationChoice),
            "build_from_translation" => Some(Self::BuildFromTranslation),
            "matching" => Some(Self::Matching),
            _ => None,
        }
    }
}

/// Kind of logged activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    LessonStart,
    QuizComplete,
    PracticeComplete,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonStart => "lesson_start",
            Self::QuizComplete => "quiz_complete",
            Self::PracticeComplete => "practice_complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lesson_start" => Some(Self::LessonStart),
            "quiz_complete" => Some(Self::QuizComplete),
            "practice_complete" => Some(Self::PracticeComplete),
            _ => None,
        }
    }
}

/// Activity data supplied by the caller; id and username are assigned on log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<HskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<PracticeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl NewActivity {
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            level: None,
            lesson: None,
            mode: None,
            word: None,
            score: None,
            total: None,
            is_correct: None,
        }
    }
}

/// Logged activity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Millisecond timestamp; unique per user and used as sort key.
    pub id: i64,
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<HskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<PracticeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A device a user is logged in from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub last_login: DateTime<Utc>,
}

/// A recently opened search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    #[serde(flatten)]
    pub word: LeveledWord,
    pub searched_at: DateTime<Utc>,
}

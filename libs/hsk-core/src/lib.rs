//! Core HSK vocabulary tutor library shared by the server and tests.
//!
//! Provides:
//! - Vocabulary tables per HSK level and fixed-size lessons
//! - Tone-insensitive pinyin search and recent searches
//! - Per-word mastery tracking
//! - Matching, translation-choice and word-building quizzes
//! - HSK 4 sentence-ordering exercises
//! - Accounts with the two-device login limit and VIP gating
//! - Activity history
//! - Storage traits with an in-memory implementation

pub mod accounts;
pub mod activity;
pub mod error;
pub mod lessons;
pub mod mastery;
pub mod ordering;
pub mod quiz;
pub mod search;
pub mod store;
pub mod types;
pub mod vocabulary;

pub use accounts::{RegistrationForm, UserProfile, UserRecord, UserUpdate, MAX_DEVICES};
pub use error::{AccountError, QuizError, Result, StoreError};
pub use lessons::WORDS_PER_LESSON;
pub use mastery::{update_word_mastery, MasterySummary, MAX_MASTERY_SCORE};
pub use ordering::{OrderingBank, SentenceOrderingExercise};
pub use store::{ActivityLogStore, MemoryStore, ProgressStore, RecentSearchStore, UserStore};
pub use types::{
    ActivityKind, ActivityLogEntry, Device, HskLevel, LeveledWord, NewActivity, Outcome,
    PracticeMode, ProgressData, RecentSearch, VocabularyWord, WordProgress,
};
pub use vocabulary::{LevelInfo, Vocabulary};

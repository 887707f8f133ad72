//! API request and response types

use hsk_core::quiz::{Advance, MatchingView, Selection, Side};
use hsk_core::{
    ActivityLogEntry, HskLevel, LeveledWord, Outcome, PracticeMode, ProgressData, RecentSearch,
    UserProfile, VocabularyWord,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from hsk-core
pub use hsk_core::{MasterySummary, NewActivity, RegistrationForm, UserUpdate};
pub use hsk_core::quiz::{BuildingQuestion, ChoiceQuestion};
pub use hsk_core::vocabulary::LevelInfo;

// === Auth / Account ===

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username, email or phone.
    #[serde(alias = "username")]
    pub identifier: String,
    pub password: String,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub user: UserProfile,
    pub is_admin: bool,
    pub vip_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub account: AccountResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// === Vocabulary ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonResponse {
    pub level: HskLevel,
    pub lesson: u32,
    pub lessons: usize,
    pub words: Vec<VocabularyWord>,
    /// Words of this lesson with a score above zero.
    pub learned: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<LeveledWord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentSearchRequest {
    pub character: String,
    pub level: HskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSearchesResponse {
    pub recent: Vec<RecentSearch>,
}

// === Progress / Activity ===

#[derive(Debug, Clone, Deserialize)]
pub struct MasteryRequest {
    pub character: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub progress: ProgressData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgressResponse {
    pub level: HskLevel,
    #[serde(flatten)]
    pub summary: MasterySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub entries: Vec<ActivityLogEntry>,
}

// === Quizzes ===

#[derive(Debug, Clone, Deserialize)]
pub struct LessonRequest {
    pub level: u8,
    pub lesson: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchingStartResponse {
    pub id: Uuid,
    pub game: MatchingView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    pub side: Side,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectResponse {
    pub selection: Selection,
    pub game: MatchingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvanceResponse {
    pub outcome: Advance,
    pub game: MatchingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceQuizResponse {
    pub questions: Vec<ChoiceQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingQuizResponse {
    pub questions: Vec<BuildingQuestion>,
}

// === Practice ===

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseRequest {
    /// Not needed for `ordering` when `level` is given.
    #[serde(default)]
    pub character: String,
    pub mode: PracticeMode,
    /// Defaults to the word's own level.
    #[serde(default)]
    pub level: Option<HskLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub character: String,
    pub sentence: String,
    #[serde(default)]
    pub level: Option<HskLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EssayRequest {
    pub essay: String,
    /// Words the writing prompt asked for.
    #[serde(default)]
    pub words: Vec<String>,
    pub level: HskLevel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderingAnswer {
    /// Labels in the chosen order, e.g. `"BCA"`.
    pub order: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderingResult {
    pub is_correct: bool,
    pub correct_order: String,
}

// === Admin ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserProfile>,
}


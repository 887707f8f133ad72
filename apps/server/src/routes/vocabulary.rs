//! Level, lesson and search endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use hsk_core::lessons::requires_vip;
use hsk_core::search::remember_search;
use hsk_core::{
    mastery, HskLevel, LeveledWord, ProgressStore, RecentSearchStore, UserStore, VocabularyWord,
    WORDS_PER_LESSON,
};

use crate::error::{ApiError, Result};
use crate::models::{
    LessonResponse, LevelInfo, RecentSearchRequest, RecentSearchesResponse, SearchQuery,
    SearchResponse,
};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

pub(crate) fn parse_level(level: u8) -> Result<HskLevel> {
    HskLevel::new(level)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid HSK level: {}", level)))
}

/// A lesson's words, checking that it exists and that the user may open it.
pub(crate) fn lesson_words(
    state: &AppState,
    auth: &AuthenticatedUser,
    level: HskLevel,
    lesson: u32,
) -> Result<(Vec<VocabularyWord>, usize)> {
    let lessons = state.vocabulary.number_of_lessons(level, WORDS_PER_LESSON);
    let words = state
        .vocabulary
        .words_for_lesson(level, lesson as usize, WORDS_PER_LESSON);
    if words.is_empty() {
        return Err(ApiError::NotFound(format!("{} lesson {}", level, lesson)));
    }

    if requires_vip(level, lesson as usize, lessons) {
        let user = state
            .repo()?
            .get_user(&auth.username)?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;
        if !user.has_vip_access(state.admin_username(), Utc::now().date_naive()) {
            return Err(ApiError::Forbidden(format!(
                "{} lesson {} requires VIP membership",
                level, lesson
            )));
        }
    }

    Ok((words.to_vec(), lessons))
}

/// GET /api/levels
pub async fn levels(State(state): State<AppState>) -> Json<Vec<LevelInfo>> {
    Json(state.vocabulary.level_info(WORDS_PER_LESSON))
}

/// GET /api/levels/:level/lessons/:lesson
pub async fn lesson(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((level, lesson)): Path<(u8, u32)>,
) -> Result<Json<LessonResponse>> {
    let level = parse_level(level)?;
    let (words, lessons) = lesson_words(&state, &auth, level, lesson)?;
    let progress = state.repo()?.load_progress(&auth.username)?;

    Ok(Json(LessonResponse {
        level,
        lesson,
        lessons,
        learned: mastery::learned_count(&words, &progress),
        words,
    }))
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let results = state.vocabulary.search(&query.q);
    Json(SearchResponse {
        query: query.q,
        results,
    })
}

/// GET /api/search/recent
pub async fn recent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<RecentSearchesResponse>> {
    let recent = state.repo()?.load_recent_searches(&auth.username)?;
    Ok(Json(RecentSearchesResponse { recent }))
}

/// POST /api/search/recent
/// Records that the user opened a search result
pub async fn record_recent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<RecentSearchRequest>,
) -> Result<Json<RecentSearchesResponse>> {
    let word = state
        .vocabulary
        .words(payload.level)
        .iter()
        .find(|w| w.character == payload.character)
        .cloned()
        .ok_or_else(|| {
            ApiError::NotFound(format!("{} is not in {}", payload.character, payload.level))
        })?;

    let repo = state.repo()?;
    let recent = remember_search(
        &*repo,
        &auth.username,
        LeveledWord {
            word,
            level: payload.level,
        },
        Utc::now(),
    )?;
    Ok(Json(RecentSearchesResponse { recent }))
}

/// DELETE /api/search/recent
pub async fn clear_recent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<StatusCode> {
    state.repo()?.save_recent_searches(&auth.username, &[])?;
    Ok(StatusCode::NO_CONTENT)
}

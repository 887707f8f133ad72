//! Word mastery endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use hsk_core::mastery::get_progress;
use hsk_core::{update_word_mastery, MasterySummary};

use crate::error::{ApiError, Result};
use crate::models::{LevelProgressResponse, MasteryRequest, ProgressResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::routes::vocabulary::parse_level;
use crate::AppState;

/// GET /api/progress
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ProgressResponse>> {
    let progress = get_progress(&*state.repo()?, &auth.username)?;
    Ok(Json(ProgressResponse { progress }))
}

/// POST /api/progress/mastery
pub async fn update_mastery(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<MasteryRequest>,
) -> Result<Json<ProgressResponse>> {
    if state.vocabulary.find(&payload.character).is_none() {
        return Err(ApiError::NotFound(format!(
            "{} is not in the vocabulary",
            payload.character
        )));
    }

    let progress = update_word_mastery(
        &*state.repo()?,
        &auth.username,
        &payload.character,
        payload.outcome,
        Utc::now(),
    )?;
    Ok(Json(ProgressResponse { progress }))
}

/// GET /api/progress/levels/:level
pub async fn level_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(level): Path<u8>,
) -> Result<Json<LevelProgressResponse>> {
    let level = parse_level(level)?;
    let progress = get_progress(&*state.repo()?, &auth.username)?;

    Ok(Json(LevelProgressResponse {
        level,
        summary: MasterySummary::for_words(state.vocabulary.words(level), &progress),
    }))
}

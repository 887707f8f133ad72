//! Quiz endpoints
//!
//! Matching games run on the server so mastery is updated as pairs are
//! matched. Choice and building quizzes are generated here and graded by the
//! client, which reports outcomes through the progress and activity routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use hsk_core::activity::log_activity;
use hsk_core::quiz::{
    translation_choice_quiz, word_building_quiz, Advance, MatchingSession,
};
use hsk_core::{update_word_mastery, ActivityKind, NewActivity, PracticeMode};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AdvanceResponse, BuildingQuizResponse, ChoiceQuizResponse, LessonRequest,
    MatchingStartResponse, SelectRequest, SelectResponse,
};
use crate::routes::auth::AuthenticatedUser;
use crate::routes::vocabulary::{lesson_words, parse_level};
use crate::AppState;

/// POST /api/quiz/matching
pub async fn start_matching(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<LessonRequest>,
) -> Result<(StatusCode, Json<MatchingStartResponse>)> {
    let level = parse_level(payload.level)?;
    let (words, _) = lesson_words(&state, &auth, level, payload.lesson)?;

    let now = Utc::now();
    let session = MatchingSession::start(&words, &mut rand::rng())?;
    let game = session.view(now);
    let id = state
        .quizzes
        .start(&auth.username, level, payload.lesson, session, now)?;

    tracing::debug!(username = %auth.username, %id, %level, lesson = payload.lesson, "matching game started");
    Ok((StatusCode::CREATED, Json(MatchingStartResponse { id, game })))
}

/// POST /api/quiz/matching/:id/select
pub async fn select(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<SelectResponse>> {
    let now = Utc::now();
    let (selection, game) = state.quizzes.with_game(id, &auth.username, now, |game| {
        let selection = game.session.select(payload.side, payload.index, now)?;
        Ok::<_, hsk_core::QuizError>((selection, game.session.view(now)))
    })??;

    let updates = selection.mastery_updates();
    if !updates.is_empty() {
        let repo = state.repo()?;
        for (character, outcome) in updates {
            update_word_mastery(&*repo, &auth.username, character, outcome, now)?;
        }
    }

    Ok(Json(SelectResponse { selection, game }))
}

/// POST /api/quiz/matching/:id/advance
/// Deals the next round, or finishes the game and logs the result
pub async fn advance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvanceResponse>> {
    let now = Utc::now();
    let (outcome, game, level, lesson) = state.quizzes.with_game(id, &auth.username, now, |game| {
        let outcome = game.session.advance(&mut rand::rng())?;
        Ok::<_, hsk_core::QuizError>((outcome, game.session.view(now), game.level, game.lesson))
    })??;

    if let Advance::GameComplete { score, total } = &outcome {
        state.quizzes.finish(id)?;

        let mut activity = NewActivity::new(ActivityKind::QuizComplete);
        activity.mode = Some(PracticeMode::Matching);
        activity.level = Some(level);
        activity.lesson = Some(lesson);
        activity.score = Some(*score as u32);
        activity.total = Some(*total as u32);
        log_activity(&*state.repo()?, &auth.username, activity, now)?;

        tracing::info!(username = %auth.username, score = *score, total = *total, "matching game complete");
    }

    Ok(Json(AdvanceResponse { outcome, game }))
}

/// POST /api/quiz/choice
pub async fn choice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<LessonRequest>,
) -> Result<Json<ChoiceQuizResponse>> {
    let level = parse_level(payload.level)?;
    let (words, _) = lesson_words(&state, &auth, level, payload.lesson)?;
    let questions = translation_choice_quiz(&words, &mut rand::rng())?;
    Ok(Json(ChoiceQuizResponse { questions }))
}

/// POST /api/quiz/building
pub async fn building(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<LessonRequest>,
) -> Result<Json<BuildingQuizResponse>> {
    let level = parse_level(payload.level)?;
    let (words, _) = lesson_words(&state, &auth, level, payload.lesson)?;
    let questions = word_building_quiz(&words, &mut rand::rng())?;
    Ok(Json(BuildingQuizResponse { questions }))
}

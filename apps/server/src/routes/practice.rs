//! Practice exercises and feedback
//!
//! No repository guard is held while waiting on the generator.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use hsk_core::{LeveledWord, OrderingBank, PracticeMode};

use crate::error::{ApiError, Result};
use crate::models::{EssayRequest, ExerciseRequest, FeedbackRequest, OrderingAnswer, OrderingResult};
use crate::routes::auth::AuthenticatedUser;
use crate::services::practice::{
    essay_feedback, generate_exercise, is_generated, sentence_feedback, Exercise, SentenceFeedback,
};
use crate::AppState;

fn find_word(state: &AppState, character: &str) -> Result<LeveledWord> {
    state
        .vocabulary
        .find(character)
        .ok_or_else(|| ApiError::NotFound(format!("{} is not in the vocabulary", character)))
}

/// A random HSK 4 ordering exercise from the bundled bank.
fn ordering_exercise(state: &AppState, payload: &ExerciseRequest) -> Result<Exercise> {
    let level = match payload.level {
        Some(level) => level,
        None => find_word(state, &payload.character)?.level,
    };
    if !OrderingBank::serves(level) {
        return Err(ApiError::BadRequest(
            "Sentence ordering exercises are only available for HSK 4".to_string(),
        ));
    }

    state
        .ordering
        .random(level, &mut rand::rng())
        .cloned()
        .map(Exercise::Ordering)
        .ok_or_else(|| ApiError::NotFound("No sentence ordering exercises are loaded".to_string()))
}

/// POST /api/practice/exercise
pub async fn exercise(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<ExerciseRequest>,
) -> Result<Json<Exercise>> {
    if payload.mode == PracticeMode::Ordering {
        return ordering_exercise(&state, &payload).map(Json);
    }
    if !is_generated(payload.mode) {
        return Err(ApiError::BadRequest(format!(
            "{} exercises are not generated",
            payload.mode.as_str()
        )));
    }
    let generator = state.generator()?;
    let word = find_word(&state, &payload.character)?;
    let level = payload.level.unwrap_or(word.level);

    tracing::debug!(username = %auth.username, mode = payload.mode.as_str(), character = %word.word.character, "generating exercise");
    generate_exercise(generator, payload.mode, &word.word, level)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::BadRequest(format!("Unsupported mode: {}", payload.mode.as_str())))
}

/// POST /api/practice/ordering/:id
pub async fn check_ordering(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(answer): Json<OrderingAnswer>,
) -> Result<Json<OrderingResult>> {
    let exercise = state
        .ordering
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Ordering exercise {}", id)))?;

    Ok(Json(OrderingResult {
        is_correct: exercise.is_correct(&answer.order),
        correct_order: exercise.correct_order.clone(),
    }))
}

/// POST /api/practice/feedback
pub async fn feedback(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<SentenceFeedback>> {
    let sentence = payload.sentence.trim();
    if sentence.is_empty() {
        return Err(ApiError::BadRequest("Sentence is required".to_string()));
    }
    let generator = state.generator()?;
    let word = find_word(&state, &payload.character)?;
    let level = payload.level.unwrap_or(word.level);

    tracing::debug!(username = %auth.username, character = %word.word.character, "checking sentence");
    let feedback = sentence_feedback(generator, &word.word, sentence, level).await?;
    Ok(Json(feedback))
}

/// POST /api/practice/essay
/// Grades an essay written for a `writing` prompt
pub async fn essay(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<EssayRequest>,
) -> Result<Json<SentenceFeedback>> {
    let essay = payload.essay.trim();
    if essay.is_empty() {
        return Err(ApiError::BadRequest("Essay is required".to_string()));
    }
    let generator = state.generator()?;

    tracing::debug!(username = %auth.username, level = %payload.level, words = payload.words.len(), "grading essay");
    let feedback = essay_feedback(generator, essay, &payload.words, payload.level).await?;
    Ok(Json(feedback))
}

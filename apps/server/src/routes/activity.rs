//! Activity history endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use hsk_core::activity::{activity_history, log_activity};

use crate::error::Result;
use crate::models::{ActivityResponse, NewActivity};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/activity
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ActivityResponse>> {
    let entries = activity_history(&*state.repo()?, &auth.username)?;
    Ok(Json(ActivityResponse { entries }))
}

/// POST /api/activity
pub async fn log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(activity): Json<NewActivity>,
) -> Result<(StatusCode, Json<ActivityResponse>)> {
    let entries = log_activity(&*state.repo()?, &auth.username, activity, Utc::now())?;
    Ok((StatusCode::CREATED, Json(ActivityResponse { entries })))
}

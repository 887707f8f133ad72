//! Admin-only account management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use hsk_core::accounts;
use hsk_core::activity::all_activity;
use hsk_core::{UserProfile, UserStore};

use crate::error::{ApiError, Result};
use crate::models::{ActivityResponse, UserListResponse, UserUpdate};
use crate::routes::auth::AuthenticatedUser;
use crate::services::passwords;
use crate::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserListResponse>> {
    auth.require_admin()?;
    let users = accounts::list_users(&*state.repo()?, state.admin_username())?
        .iter()
        .map(|u| u.profile())
        .collect();
    Ok(Json(UserListResponse { users }))
}

/// PUT /api/admin/users/:username
/// Sessions of devices dropped from the list are revoked
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserProfile>> {
    auth.require_admin()?;
    if username == state.admin_username() || update.username.trim() == state.admin_username() {
        return Err(ApiError::Forbidden(
            "The admin account cannot be edited here".to_string(),
        ));
    }

    let password_hash = match update.new_password() {
        Some(password) => Some(passwords::hash(password).await?),
        None => None,
    };

    let repo = state.repo()?;
    let previous = repo
        .get_user(&username)?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", username)))?;
    let user = accounts::apply_user_update(&*repo, &username, &update, password_hash)?;

    for device in &previous.devices {
        if !user.devices.iter().any(|d| d.id == device.id) {
            repo.delete_device_sessions(&user.username, &device.id)?;
        }
    }

    tracing::info!(admin = %auth.username, username = %user.username, "user updated");
    Ok(Json(user.profile()))
}

/// DELETE /api/admin/users/:username
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    auth.require_admin()?;
    if username == state.admin_username() {
        return Err(ApiError::Forbidden(
            "The admin account cannot be deleted".to_string(),
        ));
    }

    accounts::delete_user(&*state.repo()?, &username)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/activity
pub async fn all_activity_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ActivityResponse>> {
    auth.require_admin()?;
    let entries = all_activity(&*state.repo()?, state.admin_username())?;
    Ok(Json(ActivityResponse { entries }))
}

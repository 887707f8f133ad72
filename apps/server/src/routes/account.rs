//! Account endpoints for the logged-in user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use hsk_core::{accounts, AccountError, UserStore};

use crate::error::{ApiError, Result};
use crate::models::{AccountResponse, ChangePasswordRequest};
use crate::routes::auth::{account_response, AuthenticatedUser};
use crate::services::passwords;
use crate::AppState;

/// GET /api/account
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<AccountResponse>> {
    let user = state
        .repo()?
        .get_user(&auth.username)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(account_response(&state, &user)))
}

/// PUT /api/account/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    accounts::check_new_password(&payload.new_password)?;
    let user = state
        .repo()?
        .get_user(&auth.username)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !passwords::verify(&payload.current_password, &user.password_hash).await? {
        return Err(AccountError::InvalidCredentials.into());
    }
    let password_hash = passwords::hash(&payload.new_password).await?;

    accounts::set_password_hash(&*state.repo()?, &auth.username, password_hash)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/account/devices/:device_id
/// Frees a device slot and revokes that device's sessions
pub async fn deregister_device(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(device_id): Path<String>,
) -> Result<Json<AccountResponse>> {
    let repo = state.repo()?;
    let user = accounts::deregister_device(&*repo, &auth.username, &device_id)?;
    repo.delete_device_sessions(&auth.username, &device_id)?;
    Ok(Json(account_response(&state, &user)))
}

//! Registration, login and the authentication middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::Utc;
use hsk_core::{accounts, AccountError, UserProfile, UserRecord, UserStore};

use crate::error::{ApiError, Result};
use crate::models::{AccountResponse, LoginRequest, LoginResponse, RegistrationForm};
use crate::services::passwords;
use crate::services::tokens::{hash_token, new_token};
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub username: String,
    pub device_id: String,
    pub is_admin: bool,
    pub token_hash: String,
}

impl AuthenticatedUser {
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

pub(crate) fn account_response(state: &AppState, user: &UserRecord) -> AccountResponse {
    let admin = state.admin_username();
    AccountResponse {
        user: user.profile(),
        is_admin: user.username == admin,
        vip_active: user.has_vip_access(admin, Utc::now().date_naive()),
    }
}

/// Auth middleware - resolves the bearer token into an [`AuthenticatedUser`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    // Extract Bearer token
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?;
    let token_hash = hash_token(token);

    let user = {
        let repo = state.repo()?;
        let session = repo
            .get_session(&token_hash)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))?;

        // The device may have been deregistered from another session.
        let known_device = repo
            .get_user(&session.username)?
            .is_some_and(|u| u.devices.iter().any(|d| d.id == session.device_id));
        if !known_device {
            repo.delete_session(&token_hash)?;
            return Err(ApiError::Unauthorized("Session no longer valid".to_string()));
        }

        AuthenticatedUser {
            is_admin: session.username == state.admin_username(),
            username: session.username,
            device_id: session.device_id,
            token_hash,
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// POST /api/auth/register
/// The form is checked before and after hashing; the lock is not held while hashing
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    accounts::check_registration(&*state.repo()?, &form, state.admin_username())?;
    let password_hash = passwords::hash(&form.password).await?;
    let user = accounts::create_account(
        &*state.repo()?,
        &form,
        state.admin_username(),
        password_hash,
        Utc::now(),
    )?;
    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// POST /api/auth/login
/// Checks credentials, enforces the device limit and returns a session token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let device_id = payload.device_id.trim();
    let account = accounts::login_account(
        &*state.repo()?,
        &payload.identifier,
        &payload.password,
        device_id,
    )?;

    if !passwords::verify(&payload.password, &account.password_hash).await? {
        return Err(AccountError::InvalidCredentials.into());
    }

    let now = Utc::now();
    let token = new_token();
    let user = {
        let repo = state.repo()?;
        let user = accounts::record_login(&*repo, &account.username, device_id, now)?;
        repo.create_session(&hash_token(&token), &user.username, device_id, now)?;
        user
    };

    Ok(Json(LoginResponse {
        token,
        account: account_response(&state, &user),
    }))
}

/// POST /api/auth/logout
/// Revokes the current token; the device stays registered
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<StatusCode> {
    state.repo()?.delete_session(&auth.token_hash)?;
    tracing::info!(username = %auth.username, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

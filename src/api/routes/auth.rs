//! Auth Routes
//!
//! - POST /api/v1/auth/login - Sign in, returns a bearer token
//! - POST /api/v1/auth/register - Create a student account and sign in
//! - POST /api/v1/auth/logout - End the current session
//! - GET /api/v1/auth/me - The signed-in user

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{AuthResponse, LoginRequest};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::User;
use crate::session::RegistrationForm;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let session = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/auth/register
///
/// Every form problem is reported at once under `error.fields`.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let session = state.sessions.register(&form).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<Arc<AppState>>, current: CurrentUser) -> StatusCode {
    state.sessions.logout(&current.token).await;
    tracing::info!(user_id = %current.id(), "Signed out");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

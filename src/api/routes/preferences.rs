//! Preference Routes
//!
//! - GET /api/v1/preferences/theme
//! - PUT /api/v1/preferences/theme

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ThemeDto;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;

/// GET /api/v1/preferences/theme
pub async fn get_theme(State(state): State<Arc<AppState>>, current: CurrentUser) -> Json<ThemeDto> {
    Json(ThemeDto {
        theme: state.sessions.theme(current.id()).await,
    })
}

/// PUT /api/v1/preferences/theme
pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ThemeDto>,
) -> Json<ThemeDto> {
    let theme = state.sessions.set_theme(current.id(), req.theme).await;
    Json(ThemeDto { theme })
}

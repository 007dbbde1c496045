//! Announcement Routes
//!
//! - GET /api/v1/announcements - Visible announcements, newest first
//!   (search, type tab, page, per_page)
//! - POST /api/v1/announcements - Post an announcement (faculty, admin)
//! - DELETE /api/v1/announcements/:id - Remove one (faculty, admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::analytics::{listing::newest_first, Page};
use crate::api::dto::ListParams;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{Announcement, NewAnnouncement, Role};

/// GET /api/v1/announcements
///
/// Students only see global announcements and those of courses they are
/// enrolled in.
pub async fn list_announcements(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<ListParams>,
) -> Json<Page<Announcement>> {
    let visible = state.store.announcements_for(&current.user).await;
    Json(state.list_query(params).apply_sorted(&visible, newest_first))
}

/// POST /api/v1/announcements
pub async fn create_announcement(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<NewAnnouncement>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    current.require(&[Role::Faculty, Role::Admin])?;
    let announcement = state.store.create_announcement(req, &current.user).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// DELETE /api/v1/announcements/:id
pub async fn delete_announcement(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    current.require(&[Role::Faculty, Role::Admin])?;
    state.store.delete_announcement(id).await?;
    tracing::info!(announcement_id = id, deleted_by = %current.id(), "Deleted announcement");
    Ok(StatusCode::NO_CONTENT)
}

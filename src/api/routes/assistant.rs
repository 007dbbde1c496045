//! Study Assistant Routes
//!
//! - POST /api/v1/assistant - Ask a question about your own progress

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::AskRequest;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::assistant::AssistantReply;
use crate::domain::Role;

/// POST /api/v1/assistant
pub async fn ask(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AssistantReply>> {
    current.require(&[Role::Student])?;
    let reply = state.assistant.ask(&current.user, &req.question).await?;
    Ok(Json(reply))
}

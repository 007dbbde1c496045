//! Request Extractors
//!
//! `CurrentUser` resolves the `Authorization: Bearer <token>` header to the
//! signed-in user. Handlers that take it reject anonymous requests with 401.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::{Role, User};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: User,
}

impl CurrentUser {
    /// Reject with 403 unless the caller holds one of `roles`
    pub fn require(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "{} accounts cannot perform this action",
                self.user.role
            )))
        }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let session = state
            .sessions
            .resolve(token)
            .await
            .ok_or_else(|| ApiError::Unauthorized("session expired or unknown".to_string()))?;

        Ok(CurrentUser {
            token: session.token,
            user: session.user,
        })
    }
}

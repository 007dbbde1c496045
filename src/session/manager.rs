//! Session Manager
//!
//! Issues opaque bearer tokens on sign-in, resolves them back to users,
//! validates sign-up forms and keeps per-user theme preferences.
//!
//! The most recent session and the preference map are mirrored to
//! [`LocalStorage`] so they survive a restart. Mirroring is best effort: a
//! write failure is logged and the in-memory state stays authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::{is_plausible_email, PortalError, PortalStore, Role, User};
use crate::session::local_storage::{LocalStorage, StorageError};

const SESSION_KEY: &str = "session";
const PREFERENCES_KEY: &str = "preferences";

/// Minimum accepted password length at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Colour theme preference
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

/// Sign-up form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// A single inline form message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error("Form validation failed: {}", summarize_fields(.0))]
    InvalidForm(Vec<FieldError>),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),
}

fn summarize_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type SessionResult<T> = Result<T, SessionError>;

impl RegistrationForm {
    /// Collect every field problem rather than stopping at the first
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_plausible_email(email) {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }

        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Token table plus preference map, mirrored to local storage
pub struct SessionManager {
    store: Arc<PortalStore>,
    local: LocalStorage,
    sessions: RwLock<HashMap<String, Session>>,
    themes: RwLock<HashMap<String, Theme>>,
}

impl SessionManager {
    pub fn new(store: Arc<PortalStore>, local: LocalStorage) -> Self {
        Self {
            store,
            local,
            sessions: RwLock::new(HashMap::new()),
            themes: RwLock::new(HashMap::new()),
        }
    }

    /// Reload the persisted session and preferences.
    ///
    /// A persisted session whose user no longer exists is discarded.
    pub async fn restore(&self) -> SessionResult<Option<Session>> {
        if let Some(themes) = self.local.get::<HashMap<String, Theme>>(PREFERENCES_KEY)? {
            tracing::debug!(count = themes.len(), "Restored theme preferences");
            *self.themes.write().await = themes;
        }

        let Some(saved) = self.local.get::<Session>(SESSION_KEY)? else {
            return Ok(None);
        };

        match self.store.user(&saved.user.id).await {
            Some(user) => {
                let session = Session { user, ..saved };
                self.sessions
                    .write()
                    .await
                    .insert(session.token.clone(), session.clone());
                tracing::info!(user_id = %session.user.id, "Restored persisted session");
                Ok(Some(session))
            }
            None => {
                tracing::warn!(user_id = %saved.user.id, "Discarding session for unknown user");
                self.local.remove(SESSION_KEY)?;
                Ok(None)
            }
        }
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> SessionResult<Session> {
        let user = self.store.authenticate(email, password).await?;
        Ok(self.open_session(user).await)
    }

    /// Validate the sign-up form, create a student account and sign it in
    pub async fn register(&self, form: &RegistrationForm) -> SessionResult<Session> {
        form.validate().map_err(SessionError::InvalidForm)?;

        let user = self
            .store
            .create_user(&form.name, &form.email, Role::Student, &form.password)
            .await?;
        Ok(self.open_session(user).await)
    }

    async fn open_session(&self, user: User) -> Session {
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user,
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());

        if let Err(e) = self.local.set(SESSION_KEY, &session) {
            tracing::warn!(error = %e, "Failed to persist session");
        }

        tracing::info!(user_id = %session.user.id, role = %session.user.role, "Session opened");
        session
    }

    /// Look up a token
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// End a session. Returns whether the token was known.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);

        if removed.is_some() {
            let persisted_matches = self
                .local
                .get::<Session>(SESSION_KEY)
                .ok()
                .flatten()
                .map(|s| s.token == token)
                .unwrap_or(false);
            if persisted_matches {
                if let Err(e) = self.local.remove(SESSION_KEY) {
                    tracing::warn!(error = %e, "Failed to clear persisted session");
                }
            }
        }
        removed.is_some()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn theme(&self, user_id: &str) -> Theme {
        self.themes
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn set_theme(&self, user_id: &str, theme: Theme) -> Theme {
        let mut themes = self.themes.write().await;
        themes.insert(user_id.to_string(), theme);
        if let Err(e) = self.local.set(PREFERENCES_KEY, &*themes) {
            tracing::warn!(error = %e, user_id, "Failed to persist theme preferences");
        }
        theme
    }
}

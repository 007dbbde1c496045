//! Portal domain error types

use thiserror::Error;

/// Errors raised by store operations and domain validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortalError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record with the given identifier
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A record with the same unique key exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("Already enrolled in {0}")]
    AlreadyEnrolled(String),

    #[error("Not enrolled in {0}")]
    NotEnrolled(String),

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,
}

impl PortalError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PortalError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn already_exists(entity: &'static str, id: impl Into<String>) -> Self {
        PortalError::AlreadyExists {
            entity,
            id: id.into(),
        }
    }
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

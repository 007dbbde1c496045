//! Student Profiles
//!
//! Student profiles are the one entity read from a real backend: a hosted
//! Postgres-REST table. When no backend is configured, an in-memory table
//! seeded with mock profiles stands in.
//!
//! ## Architecture
//!
//! - **ProfileSource**: the seam handlers talk to
//! - **HostedProfileClient**: REST client for the hosted table
//! - **LocalProfiles**: in-memory fallback

mod client;
mod local;

pub use client::{HostedProfileClient, HostedProfilesConfig};
pub use local::LocalProfiles;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StudentProfile;

/// Where student profiles come from
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Short backend name for health and logs
    fn backend(&self) -> &'static str;

    /// All profiles, ordered by name
    async fn list(&self) -> Result<Vec<StudentProfile>, ProfileError>;

    /// Delete one profile by id
    async fn delete(&self, id: &str) -> Result<(), ProfileError>;
}

/// Errors talking to the profile backend
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile backend unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Student profile not found: {0}")]
    NotFound(String),
}

impl ProfileError {
    /// Whether retrying the same call might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProfileError::Unavailable | ProfileError::Timeout | ProfileError::Request(_) => true,
            ProfileError::Backend { status, .. } => *status >= 500 || *status == 429,
            ProfileError::NotFound(_) => false,
        }
    }
}

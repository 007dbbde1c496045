//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::analytics::{AttendancePolicy, ListQuery};
use crate::api::dto::ListParams;
use crate::assistant::StudyAssistant;
use crate::config::Config;
use crate::domain::PortalStore;
use crate::profiles::ProfileSource;
use crate::session::SessionManager;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// In-memory portal records
    pub store: Arc<PortalStore>,
    /// Bearer tokens and preferences
    pub sessions: Arc<SessionManager>,
    /// Student profile table (hosted or local)
    pub profiles: Arc<dyn ProfileSource>,
    pub assistant: Arc<StudyAssistant>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<PortalStore>,
        sessions: Arc<SessionManager>,
        profiles: Arc<dyn ProfileSource>,
        config: ApiConfig,
    ) -> Self {
        let assistant = Arc::new(StudyAssistant::new(Arc::clone(&store), config.policy));
        Self {
            store,
            sessions,
            profiles,
            assistant,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Turn raw list parameters into a query, applying the configured
    /// default and cap on page size
    pub fn list_query(&self, params: ListParams) -> ListQuery {
        let per_page = match params.per_page {
            None | Some(0) => self.config.default_per_page,
            Some(n) => n.min(self.config.max_per_page),
        };
        let mut query = ListQuery::new()
            .page(params.page.unwrap_or(1))
            .per_page(per_page);
        if let Some(search) = params.search {
            query = query.search(search);
        }
        if let Some(category) = params.category {
            query = query.category(category);
        }
        query
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Attendance breakpoints
    pub policy: AttendancePolicy,
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            cors_origins: config.server.cors_origins.clone(),
            request_timeout_secs: config.server.request_timeout_secs,
            policy: config.attendance.policy(),
            default_per_page: config.listing.default_per_page,
            max_per_page: config.listing.max_per_page,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

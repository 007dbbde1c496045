//! Campus API Server
//!
//! Run with: cargo run --bin campus
//!
//! # Configuration
//!
//! Read from `CAMPUS_CONFIG` when set, otherwise from the default config
//! locations (see [`campus::config`]). `CAMPUS_*` environment variables
//! override file values and `RUST_LOG` overrides the configured log level.

use campus::api::{serve, ApiConfig, AppState};
use campus::config::{Config, LoggingConfig};
use campus::domain::PortalStore;
use campus::profiles::{HostedProfileClient, LocalProfiles, ProfileSource};
use campus::session::{LocalStorage, SessionManager};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("CAMPUS_CONFIG") {
        Ok(path) => Config::load_with_env(&PathBuf::from(path))?,
        Err(_) => Config::load_default(),
    };

    init_logging(&config.logging);

    tracing::info!("Starting Campus API server v{}", env!("CARGO_PKG_VERSION"));

    // Local storage for the saved session and preferences
    let data_dir = config.storage.data_path();
    let local = match LocalStorage::open(&data_dir) {
        Ok(local) => {
            tracing::info!("Data directory: {:?}", data_dir);
            local
        }
        Err(e) => {
            tracing::warn!("Local storage unavailable at {:?}: {} (sessions will not persist)", data_dir, e);
            LocalStorage::disabled()
        }
    };

    let store = Arc::new(PortalStore::seeded());
    let sessions = Arc::new(SessionManager::new(Arc::clone(&store), local));

    match sessions.restore().await {
        Ok(Some(session)) => tracing::info!(user_id = %session.user.id, "Resumed saved session"),
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to restore saved session: {}", e),
    }

    let profiles = profile_source(&config)?;
    tracing::info!("Student profiles backend: {}", profiles.backend());

    let api_config = ApiConfig::from(&config);
    let state = AppState::new(store, sessions, profiles, api_config.clone());

    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("Campus API server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level; format is "pretty" or "json"
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("campus={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Hosted profile table when enabled, otherwise the in-memory mock table
fn profile_source(config: &Config) -> Result<Arc<dyn ProfileSource>, Box<dyn std::error::Error>> {
    if !config.profiles.enabled {
        tracing::info!("Hosted profiles disabled (set CAMPUS_PROFILES_URL to enable)");
        return Ok(Arc::new(LocalProfiles::seeded()));
    }

    if config.profiles.api_key.is_empty() {
        tracing::warn!("Hosted profiles enabled without an API key; requests will likely be rejected");
    }
    let client = HostedProfileClient::new(config.profiles.hosted())?;
    tracing::info!("Hosted profiles at {}", client.config().base_url);
    Ok(Arc::new(client))
}

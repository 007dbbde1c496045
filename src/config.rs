//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `CAMPUS_*` environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analytics::AttendancePolicy;
use crate::profiles::HostedProfilesConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub attendance: AttendanceConfig,

    #[serde(default)]
    pub listing: ListingConfig,

    #[serde(default)]
    pub profiles: ProfilesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Local storage for the session record and preferences
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("campus").to_string_lossy().to_string())
        .unwrap_or_else(|| "./campus_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// `data_dir` with a leading `~/` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }
}

/// Attendance breakpoints, in percent
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    #[serde(default = "default_excellent")]
    pub excellent: u32,
}

fn default_threshold() -> u32 {
    75
}

fn default_excellent() -> u32 {
    90
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            excellent: default_excellent(),
        }
    }
}

impl AttendanceConfig {
    pub fn policy(&self) -> AttendancePolicy {
        AttendancePolicy::new(self.threshold, self.excellent)
    }
}

/// Paginated list defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: usize,

    #[serde(default = "default_max_per_page")]
    pub max_per_page: usize,
}

fn default_per_page() -> usize {
    10
}

fn default_max_per_page() -> usize {
    100
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

/// Hosted student profile table
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_profiles_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_profiles_table")]
    pub table: String,

    #[serde(default = "default_profiles_timeout")]
    pub request_timeout_ms: u64,
}

fn default_profiles_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_profiles_table() -> String {
    "student_profiles".to_string()
}

fn default_profiles_timeout() -> u64 {
    5000
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_profiles_url(),
            api_key: String::new(),
            table: default_profiles_table(),
            request_timeout_ms: default_profiles_timeout(),
        }
    }
}

impl ProfilesConfig {
    pub fn hosted(&self) -> HostedProfilesConfig {
        HostedProfilesConfig {
            base_url: self.url.clone(),
            api_key: self.api_key.clone(),
            table: self.table.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let a = &self.attendance;
        if a.threshold > 100 || a.excellent > 100 || a.threshold > a.excellent {
            return Err(format!(
                "attendance breakpoints must satisfy threshold <= excellent <= 100 (got {} / {})",
                a.threshold, a.excellent
            ));
        }
        if self.listing.default_per_page == 0 || self.listing.max_per_page == 0 {
            return Err("listing page sizes must be positive".to_string());
        }
        Ok(())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("campus").join("config.toml")),
            Some(PathBuf::from("/etc/campus/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("CAMPUS_API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("CAMPUS_API_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Some(data_dir) = var("CAMPUS_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Setting a URL turns the hosted backend on
        if let Some(url) = var("CAMPUS_PROFILES_URL") {
            self.profiles.url = url;
            self.profiles.enabled = true;
        }
        if let Some(key) = var("CAMPUS_PROFILES_KEY") {
            self.profiles.api_key = key;
        }

        if let Some(level) = var("CAMPUS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CAMPUS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Campus Portal Configuration
#
# Environment variables override these settings:
# - CAMPUS_API_HOST
# - CAMPUS_API_PORT
# - CAMPUS_DATA_DIR
# - CAMPUS_PROFILES_URL (also enables the hosted profile table)
# - CAMPUS_PROFILES_KEY
# - CAMPUS_LOG_LEVEL
# - CAMPUS_LOG_FORMAT

[server]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]

# Request timeout in seconds
request_timeout_secs = 30

[storage]
# Directory holding the saved session and user preferences
data_dir = "~/.local/share/campus"

[attendance]
# Courses below this percentage are flagged at risk
threshold = 75

# At or above this percentage attendance is excellent
excellent = 90

[listing]
# Page size when a request does not set per_page
default_per_page = 10

# Largest page size a request may ask for
max_per_page = 100

[profiles]
# Read student profiles from the hosted table instead of mock data
enabled = false

# Hosted project URL and API key
url = "http://localhost:54321"
api_key = ""

# Table holding the profiles
table = "student_profiles"

# Per-request timeout (ms)
request_timeout_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.attendance.policy(), AttendancePolicy::default());
        assert_eq!(config.listing.default_per_page, 10);
        assert!(!config.profiles.enabled);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.attendance.threshold, 75);
        assert_eq!(config.attendance.excellent, 90);
        assert_eq!(config.profiles.table, "student_profiles");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[attendance]\nthreshold = 80\n").unwrap();
        assert_eq!(config.attendance.threshold, 80);
        assert_eq!(config.attendance.excellent, 90);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_rejects_inverted_breakpoints() {
        let err = Config::parse("[attendance]\nthreshold = 95\nexcellent = 90\n").unwrap_err();
        assert!(err.contains("threshold"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_data_path_expands_home() {
        let storage = StorageConfig {
            data_dir: "/var/lib/campus".to_string(),
        };
        assert_eq!(storage.data_path(), PathBuf::from("/var/lib/campus"));

        if let Some(home) = dirs::home_dir() {
            let storage = StorageConfig {
                data_dir: "~/.local/share/campus".to_string(),
            };
            assert_eq!(storage.data_path(), home.join(".local/share/campus"));
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CAMPUS_API_PORT", "9000"),
            ("CAMPUS_PROFILES_URL", "https://project.example.co"),
            ("CAMPUS_PROFILES_KEY", "secret"),
            ("CAMPUS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9000);
        assert!(config.profiles.enabled);
        assert_eq!(config.profiles.hosted().base_url, "https://project.example.co");
        assert_eq!(config.profiles.hosted().api_key, "secret");
        assert_eq!(config.logging.format, "json");
    }
}

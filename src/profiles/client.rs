//! Hosted profile table client
//!
//! Talks to a hosted Postgres-REST endpoint:
//!
//! - `GET    {url}/rest/v1/{table}?select=*&order=name.asc`
//! - `DELETE {url}/rest/v1/{table}?id=eq.{id}` with `Prefer: return=representation`
//!
//! Every request carries the project key as both `apikey` and bearer
//! token. Calls are single attempts bounded by the configured timeout;
//! retrying is left to the caller.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::{ProfileError, ProfileSource};
use crate::domain::StudentProfile;

/// Configuration for the hosted profile table
#[derive(Debug, Clone)]
pub struct HostedProfilesConfig {
    /// Project URL, e.g. "https://xyz.example.co"
    pub base_url: String,
    /// Project API key
    pub api_key: String,
    /// Table name
    pub table: String,
    pub request_timeout_ms: u64,
}

impl Default for HostedProfilesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            table: "student_profiles".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

/// REST client for the hosted `student_profiles` table
pub struct HostedProfileClient {
    client: Client,
    config: HostedProfilesConfig,
}

impl HostedProfileClient {
    pub fn new(config: HostedProfilesConfig) -> Result<Self, ProfileError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HostedProfilesConfig {
        &self.config
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn list_url(&self) -> String {
        format!("{}?select=*&order=name.asc", self.table_url())
    }

    fn delete_url(&self, id: &str) -> String {
        format!("{}?id=eq.{}", self.table_url(), urlencoding::encode(id))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProfileError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProfileError::Timeout
            } else if e.is_connect() {
                ProfileError::Unavailable
            } else {
                ProfileError::Request(e)
            }
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(ProfileError::Backend {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl ProfileSource for HostedProfileClient {
    fn backend(&self) -> &'static str {
        "hosted"
    }

    async fn list(&self) -> Result<Vec<StudentProfile>, ProfileError> {
        let request = self.authorize(self.client.get(self.list_url()));
        let rows: Vec<StudentProfile> = self.send(request).await?.json().await?;

        tracing::debug!(rows = rows.len(), table = %self.config.table, "Fetched student profiles");
        Ok(rows)
    }

    async fn delete(&self, id: &str) -> Result<(), ProfileError> {
        let request = self
            .authorize(self.client.delete(self.delete_url(id)))
            .header("Prefer", "return=representation");
        let deleted: Vec<StudentProfile> = self.send(request).await?.json().await?;

        if deleted.is_empty() {
            return Err(ProfileError::NotFound(id.to_string()));
        }

        tracing::info!(profile_id = %id, table = %self.config.table, "Deleted student profile");
        Ok(())
    }
}

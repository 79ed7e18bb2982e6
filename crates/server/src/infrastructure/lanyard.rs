//! Lanyard presence client (Discord presence aggregation API)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::infrastructure::ports::{PresenceData, PresenceError, PresencePort};

/// Default Lanyard base URL.
pub const DEFAULT_LANYARD_BASE_URL: &str = "https://api.lanyard.rest";

/// Client for the Lanyard REST API.
#[derive(Clone)]
pub struct LanyardClient {
    client: Client,
    base_url: String,
}

impl LanyardClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create client from the `LANYARD_BASE_URL` environment variable,
    /// falling back to the public instance.
    pub fn from_env() -> Self {
        let base_url = std::env::var("LANYARD_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LANYARD_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

impl Default for LanyardClient {
    fn default() -> Self {
        Self::new(DEFAULT_LANYARD_BASE_URL)
    }
}

#[async_trait]
impl PresencePort for LanyardClient {
    async fn fetch_presence(&self, user_id: &str) -> Result<PresenceData, PresenceError> {
        let response = self
            .client
            .get(format!("{}/v1/users/{}", self.base_url, user_id))
            .send()
            .await
            .map_err(|e| PresenceError::RequestFailed(e.to_string()))?;

        // Lanyard answers 404 for unknown users and users not in its tracking
        // guild. Any non-success status is treated the same way.
        if !response.status().is_success() {
            return Err(PresenceError::NotFound);
        }

        let envelope: LanyardEnvelope = response
            .json()
            .await
            .map_err(|e| PresenceError::InvalidResponse(e.to_string()))?;

        if !envelope.success {
            return Err(PresenceError::ServiceFailure);
        }

        envelope
            .data
            .ok_or_else(|| PresenceError::InvalidResponse("Missing data field".to_string()))
    }
}

// =============================================================================
// Lanyard API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct LanyardEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<PresenceData>,
}

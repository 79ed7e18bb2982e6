//! Twitch Helix client (client-credentials token exchange + stream query)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::infrastructure::ports::{StreamError, StreamStatusPort, TwitchStream};

/// Default Twitch OAuth token endpoint.
pub const DEFAULT_TWITCH_AUTH_URL: &str = "https://id.twitch.tv";

/// Default Twitch Helix API base URL.
pub const DEFAULT_TWITCH_API_URL: &str = "https://api.twitch.tv";

/// Application credentials for the client-credentials exchange.
///
/// Held explicitly rather than read from ambient process state, so handlers
/// stay testable with injected fixtures.
#[derive(Debug, Clone)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl TwitchConfig {
    /// Read credentials from `TWITCH_CLIENT_ID` / `TWITCH_CLIENT_SECRET`.
    ///
    /// Returns `None` unless both are present and non-empty; the server then
    /// runs the stream endpoint in degraded mode instead of failing.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("TWITCH_CLIENT_ID").ok()?;
        let client_secret = std::env::var("TWITCH_CLIENT_SECRET").ok()?;
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return None;
        }
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

/// Client for Twitch's Helix streams API.
///
/// Each query performs a fresh client-credentials exchange before hitting the
/// streams endpoint. Token reuse across calls would be a valid optimization
/// but is not required.
#[derive(Clone)]
pub struct TwitchClient {
    client: Client,
    auth_url: String,
    api_url: String,
    config: TwitchConfig,
}

impl TwitchClient {
    pub fn new(auth_url: &str, api_url: &str, config: TwitchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Create client from environment variables.
    ///
    /// Endpoint overrides (`TWITCH_AUTH_URL`, `TWITCH_API_URL`) exist for
    /// testing against local stand-ins. Returns `None` when credentials are
    /// not configured.
    pub fn from_env() -> Option<Self> {
        let config = TwitchConfig::from_env()?;
        let auth_url = std::env::var("TWITCH_AUTH_URL")
            .unwrap_or_else(|_| DEFAULT_TWITCH_AUTH_URL.to_string());
        let api_url =
            std::env::var("TWITCH_API_URL").unwrap_or_else(|_| DEFAULT_TWITCH_API_URL.to_string());
        Some(Self::new(&auth_url, &api_url, config))
    }

    async fn exchange_token(&self) -> Result<String, StreamError> {
        let response = self
            .client
            .post(format!("{}/oauth2/token", self.auth_url))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| StreamError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StreamError::TokenExchange(format!(
                "token endpoint returned status {}",
                response.status()
            )));
        }

        let token: TwitchTokenResponse = response
            .json()
            .await
            .map_err(|e| StreamError::TokenExchange(e.to_string()))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl StreamStatusPort for TwitchClient {
    async fn fetch_streams(&self, username: &str) -> Result<Vec<TwitchStream>, StreamError> {
        let token = self.exchange_token().await?;

        let response = self
            .client
            .get(format!("{}/helix/streams", self.api_url))
            .query(&[("user_login", username)])
            .header("Client-Id", &self.config.client_id)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StreamError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StreamError::RequestFailed(format!(
                "streams endpoint returned status {}",
                response.status()
            )));
        }

        let streams: TwitchStreamsResponse = response
            .json()
            .await
            .map_err(|e| StreamError::InvalidResponse(e.to_string()))?;

        Ok(streams.data)
    }
}

// =============================================================================
// Twitch API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TwitchTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TwitchStreamsResponse {
    #[serde(default)]
    data: Vec<TwitchStream>,
}

//! FiveM server directory client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::infrastructure::ports::{FivemServerRecord, ServerQueryError, ServerQueryPort};

/// Default FiveM server directory base URL.
pub const DEFAULT_FIVEM_BASE_URL: &str = "https://servers-frontend.fivem.net";

/// Client for the FiveM server-listing API.
#[derive(Clone)]
pub struct FivemClient {
    client: Client,
    base_url: String,
}

impl FivemClient {
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

    /// Create client from the `FIVEM_BASE_URL` environment variable,
    /// falling back to the public directory.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("FIVEM_BASE_URL").unwrap_or_else(|_| DEFAULT_FIVEM_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

impl Default for FivemClient {
    fn default() -> Self {
        Self::new(DEFAULT_FIVEM_BASE_URL)
    }
}

#[async_trait]
impl ServerQueryPort for FivemClient {
    async fn fetch_server(&self, join_code: &str) -> Result<FivemServerRecord, ServerQueryError> {
        let response = self
            .client
            .get(format!(
                "{}/api/servers/single/{}",
                self.base_url, join_code
            ))
            .send()
            .await
            .map_err(|e| ServerQueryError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServerQueryError::BadStatus(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ServerQueryError::InvalidResponse(e.to_string()))
    }
}

//! Port traits for upstream status services.
//!
//! These are the ONLY abstractions in the server. One port per upstream
//! dependency, so HTTP handlers can be exercised with injected fakes:
//! - Presence lookup (Lanyard)
//! - Game-server directory (FiveM)
//! - Live-stream query (Twitch Helix)
//!
//! The types returned here mirror the upstream JSON shapes. Reshaping into
//! client-facing payloads happens in `use_cases`, so the transform can be
//! tested against fixture data without any network.

use async_trait::async_trait;
use serde::Deserialize;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// Upstream answered with a non-success HTTP status for this user.
    #[error("User not found")]
    NotFound,
    /// Upstream answered 2xx but its envelope reported failure.
    #[error("Presence service reported failure")]
    ServiceFailure,
    #[error("Presence request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid presence response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ServerQueryError {
    #[error("Server query failed: {0}")]
    RequestFailed(String),
    #[error("Server directory returned status {0}")]
    BadStatus(u16),
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Stream request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid stream response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Presence Types (Lanyard)
// =============================================================================

/// A user's aggregated Discord presence as reported by Lanyard.
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceData {
    pub discord_user: DiscordUser,
    #[serde(default)]
    pub discord_status: String,
    #[serde(default)]
    pub activities: Vec<DiscordActivity>,
    #[serde(default)]
    pub listening_to_spotify: bool,
    #[serde(default)]
    pub spotify: Option<SpotifyData>,
    #[serde(default)]
    pub active_on_discord_desktop: bool,
    #[serde(default)]
    pub active_on_discord_mobile: bool,
    #[serde(default)]
    pub active_on_discord_web: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    /// Legacy discriminator ("0" for migrated accounts).
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Activity type code Discord uses for user-set custom statuses.
pub const CUSTOM_STATUS_TYPE: i64 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordActivity {
    #[serde(rename = "type")]
    pub activity_type: i64,
    pub name: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub assets: Option<ActivityAssets>,
    #[serde(default)]
    pub emoji: Option<ActivityEmoji>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityAssets {
    #[serde(default)]
    pub large_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEmoji {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyData {
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub album_art_url: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
}

// =============================================================================
// Game-Server Types (FiveM)
// =============================================================================

/// One server record from the FiveM directory.
///
/// The directory sometimes nests the interesting fields under a `Data`
/// wrapper and sometimes serves them at the top level. Both variants are
/// kept here; `use_cases::server_status` picks the right branch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FivemServerRecord {
    #[serde(rename = "Data", default)]
    pub data: Option<FivemServerFields>,
    #[serde(flatten)]
    pub top_level: FivemServerFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FivemServerFields {
    #[serde(default)]
    pub clients: Option<u32>,
    #[serde(default)]
    pub sv_maxclients: Option<u32>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub gametype: Option<String>,
    #[serde(default)]
    pub mapname: Option<String>,
}

// =============================================================================
// Stream Types (Twitch Helix)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TwitchStream {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub viewer_count: u64,
}

// =============================================================================
// Ports
// =============================================================================

#[async_trait]
pub trait PresencePort: Send + Sync {
    /// Fetch a user's presence by Discord user id.
    async fn fetch_presence(&self, user_id: &str) -> Result<PresenceData, PresenceError>;
}

#[async_trait]
pub trait ServerQueryPort: Send + Sync {
    /// Look up a game server by its join code.
    async fn fetch_server(&self, join_code: &str) -> Result<FivemServerRecord, ServerQueryError>;
}

#[async_trait]
pub trait StreamStatusPort: Send + Sync {
    /// Query live streams for a channel login. Empty means offline.
    async fn fetch_streams(&self, username: &str) -> Result<Vec<TwitchStream>, StreamError>;
}

//! Presence reshaping: Lanyard upstream record -> client payload.
//!
//! All selection rules live here as pure functions so they can be tested
//! against fixture data without any network.

use serde::Serialize;

use crate::infrastructure::ports::{DiscordActivity, PresenceData, CUSTOM_STATUS_TYPE};

const DISCORD_CDN: &str = "https://cdn.discordapp.com";
const DISCORD_MEDIA_PROXY: &str = "https://media.discordapp.net";

/// Marker prefix Discord uses for animated avatar hashes.
const ANIMATED_AVATAR_PREFIX: &str = "a_";

/// Marker prefix for externally-hosted activity assets (media-proxy refs).
const EXTERNAL_ASSET_PREFIX: &str = "mp:";

// =============================================================================
// Response payload
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub success: bool,
    pub user: UserInfo,
    pub status: String,
    pub platforms: Platforms,
    pub custom_status: Option<CustomStatus>,
    pub activity: Option<ActivityInfo>,
    pub spotify: Option<SpotifyStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Platforms {
    pub desktop: bool,
    pub mobile: bool,
    pub web: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomStatus {
    pub text: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInfo {
    pub name: String,
    pub details: Option<String>,
    pub state: Option<String>,
    pub large_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyStatus {
    pub song: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_art: Option<String>,
    pub track_id: Option<String>,
}

// =============================================================================
// Normalization
// =============================================================================

/// Reshape a Lanyard presence record into the client payload.
pub fn normalize_presence(data: &PresenceData) -> PresenceResponse {
    let user = &data.discord_user;

    let display_name = user
        .display_name
        .clone()
        .or_else(|| user.global_name.clone())
        .unwrap_or_else(|| user.username.clone());

    let main_activity = data
        .activities
        .iter()
        .find(|a| a.activity_type != CUSTOM_STATUS_TYPE && a.name != "Spotify");

    let custom = data
        .activities
        .iter()
        .find(|a| a.activity_type == CUSTOM_STATUS_TYPE);

    let spotify = if data.listening_to_spotify {
        data.spotify.as_ref().map(|s| SpotifyStatus {
            song: s.song.clone(),
            artist: s.artist.clone(),
            album: s.album.clone(),
            album_art: s.album_art_url.clone(),
            track_id: s.track_id.clone(),
        })
    } else {
        None
    };

    PresenceResponse {
        success: true,
        user: UserInfo {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name,
            avatar: avatar_url(&user.id, user.avatar.as_deref(), &user.discriminator),
        },
        status: data.discord_status.clone(),
        platforms: Platforms {
            desktop: data.active_on_discord_desktop,
            mobile: data.active_on_discord_mobile,
            web: data.active_on_discord_web,
        },
        custom_status: custom.map(|a| CustomStatus {
            text: a.state.clone(),
            emoji: a.emoji.as_ref().map(|e| e.name.clone()),
        }),
        activity: main_activity.map(|a| ActivityInfo {
            name: a.name.clone(),
            details: a.details.clone(),
            state: a.state.clone(),
            large_image: activity_image_url(a),
        }),
        spotify,
    }
}

/// Build a CDN avatar URL, choosing the animated extension for `a_` hashes.
///
/// Users without an avatar hash get a default-embed avatar keyed by
/// `discriminator % 5` (an unparseable discriminator counts as 0).
fn avatar_url(user_id: &str, avatar_hash: Option<&str>, discriminator: &str) -> String {
    match avatar_hash {
        Some(hash) => {
            let ext = if hash.starts_with(ANIMATED_AVATAR_PREFIX) {
                "gif"
            } else {
                "png"
            };
            format!("{DISCORD_CDN}/avatars/{user_id}/{hash}.{ext}")
        }
        None => {
            let index = discriminator.parse::<u64>().unwrap_or(0) % 5;
            format!("{DISCORD_CDN}/embed/avatars/{index}.png")
        }
    }
}

/// Resolve an activity's large image to a fetchable URL.
///
/// External assets (`mp:` refs) go through the Discord media proxy; app
/// assets are built from the application id. Activities without either
/// resolve to no image.
fn activity_image_url(activity: &DiscordActivity) -> Option<String> {
    let large_image = activity.assets.as_ref()?.large_image.as_deref()?;

    if let Some(external) = large_image.strip_prefix(EXTERNAL_ASSET_PREFIX) {
        return Some(format!("{DISCORD_MEDIA_PROXY}/{external}"));
    }

    activity
        .application_id
        .as_ref()
        .map(|app_id| format!("{DISCORD_CDN}/app-assets/{app_id}/{large_image}.png"))
}

// =============================================================================
// Tests
// =============================================================================

//! Stream reshaping: Twitch Helix stream list -> client payload.

use serde::Serialize;

use crate::infrastructure::ports::TwitchStream;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatusResponse {
    pub is_live: bool,
    pub title: Option<String>,
    pub game: Option<String>,
    pub viewer_count: Option<u64>,
    /// Only set on the degraded "credentials not configured" path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StreamStatusResponse {
    /// Degraded body returned when no Twitch credentials are configured.
    /// Deliberately not an error: the front-end treats it as offline.
    pub fn not_configured() -> Self {
        Self {
            is_live: false,
            title: None,
            game: None,
            viewer_count: None,
            message: Some("Twitch credentials not configured".to_string()),
        }
    }
}

/// Reshape the Helix stream list. A non-empty list means live, and the first
/// entry's fields are surfaced; everything is null when offline.
pub fn normalize_streams(streams: &[TwitchStream]) -> StreamStatusResponse {
    match streams.first() {
        Some(stream) => StreamStatusResponse {
            is_live: true,
            title: Some(stream.title.clone()),
            game: Some(stream.game_name.clone()),
            viewer_count: Some(stream.viewer_count),
            message: None,
        },
        None => StreamStatusResponse {
            is_live: false,
            title: None,
            game: None,
            viewer_count: None,
            message: None,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_offline_with_null_fields() {
        let status = normalize_streams(&[]);
        assert!(!status.is_live);
        assert!(status.title.is_none());
        assert!(status.game.is_none());
        assert!(status.viewer_count.is_none());
    }

    #[test]
    fn test_first_entry_surfaced_when_live() {
        let streams = vec![
            TwitchStream {
                title: "Speedrun practice".to_string(),
                game_name: "Celeste".to_string(),
                viewer_count: 42,
            },
            TwitchStream {
                title: "second".to_string(),
                game_name: "other".to_string(),
                viewer_count: 1,
            },
        ];

        let status = normalize_streams(&streams);
        assert!(status.is_live);
        assert_eq!(status.title.as_deref(), Some("Speedrun practice"));
        assert_eq!(status.game.as_deref(), Some("Celeste"));
        assert_eq!(status.viewer_count, Some(42));
    }

    #[test]
    fn test_offline_serializes_nulls_without_message() {
        let json = serde_json::to_value(normalize_streams(&[])).expect("serializes");
        assert_eq!(json["isLive"], false);
        assert!(json["title"].is_null());
        assert!(json["viewerCount"].is_null());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_degraded_body_carries_message() {
        let json =
            serde_json::to_value(StreamStatusResponse::not_configured()).expect("serializes");
        assert_eq!(json["isLive"], false);
        assert_eq!(json["message"], "Twitch credentials not configured");
    }
}

//! HTTP routes.
//!
//! Three independent status endpoints plus a health probe. Each handler is a
//! stateless transform: extract input, call the upstream port, reshape, and
//! classify failures. Error policies differ per endpoint:
//! - presence and stream fail loud (400/404/500 with an `error` body)
//! - game-server fails soft (always 200, failures reported as offline)

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::app::App;
use crate::infrastructure::ports::PresenceError;
use crate::use_cases::{
    presence::normalize_presence,
    server_status::{normalize_server, ServerStatusResponse},
    stream_status::{normalize_streams, StreamStatusResponse},
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/discord-presence", get(discord_presence))
        .route("/api/fivem-status", get(fivem_status))
        .route("/api/twitch-status", get(twitch_status))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Discord presence
// =============================================================================

#[derive(Debug, Deserialize)]
struct PresenceParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

async fn discord_presence(
    State(app): State<Arc<App>>,
    Query(params): Query<PresenceParams>,
) -> Result<Response, ApiError> {
    let user_id = params
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing userId parameter".to_string()))?;

    match app.presence.fetch_presence(&user_id).await {
        Ok(data) => Ok(cached_json(10, &normalize_presence(&data))),
        Err(PresenceError::NotFound) => Err(ApiError::NotFound("User not found".to_string())),
        Err(PresenceError::ServiceFailure) => {
            tracing::warn!(user_id = %user_id, "Presence service reported failure");
            Err(ApiError::Internal(
                "Presence service reported an error".to_string(),
            ))
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Presence lookup failed");
            Err(ApiError::Internal("Failed to fetch presence".to_string()))
        }
    }
}

// =============================================================================
// FiveM server status
// =============================================================================

#[derive(Debug, Deserialize)]
struct ServerParams {
    code: Option<String>,
}

/// Fail-soft: never answers with a non-200 status. Network and upstream
/// failures become the offline body with a longer cache window.
async fn fivem_status(
    State(app): State<Arc<App>>,
    Query(params): Query<ServerParams>,
) -> Response {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| app.default_join_code.clone());

    match app.server_query.fetch_server(&code).await {
        Ok(record) => server_response(30, &normalize_server(&record)),
        Err(e) => {
            tracing::debug!(code = %code, error = %e, "Server query failed, reporting offline");
            server_response(60, &ServerStatusResponse::offline())
        }
    }
}

// =============================================================================
// Twitch stream status
// =============================================================================

#[derive(Debug, Deserialize)]
struct StreamParams {
    username: Option<String>,
}

async fn twitch_status(
    State(app): State<Arc<App>>,
    Query(params): Query<StreamParams>,
) -> Result<Response, ApiError> {
    let username = params
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing username parameter".to_string()))?;

    // Degraded mode, not an error: no credentials means no upstream call and
    // no cache header.
    let Some(stream_status) = &app.stream_status else {
        return Ok(Json(StreamStatusResponse::not_configured()).into_response());
    };

    match stream_status.fetch_streams(&username).await {
        Ok(streams) => Ok(cached_json(60, &normalize_streams(&streams))),
        Err(e) => {
            tracing::warn!(username = %username, error = %e, "Stream lookup failed");
            Err(ApiError::Internal(
                "Failed to fetch stream status".to_string(),
            ))
        }
    }
}

// =============================================================================
// Response helpers
// =============================================================================

fn cached_json<T: Serialize>(max_age: u32, body: &T) -> Response {
    (
        [(header::CACHE_CONTROL, format!("public, max-age={max_age}"))],
        Json(body),
    )
        .into_response()
}

/// Game-server responses additionally allow any origin: the endpoint is
/// consumed directly from arbitrary front-ends.
fn server_response(max_age: u32, body: &ServerStatusResponse) -> Response {
    (
        [
            (
                header::CACHE_CONTROL,
                format!("public, max-age={max_age}"),
            ),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
        ],
        Json(body),
    )
        .into_response()
}

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            // "Not found" is a stable answer; let clients cache it longer
            // than a success.
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                [(header::CACHE_CONTROL, "public, max-age=30")],
                Json(json!({ "error": msg })),
            )
                .into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": msg })),
            )
                .into_response(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        DiscordUser, FivemServerFields, FivemServerRecord, PresenceData, PresencePort,
        ServerQueryError, ServerQueryPort, StreamError, StreamStatusPort, TwitchStream,
    };
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    // -------------------------------------------------------------------------
    // Fake ports
    // -------------------------------------------------------------------------

    struct FakePresence(Mutex<Option<Result<PresenceData, PresenceError>>>);

    impl FakePresence {
        fn returning(result: Result<PresenceData, PresenceError>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(Some(result))))
        }

        fn unused() -> Arc<Self> {
            Arc::new(Self(Mutex::new(None)))
        }
    }

    #[async_trait]
    impl PresencePort for FakePresence {
        async fn fetch_presence(&self, _user_id: &str) -> Result<PresenceData, PresenceError> {
            self.0.lock().expect("lock").take().expect("single call")
        }
    }

    struct FakeServerQuery {
        result: Mutex<Option<Result<FivemServerRecord, ServerQueryError>>>,
        last_code: Mutex<Option<String>>,
    }

    impl FakeServerQuery {
        fn returning(result: Result<FivemServerRecord, ServerQueryError>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
                last_code: Mutex::new(None),
            })
        }

        fn unused() -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(None),
                last_code: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ServerQueryPort for FakeServerQuery {
        async fn fetch_server(
            &self,
            join_code: &str,
        ) -> Result<FivemServerRecord, ServerQueryError> {
            *self.last_code.lock().expect("lock") = Some(join_code.to_string());
            self.result
                .lock()
                .expect("lock")
                .take()
                .expect("single call")
        }
    }

    struct FakeStreamStatus(Mutex<Option<Result<Vec<TwitchStream>, StreamError>>>);

    impl FakeStreamStatus {
        fn returning(result: Result<Vec<TwitchStream>, StreamError>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(Some(result))))
        }
    }

    #[async_trait]
    impl StreamStatusPort for FakeStreamStatus {
        async fn fetch_streams(
            &self,
            _username: &str,
        ) -> Result<Vec<TwitchStream>, StreamError> {
            self.0.lock().expect("lock").take().expect("single call")
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn sample_presence() -> PresenceData {
        PresenceData {
            discord_user: DiscordUser {
                id: "42".to_string(),
                username: "tester".to_string(),
                discriminator: "0".to_string(),
                global_name: None,
                display_name: None,
                avatar: None,
            },
            discord_status: "online".to_string(),
            activities: vec![],
            listening_to_spotify: false,
            spotify: None,
            active_on_discord_desktop: false,
            active_on_discord_mobile: false,
            active_on_discord_web: false,
        }
    }

    fn router_with(app: App) -> Router {
        routes().with_state(Arc::new(app))
    }

    fn presence_app(presence: Arc<FakePresence>) -> App {
        App::new(presence, FakeServerQuery::unused(), None, "ajv9r5")
    }

    fn server_app(server_query: Arc<FakeServerQuery>) -> App {
        App::new(FakePresence::unused(), server_query, None, "ajv9r5")
    }

    fn stream_app(stream_status: Option<Arc<FakeStreamStatus>>) -> App {
        App::new(
            FakePresence::unused(),
            FakeServerQuery::unused(),
            stream_status.map(|s| s as Arc<dyn StreamStatusPort>),
            "ajv9r5",
        )
    }

    async fn send(router: Router, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().expect("header").to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, cache, body)
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_health_probe() {
        let router = router_with(presence_app(FakePresence::unused()));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    // -------------------------------------------------------------------------
    // Discord presence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_presence_missing_user_id_is_400() {
        let router = router_with(presence_app(FakePresence::unused()));
        let (status, cache, body) = send(router, "/api/discord-presence").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(cache.is_none());
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_presence_success_has_short_cache() {
        let presence = FakePresence::returning(Ok(sample_presence()));
        let router = router_with(presence_app(presence));
        let (status, cache, body) = send(router, "/api/discord-presence?userId=42").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("public, max-age=10"));
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["username"], "tester");
        assert_eq!(body["status"], "online");
    }

    #[tokio::test]
    async fn test_presence_not_found_is_404_with_longer_cache() {
        let presence = FakePresence::returning(Err(PresenceError::NotFound));
        let router = router_with(presence_app(presence));
        let (status, cache, body) = send(router, "/api/discord-presence?userId=42").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(cache.as_deref(), Some("public, max-age=30"));
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_presence_upstream_failure_is_500_without_cache() {
        let presence = FakePresence::returning(Err(PresenceError::ServiceFailure));
        let router = router_with(presence_app(presence));
        let (status, cache, body) = send(router, "/api/discord-presence?userId=42").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(cache.is_none());
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_presence_request_error_does_not_leak_detail() {
        let presence = FakePresence::returning(Err(PresenceError::RequestFailed(
            "connection refused to 10.0.0.1".to_string(),
        )));
        let router = router_with(presence_app(presence));
        let (status, _, body) = send(router, "/api/discord-presence?userId=42").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch presence");
    }

    // -------------------------------------------------------------------------
    // FiveM server status
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_fivem_online_response() {
        let record = FivemServerRecord {
            data: Some(FivemServerFields {
                clients: Some(12),
                sv_maxclients: Some(64),
                hostname: Some("My Server".to_string()),
                gametype: Some("freeroam".to_string()),
                mapname: Some("fivem-map-skater".to_string()),
            }),
            top_level: FivemServerFields::default(),
        };
        let server_query = FakeServerQuery::returning(Ok(record));
        let router = router_with(server_app(server_query));
        let (status, cache, body) = send(router, "/api/fivem-status?code=abc123").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("public, max-age=30"));
        assert_eq!(body["online"], true);
        assert_eq!(body["players"], 12);
        assert_eq!(body["maxPlayers"], 64);
        assert_eq!(body["hostname"], "My Server");
    }

    #[tokio::test]
    async fn test_fivem_failure_is_200_offline() {
        let server_query = FakeServerQuery::returning(Err(ServerQueryError::RequestFailed(
            "connection reset".to_string(),
        )));
        let router = router_with(server_app(server_query));
        let (status, cache, body) = send(router, "/api/fivem-status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("public, max-age=60"));
        assert_eq!(body["online"], false);
        assert_eq!(body["players"], 0);
        assert_eq!(body["maxPlayers"], 0);
        assert_eq!(body["hostname"], "Unknown");
    }

    #[tokio::test]
    async fn test_fivem_defaults_join_code() {
        let server_query = FakeServerQuery::returning(Ok(FivemServerRecord::default()));
        let router = router_with(server_app(server_query.clone()));
        let _ = send(router, "/api/fivem-status").await;

        let code = server_query.last_code.lock().expect("lock").clone();
        assert_eq!(code.as_deref(), Some("ajv9r5"));
    }

    #[tokio::test]
    async fn test_fivem_allows_any_origin() {
        let server_query = FakeServerQuery::returning(Ok(FivemServerRecord::default()));
        let router = router_with(server_app(server_query));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/fivem-status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let origin = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok());
        assert_eq!(origin, Some("*"));
    }

    // -------------------------------------------------------------------------
    // Twitch stream status
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_twitch_missing_username_is_400() {
        let router = router_with(stream_app(Some(FakeStreamStatus::returning(Ok(vec![])))));
        let (status, cache, body) = send(router, "/api/twitch-status").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(cache.is_none());
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_twitch_not_configured_is_degraded_200() {
        let router = router_with(stream_app(None));
        let (status, cache, body) = send(router, "/api/twitch-status?username=streamer").await;

        assert_eq!(status, StatusCode::OK);
        assert!(cache.is_none());
        assert_eq!(body["isLive"], false);
        assert!(body.get("message").is_some());
    }

    #[tokio::test]
    async fn test_twitch_live_response() {
        let streams = vec![TwitchStream {
            title: "Speedrun practice".to_string(),
            game_name: "Celeste".to_string(),
            viewer_count: 42,
        }];
        let router = router_with(stream_app(Some(FakeStreamStatus::returning(Ok(streams)))));
        let (status, cache, body) = send(router, "/api/twitch-status?username=streamer").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("public, max-age=60"));
        assert_eq!(body["isLive"], true);
        assert_eq!(body["title"], "Speedrun practice");
        assert_eq!(body["game"], "Celeste");
        assert_eq!(body["viewerCount"], 42);
    }

    #[tokio::test]
    async fn test_twitch_offline_response() {
        let router = router_with(stream_app(Some(FakeStreamStatus::returning(Ok(vec![])))));
        let (status, cache, body) = send(router, "/api/twitch-status?username=streamer").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("public, max-age=60"));
        assert_eq!(body["isLive"], false);
        assert!(body["title"].is_null());
        assert!(body["viewerCount"].is_null());
    }

    #[tokio::test]
    async fn test_twitch_exchange_failure_is_500_without_cache() {
        let router = router_with(stream_app(Some(FakeStreamStatus::returning(Err(
            StreamError::TokenExchange("status 403".to_string()),
        )))));
        let (status, cache, body) = send(router, "/api/twitch-status?username=streamer").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(cache.is_none());
        assert_eq!(body["error"], "Failed to fetch stream status");
    }
}

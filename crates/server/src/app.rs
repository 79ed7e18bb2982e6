//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{PresencePort, ServerQueryPort, StreamStatusPort};

/// Default join code for the game-server endpoint when no `code` query
/// parameter is supplied.
pub const DEFAULT_JOIN_CODE: &str = "ajv9r5";

/// Main application state.
///
/// Holds one port handle per upstream service. Passed to HTTP handlers via
/// Axum state. The stream port is optional: without Twitch credentials the
/// stream endpoint runs in degraded mode.
pub struct App {
    pub presence: Arc<dyn PresencePort>,
    pub server_query: Arc<dyn ServerQueryPort>,
    pub stream_status: Option<Arc<dyn StreamStatusPort>>,
    pub default_join_code: String,
}

impl App {
    pub fn new(
        presence: Arc<dyn PresencePort>,
        server_query: Arc<dyn ServerQueryPort>,
        stream_status: Option<Arc<dyn StreamStatusPort>>,
        default_join_code: impl Into<String>,
    ) -> Self {
        Self {
            presence,
            server_query,
            stream_status,
            default_join_code: default_join_code.into(),
        }
    }
}

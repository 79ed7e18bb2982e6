//! Game-server reshaping: FiveM directory record -> client payload.

use serde::Serialize;

use crate::infrastructure::ports::{FivemServerFields, FivemServerRecord};

/// Fallback for string fields the directory did not report.
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusResponse {
    pub online: bool,
    pub players: u32,
    pub max_players: u32,
    pub hostname: String,
    pub gametype: String,
    pub mapname: String,
}

impl ServerStatusResponse {
    /// The fail-soft body: a fetch/parse failure is reported as an offline
    /// server, never as an error status.
    pub fn offline() -> Self {
        Self {
            online: false,
            players: 0,
            max_players: 0,
            hostname: UNKNOWN.to_string(),
            gametype: UNKNOWN.to_string(),
            mapname: UNKNOWN.to_string(),
        }
    }
}

/// Reshape a directory record into the client payload.
///
/// The directory serves two shapes: fields nested under a `Data` wrapper, or
/// the same fields at the top level. The wrapper wins when present.
pub fn normalize_server(record: &FivemServerRecord) -> ServerStatusResponse {
    let fields: &FivemServerFields = match &record.data {
        Some(data) => data,
        None => &record.top_level,
    };

    ServerStatusResponse {
        online: true,
        players: fields.clients.unwrap_or(0),
        max_players: fields.sv_maxclients.unwrap_or(0),
        hostname: fields.hostname.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        gametype: fields.gametype.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        mapname: fields.mapname.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Request DTOs for the station API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Page size used when `limit` is omitted
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest page a client may ask for
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Song identifiers arrive as strings or bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SongIdInput {
    Text(String),
    Number(u64),
}

/// Request body for POST /api/station/requests
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequestBody {
    #[serde(default)]
    pub song_id: Option<SongIdInput>,
}

impl SongRequestBody {
    /// Returns the trimmed song id, or why the body is unusable.
    pub fn song_id(&self) -> Result<String, String> {
        let id = match &self.song_id {
            Some(SongIdInput::Text(text)) => text.trim().to_string(),
            Some(SongIdInput::Number(n)) => n.to_string(),
            None => return Err("songId is required".to_string()),
        };
        if id.is_empty() {
            return Err("songId cannot be empty".to_string());
        }
        Ok(id)
    }
}

/// Query string for GET /api/station/playlists/:playlistId/songs
///
/// Kept as raw strings so bad numbers are reported with our own error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistSongsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PlaylistSongsQuery {
    /// Returns `(limit, offset)` with defaults applied.
    pub fn page(&self) -> Result<(u32, u32), String> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PAGE_LIMIT,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|l| (1..=MAX_PAGE_LIMIT).contains(l))
                .ok_or_else(|| {
                    format!("limit must be an integer between 1 and {MAX_PAGE_LIMIT}")
                })?,
        };
        let offset = match self.offset.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| "offset must be a non-negative integer".to_string())?,
        };
        Ok((limit, offset))
    }
}

//! Station data served to clients
//!
//! Normalized projections of the station API's responses. Values are built
//! once by the upstream client and never modified afterwards; a refresh
//! replaces them wholesale.

use serde::Serialize;

/// Upstream station identifier
pub type StationId = u32;

/// Upstream playlist identifier
pub type PlaylistId = u32;

/// Identity of the broadcasting station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInfo {
    pub id: StationId,
    pub name: String,
    pub shortcode: String,
    pub listen_url: Option<String>,
}

/// Song metadata shared by the current, upcoming and past tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub art_url: Option<String>,
}

/// The track on air right now, with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTrack {
    #[serde(flatten)]
    pub track: Track,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listeners {
    pub current: u64,
    pub unique: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    pub is_live: bool,
    pub streamer_name: Option<String>,
}

/// A track that has already played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    #[serde(flatten)]
    pub track: Track,
    /// Unix seconds
    pub played_at: i64,
}

/// Point-in-time read of what the station is broadcasting.
///
/// `history` is most-recent-first and bounded by the configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingSnapshot {
    pub station: StationInfo,
    pub now_playing: Option<CurrentTrack>,
    pub listeners: Listeners,
    pub live: LiveStatus,
    pub playing_next: Option<Track>,
    pub history: Vec<HistoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_enabled: bool,
    pub num_songs: u64,
    pub total_length_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSong {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub art_url: Option<String>,
    pub length_secs: u64,
    /// Identifier to pass to a song request, when the song is requestable
    pub request_id: Option<String>,
}

/// What the station said about a submitted song request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequestOutcome {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

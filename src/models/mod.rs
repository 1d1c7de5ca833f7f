//! Data models
//!
//! Station data served to clients plus the HTTP request/response DTOs.

pub mod requests;
pub mod responses;
pub mod station;

// Re-export commonly used types
pub use requests::{PlaylistSongsQuery, SongIdInput, SongRequestBody};
pub use responses::{
    ApiResponse, ClearCacheResponse, ErrorBody, ErrorResponse, HealthResponse, StatsResponse,
};
pub use station::{
    CurrentTrack, HistoryItem, Listeners, LiveStatus, NowPlayingSnapshot, PlaylistId,
    PlaylistSong, PlaylistSummary, SongRequestOutcome, StationId, StationInfo, Track,
};

//! Cache keys for station resources.
//!
//! Keys are a pure function of the query. Note that the playlist songs key
//! carries the page offset but not the page size: two reads of the same
//! offset with different limits share an entry until it expires.

use crate::models::{PlaylistId, StationId};

pub fn now_playing_key(station_id: StationId) -> String {
    format!("now-playing:{station_id}")
}

pub fn playlists_key(station_id: StationId) -> String {
    format!("playlists:{station_id}")
}

pub fn playlist_songs_key(station_id: StationId, playlist_id: PlaylistId, offset: u32) -> String {
    format!("playlist:{station_id}:{playlist_id}:{offset}")
}

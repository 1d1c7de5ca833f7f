//! Station API response shapes
//!
//! Lenient mirrors of the JSON the station API returns, plus their
//! normalization into the types in `crate::models`. Missing fields default
//! rather than fail; only a body that is not the expected JSON shape at all
//! is treated as malformed.

use serde::Deserialize;
use url::Url;

use crate::models::{
    CurrentTrack, HistoryItem, Listeners, LiveStatus, NowPlayingSnapshot, PlaylistSong,
    PlaylistSummary, SongRequestOutcome, StationInfo, Track,
};

#[derive(Debug, Deserialize)]
pub struct NowPlayingWire {
    pub station: StationWire,
    #[serde(default)]
    pub listeners: ListenersWire,
    #[serde(default)]
    pub live: LiveWire,
    #[serde(default)]
    pub now_playing: Option<CurrentWire>,
    #[serde(default)]
    pub playing_next: Option<NextWire>,
    #[serde(default)]
    pub song_history: Vec<HistoryWire>,
}

#[derive(Debug, Deserialize)]
pub struct StationWire {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shortcode: String,
    #[serde(default)]
    pub listen_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListenersWire {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub unique: u64,
    #[serde(default)]
    pub current: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct LiveWire {
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub streamer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SongWire {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub art: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWire {
    #[serde(default)]
    pub elapsed: u64,
    #[serde(default)]
    pub remaining: u64,
    #[serde(default)]
    pub duration: u64,
    pub song: SongWire,
}

#[derive(Debug, Deserialize)]
pub struct NextWire {
    pub song: SongWire,
}

#[derive(Debug, Deserialize)]
pub struct HistoryWire {
    #[serde(default)]
    pub played_at: i64,
    pub song: SongWire,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistWire {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub num_songs: u64,
    #[serde(default)]
    pub total_length: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistSongWire {
    #[serde(alias = "unique_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SongRequestWire {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

// == Normalization ==

/// Turns an art reference into an absolute URL.
///
/// Protocol-relative references get `https:`; paths are resolved against the
/// station API base. Empty or unparsable references become `None`.
pub fn normalize_art_url(art: Option<String>, base: &Url) -> Option<String> {
    let art = art?;
    let art = art.trim();
    if art.is_empty() {
        return None;
    }
    if art.starts_with("//") {
        return Some(format!("https:{art}"));
    }
    match Url::parse(art) {
        Ok(url) => Some(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(art).ok().map(String::from),
        Err(_) => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SongWire {
    fn into_track(self, base: &Url) -> Track {
        Track {
            song_id: self.id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            art_url: normalize_art_url(self.art, base),
        }
    }
}

impl NowPlayingWire {
    /// Builds a snapshot keeping at most `history_limit` past tracks,
    /// newest first.
    pub fn into_snapshot(self, base: &Url, history_limit: usize) -> NowPlayingSnapshot {
        let mut history = self.song_history;
        history.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        history.truncate(history_limit);

        NowPlayingSnapshot {
            station: StationInfo {
                id: self.station.id,
                name: self.station.name,
                shortcode: self.station.shortcode,
                listen_url: non_empty(self.station.listen_url),
            },
            now_playing: self.now_playing.map(|current| CurrentTrack {
                track: current.song.into_track(base),
                elapsed_secs: current.elapsed,
                remaining_secs: current.remaining,
                duration_secs: current.duration,
            }),
            listeners: Listeners {
                current: self.listeners.current,
                unique: self.listeners.unique,
                total: self.listeners.total,
            },
            live: LiveStatus {
                is_live: self.live.is_live,
                streamer_name: non_empty(self.live.streamer_name),
            },
            playing_next: self.playing_next.map(|next| next.song.into_track(base)),
            history: history
                .into_iter()
                .map(|item| HistoryItem {
                    played_at: item.played_at,
                    track: item.song.into_track(base),
                })
                .collect(),
        }
    }
}

impl From<PlaylistWire> for PlaylistSummary {
    fn from(wire: PlaylistWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            kind: wire.kind,
            is_enabled: wire.is_enabled,
            num_songs: wire.num_songs,
            total_length_secs: wire.total_length,
        }
    }
}

impl PlaylistSongWire {
    pub fn into_song(self, base: &Url) -> PlaylistSong {
        PlaylistSong {
            song_id: self.id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            art_url: normalize_art_url(self.art, base),
            length_secs: self.length,
            request_id: non_empty(self.request_id),
        }
    }
}

impl From<SongRequestWire> for SongRequestOutcome {
    fn from(wire: SongRequestWire) -> Self {
        Self {
            accepted: wire.success,
            message: non_empty(wire.message),
        }
    }
}

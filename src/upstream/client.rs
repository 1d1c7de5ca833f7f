//! HTTP client for the station API
//!
//! One HTTP round trip per operation, bounded by a timeout, no retries.
//! Failures come back as [`UpstreamError`] for the caller to decide on.
//!
//! # Example
//!
//! ```no_run
//! use station_proxy::upstream::{HttpStationClient, StationApi};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpStationClient::builder()
//!     .base_url("https://radio.example.org")
//!     .api_key("secret")
//!     .build()?;
//!
//! let snapshot = client.fetch_now_playing(1).await?;
//! println!("{} listeners", snapshot.listeners.current);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{Operation, Result, UpstreamError};
use super::wire::{NowPlayingWire, PlaylistSongWire, PlaylistWire, SongRequestWire};
use crate::models::{
    NowPlayingSnapshot, PlaylistId, PlaylistSong, PlaylistSummary, SongRequestOutcome, StationId,
};

/// Default timeout for station API requests (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default number of history items kept in a snapshot
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Header carrying the station API credential
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("station_proxy/", env!("CARGO_PKG_VERSION"));

// == Station API Trait ==
/// Operations the proxy needs from the station API.
#[async_trait]
pub trait StationApi: Send + Sync {
    async fn fetch_now_playing(&self, station_id: StationId) -> Result<NowPlayingSnapshot>;

    async fn fetch_playlists(&self, station_id: StationId) -> Result<Vec<PlaylistSummary>>;

    async fn fetch_playlist_songs(
        &self,
        station_id: StationId,
        playlist_id: PlaylistId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PlaylistSong>>;

    /// Submits a song request. A request the station refuses is an error.
    async fn submit_song_request(
        &self,
        station_id: StationId,
        song_id: &str,
    ) -> Result<SongRequestOutcome>;
}

// == Build Errors ==
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("Invalid station API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

// == HTTP Station Client ==
/// [`StationApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpStationClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
    history_limit: usize,
}

impl HttpStationClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Builds `{base}/seg/seg/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected by the builder
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Sends `request` and decodes a 2xx JSON body into `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T> {
        let timeout_secs = self.timeout.as_secs();
        let classify = |err: reqwest::Error| UpstreamError::from_reqwest(operation, timeout_secs, err);

        let response = self
            .authorize(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus {
                operation,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(classify)?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::MalformedResponse {
            operation,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl StationApi for HttpStationClient {
    async fn fetch_now_playing(&self, station_id: StationId) -> Result<NowPlayingSnapshot> {
        let url = self.endpoint(&["api", "nowplaying", &station_id.to_string()]);
        debug!("Fetching now playing: {}", url);

        let wire: NowPlayingWire = self
            .execute(Operation::NowPlaying, self.client.get(url))
            .await?;
        Ok(wire.into_snapshot(&self.base_url, self.history_limit))
    }

    async fn fetch_playlists(&self, station_id: StationId) -> Result<Vec<PlaylistSummary>> {
        let url = self.endpoint(&["api", "station", &station_id.to_string(), "playlists"]);
        debug!("Fetching playlists: {}", url);

        let wire: Vec<PlaylistWire> = self
            .execute(Operation::Playlists, self.client.get(url))
            .await?;
        Ok(wire.into_iter().map(PlaylistSummary::from).collect())
    }

    async fn fetch_playlist_songs(
        &self,
        station_id: StationId,
        playlist_id: PlaylistId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PlaylistSong>> {
        let mut url = self.endpoint(&[
            "api",
            "station",
            &station_id.to_string(),
            "playlist",
            &playlist_id.to_string(),
            "songs",
        ]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        debug!("Fetching playlist songs: {}", url);

        let wire: Vec<PlaylistSongWire> = self
            .execute(Operation::PlaylistSongs, self.client.get(url))
            .await?;
        Ok(wire
            .into_iter()
            .map(|song| song.into_song(&self.base_url))
            .collect())
    }

    async fn submit_song_request(
        &self,
        station_id: StationId,
        song_id: &str,
    ) -> Result<SongRequestOutcome> {
        let url = self.endpoint(&["api", "station", &station_id.to_string(), "request", song_id]);
        debug!("Submitting song request: {}", url);

        let wire: SongRequestWire = self
            .execute(Operation::SongRequest, self.client.post(url))
            .await?;
        let outcome = SongRequestOutcome::from(wire);

        if !outcome.accepted {
            return Err(UpstreamError::Rejected {
                operation: Operation::SongRequest,
                message: outcome
                    .message
                    .unwrap_or_else(|| "request not accepted".to_string()),
            });
        }
        Ok(outcome)
    }
}

// == Builder ==
/// Builder for configuring an [`HttpStationClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    history_limit: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Credential sent as `X-API-Key`; blank keys are ignored
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn build(self) -> std::result::Result<HttpStationClient, ClientBuildError> {
        let base_url =
            Url::parse(&self.base_url).map_err(|e| ClientBuildError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::InvalidBaseUrl {
                url: self.base_url,
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(self.timeout)
            .build()?;

        Ok(HttpStationClient {
            client,
            base_url,
            api_key: self.api_key,
            timeout: self.timeout,
            history_limit: self.history_limit,
        })
    }
}

//! Station Proxy Service
//!
//! Decides what is cached, under which key, for how long, and when it is
//! invalidated. Upstream failures are passed through untouched and never
//! answered from an expired entry.
//!
//! Upstream calls run on their own tasks, together with the cache write or
//! invalidation that follows them, so a caller that disconnects midway does
//! not cut either short.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::keys::{now_playing_key, playlist_songs_key, playlists_key};
use super::single_flight::InFlight;
use crate::cache::{CacheStats, CacheStore};
use crate::error::{ApiError, Result};
use crate::models::{
    NowPlayingSnapshot, PlaylistId, PlaylistSong, PlaylistSummary, SongRequestOutcome, StationId,
};
use crate::upstream::StationApi;

// == Cached Values ==
/// Everything the service keeps in the cache, one variant per resource.
#[derive(Debug, Clone)]
pub enum StationData {
    NowPlaying(Arc<NowPlayingSnapshot>),
    Playlists(Arc<Vec<PlaylistSummary>>),
    PlaylistSongs(Arc<Vec<PlaylistSong>>),
}

/// Cache store shared between the service and the sweep task
pub type SharedCache = Arc<RwLock<CacheStore<StationData>>>;

// == Station Service ==
#[derive(Clone)]
pub struct StationService {
    cache: SharedCache,
    upstream: Arc<dyn StationApi>,
    ttl: u64,
    in_flight: InFlight<StationData>,
}

impl StationService {
    /// Creates a service caching upstream results for `ttl` seconds.
    pub fn new(cache: SharedCache, upstream: Arc<dyn StationApi>, ttl: u64) -> Self {
        Self {
            cache,
            upstream,
            ttl,
            in_flight: InFlight::new(),
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Now Playing ==
    pub async fn now_playing(&self, station_id: StationId) -> Result<Arc<NowPlayingSnapshot>> {
        let upstream = self.upstream.clone();
        self.cached(
            now_playing_key(station_id),
            |data| match data {
                StationData::NowPlaying(snapshot) => Some(snapshot),
                _ => None,
            },
            StationData::NowPlaying,
            move || async move { upstream.fetch_now_playing(station_id).await },
        )
        .await
    }

    // == Playlists ==
    pub async fn playlists(&self, station_id: StationId) -> Result<Arc<Vec<PlaylistSummary>>> {
        let upstream = self.upstream.clone();
        self.cached(
            playlists_key(station_id),
            |data| match data {
                StationData::Playlists(playlists) => Some(playlists),
                _ => None,
            },
            StationData::Playlists,
            move || async move { upstream.fetch_playlists(station_id).await },
        )
        .await
    }

    // == Playlist Songs ==
    /// Returns one page of a playlist.
    ///
    /// The cache key ignores `limit`: a page cached for one limit is served
    /// for any other limit at the same offset until it expires.
    pub async fn playlist_songs(
        &self,
        station_id: StationId,
        playlist_id: PlaylistId,
        limit: u32,
        offset: u32,
    ) -> Result<Arc<Vec<PlaylistSong>>> {
        let upstream = self.upstream.clone();
        self.cached(
            playlist_songs_key(station_id, playlist_id, offset),
            |data| match data {
                StationData::PlaylistSongs(songs) => Some(songs),
                _ => None,
            },
            StationData::PlaylistSongs,
            move || async move {
                upstream
                    .fetch_playlist_songs(station_id, playlist_id, limit, offset)
                    .await
            },
        )
        .await
    }

    // == Song Request ==
    /// Forwards a song request and, once the station accepts it, drops the
    /// cached now-playing snapshot so the next poll sees the new queue.
    pub async fn request_song(
        &self,
        station_id: StationId,
        song_id: &str,
    ) -> Result<SongRequestOutcome> {
        let upstream = self.upstream.clone();
        let cache = self.cache.clone();
        let song_id = song_id.to_string();

        let task = tokio::spawn(async move {
            let outcome = upstream
                .submit_song_request(station_id, &song_id)
                .await
                .inspect_err(|e| warn!("Song request {} failed: {}", song_id, e))?;

            let key = now_playing_key(station_id);
            cache.write().await.clear(Some(&key));
            info!("Song request {} accepted, invalidated {}", song_id, key);
            Ok::<_, ApiError>(outcome)
        });

        task.await
            .map_err(|e| ApiError::Internal(format!("song request task failed: {e}")))?
    }

    // == Admin ==
    /// Drops every cached entry. Returns how many were removed.
    pub async fn clear_cache(&self) -> usize {
        let removed = self.cache.write().await.clear(None);
        info!("Station cache cleared ({} entries)", removed);
        removed
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Serves `key` from the cache, or fetches, stores and returns it.
    ///
    /// Concurrent misses on the same key share one fetch and its outcome.
    /// Nothing is stored when the fetch fails.
    async fn cached<T, X, W, F, Fut>(
        &self,
        key: String,
        extract: X,
        wrap: W,
        fetch: F,
    ) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        X: Fn(StationData) -> Option<Arc<T>>,
        W: FnOnce(Arc<T>) -> StationData + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = crate::upstream::Result<T>> + Send + 'static,
    {
        if let Some(value) = self.cache.write().await.get(&key).and_then(&extract) {
            debug!("Cache hit: {}", key);
            return Ok(value);
        }

        let cache = self.cache.clone();
        let ttl = self.ttl;
        let fetch_key = key.clone();
        let data = self
            .in_flight
            .run(&key, async move {
                // A fetch that finished just before this one started already stored it.
                if let Some(data) = cache.write().await.peek(&fetch_key) {
                    debug!("Cache filled before fetch: {}", fetch_key);
                    return Ok(data);
                }

                debug!("Cache miss: {}, fetching from station API", fetch_key);
                let value = fetch()
                    .await
                    .inspect_err(|e| warn!("Station API call for {} failed: {}", fetch_key, e))?;

                let data = wrap(Arc::new(value));
                cache.write().await.set(fetch_key, data.clone(), Some(ttl));
                Ok::<_, ApiError>(data)
            })
            .await?;

        extract(data)
            .ok_or_else(|| ApiError::Internal(format!("unexpected value cached under {key}")))
    }
}

//! API Handlers
//!
//! Thin translation between HTTP and [`StationService`] calls.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AuthenticatedUser, Authenticator, StaticTokenAuthenticator};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    ApiResponse, ClearCacheResponse, HealthResponse, NowPlayingSnapshot, PlaylistId,
    PlaylistSong, PlaylistSongsQuery, PlaylistSummary, SongRequestBody, SongRequestOutcome,
    StationId, StatsResponse,
};
use crate::station::{SharedCache, StationService};
use crate::upstream::{ClientBuildError, HttpStationClient, StationApi};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: StationService,
    pub auth: Arc<dyn Authenticator>,
    /// Station every public route reads from
    pub station_id: StationId,
}

impl AppState {
    pub fn new(service: StationService, auth: Arc<dyn Authenticator>, station_id: StationId) -> Self {
        Self {
            service,
            auth,
            station_id,
        }
    }

    /// Wires the HTTP station client, cache store and token table from
    /// configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ClientBuildError> {
        let mut builder = HttpStationClient::builder()
            .base_url(&config.station_api_url)
            .timeout(config.upstream_timeout())
            .history_limit(config.history_limit);
        if let Some(key) = &config.station_api_key {
            builder = builder.api_key(key);
        }
        let upstream: Arc<dyn StationApi> = Arc::new(builder.build()?);

        let cache: SharedCache = Arc::new(RwLock::new(CacheStore::new(config.cache_ttl)));
        let service = StationService::new(cache, upstream, config.cache_ttl);
        let auth = Arc::new(StaticTokenAuthenticator::new(config.api_tokens.clone()));

        Ok(Self::new(service, auth, config.station_id))
    }
}

/// Handler for GET /api/station/now-playing
pub async fn now_playing_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Arc<NowPlayingSnapshot>>>> {
    let snapshot = state.service.now_playing(state.station_id).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// Handler for GET /api/station/playlists
pub async fn playlists_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Arc<Vec<PlaylistSummary>>>>> {
    let playlists = state.service.playlists(state.station_id).await?;
    Ok(Json(ApiResponse::ok(playlists)))
}

/// Handler for GET /api/station/playlists/:playlist_id/songs
///
/// A `playlist_id` that is not an integer is rejected with 400.
pub async fn playlist_songs_handler(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Query(query): Query<PlaylistSongsQuery>,
) -> Result<Json<ApiResponse<Arc<Vec<PlaylistSong>>>>> {
    let playlist_id: PlaylistId = playlist_id.trim().parse().map_err(|_| {
        ApiError::InvalidRequest(format!("playlistId must be an integer, got '{playlist_id}'"))
    })?;
    let (limit, offset) = query.page().map_err(ApiError::InvalidRequest)?;

    let songs = state
        .service
        .playlist_songs(state.station_id, playlist_id, limit, offset)
        .await?;
    Ok(Json(ApiResponse::ok(songs)))
}

/// Handler for POST /api/station/requests
///
/// Runs behind the bearer middleware, which supplies the user.
pub async fn request_song_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: std::result::Result<Json<SongRequestBody>, JsonRejection>,
) -> Result<Json<ApiResponse<SongRequestOutcome>>> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let song_id = body.song_id().map_err(ApiError::InvalidRequest)?;

    info!("User {} requested song {}", user.id, song_id);
    let outcome = state.service.request_song(state.station_id, &song_id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for DELETE /admin/cache
pub async fn clear_cache_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<ClearCacheResponse>> {
    let cleared_entries = state.service.clear_cache().await;
    Json(ApiResponse::ok(ClearCacheResponse { cleared_entries }))
}

/// Handler for GET /admin/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let stats = state.service.cache_stats().await;
    Json(ApiResponse::ok(StatsResponse::from(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_upstream_url() {
        let config = Config {
            station_api_url: "::not a url::".to_string(),
            ..Config::default()
        };
        assert!(AppState::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_station() {
        let config = Config {
            station_id: 7,
            cache_ttl: 15,
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.station_id, 7);
        assert_eq!(state.service.ttl(), 15);
        assert_eq!(state.service.cache().read().await.default_ttl(), 15);
    }
}

//! API Routes
//!
//! Configures the public and admin Axum routers.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth::require_bearer;
use super::handlers::{
    clear_cache_handler, health_handler, now_playing_handler, playlist_songs_handler,
    playlists_handler, request_song_handler, stats_handler, AppState,
};

/// Creates the public router.
///
/// # Endpoints
/// - `GET /api/station/now-playing`
/// - `GET /api/station/playlists`
/// - `GET /api/station/playlists/:playlist_id/songs?limit=&offset=`
/// - `POST /api/station/requests` (bearer token required)
/// - `GET /health`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let authenticated = Router::new()
        .route("/api/station/requests", post(request_song_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/api/station/now-playing", get(now_playing_handler))
        .route("/api/station/playlists", get(playlists_handler))
        .route(
            "/api/station/playlists/:playlist_id/songs",
            get(playlist_songs_handler),
        )
        .merge(authenticated)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the admin router. Serve it on a loopback listener only.
///
/// # Endpoints
/// - `DELETE /admin/cache`
/// - `GET /admin/cache/stats`
pub fn create_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/cache", delete(clear_cache_handler))
        .route("/admin/cache/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

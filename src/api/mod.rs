//! API Module
//!
//! HTTP handlers and routing for the station proxy.
//!
//! # Endpoints
//! - `GET /api/station/now-playing` - Current snapshot
//! - `GET /api/station/playlists` - Playlist summaries
//! - `GET /api/station/playlists/:playlist_id/songs` - One page of a playlist
//! - `POST /api/station/requests` - Submit a song request (bearer auth)
//! - `GET /health` - Health check endpoint
//!
//! Admin endpoints live on a separate router, see [`create_admin_router`].

mod auth;
pub mod handlers;
pub mod routes;

pub use auth::require_bearer;
pub use handlers::*;
pub use routes::{create_admin_router, create_router};

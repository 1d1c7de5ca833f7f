//! Station Proxy - caching front for a radio station's broadcast API
//!
//! Serves now-playing state, playlists and song requests to many clients
//! while keeping calls to the station API down to one per resource per TTL.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod station;
pub mod tasks;
pub mod upstream;

pub use api::{create_admin_router, create_router, AppState};
pub use config::Config;
pub use station::StationService;
pub use tasks::spawn_cleanup_task;

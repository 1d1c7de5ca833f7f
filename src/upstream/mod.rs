//! Upstream Module
//!
//! Client for the station's broadcast-automation API.

mod client;
mod error;
mod wire;

pub use client::{
    ClientBuildError, ClientBuilder, HttpStationClient, StationApi, API_KEY_HEADER,
    DEFAULT_HISTORY_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use error::{Operation, Result, UpstreamError};
pub use wire::normalize_art_url;

//! Error types for the station API client

use std::fmt;

use thiserror::Error;

/// Result type alias for station API operations
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// The upstream call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NowPlaying,
    Playlists,
    PlaylistSongs,
    SongRequest,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::NowPlaying => "now_playing",
            Operation::Playlists => "playlists",
            Operation::PlaylistSongs => "playlist_songs",
            Operation::SongRequest => "song_request",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures talking to the station API.
///
/// Every variant names the operation it came from. The client never
/// recovers from these itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// No response within the configured timeout
    #[error("{operation}: station API did not respond within {timeout_secs}s")]
    Timeout {
        operation: Operation,
        timeout_secs: u64,
    },

    /// The station API answered with a non-2xx status
    #[error("{operation}: station API returned HTTP {status}")]
    HttpStatus { operation: Operation, status: u16 },

    /// A 2xx response whose body does not have the expected shape
    #[error("{operation}: malformed station API response: {message}")]
    MalformedResponse {
        operation: Operation,
        message: String,
    },

    /// Connection-level failure before any response arrived
    #[error("{operation}: station API unreachable: {message}")]
    Unreachable {
        operation: Operation,
        message: String,
    },

    /// The station API accepted the call but refused the song request
    #[error("{operation}: request rejected by station: {message}")]
    Rejected {
        operation: Operation,
        message: String,
    },
}

impl UpstreamError {
    pub fn operation(&self) -> Operation {
        match self {
            UpstreamError::Timeout { operation, .. }
            | UpstreamError::HttpStatus { operation, .. }
            | UpstreamError::MalformedResponse { operation, .. }
            | UpstreamError::Unreachable { operation, .. }
            | UpstreamError::Rejected { operation, .. } => *operation,
        }
    }

    /// HTTP status reported by the station API, when one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            UpstreamError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout { .. })
    }

    /// Classifies a reqwest failure for `operation`.
    pub(crate) fn from_reqwest(operation: Operation, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout {
                operation,
                timeout_secs,
            }
        } else if let Some(status) = err.status() {
            UpstreamError::HttpStatus {
                operation,
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            UpstreamError::MalformedResponse {
                operation,
                message: err.to_string(),
            }
        } else {
            UpstreamError::Unreachable {
                operation,
                message: err.to_string(),
            }
        }
    }
}

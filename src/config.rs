//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::StationId;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the station API
    pub station_api_url: String,
    /// Station served by this proxy
    pub station_id: StationId,
    /// Credential for the station API, if it requires one
    pub station_api_key: Option<String>,
    /// TTL in seconds for cached station data
    pub cache_ttl: u64,
    /// Timeout in seconds for each station API call
    pub upstream_timeout: u64,
    /// Public HTTP server port
    pub server_port: u16,
    /// Loopback port for the admin listener; disabled when `None`
    pub admin_port: Option<u16>,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Maximum number of recently played tracks in a snapshot
    pub history_limit: usize,
    /// Accepted bearer tokens mapped to the user they identify
    pub api_tokens: HashMap<String, String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STATION_API_URL` - Station API base URL (default: http://localhost)
    /// - `STATION_ID` - Station identifier (default: 1)
    /// - `STATION_API_KEY` - Station API credential (default: none)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 60)
    /// - `UPSTREAM_TIMEOUT` - Station API timeout in seconds (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ADMIN_PORT` - Admin listener port on 127.0.0.1 (default: disabled)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `HISTORY_LIMIT` - Recent tracks kept per snapshot (default: 5)
    /// - `API_TOKENS` - `token=user` pairs, comma separated (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            station_api_url: env::var("STATION_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.station_api_url),
            station_id: parse_var("STATION_ID").unwrap_or(defaults.station_id),
            station_api_key: env::var("STATION_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.upstream_timeout),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            admin_port: parse_var("ADMIN_PORT"),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            history_limit: parse_var("HISTORY_LIMIT").unwrap_or(defaults.history_limit),
            api_tokens: env::var("API_TOKENS")
                .map(|raw| parse_tokens(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station_api_url: "http://localhost".to_string(),
            station_id: 1,
            station_api_key: None,
            cache_ttl: 60,
            upstream_timeout: 10,
            server_port: 3000,
            admin_port: None,
            cleanup_interval: 30,
            history_limit: 5,
            api_tokens: HashMap::new(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parses `token=user,token2=user2`. Entries without a user are named after
/// their position; blank entries are skipped.
pub fn parse_tokens(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .filter_map(|(i, entry)| {
            let (token, user) = match entry.split_once('=') {
                Some((token, user)) => (token.trim(), user.trim()),
                None => (entry, ""),
            };
            if token.is_empty() {
                return None;
            }
            let user = if user.is_empty() {
                format!("token-{}", i + 1)
            } else {
                user.to_string()
            };
            Some((token.to_string(), user))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.station_api_url, "http://localhost");
        assert_eq!(config.station_id, 1);
        assert!(config.station_api_key.is_none());
        assert_eq!(config.cache_ttl, 60);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
        assert_eq!(config.server_port, 3000);
        assert!(config.admin_port.is_none());
        assert_eq!(config.cleanup_interval, 30);
        assert_eq!(config.history_limit, 5);
        assert!(config.api_tokens.is_empty());
    }

    #[test]
    fn test_parse_tokens() {
        let tokens = parse_tokens(" abc=alice, ,def=bob,ghi ,=nobody");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens["abc"], "alice");
        assert_eq!(tokens["def"], "bob");
        assert_eq!(tokens["ghi"], "token-3");
    }

    #[test]
    fn test_parse_tokens_empty() {
        assert!(parse_tokens("").is_empty());
    }
}

//! Integration tests for the station API client against a mock server.

use std::time::Duration;

use serde_json::json;
use station_proxy::upstream::{HttpStationClient, Operation, StationApi, UpstreamError};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn now_playing_json() -> serde_json::Value {
    json!({
        "station": {"id": 1, "name": "Community FM", "shortcode": "community_fm",
                    "listen_url": "https://radio.example.org/listen/community_fm/radio.mp3"},
        "listeners": {"total": 42, "unique": 30, "current": 28},
        "live": {"is_live": false, "streamer_name": ""},
        "now_playing": {
            "elapsed": 10, "remaining": 170, "duration": 180,
            "song": {"id": "s1", "title": "Song A", "artist": "The Band", "album": "First",
                     "art": "/api/station/1/art/s1.jpg"}
        },
        "playing_next": {"song": {"id": "s2", "title": "Song B", "artist": "Other", "album": ""}},
        "song_history": [
            {"played_at": 1700000000, "song": {"id": "h1", "title": "Earlier", "artist": "X"}},
            {"played_at": 1700000300, "song": {"id": "h2", "title": "Just Before", "artist": "Y"}}
        ]
    })
}

fn client_for(server: &MockServer) -> HttpStationClient {
    HttpStationClient::builder()
        .base_url(server.uri())
        .api_key("station-secret")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_now_playing_normalizes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nowplaying/1"))
        .and(header("X-API-Key", "station-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(now_playing_json()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = assert_ok!(client_for(&server).fetch_now_playing(1).await);

    assert_eq!(snapshot.station.name, "Community FM");
    assert_eq!(snapshot.listeners.current, 28);
    assert!(!snapshot.live.is_live);
    assert_eq!(snapshot.live.streamer_name, None);

    let current = snapshot.now_playing.unwrap();
    assert_eq!(current.track.title, "Song A");
    assert_eq!(current.elapsed_secs, 10);
    assert_eq!(
        current.track.art_url,
        Some(format!("{}/api/station/1/art/s1.jpg", server.uri()))
    );

    assert_eq!(snapshot.playing_next.unwrap().title, "Song B");
    assert_eq!(snapshot.history[0].track.title, "Just Before");
    assert_eq!(snapshot.history[1].track.title, "Earlier");
}

#[tokio::test]
async fn test_fetch_playlists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/station/1/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "name": "Morning Show", "type": "default", "is_enabled": true,
             "num_songs": 120, "total_length": 28800},
            {"id": 6, "name": "Jingles", "type": "once_per_x_songs", "is_enabled": false}
        ])))
        .mount(&server)
        .await;

    let playlists = assert_ok!(client_for(&server).fetch_playlists(1).await);

    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0].name, "Morning Show");
    assert_eq!(playlists[0].total_length_secs, 28800);
    assert_eq!(playlists[1].num_songs, 0);
}

#[tokio::test]
async fn test_fetch_playlist_songs_sends_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/station/1/playlist/5/songs"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s9", "title": "Deep Cut", "artist": "Band", "length": 240,
             "art": "//cdn.example.org/s9.jpg", "request_id": "req-9"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let songs = assert_ok!(client_for(&server).fetch_playlist_songs(1, 5, 10, 20).await);

    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].art_url.as_deref(), Some("https://cdn.example.org/s9.jpg"));
    assert_eq!(songs[0].request_id.as_deref(), Some("req-9"));
}

#[tokio::test]
async fn test_submit_song_request_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/station/1/request/req-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Your request has been submitted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = assert_ok!(client_for(&server).submit_song_request(1, "req-9").await);

    assert!(outcome.accepted);
    assert_eq!(outcome.message.as_deref(), Some("Your request has been submitted"));
}

#[tokio::test]
async fn test_submit_song_request_refused_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/station/1/request/req-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Song was played recently"})),
        )
        .mount(&server)
        .await;

    let err = assert_err!(client_for(&server).submit_song_request(1, "req-9").await);

    assert_eq!(
        err,
        UpstreamError::Rejected {
            operation: Operation::SongRequest,
            message: "Song was played recently".to_string(),
        }
    );
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/station/1/playlists"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = assert_err!(client_for(&server).fetch_playlists(1).await);

    assert_eq!(err.operation(), Operation::Playlists);
    assert_eq!(err.http_status(), Some(500));
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nowplaying/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = assert_err!(client_for(&server).fetch_now_playing(1).await);

    assert!(matches!(
        err,
        UpstreamError::MalformedResponse {
            operation: Operation::NowPlaying,
            ..
        }
    ));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nowplaying/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(now_playing_json())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = HttpStationClient::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let err = assert_err!(client.fetch_now_playing(1).await);
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn test_unreachable_upstream() {
    // Nothing listens on port 1.
    let client = HttpStationClient::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = assert_err!(client.fetch_playlists(1).await);
    assert!(
        matches!(err, UpstreamError::Unreachable { .. }),
        "expected unreachable, got {err:?}"
    );
}

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use ddpm::config::Config;
use ddpm::types::{Playlist, Track};
use ddpm::utils::*;

// Helper function to create a test playlist
fn create_test_playlist(name: &str) -> Playlist {
    Playlist {
        id: format!("id-{}", name.len()),
        name: name.to_string(),
    }
}

fn create_test_track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id),
        ..Default::default()
    }
}

fn test_config() -> Config {
    let env: HashMap<&str, &str> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client id"),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
        ("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
    ]);
    Config::from_vars(|k| env.get(k).map(|v| v.to_string())).unwrap()
}

#[test]
fn test_parse_query_params() {
    let params = parse_query_params("?code=AQB%2Fx%3D%3D&state=abc");

    assert_eq!(params.len(), 2);
    assert_eq!(params["code"], "AQB/x==");
    assert_eq!(params["state"], "abc");
}

#[test]
fn test_parse_query_params_splits_on_first_equals() {
    let params = parse_query_params("code=a=b=c");
    assert_eq!(params["code"], "a=b=c");
}

#[test]
fn test_parse_query_params_edge_cases() {
    // Empty query
    assert!(parse_query_params("").is_empty());
    assert!(parse_query_params("?").is_empty());

    // Empty segments are skipped, a bare key maps to an empty value
    let params = parse_query_params("a=1&&flag&");
    assert_eq!(params.len(), 2);
    assert_eq!(params["a"], "1");
    assert_eq!(params["flag"], "");

    // Keys stay unique, the last one wins
    let params = parse_query_params("code=first&code=second");
    assert_eq!(params.len(), 1);
    assert_eq!(params["code"], "second");

    // Malformed escapes are kept verbatim
    let params = parse_query_params("code=%E0%A4%A");
    assert_eq!(params["code"], "%E0%A4%A");
}

#[test]
fn test_parse_query_params_round_trip() {
    let values = [
        "plain",
        "with space",
        "slash/and?question",
        "amp&equals=",
        "percent%literal",
        "ünïcödé ✓",
        "",
    ];

    for value in values {
        let query = format!("?code={}", urlencoding::encode(value));
        let params = parse_query_params(&query);
        assert_eq!(params["code"], value, "query was {}", query);
    }
}

#[test]
fn test_build_authorize_url() {
    let url = build_authorize_url(&test_config());

    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(url.contains("client_id=client%20id"));
    assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8888%2Fcallback"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("scope=user-top-read%20playlist-modify-public"));

    // Query parsing gives the unencoded values back
    let query = url.split_once('?').unwrap().1;
    let params = parse_query_params(query);
    assert_eq!(params["redirect_uri"], "http://127.0.0.1:8888/callback");
    assert_eq!(params["scope"], "user-top-read playlist-modify-public");
}

#[test]
fn test_basic_auth_credential() {
    let header = basic_auth_credential("id", "secret");
    assert_eq!(header, format!("Basic {}", STANDARD.encode("id:secret")));
    assert_eq!(header, "Basic aWQ6c2VjcmV0");
}

#[test]
fn test_seed_tracks() {
    assert_eq!(seed_tracks(&[]), None);
    assert_eq!(seed_tracks(&[create_test_track("a")]), Some("a".to_string()));

    let tracks: Vec<Track> = ["1", "2", "3", "4", "5"]
        .iter()
        .map(|id| create_test_track(id))
        .collect();
    assert_eq!(seed_tracks(&tracks), Some("1,2,3,4,5".to_string()));
}

#[test]
fn test_iso_date() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(iso_date(date), "2024-01-01");
}

#[test]
fn test_next_playlist_name_first_of_the_day() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let existing = vec![
        create_test_playlist("Road trip"),
        create_test_playlist("P - 2023-12-31 - 1"),
    ];

    assert_eq!(next_playlist_name("P", date, &[]), "P - 2024-01-01 - 1");
    assert_eq!(next_playlist_name("P", date, &existing), "P - 2024-01-01 - 1");
}

#[test]
fn test_next_playlist_name_counts_same_day() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let existing = vec![
        create_test_playlist("P - 2024-01-01"),
        create_test_playlist("Other"),
        create_test_playlist("P - 2024-01-01 - 2"),
    ];

    assert_eq!(next_playlist_name("P", date, &existing), "P - 2024-01-01 - 3");
}

#[test]
fn test_next_playlist_name_prefix_is_exact() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let existing = vec![
        create_test_playlist("DDPM - 2024-01-01 - 1"),
        create_test_playlist("ddpm - 2024-01-01 - 2"),
    ];

    assert_eq!(
        next_playlist_name("DDPM", date, &existing),
        "DDPM - 2024-01-01 - 2"
    );
}

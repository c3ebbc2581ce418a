use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{NaiveDate, Utc};

use crate::{
    config::Config,
    types::{Playlist, Track},
};

/// Splits a query string into a key/value map.
///
/// A leading `?` is ignored, each pair is split on its first `=` and the
/// value is percent-decoded. Later duplicates overwrite earlier ones.
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);

    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .fold(HashMap::new(), |mut acc, segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            acc.insert(key.to_string(), percent_decode(value));
            acc
        })
}

fn percent_decode(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}

pub fn build_authorize_url(config: &Config) -> String {
    format!(
        "{auth_url}?client_id={client_id}&redirect_uri={redirect_uri}&response_type=code&scope={scope}",
        auth_url = config.auth_url,
        client_id = urlencoding::encode(&config.client_id),
        redirect_uri = urlencoding::encode(&config.redirect_uri),
        scope = urlencoding::encode(&config.scope),
    )
}

/// `Authorization` header value for the token endpoint.
pub fn basic_auth_credential(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Comma-joined track ids, `None` when there is nothing to seed with.
pub fn seed_tracks(tracks: &[Track]) -> Option<String> {
    if tracks.is_empty() {
        return None;
    }

    Some(
        tracks
            .iter()
            .map(|t| t.id.as_str())
            .collect::<Vec<_>>()
            .join(","),
    )
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Picks the name for the next playlist of the day.
///
/// Every existing playlist whose name starts with `"<prefix> - <date>"`
/// counts as a previous run, so the result is numbered one past that count.
pub fn next_playlist_name(prefix: &str, date: NaiveDate, existing: &[Playlist]) -> String {
    let day = format!("{} - {}", prefix, iso_date(date));
    let taken = existing.iter().filter(|p| p.name.starts_with(&day)).count();

    format!("{} - {}", day, taken + 1)
}

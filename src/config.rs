//! Configuration management for ddpm.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Environment variables that are already
//! set take precedence over the file.
//!
//! Only the Spotify client credentials are required; everything else falls
//! back to the public Spotify endpoints and a local callback server on
//! `127.0.0.1:8888`.

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-top-read playlist-modify-public";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_PLAYLIST_PREFIX: &str = "DDPM";
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub server_addr: SocketAddr,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
    pub playlist_prefix: String,
    pub login_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Resolves the configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset so an empty line in `.env` falls
    /// back to the default instead of producing an empty URL.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());

        let server_addr_raw = or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
        let server_addr =
            server_addr_raw
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::Invalid {
                    var: "SERVER_ADDRESS",
                    value: server_addr_raw.clone(),
                })?;

        let login_timeout = match get("DDPM_LOGIN_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    var: "DDPM_LOGIN_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS),
        };

        Ok(Config {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: or_default("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            server_addr,
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            playlist_prefix: or_default("DDPM_PLAYLIST_PREFIX", DEFAULT_PLAYLIST_PREFIX),
            login_timeout,
        })
    }
}

/// Loads environment variables from `<data_local_dir>/ddpm/.env`.
///
/// The directory is created on first use. A missing `.env` file is fine,
/// configuration may come entirely from the process environment.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ddpm/.env");
    path
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_with_only_credentials() {
        let env = vars(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "id"),
            ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
        ]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.server_addr.to_string(), DEFAULT_SERVER_ADDRESS);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.scope, "user-top-read playlist-modify-public");
        assert_eq!(config.playlist_prefix, "DDPM");
        assert_eq!(config.login_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_missing_secret() {
        let env = vars(&[("SPOTIFY_API_AUTH_CLIENT_ID", "id")]);
        let err = Config::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_SECRET"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let env = vars(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "   "),
            ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
        ]);
        let err = Config::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"));
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let env = vars(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "id"),
            ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
            ("SPOTIFY_API_URL", "http://127.0.0.1:9999/v1/"),
            ("SERVER_ADDRESS", "0.0.0.0:3000"),
            ("DDPM_PLAYLIST_PREFIX", "Mix"),
            ("DDPM_LOGIN_TIMEOUT_SECS", "5"),
        ]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:9999/v1");
        assert_eq!(config.server_addr.port(), 3000);
        assert_eq!(config.playlist_prefix, "Mix");
        assert_eq!(config.login_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numbers_and_addresses() {
        let env = vars(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "id"),
            ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
            ("DDPM_LOGIN_TIMEOUT_SECS", "soon"),
        ]);
        let err = Config::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "DDPM_LOGIN_TIMEOUT_SECS",
                value: "soon".to_string()
            }
        );

        let env = vars(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "id"),
            ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
            ("SERVER_ADDRESS", "localhost"),
        ]);
        assert!(matches!(
            Config::from_vars(|k| env.get(k).cloned()),
            Err(ConfigError::Invalid {
                var: "SERVER_ADDRESS",
                ..
            })
        ));
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

/// Default scopes requested on the authorize URL (space-joined).
pub const DEFAULT_SCOPES: &str = "user-read-currently-playing user-read-playback-state";

/// Links chat identities to a Spotify account and announces what they play.
#[derive(Debug, Clone, Parser)]
#[command(name = "spotlink", version, about)]
pub struct LinkConfig {
    /// Host to bind the host-adapter API on.
    #[arg(long, default_value = "127.0.0.1", env = "SPOTLINK_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9810, env = "SPOTLINK_PORT")]
    pub port: u16,

    /// Bearer token for API auth. If unset, auth is disabled.
    #[arg(long, env = "SPOTLINK_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// OAuth client ID registered with the provider.
    #[arg(long, env = "SPOTLINK_CLIENT_ID", default_value = "")]
    pub client_id: String,

    /// OAuth client secret.
    #[arg(long, env = "SPOTLINK_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub client_secret: String,

    /// Redirect URI served by the web endpoint that writes the callback inbox.
    #[arg(long, env = "SPOTLINK_REDIRECT_URI", default_value = "")]
    pub redirect_uri: String,

    /// Provider authorization endpoint.
    #[arg(
        long,
        env = "SPOTLINK_AUTHORIZE_URL",
        default_value = "https://accounts.spotify.com/authorize"
    )]
    pub authorize_url: String,

    /// Provider token endpoint.
    #[arg(long, env = "SPOTLINK_TOKEN_URL", default_value = "https://accounts.spotify.com/api/token")]
    pub token_url: String,

    /// Provider "currently playing" endpoint.
    #[arg(
        long,
        env = "SPOTLINK_PLAYBACK_URL",
        default_value = "https://api.spotify.com/v1/me/player/currently-playing"
    )]
    pub playback_url: String,

    /// Space-separated OAuth scopes.
    #[arg(long, env = "SPOTLINK_SCOPES", default_value = DEFAULT_SCOPES)]
    pub scopes: String,

    /// Directory holding the credential, state-mapping and journal files.
    #[arg(long, env = "SPOTLINK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Credential store file (defaults to `<data-dir>/spotify_tokens.json`).
    #[arg(long, env = "SPOTLINK_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// State-mapping store file (defaults to `<data-dir>/spotify_state_mapping.json`).
    #[arg(long, env = "SPOTLINK_STATES_FILE")]
    pub states_file: Option<PathBuf>,

    /// Callback inbox written by the redirect endpoint
    /// (defaults to `<data-dir>/spotify_callbacks.json`).
    #[arg(long, env = "SPOTLINK_INBOX_FILE")]
    pub inbox_file: Option<PathBuf>,

    /// Heartbeat interval in milliseconds.
    #[arg(long, default_value_t = 1000, env = "SPOTLINK_TICK_MS")]
    pub tick_ms: u64,

    /// Minimum seconds between playback poll cycles.
    #[arg(long, default_value_t = 30, env = "SPOTLINK_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: u64,

    /// Seconds an unanswered authorization state stays valid (0 = forever).
    #[arg(long, default_value_t = 900, env = "SPOTLINK_STATE_TTL_SECS")]
    pub state_ttl_secs: u64,

    /// Provider HTTP request timeout in seconds (0 = transport default).
    #[arg(long, default_value_t = 30, env = "SPOTLINK_HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: u64,

    /// Log format (json or text).
    #[arg(long, env = "SPOTLINK_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "SPOTLINK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl LinkConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client_id.trim().is_empty() {
            anyhow::bail!("--client-id is required");
        }
        if self.client_secret.trim().is_empty() {
            anyhow::bail!("--client-secret is required");
        }
        if self.redirect_uri.trim().is_empty() {
            anyhow::bail!("--redirect-uri is required");
        }
        if self.tick_ms == 0 {
            anyhow::bail!("--tick-ms must be greater than zero");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("--poll-interval-secs must be greater than zero");
        }
        if self.scopes.split_whitespace().next().is_none() {
            anyhow::bail!("--scopes must name at least one scope");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn state_ttl(&self) -> Option<Duration> {
        (self.state_ttl_secs > 0).then(|| Duration::from_secs(self.state_ttl_secs))
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        (self.http_timeout_secs > 0).then(|| Duration::from_secs(self.http_timeout_secs))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(state_dir)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_file.clone().unwrap_or_else(|| self.data_dir().join("spotify_tokens.json"))
    }

    pub fn states_path(&self) -> PathBuf {
        self.states_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("spotify_state_mapping.json"))
    }

    pub fn inbox_path(&self) -> PathBuf {
        self.inbox_file.clone().unwrap_or_else(|| self.data_dir().join("spotify_callbacks.json"))
    }

    /// In-flight exchange journal, kept beside the credential file.
    pub fn journal_path(&self) -> PathBuf {
        let creds = self.credentials_path();
        creds.with_file_name("spotify_callbacks.inflight.json")
    }

    /// Config pointing every provider endpoint at `provider_base` and every
    /// file under `data_dir`, with fast timings.
    pub fn test(data_dir: &Path, provider_base: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            auth_token: None,
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            redirect_uri: "http://localhost/spotify/callback".into(),
            authorize_url: format!("{provider_base}/authorize"),
            token_url: format!("{provider_base}/api/token"),
            playback_url: format!("{provider_base}/v1/me/player/currently-playing"),
            scopes: DEFAULT_SCOPES.into(),
            data_dir: Some(data_dir.to_path_buf()),
            credentials_file: None,
            states_file: None,
            inbox_file: None,
            tick_ms: 50,
            poll_interval_secs: 30,
            state_ttl_secs: 900,
            http_timeout_secs: 5,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

/// Resolve the default state directory.
///
/// Checks `$XDG_STATE_HOME/spotlink`, then `$HOME/.local/state/spotlink`.
pub fn state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("spotlink");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/spotlink");
    }
    PathBuf::from(".spotlink")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

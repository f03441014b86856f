// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider HTTP client: token endpoint grants and the playback endpoint.

pub mod oauth;
pub mod playback;

use std::fmt;
use std::sync::Once;

use crate::config::LinkConfig;

pub use oauth::TokenResponse;
pub use playback::{Playback, PlaybackSnapshot};

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Failure talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure (connect, TLS, timeout, body read).
    Network(String),
    /// Non-success HTTP status.
    Status { status: u16, body: String },
    /// Success status but the body is not the expected shape.
    Malformed(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network: {msg}"),
            Self::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Endpoints and client credentials for one OAuth provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub playback_url: String,
    pub scopes: Vec<String>,
}

impl From<&LinkConfig> for ProviderSettings {
    fn from(config: &LinkConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            playback_url: config.playback_url.clone(),
            scopes: config.scopes.split_whitespace().map(str::to_owned).collect(),
        }
    }
}

pub struct ProviderClient {
    http: reqwest::Client,
    settings: ProviderSettings,
}

impl ProviderClient {
    pub fn new(settings: ProviderSettings, timeout: Option<std::time::Duration>) -> anyhow::Result<Self> {
        ensure_crypto();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { http: builder.build()?, settings })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

/// Read a response body, mapping non-success statuses to [`ProviderError::Status`].
async fn success_body(resp: reqwest::Response) -> Result<String, ProviderError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| ProviderError::Network(format!("read body: {e}")))?;
    if !status.is_success() {
        return Err(ProviderError::Status { status: status.as_u16(), body });
    }
    Ok(body)
}

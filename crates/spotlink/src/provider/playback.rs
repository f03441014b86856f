// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! "Currently playing" endpoint.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::provider::{success_body, ProviderClient, ProviderError};

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackResponse {
    #[serde(default)]
    pub item: Option<PlaybackItem>,
    #[serde(default)]
    pub is_playing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackItem {
    /// Absent for local files.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<NamedEntity>,
    #[serde(default)]
    pub album: Option<NamedEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntity {
    #[serde(default)]
    pub name: String,
}

/// Decoded result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub is_playing: bool,
}

/// What the playback endpoint reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// 204, or a body without an item.
    Nothing,
    Track(PlaybackSnapshot),
}

impl PlaybackResponse {
    pub fn into_playback(self) -> Playback {
        let Some(item) = self.item else {
            return Playback::Nothing;
        };
        let artist_name = item
            .artists
            .into_iter()
            .map(|a| a.name)
            .find(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown artist".to_owned());
        // Local files carry no id; fall back to a title/artist key so dedup still works.
        let track_id = item
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("local:{}:{}", item.name, artist_name));
        Playback::Track(PlaybackSnapshot {
            track_id,
            title: item.name,
            artist_name,
            album_name: item.album.map(|a| a.name).filter(|n| !n.is_empty()),
            is_playing: self.is_playing,
        })
    }
}

impl ProviderClient {
    /// Query what the bearer of `access_token` is playing.
    pub async fn currently_playing(&self, access_token: &str) -> Result<Playback, ProviderError> {
        let resp = self
            .http
            .get(&self.settings.playback_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(Playback::Nothing);
        }
        let body = success_body(resp).await?;
        if body.trim().is_empty() {
            return Ok(Playback::Nothing);
        }
        let decoded: PlaybackResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(decoded.into_playback())
    }
}

#[cfg(test)]
#[path = "playback_tests.rs"]
mod tests;

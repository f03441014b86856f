// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use super::*;
use crate::config::LinkConfig;
use crate::provider::ProviderSettings;
use crate::test_support::{playing_json, MockProvider};

fn client_for(mock: &MockProvider) -> anyhow::Result<ProviderClient> {
    let config = LinkConfig::test(Path::new("/unused"), &mock.base_url());
    ProviderClient::new(ProviderSettings::from(&config), Some(Duration::from_secs(5)))
}

fn decode(json: serde_json::Value) -> anyhow::Result<Playback> {
    let response: PlaybackResponse = serde_json::from_value(json)?;
    Ok(response.into_playback())
}

#[test]
fn decodes_full_item() -> anyhow::Result<()> {
    let playback = decode(serde_json::json!({
        "is_playing": true,
        "item": {
            "id": "T1",
            "name": "Song A",
            "artists": [{ "name": "Artist" }, { "name": "Feature" }],
            "album": { "name": "Album" }
        }
    }))?;
    assert_eq!(
        playback,
        Playback::Track(PlaybackSnapshot {
            track_id: "T1".into(),
            title: "Song A".into(),
            artist_name: "Artist".into(),
            album_name: Some("Album".into()),
            is_playing: true,
        })
    );
    Ok(())
}

#[test]
fn missing_item_is_nothing() -> anyhow::Result<()> {
    assert_eq!(decode(serde_json::json!({ "is_playing": true, "item": null }))?, Playback::Nothing);
    assert_eq!(decode(serde_json::json!({ "is_playing": false }))?, Playback::Nothing);
    Ok(())
}

#[test]
fn local_file_without_id_gets_stable_key() -> anyhow::Result<()> {
    let json = serde_json::json!({
        "is_playing": true,
        "item": { "id": null, "name": "Demo", "artists": [] }
    });
    let first = decode(json.clone())?;
    let second = decode(json)?;
    assert_eq!(first, second);
    match first {
        Playback::Track(s) => {
            assert_eq!(s.track_id, "local:Demo:Unknown artist");
            assert_eq!(s.artist_name, "Unknown artist");
        }
        Playback::Nothing => anyhow::bail!("expected a track"),
    }
    Ok(())
}

#[tokio::test]
async fn no_content_is_nothing() -> anyhow::Result<()> {
    let mock = MockProvider::start(vec![], vec![(204, String::new())]).await?;
    let client = client_for(&mock)?;
    assert_eq!(client.currently_playing("AT1").await?, Playback::Nothing);
    assert_eq!(mock.playback_auth(), vec!["Bearer AT1".to_owned()]);
    Ok(())
}

#[tokio::test]
async fn playing_track_is_decoded() -> anyhow::Result<()> {
    let mock =
        MockProvider::start(vec![], vec![(200, playing_json("T1", "Song A", "Artist", false))])
            .await?;
    let client = client_for(&mock)?;
    match client.currently_playing("AT1").await? {
        Playback::Track(s) => {
            assert_eq!(s.track_id, "T1");
            assert!(!s.is_playing);
        }
        Playback::Nothing => anyhow::bail!("expected a track"),
    }
    Ok(())
}

#[tokio::test]
async fn unauthorized_is_status_error() -> anyhow::Result<()> {
    let mock = MockProvider::start(vec![], vec![(401, "{}".to_owned())]).await?;
    let client = client_for(&mock)?;
    let result = client.currently_playing("stale").await;
    assert!(matches!(result, Err(ProviderError::Status { status: 401, .. })), "got {result:?}");
    Ok(())
}

#[tokio::test]
async fn garbage_body_is_malformed() -> anyhow::Result<()> {
    let mock = MockProvider::start(vec![], vec![(200, "[1,2".to_owned())]).await?;
    let client = client_for(&mock)?;
    let result = client.currently_playing("AT1").await;
    assert!(matches!(result, Err(ProviderError::Malformed(_))), "got {result:?}");
    Ok(())
}

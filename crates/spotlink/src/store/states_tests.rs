// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::time::Duration;

use super::*;

#[tokio::test]
async fn resolve_consumes_exactly_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = StateMappingStore::new(Some(dir.path().join("states.json")), None);
    store.put("S1", "alice").await;

    assert_eq!(store.resolve_and_remove("S1").await.as_deref(), Some("alice"));
    assert_eq!(store.resolve_and_remove("S1").await, None);
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn unknown_state_leaves_store_and_file_unchanged() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("states.json");
    let store = StateMappingStore::new(Some(path.clone()), None);
    store.put("S1", "alice").await;
    let before = std::fs::read_to_string(&path)?;

    assert_eq!(store.resolve_and_remove("nope").await, None);

    assert_eq!(store.len().await, 1);
    assert_eq!(std::fs::read_to_string(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn file_is_flat_state_to_identity_object() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("states.json");
    let store = StateMappingStore::new(Some(path.clone()), None);
    store.put("S1", "alice").await;
    store.put("S2", "alice").await;
    store.put("S3", "bob").await;

    let on_disk: HashMap<String, String> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk["S2"], "alice");
    assert_eq!(on_disk["S3"], "bob");
    Ok(())
}

#[tokio::test]
async fn persist_then_reload_is_identical() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("states.json");
    let store = StateMappingStore::new(Some(path.clone()), None);
    store.put("S1", "alice").await;
    store.put("S2", "bob").await;
    store.persist_all().await?;

    let reloaded = StateMappingStore::new(Some(path), None);
    assert_eq!(reloaded.load_all().await?, 2);
    assert_eq!(reloaded.resolve_and_remove("S2").await.as_deref(), Some("bob"));
    assert_eq!(reloaded.resolve_and_remove("S1").await.as_deref(), Some("alice"));
    Ok(())
}

#[tokio::test]
async fn expired_state_does_not_resolve() -> anyhow::Result<()> {
    let store = StateMappingStore::new(None, Some(Duration::from_millis(20)));
    store.put("S1", "alice").await;
    tokio::time::sleep(Duration::from_millis(40)).await;

    assert_eq!(store.resolve_and_remove("S1").await, None);
    assert!(store.is_empty().await, "expired state is still consumed");
    Ok(())
}

#[tokio::test]
async fn sweep_removes_only_expired_states() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("states.json");
    let store = StateMappingStore::new(Some(path.clone()), Some(Duration::from_millis(50)));
    store.put("old", "alice").await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    store.put("fresh", "bob").await;

    assert_eq!(store.sweep_expired().await, 1);
    assert_eq!(store.len().await, 1);

    let on_disk: HashMap<String, String> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert!(on_disk.contains_key("fresh"));
    assert!(!on_disk.contains_key("old"));
    Ok(())
}

#[tokio::test]
async fn sweep_without_ttl_keeps_everything() {
    let store = StateMappingStore::new(None, None);
    store.put("S1", "alice").await;
    assert_eq!(store.sweep_expired().await, 0);
    assert_eq!(store.len().await, 1);
}

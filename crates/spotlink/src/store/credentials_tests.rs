// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use super::*;

fn credential(access: &str, refresh: &str, expires_at: u64) -> Credential {
    Credential {
        identity: String::new(),
        access_token: access.to_owned(),
        refresh_token: refresh.to_owned(),
        expires_at,
        last_track_id: None,
    }
}

#[tokio::test]
async fn absent_file_loads_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(Some(dir.path().join("missing.json")));
    assert_eq!(store.load_all().await?, 0);
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn put_sets_identity_and_writes_through() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = CredentialStore::new(Some(path.clone()));

    store.put("alice", credential("AT1", "RT1", 1_000)).await;

    let got = store.get("alice").await.ok_or_else(|| anyhow::anyhow!("missing alice"))?;
    assert_eq!(got.identity, "alice");

    let on_disk: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(on_disk["alice"]["accessToken"], "AT1");
    assert_eq!(on_disk["alice"]["refreshToken"], "RT1");
    assert_eq!(on_disk["alice"]["expiresAt"], 1_000);
    assert!(on_disk["alice"]["lastTrackId"].is_null());
    Ok(())
}

#[tokio::test]
async fn persist_then_reload_is_identical() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = CredentialStore::new(Some(path.clone()));
    store.put("alice", credential("AT1", "RT1", 1_000)).await;
    store.put("bob", credential("AT2", "", 2_000)).await;
    store.update("bob", |c| c.last_track_id = Some("T9".into())).await;
    store.persist_all().await?;

    let reloaded = CredentialStore::new(Some(path));
    assert_eq!(reloaded.load_all().await?, 2);
    assert_eq!(reloaded.get("alice").await, store.get("alice").await);
    assert_eq!(reloaded.get("bob").await, store.get("bob").await);
    Ok(())
}

#[tokio::test]
async fn update_missing_identity_is_noop() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = CredentialStore::new(Some(path.clone()));

    let updated = store.update("ghost", |c| c.access_token = "x".into()).await;
    assert!(updated.is_none());
    assert!(!path.exists(), "no write for a no-op update");
    Ok(())
}

#[tokio::test]
async fn remove_deletes_from_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = CredentialStore::new(Some(path.clone()));
    store.put("alice", credential("AT1", "RT1", 1_000)).await;

    assert!(store.remove("alice").await.is_some());
    assert!(store.remove("alice").await.is_none());

    let on_disk: HashMap<String, Credential> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert!(on_disk.is_empty());
    Ok(())
}

#[tokio::test]
async fn loads_legacy_record_without_identity_field() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    std::fs::write(
        &path,
        r#"{"carol": {"accessToken": "AT", "refreshToken": "RT", "expiresAt": 5}}"#,
    )?;
    let store = CredentialStore::new(Some(path));
    store.load_all().await?;
    let carol = store.get("carol").await.ok_or_else(|| anyhow::anyhow!("missing carol"))?;
    assert_eq!(carol.identity, "carol");
    assert_eq!(carol.last_track_id, None);
    Ok(())
}

#[tokio::test]
async fn persistence_failure_keeps_memory_authoritative() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // Parent "directory" is a regular file, so every save fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a dir")?;
    let store = CredentialStore::new(Some(blocker.join("tokens.json")));

    store.put("alice", credential("AT1", "RT1", 1_000)).await;

    assert!(store.is_linked("alice").await);
    assert!(store.persist_all().await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_lose_no_updates() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = Arc::new(CredentialStore::new(Some(path.clone())));

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let identity = format!("user-{i}");
            store.put(&identity, credential(&format!("AT{i}"), "RT", 1_000)).await;
            store.update(&identity, |c| c.last_track_id = Some(format!("T{i}"))).await;
        }));
    }
    for handle in handles {
        handle.await?;
    }

    let reloaded = CredentialStore::new(Some(path));
    assert_eq!(reloaded.load_all().await?, 32);
    for i in 0..32 {
        let c = reloaded
            .get(&format!("user-{i}"))
            .await
            .ok_or_else(|| anyhow::anyhow!("user-{i} lost"))?;
        assert_eq!(c.access_token, format!("AT{i}"));
        assert_eq!(c.last_track_id, Some(format!("T{i}")));
    }
    Ok(())
}

#[test]
fn expiry_boundary_counts_as_expired() {
    let c = credential("AT", "RT", 100);
    assert!(!c.is_expired_at(99));
    assert!(c.is_expired_at(100));
    assert!(c.is_expired_at(101));
}

fn arb_credential() -> impl Strategy<Value = Credential> {
    (
        "[a-zA-Z0-9_-]{0,24}",
        "[a-zA-Z0-9_-]{0,24}",
        any::<u64>(),
        proptest::option::of("[a-zA-Z0-9]{1,22}"),
    )
        .prop_map(|(access_token, refresh_token, expires_at, last_track_id)| Credential {
            identity: String::new(),
            access_token,
            refresh_token,
            expires_at,
            last_track_id,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reload_reproduces_mapping(records in proptest::collection::hash_map("[a-z]{1,12}", arb_credential(), 0..8)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tokens.json");

        let (written, reloaded) = rt.block_on(async {
            let store = CredentialStore::new(Some(path.clone()));
            for (identity, credential) in &records {
                store.put(identity, credential.clone()).await;
            }
            store.persist_all().await?;

            let reloaded = CredentialStore::new(Some(path.clone()));
            reloaded.load_all().await?;

            let mut written = Vec::new();
            let mut back = Vec::new();
            for identity in records.keys() {
                written.push(store.get(identity).await);
                back.push(reloaded.get(identity).await);
            }
            anyhow::Ok((written, back))
        }).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(written, reloaded);
    }
}

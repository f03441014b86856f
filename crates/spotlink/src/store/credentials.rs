// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable per-identity token records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::store::{epoch_secs, persist};

/// An identity's provider tokens and playback bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub identity: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Expiry as epoch seconds.
    #[serde(default)]
    pub expires_at: u64,
    #[serde(default)]
    pub last_track_id: Option<String>,
}

impl Credential {
    /// Whether the identity finished linking (an access token is present).
    pub fn is_linked(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// A token is still valid up to, but not including, its expiry second.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(epoch_secs())
    }
}

type CredentialMap = HashMap<String, Credential>;

/// Keeps at most one [`Credential`] per identity.
///
/// Every mutation rewrites the backing file while the map lock is held, so
/// file writes are totally ordered and each one contains every earlier update.
pub struct CredentialStore {
    path: Option<PathBuf>,
    entries: Mutex<CredentialMap>,
}

impl CredentialStore {
    /// Create a store backed by `path`, or memory-only when `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, entries: Mutex::new(HashMap::new()) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the in-memory mapping with the backing file's contents.
    /// An absent file yields an empty mapping.
    pub async fn load_all(&self) -> anyhow::Result<usize> {
        let Some(ref path) = self.path else {
            return Ok(0);
        };
        let mut loaded: CredentialMap = persist::load(path).await?;
        for (identity, credential) in loaded.iter_mut() {
            if credential.identity.is_empty() {
                credential.identity = identity.clone();
            }
        }
        let count = loaded.len();
        *self.entries.lock().await = loaded;
        Ok(count)
    }

    /// Write the full mapping to the backing file.
    pub async fn persist_all(&self) -> anyhow::Result<()> {
        let entries = self.entries.lock().await;
        self.write(&entries).await
    }

    pub async fn get(&self, identity: &str) -> Option<Credential> {
        self.entries.lock().await.get(identity).cloned()
    }

    /// Whether `identity` holds a credential with a non-empty access token.
    pub async fn is_linked(&self, identity: &str) -> bool {
        self.entries.lock().await.get(identity).is_some_and(Credential::is_linked)
    }

    /// Insert or replace the credential for `identity`.
    pub async fn put(&self, identity: &str, mut credential: Credential) {
        credential.identity = identity.to_owned();
        let mut entries = self.entries.lock().await;
        entries.insert(identity.to_owned(), credential);
        self.write_through(&entries).await;
    }

    /// Mutate an existing credential in place. Returns the updated record, or
    /// `None` (and writes nothing) when the identity has no credential.
    pub async fn update<F>(&self, identity: &str, f: F) -> Option<Credential>
    where
        F: FnOnce(&mut Credential),
    {
        let mut entries = self.entries.lock().await;
        let credential = entries.get_mut(identity)?;
        f(credential);
        let updated = credential.clone();
        self.write_through(&entries).await;
        Some(updated)
    }

    pub async fn remove(&self, identity: &str) -> Option<Credential> {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(identity);
        if removed.is_some() {
            self.write_through(&entries).await;
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Persist, logging failure; the in-memory mapping stays authoritative.
    async fn write_through(&self, entries: &CredentialMap) {
        if let Err(e) = self.write(entries).await {
            warn!(err = %e, "failed to persist credentials");
        }
    }

    async fn write(&self, entries: &CredentialMap) -> anyhow::Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        persist::save(path, entries).await?;
        debug!(path = %path.display(), count = entries.len(), "persisted credentials");
        Ok(())
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

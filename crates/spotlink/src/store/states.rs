// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable mapping from authorization `state` tokens to the identity that
//! requested them.
//!
//! The backing file is a flat `{state: identity}` object. Issue times are kept
//! in memory only; entries read from disk count as issued at load time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::store::persist;

struct PendingState {
    identity: String,
    issued_at: Instant,
}

impl PendingState {
    fn is_expired(&self, ttl: Option<Duration>, now: Instant) -> bool {
        ttl.is_some_and(|ttl| now.saturating_duration_since(self.issued_at) >= ttl)
    }
}

type StateMap = HashMap<String, PendingState>;

pub struct StateMappingStore {
    path: Option<PathBuf>,
    ttl: Option<Duration>,
    entries: Mutex<StateMap>,
}

impl StateMappingStore {
    /// Create a store backed by `path` (memory-only when `None`). States older
    /// than `ttl` no longer resolve; `None` keeps them forever.
    pub fn new(path: Option<PathBuf>, ttl: Option<Duration>) -> Self {
        Self { path, ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub async fn load_all(&self) -> anyhow::Result<usize> {
        let Some(ref path) = self.path else {
            return Ok(0);
        };
        let loaded: HashMap<String, String> = persist::load(path).await?;
        let now = Instant::now();
        let count = loaded.len();
        *self.entries.lock().await = loaded
            .into_iter()
            .map(|(state, identity)| (state, PendingState { identity, issued_at: now }))
            .collect();
        Ok(count)
    }

    pub async fn persist_all(&self) -> anyhow::Result<()> {
        let entries = self.entries.lock().await;
        self.write(&entries).await
    }

    /// Bind a freshly issued `state` to `identity`.
    pub async fn put(&self, state: &str, identity: &str) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            state.to_owned(),
            PendingState { identity: identity.to_owned(), issued_at: Instant::now() },
        );
        self.write_through(&entries).await;
    }

    /// Consume `state`, returning the identity it was issued to.
    ///
    /// An unknown state leaves the store untouched. An expired state is
    /// removed but does not resolve.
    pub async fn resolve_and_remove(&self, state: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let pending = entries.remove(state)?;
        self.write_through(&entries).await;
        if pending.is_expired(self.ttl, Instant::now()) {
            debug!(identity = %pending.identity, "authorization state expired");
            return None;
        }
        Some(pending.identity)
    }

    /// Drop every state older than the TTL. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, pending| !pending.is_expired(self.ttl, now));
        let removed = before - entries.len();
        if removed > 0 {
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

    async fn write_through(&self, entries: &StateMap) {
        if let Err(e) = self.write(entries).await {
            warn!(err = %e, "failed to persist state mapping");
        }
    }

    async fn write(&self, entries: &StateMap) -> anyhow::Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let flat: HashMap<&str, &str> =
            entries.iter().map(|(state, p)| (state.as_str(), p.identity.as_str())).collect();
        persist::save(path, &flat).await?;
        debug!(path = %path.display(), count = flat.len(), "persisted state mapping");
        Ok(())
    }
}

#[cfg(test)]
#[path = "states_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-flight callback journal.
//!
//! Callback records move here before the inbox is cleared and leave only once
//! their exchange has finished, so a crash in between can be replayed.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::inbox::CallbackRecord;
use crate::store::persist;

/// A callback whose exchange has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlight {
    pub code: String,
    /// Set once the state token has been resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

type JournalMap = HashMap<String, InFlight>;

/// Keyed by the callback's `state` token.
pub struct InFlightJournal {
    path: Option<PathBuf>,
    entries: Mutex<JournalMap>,
}

impl InFlightJournal {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, entries: Mutex::new(HashMap::new()) }
    }

    pub async fn load_all(&self) -> anyhow::Result<usize> {
        let Some(ref path) = self.path else {
            return Ok(0);
        };
        let loaded: JournalMap = persist::load(path).await?;
        let count = loaded.len();
        *self.entries.lock().await = loaded;
        Ok(count)
    }

    /// Record a batch of callbacks. States already in flight keep their entry.
    /// Returns the records that were newly added.
    ///
    /// Fails, leaving the journal as it was, when the batch cannot be written
    /// to disk.
    pub async fn record(&self, records: Vec<CallbackRecord>) -> anyhow::Result<Vec<CallbackRecord>> {
        let mut entries = self.entries.lock().await;
        let mut added = Vec::with_capacity(records.len());
        for record in records {
            if entries.contains_key(&record.state) {
                continue;
            }
            entries.insert(record.state.clone(), InFlight { code: record.code.clone(), identity: None });
            added.push(record);
        }
        if added.is_empty() {
            return Ok(added);
        }
        if let Some(ref path) = self.path {
            if let Err(e) = persist::save(path, &*entries).await {
                for record in &added {
                    entries.remove(&record.state);
                }
                return Err(e.context(format!("journal {}", path.display())));
            }
        }
        Ok(added)
    }

    /// Note which identity a journaled state resolved to.
    pub async fn assign(&self, state: &str, identity: &str) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(state) {
            entry.identity = Some(identity.to_owned());
            self.write_through(&entries).await;
        }
    }

    /// Forget a state whose exchange finished or whose state was unknown.
    pub async fn complete(&self, state: &str) {
        let mut entries = self.entries.lock().await;
        if entries.remove(state).is_some() {
            self.write_through(&entries).await;
        }
    }

    /// Snapshot of every pending entry as `(state, entry)`.
    pub async fn pending(&self) -> Vec<(String, InFlight)> {
        self.entries.lock().await.iter().map(|(s, e)| (s.clone(), e.clone())).collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn write_through(&self, entries: &JournalMap) {
        let Some(ref path) = self.path else {
            return;
        };
        if let Err(e) = persist::save(path, entries).await {
            warn!(path = %path.display(), err = %e, "failed to persist callback journal");
        }
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;

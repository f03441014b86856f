// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Callback ingestion and crash recovery.
//!
//! A batch is journaled before the inbox is cleared. Journal entries leave
//! only when their state is unknown or their exchange has finished.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::Engine;

impl Engine {
    /// Move every inbox record into the journal and dispatch its exchange.
    pub async fn ingest(self: &Arc<Self>) {
        let records = match self.inbox.read().await {
            Ok(records) => records,
            Err(e) if e.downcast_ref::<serde_json::Error>().is_some() => {
                match self.inbox.reject().await {
                    Ok(moved) => warn!(moved = %moved.display(), err = %e, "malformed callback inbox set aside"),
                    Err(re) => warn!(path = %self.inbox.path().display(), err = %re, "failed to set aside malformed callback inbox"),
                }
                return;
            }
            Err(e) => {
                warn!(path = %self.inbox.path().display(), err = %e, "unreadable callback inbox");
                return;
            }
        };
        if records.is_empty() {
            return;
        }

        let received = records.len();
        let added = match self.journal.record(records).await {
            Ok(added) => added,
            Err(e) => {
                warn!(err = %e, "failed to journal callbacks, inbox kept for next tick");
                return;
            }
        };
        if let Err(e) = self.inbox.clear().await {
            warn!(path = %self.inbox.path().display(), err = %e, "failed to clear callback inbox");
        }
        debug!(received, new = added.len(), "ingested callbacks");

        for record in added {
            self.resolve_and_dispatch(record.state, record.code).await;
        }
    }

    /// Re-dispatch callbacks journaled by a previous run. Returns how many.
    pub async fn recover(self: &Arc<Self>) -> usize {
        let pending = self.journal.pending().await;
        let count = pending.len();
        for (state, entry) in pending {
            match entry.identity {
                Some(identity) => self.dispatch_exchange(state, entry.code, identity),
                None => self.resolve_and_dispatch(state, entry.code).await,
            }
        }
        if count > 0 {
            info!(count, "recovered in-flight callbacks");
        }
        count
    }

    async fn resolve_and_dispatch(self: &Arc<Self>, state: String, code: String) {
        match self.states.resolve_and_remove(&state).await {
            Some(identity) => {
                self.journal.assign(&state, &identity).await;
                self.dispatch_exchange(state, code, identity);
            }
            None => {
                warn!("callback with unknown or expired state dropped");
                self.journal.complete(&state).await;
            }
        }
    }
}

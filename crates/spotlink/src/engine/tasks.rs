// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background units of work keyed by identity.
//!
//! Every unit runs inside its identity's exclusive section, so an exchange,
//! a refresh and a poll for the same identity never interleave their store
//! writes. Units for different identities run concurrently.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::task::TaskTracker;

/// Kinds of unit that are never run twice at once for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Poll,
    Status,
}

type IdentityLock = Arc<tokio::sync::Mutex<()>>;
type LockTable = Arc<Mutex<HashMap<String, IdentityLock>>>;

#[derive(Default)]
pub struct IdentityTasks {
    tracker: TaskTracker,
    /// Entries live only while a unit for the identity is queued or running.
    locks: LockTable,
    running: Arc<Mutex<HashSet<(UnitKind, String)>>>,
}

impl IdentityTasks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, identity: &str) -> IdentityLock {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(identity.to_owned()).or_default())
    }

    /// Spawn `fut` inside `identity`'s exclusive section.
    pub fn spawn<F>(&self, identity: &str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let lock = self.lock_for(identity);
        let table = Arc::clone(&self.locks);
        let identity = identity.to_owned();
        self.tracker.spawn(async move {
            let guard = Arc::clone(&lock).lock_owned().await;
            fut.await;
            drop(guard);
            release(&table, &identity, lock);
        });
    }

    /// Like [`spawn`](Self::spawn), but skipped (returning `false`) while a
    /// unit of the same kind is still running for `identity`.
    pub fn spawn_unique<F>(&self, kind: UnitKind, identity: &str, fut: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = (kind, identity.to_owned());
        if !self.running.lock().insert(key.clone()) {
            return false;
        }
        let done = RunningGuard { running: Arc::clone(&self.running), key: Some(key) };
        self.spawn(identity, async move {
            let _done = done;
            fut.await;
        });
        true
    }

    /// Number of units spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Number of identities holding an exclusive section.
    pub fn tracked_identities(&self) -> usize {
        self.locks.lock().len()
    }

    /// Wait until every unit spawned so far has finished.
    pub async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

/// Drop `identity`'s table entry unless another unit still holds a handle.
fn release(table: &LockTable, identity: &str, lock: IdentityLock) {
    let mut locks = table.lock();
    // The table's handle plus ours.
    if Arc::strong_count(&lock) == 2 && locks.get(identity).is_some_and(|l| Arc::ptr_eq(l, &lock)) {
        locks.remove(identity);
    }
}

/// Clears the running marker when the unit ends or is dropped.
struct RunningGuard {
    running: Arc<Mutex<HashSet<(UnitKind, String)>>>,
    key: Option<(UnitKind, String)>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.running.lock().remove(&key);
        }
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed stores: credentials, authorization states, in-flight callbacks.
//!
//! Each store owns a lock over its map and rewrites its whole file under that
//! lock on every mutation. Persistence failures are logged and never undo the
//! in-memory change.

pub mod credentials;
pub mod journal;
pub mod persist;
pub mod states;

use std::time::{SystemTime, UNIX_EPOCH};

pub use credentials::{Credential, CredentialStore};
pub use journal::{InFlight, InFlightJournal};
pub use states::StateMappingStore;

/// Current time as epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth token lifecycle engine.
//!
//! The host heartbeat calls [`Engine::tick`], which ingests callbacks on every
//! call and polls playback at most once per poll interval. Identity commands
//! arrive through [`Engine::command`]. Exchanges, refreshes and polls run as
//! background units in [`IdentityTasks`].

pub mod exchange;
pub mod heartbeat;
pub mod ingest;
pub mod link;
pub mod messages;
pub mod poller;
pub mod refresh;
pub mod tasks;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::host::{Command, Host};
use crate::inbox::CallbackInbox;
use crate::provider::{ProviderClient, ProviderSettings};
use crate::store::{CredentialStore, InFlightJournal, StateMappingStore};

pub use link::LinkOutcome;
pub use refresh::RefreshOutcome;
pub use tasks::{IdentityTasks, UnitKind};

pub struct Engine {
    provider: ProviderClient,
    credentials: CredentialStore,
    states: StateMappingStore,
    journal: InFlightJournal,
    inbox: CallbackInbox,
    host: Arc<dyn Host>,
    tasks: IdentityTasks,
    poll_interval: Duration,
    last_poll: parking_lot::Mutex<Option<Instant>>,
}

impl Engine {
    /// Build an engine whose stores live where `config` points.
    pub fn new(config: &LinkConfig, host: Arc<dyn Host>) -> anyhow::Result<Arc<Self>> {
        let provider = ProviderClient::new(ProviderSettings::from(config), config.http_timeout())?;
        Ok(Arc::new(Self {
            provider,
            credentials: CredentialStore::new(Some(config.credentials_path())),
            states: StateMappingStore::new(Some(config.states_path()), config.state_ttl()),
            journal: InFlightJournal::new(Some(config.journal_path())),
            inbox: CallbackInbox::new(config.inbox_path()),
            host,
            tasks: IdentityTasks::new(),
            poll_interval: config.poll_interval(),
            last_poll: parking_lot::Mutex::new(None),
        }))
    }

    /// Load every store from disk. Unreadable files are logged and start empty.
    pub async fn load(&self) {
        match self.credentials.load_all().await {
            Ok(count) => info!(count, "loaded credentials"),
            Err(e) => warn!(err = %e, "failed to load credentials"),
        }
        match self.states.load_all().await {
            Ok(count) => info!(count, "loaded state mappings"),
            Err(e) => warn!(err = %e, "failed to load state mappings"),
        }
        match self.journal.load_all().await {
            Ok(0) => {}
            Ok(count) => info!(count, "found in-flight callbacks from a previous run"),
            Err(e) => warn!(err = %e, "failed to load callback journal"),
        }
    }

    /// Heartbeat entry point.
    pub async fn tick(self: &Arc<Self>) {
        self.ingest().await;
        if self.poll_due() {
            self.poll_cycle().await;
        }
    }

    /// Dispatch a command issued by `identity`.
    pub async fn command(self: &Arc<Self>, identity: &str, command: Command) {
        debug!(identity, %command, "command");
        match command {
            Command::Link => self.handle_link(identity).await,
            Command::Status => self.status(identity).await,
            Command::Unlink => self.unlink(identity).await,
        }
    }

    /// Greet a linked identity when it joins the host.
    pub async fn joined(&self, identity: &str) {
        if self.credentials.is_linked(identity).await {
            self.host.send(identity, messages::WELCOME_LINKED);
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn states(&self) -> &StateMappingStore {
        &self.states
    }

    pub fn journal(&self) -> &InFlightJournal {
        &self.journal
    }

    pub fn inbox(&self) -> &CallbackInbox {
        &self.inbox
    }

    pub fn tasks(&self) -> &IdentityTasks {
        &self.tasks
    }

    /// Wait for every background unit spawned so far.
    pub async fn settle(&self) {
        self.tasks.settle().await;
    }

    /// True at most once per poll interval; the first call is always due.
    fn poll_due(&self) -> bool {
        let mut last = self.last_poll.lock();
        let now = Instant::now();
        match *last {
            Some(at) if now.duration_since(at) < self.poll_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

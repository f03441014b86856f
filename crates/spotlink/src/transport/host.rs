// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process host: a roster of identities, each with an outbox that HTTP
//! clients drain.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::host::Host;

/// A message waiting in an identity's outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    /// Present for clickable links; `text` is then the caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Default)]
pub struct LocalHost {
    outboxes: Mutex<BTreeMap<String, Vec<OutboundMessage>>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `identity` to the roster. Returns `false` if it was already present.
    pub fn join(&self, identity: &str) -> bool {
        let mut outboxes = self.outboxes.lock();
        if outboxes.contains_key(identity) {
            return false;
        }
        outboxes.insert(identity.to_owned(), Vec::new());
        true
    }

    /// Remove `identity` and discard its undelivered messages.
    pub fn part(&self, identity: &str) -> bool {
        self.outboxes.lock().remove(identity).is_some()
    }

    pub fn is_present(&self, identity: &str) -> bool {
        self.outboxes.lock().contains_key(identity)
    }

    /// Take every queued message for `identity`, or `None` if it is not present.
    pub fn drain(&self, identity: &str) -> Option<Vec<OutboundMessage>> {
        self.outboxes.lock().get_mut(identity).map(std::mem::take)
    }

    pub fn len(&self) -> usize {
        self.outboxes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outboxes.lock().is_empty()
    }

    fn push(&self, identity: &str, message: OutboundMessage) {
        if let Some(outbox) = self.outboxes.lock().get_mut(identity) {
            outbox.push(message);
        }
    }
}

impl Host for LocalHost {
    fn roster(&self) -> Vec<String> {
        self.outboxes.lock().keys().cloned().collect()
    }

    fn send(&self, identity: &str, text: &str) {
        self.push(identity, OutboundMessage { text: text.to_owned(), url: None });
    }

    fn send_link(&self, identity: &str, url: &str, caption: &str) {
        self.push(identity, OutboundMessage { text: caption.to_owned(), url: Some(url.to_owned()) });
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization request issuance and disconnect.

use tracing::info;

use crate::engine::{messages, Engine};
use crate::provider::oauth::generate_state;

/// Result of a link request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The identity already holds a usable credential; nothing was issued.
    AlreadyLinked,
    /// A fresh state was bound to the identity.
    Authorize { url: String, state: String },
}

impl Engine {
    /// Issue an authorize URL for `identity` unless it is already linked.
    ///
    /// Every call binds a new state; earlier states for the same identity stay
    /// valid until consumed or expired.
    pub async fn link(&self, identity: &str) -> LinkOutcome {
        if self.credentials.is_linked(identity).await {
            return LinkOutcome::AlreadyLinked;
        }
        let state = generate_state();
        self.states.put(&state, identity).await;
        let url = self.provider.authorize_url(&state);
        info!(identity, "issued authorization request");
        LinkOutcome::Authorize { url, state }
    }

    pub(crate) async fn handle_link(&self, identity: &str) {
        match self.link(identity).await {
            LinkOutcome::AlreadyLinked => self.host.send(identity, messages::ALREADY_LINKED),
            LinkOutcome::Authorize { url, .. } => {
                self.host.send_link(identity, &url, messages::LINK_CAPTION);
                self.host.send(identity, messages::LINK_HINT);
            }
        }
    }

    /// Forget `identity`'s credential, linked or not, and confirm.
    pub async fn unlink(&self, identity: &str) {
        if self.credentials.remove(identity).await.is_some() {
            info!(identity, "credential removed");
        }
        self.host.send(identity, messages::UNLINKED);
    }
}

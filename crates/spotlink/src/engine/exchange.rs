// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization code exchange.

use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::{messages, Engine};
use crate::store::{epoch_secs, Credential};

impl Engine {
    /// Exchange `code` for `identity` as a background unit, then retire the
    /// journal entry for `state` whatever the outcome.
    pub(crate) fn dispatch_exchange(self: &Arc<Self>, state: String, code: String, identity: String) {
        let engine = Arc::clone(self);
        let key = identity.clone();
        self.tasks.spawn(&key, async move {
            engine.exchange(&code, &identity).await;
            engine.journal.complete(&state).await;
        });
    }

    /// Trade an authorization code for a credential. Returns whether a
    /// credential was stored.
    pub async fn exchange(&self, code: &str, identity: &str) -> bool {
        let token = match self.provider.exchange_code(code).await {
            Ok(token) => token,
            Err(e) => {
                warn!(identity, err = %e, "code exchange failed");
                return false;
            }
        };
        if token.access_token.is_empty() {
            warn!(identity, "code exchange returned no access token");
            return false;
        }

        let credential = Credential {
            identity: identity.to_owned(),
            refresh_token: token.refresh_token.unwrap_or_default(),
            access_token: token.access_token,
            expires_at: epoch_secs().saturating_add(token.expires_in),
            last_track_id: None,
        };
        let expires_at = credential.expires_at;
        self.credentials.put(identity, credential).await;
        info!(identity, expires_at, "account linked");
        self.host.send(identity, messages::LINKED);
        true
    }
}

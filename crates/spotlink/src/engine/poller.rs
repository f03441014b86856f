// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Playback polling: the background "now playing" broadcast and the
//! interactive status reply.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::{messages, Engine, RefreshOutcome, UnitKind};
use crate::provider::{Playback, ProviderError};
use crate::store::Credential;

/// Why no usable access token is available.
enum NoAccess {
    NotLinked,
    Pending,
    Revoked,
    /// The token endpoint was unreachable; the credential is kept.
    Unreachable,
}

impl Engine {
    /// Poll every linked roster identity once. Identities whose previous
    /// poll is still running are skipped.
    pub async fn poll_cycle(self: &Arc<Self>) {
        let swept = self.states.sweep_expired().await;
        if swept > 0 {
            debug!(swept, "expired authorization states removed");
        }

        for identity in self.host.roster() {
            if !self.credentials.is_linked(&identity).await {
                continue;
            }
            let engine = Arc::clone(self);
            let id = identity.clone();
            let spawned = self.tasks.spawn_unique(UnitKind::Poll, &identity, async move {
                engine.poll_identity(&id).await;
            });
            if !spawned {
                debug!(identity, "previous poll still running");
            }
        }
    }

    /// Answer a status request privately as a background unit.
    pub(crate) async fn status(self: &Arc<Self>, identity: &str) {
        let engine = Arc::clone(self);
        let id = identity.to_owned();
        let spawned = self.tasks.spawn_unique(UnitKind::Status, identity, async move {
            engine.report_status(&id).await;
        });
        if !spawned {
            debug!(identity, "status request already in progress");
        }
    }

    async fn poll_identity(&self, identity: &str) {
        let Ok(credential) = self.access(identity).await else {
            return;
        };
        let track = match self.provider.currently_playing(&credential.access_token).await {
            Ok(Playback::Track(track)) => track,
            Ok(Playback::Nothing) => return,
            Err(e) => {
                debug!(identity, err = %e, "playback poll failed");
                return;
            }
        };
        if !track.is_playing || credential.last_track_id.as_deref() == Some(track.track_id.as_str()) {
            return;
        }

        let track_id = track.track_id.clone();
        if self.credentials.update(identity, |c| c.last_track_id = Some(track_id)).await.is_none() {
            return;
        }
        info!(identity, track_id = %track.track_id, "track changed");
        self.host.broadcast(&messages::now_playing(identity, &track));
    }

    async fn report_status(&self, identity: &str) {
        let credential = match self.access(identity).await {
            Ok(credential) => credential,
            Err(reason) => {
                let text = match reason {
                    NoAccess::NotLinked => messages::NOT_LINKED,
                    NoAccess::Pending => messages::LINK_PENDING,
                    NoAccess::Revoked => messages::REFRESH_FAILED,
                    NoAccess::Unreachable => messages::FETCH_ERROR,
                };
                self.host.send(identity, text);
                return;
            }
        };
        let reply = match self.provider.currently_playing(&credential.access_token).await {
            Ok(Playback::Track(track)) => messages::status_reply(&track),
            Ok(Playback::Nothing) => messages::NOTHING_PLAYING.to_owned(),
            Err(ProviderError::Status { status, .. }) => {
                warn!(identity, status, "status request rejected");
                messages::FETCH_FAILED.to_owned()
            }
            Err(e) => {
                warn!(identity, err = %e, "status request failed");
                messages::FETCH_ERROR.to_owned()
            }
        };
        self.host.send(identity, &reply);
    }

    /// The identity's credential with an unexpired access token, refreshing
    /// first when needed.
    async fn access(&self, identity: &str) -> Result<Credential, NoAccess> {
        let credential = self.credentials.get(identity).await.ok_or(NoAccess::NotLinked)?;
        if !credential.is_linked() {
            return Err(NoAccess::Pending);
        }
        if !credential.is_expired() {
            return Ok(credential);
        }
        match self.refresh(identity, &credential).await {
            RefreshOutcome::Refreshed(credential) => Ok(credential),
            RefreshOutcome::Revoked => Err(NoAccess::Revoked),
            RefreshOutcome::Failed => Err(NoAccess::Unreachable),
        }
    }
}

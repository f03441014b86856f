// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access token renewal.

use tracing::{info, warn};

use crate::engine::Engine;
use crate::provider::ProviderError;
use crate::store::{epoch_secs, Credential};

/// Result of a refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The stored credential now carries a fresh access token.
    Refreshed(Credential),
    /// The grant is gone; the credential was removed.
    Revoked,
    /// The provider could not be reached; the credential is unchanged.
    Failed,
}

impl Engine {
    /// Renew `credential` for `identity`.
    ///
    /// Rejected grants (any non-success status, an unreadable body, or a
    /// missing access token) remove the credential. Transport failures keep it
    /// for the next attempt.
    pub async fn refresh(&self, identity: &str, credential: &Credential) -> RefreshOutcome {
        if credential.refresh_token.trim().is_empty() {
            warn!(identity, "no refresh token; removing credential");
            self.credentials.remove(identity).await;
            return RefreshOutcome::Revoked;
        }

        let token = match self.provider.refresh(&credential.refresh_token).await {
            Ok(token) if !token.access_token.is_empty() => token,
            Ok(_) => {
                warn!(identity, "refresh returned no access token; removing credential");
                self.credentials.remove(identity).await;
                return RefreshOutcome::Revoked;
            }
            Err(ProviderError::Network(e)) => {
                warn!(identity, err = %e, "refresh request failed");
                return RefreshOutcome::Failed;
            }
            Err(e) => {
                warn!(identity, err = %e, "refresh rejected; removing credential");
                self.credentials.remove(identity).await;
                return RefreshOutcome::Revoked;
            }
        };

        let expires_at = epoch_secs().saturating_add(token.expires_in);
        let rotated = token.rotated_refresh_token().map(str::to_owned);
        let updated = self
            .credentials
            .update(identity, |c| {
                c.access_token = token.access_token;
                c.expires_at = expires_at;
                if let Some(rt) = rotated {
                    c.refresh_token = rt;
                }
            })
            .await;
        match updated {
            Some(credential) => {
                info!(identity, expires_at, "access token refreshed");
                RefreshOutcome::Refreshed(credential)
            }
            // Unlinked while the request was in flight.
            None => RefreshOutcome::Revoked,
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capabilities the engine needs from the chat host.
//!
//! The host owns the user directory and message delivery. It drives the
//! engine through [`Engine::tick`](crate::engine::Engine::tick),
//! [`Engine::command`](crate::engine::Engine::command) and
//! [`Engine::joined`](crate::engine::Engine::joined).

use std::fmt;
use std::str::FromStr;

pub trait Host: Send + Sync + 'static {
    /// Identities currently present on the host.
    fn roster(&self) -> Vec<String>;

    /// Deliver `text` privately to `identity`. Hosts drop messages for
    /// identities that are not present.
    fn send(&self, identity: &str, text: &str);

    /// Deliver a clickable link. Hosts without link support get plain text.
    fn send_link(&self, identity: &str, url: &str, caption: &str) {
        self.send(identity, &format!("{caption}: {url}"));
    }

    /// Deliver `text` to every identity on the roster.
    fn broadcast(&self, text: &str) {
        for identity in self.roster() {
            self.send(&identity, text);
        }
    }
}

/// Text commands an identity can direct at the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Issue an authorize URL, or report an existing link.
    Link,
    /// Report the current or paused track.
    Status,
    /// Remove the stored credential.
    Unlink,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Status => "status",
            Self::Unlink => "unlink",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    /// Accepts an optional leading `/` and the legacy `spotify`/`song`/`spotifyoff` names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix('/').unwrap_or(name);
        let name = name.split_whitespace().next().unwrap_or_default();
        match name.to_lowercase().as_str() {
            "link" | "spotify" => Ok(Self::Link),
            "status" | "song" => Ok(Self::Status),
            "unlink" | "spotifyoff" => Ok(Self::Unlink),
            other => anyhow::bail!("unknown command: {other}"),
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Callback inbox shared with the redirect endpoint.
//!
//! The endpoint appends `{code, state}` records to a JSON array file; the
//! ingester reads the whole file and deletes it once the batch is journaled.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::epoch_secs;

/// One authorization callback as delivered by the redirect endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRecord {
    #[serde(alias = "Code")]
    pub code: String,
    #[serde(alias = "State")]
    pub state: String,
}

pub struct CallbackInbox {
    path: PathBuf,
}

impl CallbackInbox {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every pending record. A missing, empty, or `null` file is an
    /// empty inbox.
    pub async fn read(&self) -> anyhow::Result<Vec<CallbackRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Option<Vec<CallbackRecord>> = serde_json::from_str(&contents)?;
        Ok(records.unwrap_or_default())
    }

    /// Move an inbox that cannot be parsed out of the way so later callbacks
    /// can land. Returns where it went.
    pub async fn reject(&self) -> anyhow::Result<PathBuf> {
        let name = self.path.file_name().unwrap_or_default().to_string_lossy();
        let target = self.path.with_file_name(format!("{name}.{}.rejected", epoch_secs()));
        tokio::fs::rename(&self.path, &target).await?;
        Ok(target)
    }

    /// Remove the inbox file in one step.
    pub async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "inbox_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the host adapter.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::host::{Command, Host};
use crate::transport::host::OutboundMessage;
use crate::transport::AppState;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub roster: usize,
    pub linked: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RosterResponse {
    pub identities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub identity: String,
    pub joined: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartResponse {
    pub identity: String,
    pub removed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub identity: String,
    pub command: String,
    pub accepted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub identity: String,
    pub messages: Vec<OutboundMessage>,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        roster: s.host.len(),
        linked: s.engine.credentials().len().await,
    })
}

/// `GET /api/v1/roster`
pub async fn roster(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(RosterResponse { identities: s.host.roster() })
}

/// `PUT /api/v1/roster/{identity}`: the identity joined the host.
pub async fn join(
    State(s): State<Arc<AppState>>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    let joined = s.host.join(&identity);
    if joined {
        tracing::debug!(identity = %identity, "joined");
        s.engine.joined(&identity).await;
    }
    Json(JoinResponse { identity, joined })
}

/// `DELETE /api/v1/roster/{identity}`: the identity left the host.
pub async fn part(
    State(s): State<Arc<AppState>>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    let removed = s.host.part(&identity);
    if removed {
        tracing::debug!(identity = %identity, "parted");
    }
    Json(PartResponse { identity, removed })
}

/// `POST /api/v1/roster/{identity}/commands`
pub async fn command(
    State(s): State<Arc<AppState>>,
    Path(identity): Path<String>,
    Json(req): Json<CommandRequest>,
) -> impl IntoResponse {
    let command: Command = match req.command.parse() {
        Ok(c) => c,
        Err(e) => return ApiError::BadRequest.to_http_response(e.to_string()).into_response(),
    };
    if !s.host.is_present(&identity) {
        return ApiError::IdentityNotFound
            .to_http_response(format!("{identity} is not on the roster"))
            .into_response();
    }
    s.engine.command(&identity, command).await;
    Json(CommandResponse { identity, command: command.to_string(), accepted: true })
        .into_response()
}

/// `GET /api/v1/roster/{identity}/messages`: drain the identity's outbox.
pub async fn messages(
    State(s): State<Arc<AppState>>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    match s.host.drain(&identity) {
        Some(messages) => Json(MessagesResponse { identity, messages }).into_response(),
        None => ApiError::IdentityNotFound
            .to_http_response(format!("{identity} is not on the roster"))
            .into_response(),
    }
}

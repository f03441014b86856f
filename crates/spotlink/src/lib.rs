// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spotlink: links chat identities to a streaming provider account through
//! OAuth and announces what they are playing.

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod inbox;
pub mod provider;
pub mod store;
pub mod test_support;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::LinkConfig;
use crate::engine::heartbeat::spawn_heartbeat;
use crate::engine::Engine;
use crate::transport::host::LocalHost;
use crate::transport::{build_router, AppState};

/// How long in-flight exchanges and polls may run after shutdown begins.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Run the adapter until Ctrl-C.
pub async fn run(config: LinkConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let host = Arc::new(LocalHost::new());
    let engine = Engine::new(&config, host.clone())?;
    engine.load().await;
    engine.recover().await;

    let heartbeat = spawn_heartbeat(Arc::clone(&engine), config.tick_interval(), shutdown.clone());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
            }
            shutdown.cancel();
        });
    }

    let state = Arc::new(AppState {
        engine: Arc::clone(&engine),
        host,
        auth_token: config.auth_token.clone(),
    });
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        data_dir = %config.data_dir().display(),
        inbox = %config.inbox_path().display(),
        "spotlink listening on {addr}"
    );
    axum::serve(listener, router).with_graceful_shutdown(shutdown.clone().cancelled_owned()).await?;

    shutdown.cancel();
    if let Err(e) = heartbeat.await {
        warn!(err = %e, "heartbeat task ended abnormally");
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, engine.settle()).await.is_err() {
        warn!(in_flight = engine.tasks().in_flight(), "abandoning unfinished units at shutdown");
    }
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a mock provider, a recording host, and
//! assertion helpers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::host::Host;

/// Canned `(status, body)` responses, indexed by call count. Once exhausted
/// the last response repeats; an empty list answers 500.
struct Script {
    responses: Vec<(u16, String)>,
    calls: AtomicU32,
}

impl Script {
    fn new(responses: Vec<(u16, String)>) -> Self {
        Self { responses, calls: AtomicU32::new(0) }
    }

    fn next(&self) -> (StatusCode, String) {
        let idx = self.calls.fetch_add(1, Ordering::Relaxed) as usize;
        let (status, body) = self
            .responses
            .get(idx)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or((500, "{}".to_owned()));
        (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body)
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct Recorded {
    token_forms: Mutex<Vec<String>>,
    playback_auth: Mutex<Vec<String>>,
}

/// Token and playback endpoints served by a real axum server on `127.0.0.1:0`.
pub struct MockProvider {
    addr: SocketAddr,
    token: Arc<Script>,
    playback: Arc<Script>,
    recorded: Arc<Recorded>,
}

impl MockProvider {
    pub async fn start(
        token: Vec<(u16, String)>,
        playback: Vec<(u16, String)>,
    ) -> anyhow::Result<Self> {
        let token = Arc::new(Script::new(token));
        let playback = Arc::new(Script::new(playback));
        let recorded = Arc::new(Recorded::default());

        let app = Router::new()
            .route(
                "/api/token",
                post({
                    let token = Arc::clone(&token);
                    let recorded = Arc::clone(&recorded);
                    move |body: String| async move {
                        recorded.token_forms.lock().push(body);
                        token.next()
                    }
                }),
            )
            .route(
                "/v1/me/player/currently-playing",
                get({
                    let playback = Arc::clone(&playback);
                    let recorded = Arc::clone(&recorded);
                    move |headers: HeaderMap| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_owned();
                        recorded.playback_auth.lock().push(auth);
                        playback.next()
                    }
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self { addr, token, playback, recorded })
    }

    /// Base URL for [`LinkConfig::test`](crate::config::LinkConfig::test).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn token_calls(&self) -> u32 {
        self.token.calls()
    }

    pub fn playback_calls(&self) -> u32 {
        self.playback.calls()
    }

    /// Raw form bodies posted to the token endpoint, in arrival order.
    pub fn token_requests(&self) -> Vec<String> {
        self.recorded.token_forms.lock().clone()
    }

    /// `Authorization` header of every playback request.
    pub fn playback_auth(&self) -> Vec<String> {
        self.recorded.playback_auth.lock().clone()
    }
}

/// Token endpoint success body.
pub fn token_json(access_token: &str, refresh_token: Option<&str>, expires_in: u64) -> String {
    let mut body = serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "user-read-currently-playing user-read-playback-state",
    });
    if let Some(rt) = refresh_token {
        body["refresh_token"] = serde_json::Value::String(rt.to_owned());
    }
    body.to_string()
}

/// Playback endpoint body for a single-artist track.
pub fn playing_json(id: &str, name: &str, artist: &str, is_playing: bool) -> String {
    serde_json::json!({
        "is_playing": is_playing,
        "item": {
            "id": id,
            "name": name,
            "artists": [{ "name": artist }],
            "album": { "name": format!("{name} (album)") },
        }
    })
    .to_string()
}

/// One delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub identity: String,
    pub text: String,
    pub url: Option<String>,
}

/// [`Host`] that records every delivery. Messages for identities not on the
/// roster are dropped, like a real host.
#[derive(Default)]
pub struct RecordingHost {
    roster: Mutex<Vec<String>>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingHost {
    pub fn new(roster: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            roster: Mutex::new(roster.iter().map(|s| (*s).to_owned()).collect()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn join(&self, identity: &str) {
        let mut roster = self.roster.lock();
        if !roster.iter().any(|i| i == identity) {
            roster.push(identity.to_owned());
        }
    }

    pub fn part(&self, identity: &str) {
        self.roster.lock().retain(|i| i != identity);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Texts delivered to `identity`, oldest first.
    pub fn messages_for(&self, identity: &str) -> Vec<String> {
        self.sent.lock().iter().filter(|s| s.identity == identity).map(|s| s.text.clone()).collect()
    }

    /// URLs delivered to `identity` as links.
    pub fn links_for(&self, identity: &str) -> Vec<String> {
        self.sent.lock().iter().filter(|s| s.identity == identity).filter_map(|s| s.url.clone()).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    fn present(&self, identity: &str) -> bool {
        self.roster.lock().iter().any(|i| i == identity)
    }

    fn record(&self, identity: &str, text: &str, url: Option<&str>) {
        if !self.present(identity) {
            return;
        }
        self.sent.lock().push(Sent {
            identity: identity.to_owned(),
            text: text.to_owned(),
            url: url.map(str::to_owned),
        });
    }
}

impl Host for RecordingHost {
    fn roster(&self) -> Vec<String> {
        self.roster.lock().clone()
    }

    fn send(&self, identity: &str, text: &str) {
        self.record(identity, text, None);
    }

    fn send_link(&self, identity: &str, url: &str, caption: &str) {
        self.record(identity, caption, Some(url));
    }
}

/// Assert that a `Result` is `Err` and its message contains a substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

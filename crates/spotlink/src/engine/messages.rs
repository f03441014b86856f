// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing message text.

use crate::provider::PlaybackSnapshot;

pub const ALREADY_LINKED: &str = "Your Spotify account is already connected!";
pub const LINK_CAPTION: &str = "Click here to connect your Spotify account";
pub const LINK_HINT: &str = "Connect your Spotify account using the link above.";
pub const LINKED: &str = "Your Spotify account has been connected successfully!";
pub const NOT_LINKED: &str = "You need to connect your Spotify account first. Type /link";
pub const LINK_PENDING: &str =
    "Your Spotify authentication is still processing. Please wait a moment and try again.";
pub const REFRESH_FAILED: &str =
    "Failed to refresh your Spotify connection. Please reconnect with /link";
pub const NOTHING_PLAYING: &str = "You're not currently playing anything on Spotify.";
pub const FETCH_FAILED: &str = "Failed to get your current track. Please try again.";
pub const FETCH_ERROR: &str = "An error occurred while fetching your current track.";
pub const UNLINKED: &str = "Your Spotify connection has been removed.";
pub const WELCOME_LINKED: &str =
    "Your Spotify is connected! We'll show what you're listening to. Type /status to see your current track.";

/// Broadcast line announcing a new track.
pub fn now_playing(identity: &str, track: &PlaybackSnapshot) -> String {
    format!("🎵 {identity} is now playing: {} by {}", track.title, track.artist_name)
}

/// Private reply to a status request.
pub fn status_reply(track: &PlaybackSnapshot) -> String {
    if track.is_playing {
        format!("🎵 Now playing: {} by {}", track.title, track.artist_name)
    } else {
        format!("⏸️ Paused: {} by {}", track.title, track.artist_name)
    }
}

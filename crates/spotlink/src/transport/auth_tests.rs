// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::HeaderValue;

use super::*;

fn headers(auth: Option<&str>) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Some(value) = auth {
        if let Ok(v) = HeaderValue::from_str(value) {
            map.insert("authorization", v);
        }
    }
    map
}

#[yare::parameterized(
    disabled        = { None, None, true },
    disabled_extra  = { None, Some("Bearer anything"), true },
    matching        = { Some("secret"), Some("Bearer secret"), true },
    missing         = { Some("secret"), None, false },
    wrong_token     = { Some("secret"), Some("Bearer secreT"), false },
    wrong_length    = { Some("secret"), Some("Bearer secret2"), false },
    wrong_scheme    = { Some("secret"), Some("Basic secret"), false },
)]
fn bearer_validation(expected: Option<&str>, header: Option<&str>, ok: bool) {
    assert_eq!(validate_bearer(&headers(header), expected).is_ok(), ok);
}

#[test]
fn constant_time_eq_matches_equality() {
    assert!(constant_time_eq("abc", "abc"));
    assert!(!constant_time_eq("abc", "abd"));
    assert!(!constant_time_eq("abc", "ab"));
    assert!(constant_time_eq("", ""));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    unauthorized = { ApiError::Unauthorized, 401, "UNAUTHORIZED" },
    bad_request  = { ApiError::BadRequest, 400, "BAD_REQUEST" },
    not_found    = { ApiError::IdentityNotFound, 404, "IDENTITY_NOT_FOUND" },
)]
fn error_maps_to_status_and_code(err: ApiError, status: u16, code: &str) {
    assert_eq!(err.http_status(), status);
    assert_eq!(err.to_string(), code);

    let (http, Json(body)) = err.to_http_response("nope");
    assert_eq!(http.as_u16(), status);
    assert_eq!(body.error.code, code);
    assert_eq!(body.error.message, "nope");
}

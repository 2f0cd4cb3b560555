//! JSON message envelopes and authentication diagnostic headers.

use axum::Json;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gateward_auth::TokenError;

pub const TOKEN_ERROR: HeaderName = HeaderName::from_static("token-error");
pub const TOKEN_ERROR_ISS: HeaderName = HeaderName::from_static("token-error-iss");
pub const TOKEN_ERROR_AUD: HeaderName = HeaderName::from_static("token-error-aud");
pub const TOKEN_EXPIRED: HeaderName = HeaderName::from_static("token-expired");

/// The `{status, msg}` body used for every auth-related response.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub status: u16,
    pub msg: String,
}

pub fn message(status: StatusCode, msg: impl Into<String>) -> Response {
    (
        status,
        Json(ApiMessage {
            status: status.as_u16(),
            msg: msg.into(),
        }),
    )
        .into_response()
}

/// 401 challenge, with a diagnostic header naming the token failure when the
/// request carried a token at all.
pub fn challenge(error: Option<&TokenError>) -> Response {
    let mut res = message(StatusCode::UNAUTHORIZED, "unauthorized");
    if let Some(error) = error {
        let (name, value) = match error {
            TokenError::Expired => (TOKEN_EXPIRED, "true".to_string()),
            TokenError::WrongIssuer => (TOKEN_ERROR_ISS, error.to_string()),
            TokenError::WrongAudience => (TOKEN_ERROR_AUD, error.to_string()),
            other => (TOKEN_ERROR, other.to_string()),
        };
        let value = HeaderValue::from_str(&value)
            .unwrap_or_else(|_| HeaderValue::from_static("token rejected"));
        res.headers_mut().insert(name, value);
    }
    res
}

/// Authorization denial: request-scoped status and message when the engine
/// set them, generic bodies otherwise.
pub fn forbid(status: u16, reason: Option<String>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FORBIDDEN);
    match reason {
        Some(msg) => message(status, msg),
        None if status.is_server_error() => message(status, "internal error"),
        None => message(status, "forbidden"),
    }
}

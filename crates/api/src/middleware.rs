use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use gateward_auth::{DOCS_SESSION_KEY, DOCS_SESSION_OK, Outcome, RequestCtx, TokenClaims};

use crate::app::AppState;
use crate::context::PrincipalContext;
use crate::response;

/// Path prefix where the token may ride in the `access_token` query
/// parameter (browser event-stream clients cannot set headers).
const STREAM_PATH: &str = "/stream";

/// Authorization guard applied to every protected route.
///
/// Adapts the HTTP request into a [`RequestCtx`], runs the engine, and maps
/// the outcome back to a response. Token decode failures short-circuit here
/// with the diagnostic headers; the engine only ever sees verified claims.
pub async fn authorize_guard(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_lowercase();
    let method = req.method().as_str().to_string();
    let form_content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

    let claims: Option<TokenClaims> = match extract_token(&req, &path) {
        Some(token) => match state.codec.decode(&token) {
            Ok(claims) => {
                // Independent HMAC recompute on top of the library check.
                if !state.codec.verify_signature(&token) {
                    return response::challenge(Some(
                        &gateward_auth::TokenError::InvalidSignature,
                    ));
                }
                Some(claims)
            }
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "token rejected");
                return response::challenge(Some(&e));
            }
        },
        None => None,
    };

    let docs_session =
        state.sessions.get_string(DOCS_SESSION_KEY).as_deref() == Some(DOCS_SESSION_OK);

    let ctx = RequestCtx {
        path: &path,
        method: &method,
        form_content_type,
        principal: claims.as_ref(),
        docs_session,
    };

    match state.engine.authorize(&ctx, Utc::now()).await {
        Outcome::Allow => {
            if let Some(claims) = &claims {
                req.extensions_mut()
                    .insert(PrincipalContext::from_claims(claims));
            }
            next.run(req).await
        }
        Outcome::Challenge { .. } => response::challenge(None),
        Outcome::Deny { status, reason } => response::forbid(status, reason),
    }
}

fn extract_token(req: &Request<Body>, path: &str) -> Option<String> {
    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        return Some(token.to_string());
    }

    if path.starts_with(STREAM_PATH) {
        let query = req.uri().query()?;
        let token = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("access_token="))?;
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

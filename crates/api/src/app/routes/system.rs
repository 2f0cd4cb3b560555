use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::app::AppState;
use crate::context::PrincipalContext;
use crate::response;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(principal: Option<Extension<PrincipalContext>>) -> impl IntoResponse {
    match principal {
        Some(Extension(p)) => Json(serde_json::json!({
            "user_id": p.user_id().map(|id| id.as_i64()),
            "roles": p.roles(),
        })),
        // Bypass paths (docs session, load-test switch) carry no principal.
        None => Json(serde_json::json!({
            "user_id": null,
            "roles": [],
        })),
    }
}

/// Streaming entrypoint; the guard accepts `access_token` in the query
/// string here. A plain acknowledgement stands in for the hub protocol.
pub async fn stream(principal: Option<Extension<PrincipalContext>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "connected": true,
        "user_id": principal
            .as_ref()
            .and_then(|Extension(p)| p.user_id())
            .map(|id| id.as_i64()),
    }))
}

/// Coarse policy gate layered on top of per-URL matching: the caller must
/// also satisfy the named role policy.
pub async fn admin_overview(
    State(state): State<AppState>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    let roles: Vec<String> = principal
        .map(|Extension(p)| p.roles().to_vec())
        .unwrap_or_default();

    if state.policies.check("SystemOrAdmin", &roles) != Some(true) {
        return response::message(StatusCode::FORBIDDEN, "forbidden");
    }

    match state.users.list_users().await {
        Ok(users) => Json(serde_json::json!({ "user_count": users.len() })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "overview query failed");
            response::message(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

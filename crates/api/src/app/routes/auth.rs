//! Login endpoint: credential check and token issuance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use gateward_auth::password_digest;

use crate::app::AppState;
use crate::response;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub name: String,
    pub pass: String,
}

#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub success: bool,
    pub token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
}

/// POST /api/login (form-encoded). The only guarded route the engine admits
/// without a principal.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let digest = password_digest(&form.pass);
    let user = match state.users.find_user_by_login(&form.name, &digest).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "login lookup failed");
            return response::message(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };
    let Some(user) = user else {
        tracing::info!(name = %form.name, "login rejected");
        return response::message(StatusCode::UNAUTHORIZED, "login failed");
    };

    match state.codec.issue(user.id, &user.roles, Utc::now()) {
        Ok(token) => {
            tracing::info!(user_id = %user.id, "token issued");
            Json(TokenInfo {
                success: true,
                token,
                expires_in: state.codec.ttl_seconds(),
                token_type: "Bearer",
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "token issuance failed");
            response::message(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

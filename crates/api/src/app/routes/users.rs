//! Guarded user reads.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gateward_auth::AuthUser;
use gateward_core::UserId;

use crate::app::AppState;
use crate::response;

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub login_name: String,
    pub enabled: bool,
}

impl From<AuthUser> for UserView {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id.as_i64(),
            login_name: user.login_name,
            enabled: user.enabled,
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    match state.users.list_users().await {
        Ok(users) => {
            let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();
            Json(views).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "user listing failed");
            response::message(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.users.find_user_by_id(UserId::new(id)).await {
        // Soft-deleted accounts are indistinguishable from absent ones.
        Ok(Some(user)) if !user.deleted => Json(UserView::from(user)).into_response(),
        Ok(_) => response::message(StatusCode::NOT_FOUND, "not found"),
        Err(e) => {
            tracing::error!(user_id = id, error = %e, "user lookup failed");
            response::message(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

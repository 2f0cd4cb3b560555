use axum::{
    Router,
    routing::{get, post},
};

use crate::app::AppState;

pub mod auth;
pub mod orders;
pub mod system;
pub mod users;

/// Router for all guarded endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/users", get(users::list))
        .route("/api/users/:id", get(users::get_by_id))
        .route("/api/orders/:id", get(orders::get_by_id))
        .route("/api/admin/overview", get(system::admin_overview))
        .route("/api/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
}

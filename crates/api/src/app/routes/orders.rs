//! Sample order read.
//!
//! Exists so deployments have a second guarded URL family: a role whose
//! permission rows only cover `/api/users.*` must be denied here before the
//! handler runs.

use axum::Json;
use axum::extract::Path;
use axum::response::IntoResponse;

pub async fn get_by_id(Path(id): Path<i64>) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": id,
        "state": "open",
    }))
}

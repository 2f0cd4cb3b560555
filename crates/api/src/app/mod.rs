//! Application wiring: shared state and the router.

use std::sync::Arc;

use axum::{Router, routing::get};

use gateward_auth::{
    AuthSettings, Engine, PermissionSource, PolicyRegistry, SessionStore, TokenCodec, UserStore,
};

use crate::middleware;

pub mod routes;

/// Everything a handler or the guard needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub engine: Arc<Engine>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub policies: Arc<PolicyRegistry>,
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(
    settings: AuthSettings,
    users: Arc<dyn UserStore>,
    permissions: Arc<dyn PermissionSource>,
    sessions: Arc<dyn SessionStore>,
) -> Router {
    let codec = Arc::new(settings.codec());
    let requirement = Arc::new(settings.requirement());
    let engine = Arc::new(Engine::new(requirement, users.clone(), permissions));

    let state = AppState {
        codec,
        engine,
        users,
        sessions,
        policies: Arc::new(PolicyRegistry::builtin()),
    };

    // Everything except /health goes through the authorization guard; the
    // login route included, since the engine itself admits the
    // unauthenticated login POST.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::authorize_guard,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .with_state(state)
}

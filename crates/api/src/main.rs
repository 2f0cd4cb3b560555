use std::sync::Arc;

use gateward_auth::{AuthSettings, SecretSource, password_digest};
use gateward_infra::{MemoryAuthStore, MemorySessionStore, PgAuthStore, SecretSettings};

#[tokio::main]
async fn main() {
    gateward_observability::init();

    let secret = SecretSettings::from_env()
        .resolve_signing_secret()
        .unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

    let settings = AuthSettings {
        secret,
        ..Default::default()
    };

    let sessions = Arc::new(MemorySessionStore::new());
    let app = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = Arc::new(
                PgAuthStore::connect(&url)
                    .await
                    .expect("database connection failed"),
            );
            gateward_api::app::build_app(settings, store.clone(), store, sessions)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; serving seeded in-memory stores");
            let store = Arc::new(seeded_dev_store());
            gateward_api::app::build_app(settings, store.clone(), store, sessions)
        }
    };

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().expect("local addr"));

    axum::serve(listener, app).await.expect("server error");
}

fn seeded_dev_store() -> MemoryAuthStore {
    MemoryAuthStore::new()
        .with_user(1, "admin", &password_digest("admin"), &["Admin"])
        .with_user(2, "root", &password_digest("root"), &["SuperAdmin"])
        .with_permission(1, 10, "Admin", "/api/users.*")
        .with_permission(2, 10, "Admin", "/api/whoami")
        .with_permission(3, 10, "Admin", "/api/admin/overview")
        .with_permission(4, 10, "Admin", "/stream.*")
}

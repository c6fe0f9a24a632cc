//! Router smoke tests over a lazily-connected pool; no database is
//! required because none of the exercised routes query it.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use stanza_api::config::ServerConfig;
use stanza_api::router::build_app_router;
use stanza_api::state::AppState;
use stanza_core::transformer::TransformerRegistry;
use stanza_importer::db_store::DbContentStore;
use stanza_importer::finalize::ParentCache;
use stanza_importer::transformers::register_defaults;
use tower::util::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 5,
        cors_allowed_origins: vec!["https://cms.example.com".to_string()],
    }
}

fn test_state(config: &ServerConfig) -> AppState {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/stanza_test")
        .expect("lazy pool");

    let mut registry = TransformerRegistry::new();
    register_defaults(&mut registry);

    AppState {
        store: Arc::new(DbContentStore::new(pool.clone())),
        pool,
        config: Arc::new(config.clone()),
        registry: Arc::new(registry),
        parent_cache: Arc::new(ParentCache::new()),
        event_bus: Arc::new(stanza_events::EventBus::default()),
    }
}

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let config = test_config();
    let app = build_app_router(test_state(&config), &config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let config = test_config();
    let app = build_app_router(test_state(&config), &config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

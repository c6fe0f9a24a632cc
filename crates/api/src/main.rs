use std::net::SocketAddr;
use std::sync::Arc;

use stanza_api::config::ServerConfig;
use stanza_api::router::build_app_router;
use stanza_api::state::AppState;
use stanza_core::transformer::TransformerRegistry;
use stanza_importer::db_store::DbContentStore;
use stanza_importer::finalize::ParentCache;
use stanza_importer::transformers::register_defaults;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stanza_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = stanza_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    stanza_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    stanza_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Transformer registry ---
    let mut registry = TransformerRegistry::new();
    register_defaults(&mut registry);

    // --- Event bus ---
    let event_bus = Arc::new(stanza_events::EventBus::default());

    let state = AppState {
        store: Arc::new(DbContentStore::new(pool.clone())),
        pool,
        config: Arc::new(config.clone()),
        registry: Arc::new(registry),
        parent_cache: Arc::new(ParentCache::new()),
        event_bus,
    };

    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(config.host.parse().expect("Invalid HOST"), config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

use std::sync::Arc;
use std::time::Duration;

use stanza_core::transformer::TransformerRegistry;
use stanza_events::EventBus;
use stanza_importer::db_store::DbContentStore;
use stanza_importer::finalize::ParentCache;
use stanza_importer::runtime::{WorkerDeps, WorkerRuntime};
use stanza_importer::transformers::register_defaults;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stanza_worker=debug,stanza_importer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = stanza_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    stanza_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    // Transformers are registered once here; the registry is read-only
    // for the rest of the process lifetime.
    let mut registry = TransformerRegistry::new();
    register_defaults(&mut registry);

    let deps = WorkerDeps {
        store: Arc::new(DbContentStore::new(pool.clone())),
        pool,
        registry: Arc::new(registry),
        events: Arc::new(EventBus::default()),
        parent_cache: Arc::new(ParentCache::new()),
    };

    let cancel = CancellationToken::new();
    let mut runtime = WorkerRuntime::new(deps);
    if let Some(poll_interval) = std::env::var("WORKER_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
    {
        runtime = runtime.with_poll_interval(poll_interval);
    }

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    runtime.run(cancel).await;
}

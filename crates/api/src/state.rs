use std::sync::Arc;

use stanza_core::transformer::TransformerRegistry;
use stanza_importer::db_store::DbContentStore;
use stanza_importer::finalize::ParentCache;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stanza_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Read-only transformer lookup table, built at startup.
    pub registry: Arc<TransformerRegistry>,
    /// Destination content store.
    pub store: Arc<DbContentStore>,
    /// Per-import parent lookup cache shared with the orchestrator.
    pub parent_cache: Arc<ParentCache>,
    /// Centralized event bus for publishing pipeline events.
    pub event_bus: Arc<stanza_events::EventBus>,
}

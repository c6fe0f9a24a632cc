//! Post-import finalization: rebuild the destination collection's tree.
//!
//! Runs at most once per entries run, after every batch has finished.
//! The rebuild is idempotent: it recomputes the full ordering from the
//! collection's current parent references, so a duplicate invocation
//! rewrites the same placements.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use stanza_core::import::Destination;
use stanza_core::pipeline_events::EVENT_RUN_COMPLETED;
use stanza_core::tree::{build_tree, EntryRef};
use stanza_core::types::DbId;
use stanza_db::repositories::ImportRepo;
use stanza_db::DbPool;
use stanza_events::{EventBus, PipelineEvent};
use tokio::sync::RwLock;

use crate::error::ImporterError;
use crate::store::ContentStore;

// ---------------------------------------------------------------------------
// ParentCache
// ---------------------------------------------------------------------------

/// Per-import memo of the destination collection's tree rows.
///
/// Read-through: the first tree rebuild of a run loads the rows from the
/// store and caches them under the import's id; the only invalidation is
/// [`forget`](ParentCache::forget) at run start. Entries modified mid-run
/// by unrelated actors may therefore be seen stale until the next run;
/// that window is accepted.
#[derive(Default)]
pub struct ParentCache {
    inner: RwLock<HashMap<DbId, Arc<Vec<EntryRef>>>>,
}

impl ParentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop whatever is cached for an import. Called at run start.
    pub async fn forget(&self, import_id: DbId) {
        self.inner.write().await.remove(&import_id);
    }

    pub async fn get(&self, import_id: DbId) -> Option<Arc<Vec<EntryRef>>> {
        self.inner.read().await.get(&import_id).cloned()
    }

    pub async fn store(&self, import_id: DbId, rows: Vec<EntryRef>) -> Arc<Vec<EntryRef>> {
        let rows = Arc::new(rows);
        self.inner
            .write()
            .await
            .insert(import_id, Arc::clone(&rows));
        rows
    }
}

// ---------------------------------------------------------------------------
// Tree rebuild
// ---------------------------------------------------------------------------

/// Recompute and persist the hierarchical ordering of the import's
/// destination collection, then close out the run.
pub async fn rebuild_tree(
    pool: &DbPool,
    store: &dyn ContentStore,
    parent_cache: &ParentCache,
    events: &EventBus,
    import_id: DbId,
) -> Result<(), ImporterError> {
    let import = ImportRepo::find_by_id(pool, import_id)
        .await?
        .ok_or(ImporterError::ImportNotFound(import_id))?;

    let Destination::Entries { collection } = import.destination()? else {
        // Only entries destinations carry a tree; nothing to do.
        return Ok(());
    };

    let rows = match parent_cache.get(import_id).await {
        Some(rows) => rows,
        None => {
            let loaded = store.collection_tree_rows(&collection).await?;
            parent_cache.store(import_id, loaded).await
        }
    };

    let placements = build_tree(&rows);
    store.persist_tree(&collection, &placements).await?;

    ImportRepo::finish_finalizing(pool, import_id).await?;

    tracing::info!(
        import_id,
        collection = %collection,
        entries = placements.len(),
        "Collection tree rebuilt",
    );
    events.publish(
        PipelineEvent::new(EVENT_RUN_COMPLETED)
            .with_import(import_id)
            .with_payload(json!({ "collection": collection, "entries": placements.len() })),
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

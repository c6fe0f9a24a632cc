//! Interfaces to the destination content platform.
//!
//! The pipeline writes records and reads schemas through these traits so
//! the import machinery stays independent of how content is stored.
//! Production wiring uses [`crate::db_store::DbContentStore`]; tests use
//! in-memory fakes.

use async_trait::async_trait;
use stanza_core::blueprint::Blueprint;
use stanza_core::import::Destination;
use stanza_core::tree::{EntryRef, TreePlacement};
use stanza_core::types::DbId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown taxonomy: {0}")]
    UnknownTaxonomy(String),

    /// The destination refused the record (e.g. no usable slug or email
    /// could be derived from the payload).
    #[error("Record rejected: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The field values written for one destination record.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Handle to a created (or updated) destination record.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    pub id: DbId,
    /// The record's natural key: entry/term slug, or user email.
    pub key: String,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read-only access to destination schemas.
#[async_trait]
pub trait BlueprintProvider: Send + Sync {
    /// The blueprint describing a destination's fields.
    async fn blueprint(&self, destination: &Destination) -> Result<Blueprint, StoreError>;
}

/// Write access to the destination content stores.
///
/// One call to [`write`](ContentStore::write) is the single destination
/// write a source row produces.
#[async_trait]
pub trait ContentStore: BlueprintProvider {
    /// Write one record to the destination, returning its handle.
    async fn write(
        &self,
        destination: &Destination,
        payload: &Payload,
    ) -> Result<RecordHandle, StoreError>;

    /// The tree-relevant view of every entry in a collection.
    async fn collection_tree_rows(&self, collection: &str) -> Result<Vec<EntryRef>, StoreError>;

    /// Persist a computed tree ordering for a collection.
    async fn persist_tree(
        &self,
        collection: &str,
        placements: &[TreePlacement],
    ) -> Result<(), StoreError>;
}

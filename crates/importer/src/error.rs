//! Pipeline error types.

use stanza_core::error::CoreError;
use stanza_core::types::DbId;

use crate::sources::SourceError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ImporterError {
    /// The task queue's batch-tracking table is absent. Raised before any
    /// dispatch; nothing is enqueued. Not retryable until the operator
    /// runs the database migrations.
    #[error("Batch tracking storage is missing; run the database migrations before importing")]
    BatchStorageMissing,

    #[error("Import {0} not found")]
    ImportNotFound(DbId),

    /// A domain/configuration error from `stanza-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The source file could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A destination write or schema lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

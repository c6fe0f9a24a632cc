//! Repository for the `import_batches` tracking table.

use sqlx::PgPool;
use stanza_core::types::{BatchId, DbId};

use crate::models::batch::ImportBatch;

/// Column list for `import_batches` queries.
const COLUMNS: &str =
    "id, import_id, total_tasks, pending_tasks, failed_tasks, created_at, finished_at";

/// Provides batch lifecycle operations.
pub struct BatchRepo;

impl BatchRepo {
    /// Whether the batch-tracking table exists at all.
    ///
    /// The orchestrator treats a missing table as a fatal, non-retryable
    /// precondition failure before dispatching anything.
    pub async fn storage_exists(pool: &PgPool) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT to_regclass('import_batches') IS NOT NULL")
            .fetch_one(pool)
            .await
    }

    /// Register a new batch with all of its tasks pending.
    pub async fn create(
        pool: &PgPool,
        id: BatchId,
        import_id: DbId,
        total_tasks: i32,
    ) -> Result<ImportBatch, sqlx::Error> {
        let sql = format!(
            "INSERT INTO import_batches (id, import_id, total_tasks, pending_tasks) \
             VALUES ($1, $2, $3, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(id)
            .bind(import_id)
            .bind(total_tasks)
            .fetch_one(pool)
            .await
    }

    /// Record one task result against its batch.
    ///
    /// Decrements `pending_tasks`, counts the failure, and stamps
    /// `finished_at` when the last task reports, all in one statement.
    /// Returns the number of tasks still pending; `0` means this call
    /// finished the batch.
    pub async fn record_task_result(
        pool: &PgPool,
        batch_id: BatchId,
        success: bool,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE import_batches \
             SET pending_tasks = pending_tasks - 1, \
                 failed_tasks = failed_tasks + CASE WHEN $2 THEN 0 ELSE 1 END, \
                 finished_at = CASE WHEN pending_tasks - 1 = 0 THEN NOW() ELSE finished_at END \
             WHERE id = $1 \
             RETURNING pending_tasks",
        )
        .bind(batch_id)
        .bind(success)
        .fetch_one(pool)
        .await
    }

    /// Find a batch by ID.
    pub async fn find_by_id(pool: &PgPool, id: BatchId) -> Result<Option<ImportBatch>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM import_batches WHERE id = $1");
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All batches ever dispatched for an import, oldest first.
    pub async fn list_by_import(
        pool: &PgPool,
        import_id: DbId,
    ) -> Result<Vec<ImportBatch>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM import_batches WHERE import_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(import_id)
            .fetch_all(pool)
            .await
    }
}

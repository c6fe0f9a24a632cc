//! Repository for the `import_tasks` work queue.
//!
//! Claiming uses `FOR UPDATE SKIP LOCKED` so that any number of worker
//! processes can pull from the queue without double-claiming a task.

use sqlx::PgPool;
use stanza_core::types::{BatchId, DbId};

use crate::models::task::{
    ImportTask, TaskType, TASK_STATUS_COMPLETED, TASK_STATUS_FAILED, TASK_STATUS_PENDING,
    TASK_STATUS_RUNNING,
};

/// Column list for `import_tasks` queries.
const COLUMNS: &str =
    "id, batch_id, import_id, task_type, payload, status, error_message, \
     created_at, claimed_at, completed_at";

/// Provides enqueue/claim/complete operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Enqueue one row-import task per payload of a chunk.
    pub async fn enqueue_row_imports(
        pool: &PgPool,
        import_id: DbId,
        batch_id: BatchId,
        payloads: &[serde_json::Value],
    ) -> Result<(), sqlx::Error> {
        for payload in payloads {
            sqlx::query(
                "INSERT INTO import_tasks (batch_id, import_id, task_type, payload) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(batch_id)
            .bind(import_id)
            .bind(TaskType::RowImport.as_str())
            .bind(payload)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    /// Enqueue the run-level tree rebuild task. Belongs to no batch.
    pub async fn enqueue_tree_rebuild(
        pool: &PgPool,
        import_id: DbId,
    ) -> Result<ImportTask, sqlx::Error> {
        let sql = format!(
            "INSERT INTO import_tasks (import_id, task_type) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportTask>(&sql)
            .bind(import_id)
            .bind(TaskType::TreeRebuild.as_str())
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest pending task.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<ImportTask>, sqlx::Error> {
        let sql = format!(
            "UPDATE import_tasks \
             SET status = $1, claimed_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM import_tasks \
                 WHERE status = $2 \
                 ORDER BY id \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportTask>(&sql)
            .bind(TASK_STATUS_RUNNING)
            .bind(TASK_STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Mark a task as completed.
    pub async fn complete(pool: &PgPool, task_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE import_tasks SET status = $2, completed_at = NOW() WHERE id = $1")
            .bind(task_id)
            .bind(TASK_STATUS_COMPLETED)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Mark a task as failed with its error message.
    ///
    /// Failed tasks stay in the queue table for the operator to inspect;
    /// there is no automatic retry.
    pub async fn fail(pool: &PgPool, task_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE import_tasks \
             SET status = $3, error_message = $2, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(error)
        .bind(TASK_STATUS_FAILED)
        .execute(pool)
        .await?;
        Ok(())
    }
}

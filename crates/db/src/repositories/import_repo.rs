//! Repository for the `imports` table.
//!
//! Run-state transitions are single UPDATE statements guarded by the
//! current state, so concurrent batch completions can never double-fire a
//! transition.

use sqlx::PgPool;
use stanza_core::import::RunState;
use stanza_core::types::{BatchId, DbId};

use crate::models::import::{CreateImport, Import};

/// Column list for `imports` queries.
const COLUMNS: &str =
    "id, name, import_type, path, destination, mappings, batch_ids, run_state, \
     created_at, updated_at";

/// Provides CRUD operations and run-state transitions for import records.
pub struct ImportRepo;

impl ImportRepo {
    /// Create a new import record in 'configured' state.
    pub async fn create(pool: &PgPool, input: &CreateImport) -> Result<Import, sqlx::Error> {
        let sql = format!(
            "INSERT INTO imports (name, import_type, path, destination, mappings) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Import>(&sql)
            .bind(&input.name)
            .bind(input.import_type.as_str())
            .bind(&input.path)
            .bind(sqlx::types::Json(&input.destination))
            .bind(sqlx::types::Json(&input.mappings))
            .fetch_one(pool)
            .await
    }

    /// Find an import by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Import>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM imports WHERE id = $1");
        sqlx::query_as::<_, Import>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all imports, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Import>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM imports ORDER BY id DESC");
        sqlx::query_as::<_, Import>(&sql).fetch_all(pool).await
    }

    /// Start a run: clear the previous run's batch ids and enter
    /// 'dispatching' in one statement, so stale ids are never observable
    /// alongside the new run.
    pub async fn begin_run(pool: &PgPool, id: DbId) -> Result<Option<Import>, sqlx::Error> {
        let sql = format!(
            "UPDATE imports \
             SET batch_ids = '{{}}', run_state = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Import>(&sql)
            .bind(id)
            .bind(RunState::Dispatching.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Append a freshly dispatched batch id to the current run.
    ///
    /// `array_append` runs inside the UPDATE, so concurrent appends cannot
    /// lose each other.
    pub async fn append_batch_id(
        pool: &PgPool,
        id: DbId,
        batch_id: BatchId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE imports \
             SET batch_ids = array_append(batch_ids, $2), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(batch_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Dispatch finished: move 'dispatching' to 'running'. Completion is
    /// only evaluated from 'running', which keeps a batch that finishes
    /// mid-dispatch from being mistaken for the whole run finishing.
    pub async fn mark_running(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE imports SET run_state = $2, updated_at = NOW() \
             WHERE id = $1 AND run_state = $3",
        )
        .bind(id)
        .bind(RunState::Running.as_str())
        .bind(RunState::Dispatching.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Compare-and-set out of 'running' once every batch of the current
    /// run has finished.
    ///
    /// Returns `true` for exactly one caller per run: the statement
    /// requires `run_state = 'running'`, a non-empty `batch_ids`, and no
    /// unfinished batch among them. Everyone else sees `false`.
    pub async fn try_complete_run(
        pool: &PgPool,
        id: DbId,
        next: RunState,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<DbId> = sqlx::query_scalar(
            "UPDATE imports i \
             SET run_state = $2, updated_at = NOW() \
             WHERE i.id = $1 \
               AND i.run_state = $3 \
               AND cardinality(i.batch_ids) > 0 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM import_batches b \
                   WHERE b.id = ANY(i.batch_ids) AND b.finished_at IS NULL \
               ) \
             RETURNING i.id",
        )
        .bind(id)
        .bind(next.as_str())
        .bind(RunState::Running.as_str())
        .fetch_optional(pool)
        .await?;
        Ok(row.is_some())
    }

    /// Close out a run whose source produced no batches: 'running' with an
    /// empty `batch_ids` goes straight to 'done'.
    pub async fn complete_empty_run(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE imports SET run_state = $2, updated_at = NOW() \
             WHERE id = $1 AND run_state = $3 AND cardinality(batch_ids) = 0",
        )
        .bind(id)
        .bind(RunState::Done.as_str())
        .bind(RunState::Running.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Tree rebuild done: move 'finalizing' to 'done'.
    pub async fn finish_finalizing(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE imports SET run_state = $2, updated_at = NOW() \
             WHERE id = $1 AND run_state = $3",
        )
        .bind(id)
        .bind(RunState::Done.as_str())
        .bind(RunState::Finalizing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

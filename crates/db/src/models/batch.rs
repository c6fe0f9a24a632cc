//! Batch tracking models.

use serde::Serialize;
use sqlx::FromRow;
use stanza_core::types::{BatchId, DbId, Timestamp};

/// A row from the `import_batches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportBatch {
    pub id: BatchId,
    pub import_id: DbId,
    pub total_tasks: i32,
    pub pending_tasks: i32,
    pub failed_tasks: i32,
    pub created_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl ImportBatch {
    /// A batch is finished once its last task has reported.
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn succeeded_tasks(&self) -> i32 {
        self.total_tasks - self.pending_tasks - self.failed_tasks
    }
}

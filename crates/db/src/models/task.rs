//! Task models: the substrate's unit of work.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stanza_core::types::{BatchId, DbId, Timestamp};

// ── Task type ────────────────────────────────────────────────────────

/// What a task does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Import one source row into the destination.
    RowImport,
    /// Re-sequence a collection's tree after all batches finished.
    TreeRebuild,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RowImport => "row_import",
            Self::TreeRebuild => "tree_rebuild",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "row_import" => Some(Self::RowImport),
            "tree_rebuild" => Some(Self::TreeRebuild),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Task status ──────────────────────────────────────────────────────

pub const TASK_STATUS_PENDING: &str = "pending";
pub const TASK_STATUS_RUNNING: &str = "running";
pub const TASK_STATUS_COMPLETED: &str = "completed";
pub const TASK_STATUS_FAILED: &str = "failed";

// ── Task row ─────────────────────────────────────────────────────────

/// A row from the `import_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportTask {
    pub id: DbId,
    pub batch_id: Option<BatchId>,
    pub import_id: DbId,
    pub task_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl ImportTask {
    pub fn task_type(&self) -> Option<TaskType> {
        TaskType::from_str(&self.task_type)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_roundtrip() {
        assert_eq!(TaskType::from_str("row_import"), Some(TaskType::RowImport));
        assert_eq!(TaskType::from_str("tree_rebuild"), Some(TaskType::TreeRebuild));
        assert_eq!(TaskType::RowImport.as_str(), "row_import");
        assert_eq!(TaskType::TreeRebuild.as_str(), "tree_rebuild");
    }

    #[test]
    fn unknown_task_type_is_none() {
        assert!(TaskType::from_str("vacuum").is_none());
    }
}

//! The worker runtime: a polling claim loop over the task queue.
//!
//! Any number of worker processes can run this loop against the same
//! database; `FOR UPDATE SKIP LOCKED` claiming keeps them from stepping
//! on each other. Rows execute with no ordering guarantee within or
//! across batches.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stanza_core::error::CoreError;
use stanza_core::pipeline_events::{EVENT_BATCH_FINISHED, EVENT_ROW_FAILED};
use stanza_core::transformer::TransformerRegistry;
use stanza_db::models::task::{ImportTask, TaskType};
use stanza_db::repositories::{BatchRepo, ImportRepo, TaskRepo};
use stanza_db::DbPool;
use stanza_events::{EventBus, PipelineEvent};
use tokio_util::sync::CancellationToken;

use crate::completion;
use crate::error::ImporterError;
use crate::finalize::{self, ParentCache};
use crate::store::{ContentStore, RecordHandle};
use crate::worker::{import_row, RowTaskPayload};

/// Default polling interval for the claim loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything a worker needs to execute tasks.
#[derive(Clone)]
pub struct WorkerDeps {
    pub pool: DbPool,
    pub store: Arc<dyn ContentStore>,
    pub registry: Arc<TransformerRegistry>,
    pub events: Arc<EventBus>,
    pub parent_cache: Arc<ParentCache>,
}

/// A single claim-and-execute loop.
pub struct WorkerRuntime {
    deps: WorkerDeps,
    poll_interval: Duration,
}

impl WorkerRuntime {
    /// Create a runtime with the default 1-second poll interval.
    pub fn new(deps: WorkerDeps) -> Self {
        Self {
            deps,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the claim loop until the cancellation token is triggered.
    ///
    /// Each tick drains the queue: tasks are claimed and executed one
    /// after another until none are pending.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Import worker started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Import worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.drain_queue(&cancel).await {
                        tracing::error!(error = %e, "Worker cycle failed");
                    }
                }
            }
        }
    }

    /// Claim and execute tasks until the queue is empty or shutdown is
    /// requested.
    async fn drain_queue(&self, cancel: &CancellationToken) -> Result<(), ImporterError> {
        while !cancel.is_cancelled() {
            let Some(task) = TaskRepo::claim_next(&self.deps.pool).await? else {
                return Ok(());
            };
            self.execute(task).await?;
        }
        Ok(())
    }

    /// Execute one claimed task and record its outcome.
    ///
    /// Row-level failures are absorbed here: they fail the task, count
    /// against the batch, and go no further.
    async fn execute(&self, task: ImportTask) -> Result<(), ImporterError> {
        match task.task_type() {
            Some(TaskType::RowImport) => self.execute_row_import(task).await,
            Some(TaskType::TreeRebuild) => self.execute_tree_rebuild(task).await,
            None => {
                TaskRepo::fail(
                    &self.deps.pool,
                    task.id,
                    &format!("Unknown task type: {}", task.task_type),
                )
                .await?;
                Ok(())
            }
        }
    }

    async fn execute_row_import(&self, task: ImportTask) -> Result<(), ImporterError> {
        let outcome = self.import_row_task(&task).await;
        let success = outcome.is_ok();

        match outcome {
            Ok(handle) => {
                tracing::debug!(task_id = task.id, record = %handle.key, "Row imported");
                TaskRepo::complete(&self.deps.pool, task.id).await?;
            }
            Err(e) => {
                tracing::warn!(
                    task_id = task.id,
                    import_id = task.import_id,
                    error = %e,
                    "Row import failed",
                );
                TaskRepo::fail(&self.deps.pool, task.id, &e.to_string()).await?;
                self.deps.events.publish(
                    PipelineEvent::new(EVENT_ROW_FAILED)
                        .with_import(task.import_id)
                        .with_payload(json!({ "task_id": task.id, "error": e.to_string() })),
                );
            }
        }

        // Count the result against the batch; whoever records the last
        // task finishes the batch and evaluates run completion.
        if let Some(batch_id) = task.batch_id {
            let pending =
                BatchRepo::record_task_result(&self.deps.pool, batch_id, success).await?;
            if pending == 0 {
                let failed = BatchRepo::find_by_id(&self.deps.pool, batch_id)
                    .await?
                    .map(|batch| batch.failed_tasks)
                    .unwrap_or_default();
                tracing::info!(
                    batch_id = %batch_id,
                    import_id = task.import_id,
                    failed_tasks = failed,
                    "Batch finished",
                );
                self.deps.events.publish(
                    PipelineEvent::new(EVENT_BATCH_FINISHED)
                        .with_import(task.import_id)
                        .with_batch(batch_id)
                        .with_payload(json!({ "failed_tasks": failed })),
                );
                completion::check_and_advance(&self.deps.pool, &self.deps.events, task.import_id)
                    .await?;
            }
        }

        Ok(())
    }

    /// Resolve the task's row against the import's configuration and
    /// perform the destination write.
    async fn import_row_task(&self, task: &ImportTask) -> Result<RecordHandle, ImporterError> {
        let payload: RowTaskPayload =
            serde_json::from_value(task.payload.clone()).map_err(|e| {
                CoreError::Validation(format!("Task {} has an invalid payload: {e}", task.id))
            })?;

        let row = match payload {
            RowTaskPayload::Row { row } => row,
            RowTaskPayload::Invalid { error } => {
                return Err(CoreError::Validation(error).into());
            }
        };

        let import = ImportRepo::find_by_id(&self.deps.pool, task.import_id)
            .await?
            .ok_or(ImporterError::ImportNotFound(task.import_id))?;
        let destination = import.destination()?;
        let mappings = import.mappings()?;
        let blueprint = self.deps.store.blueprint(&destination).await?;

        import_row(
            &destination,
            &mappings,
            &blueprint,
            &self.deps.registry,
            self.deps.store.as_ref(),
            &row,
        )
        .await
    }

    async fn execute_tree_rebuild(&self, task: ImportTask) -> Result<(), ImporterError> {
        let result = finalize::rebuild_tree(
            &self.deps.pool,
            self.deps.store.as_ref(),
            &self.deps.parent_cache,
            &self.deps.events,
            task.import_id,
        )
        .await;

        match result {
            Ok(()) => TaskRepo::complete(&self.deps.pool, task.id).await?,
            Err(e) => {
                tracing::error!(
                    task_id = task.id,
                    import_id = task.import_id,
                    error = %e,
                    "Tree rebuild failed",
                );
                TaskRepo::fail(&self.deps.pool, task.id, &e.to_string()).await?;
            }
        }

        Ok(())
    }
}

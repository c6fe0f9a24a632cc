//! Batch orchestration: decompose one import run into batches of
//! row-import tasks.
//!
//! `run()` blocks only while reading and partitioning the lazy row
//! sequence and enqueuing each batch; it never waits for workers.
//! Completion is observed later by the worker runtime through
//! [`crate::completion`].

use std::path::Path;

use serde_json::json;
use stanza_core::chunking::{chunks, CHUNK_SIZE};
use stanza_core::import::validate_mappings;
use stanza_core::pipeline_events::{EVENT_BATCH_DISPATCHED, EVENT_RUN_STARTED};
use stanza_core::types::{BatchId, DbId};
use stanza_db::repositories::{BatchRepo, ImportRepo, TaskRepo};
use stanza_db::DbPool;
use stanza_events::{EventBus, PipelineEvent};

use crate::completion;
use crate::error::ImporterError;
use crate::finalize::ParentCache;
use crate::sources::Source;
use crate::worker::RowTaskPayload;

/// What one `run()` invocation dispatched.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RunSummary {
    pub batches_dispatched: usize,
    pub rows_enqueued: usize,
}

/// Execute one import run.
///
/// 1. Reset the record's `batch_ids`, enter `dispatching`, and drop the
///    import's cached parent lookups, so nothing from a previous run leaks
///    into this one.
/// 2. Fail fast with [`ImporterError::BatchStorageMissing`] when the
///    batch-tracking table is absent; at that point the ids are reset but
///    nothing has been dispatched.
/// 3. Stream the source in windows of [`CHUNK_SIZE`] rows. Per window:
///    register the batch, append its id to `batch_ids`, then enqueue the
///    window's tasks. A task can therefore never report against a batch
///    the import record does not know about.
/// 4. Enter `running` and evaluate completion once, covering the case
///    where every batch already finished while dispatch was under way.
pub async fn run(
    pool: &DbPool,
    events: &EventBus,
    parent_cache: &ParentCache,
    import_id: DbId,
) -> Result<RunSummary, ImporterError> {
    let import = ImportRepo::begin_run(pool, import_id)
        .await?
        .ok_or(ImporterError::ImportNotFound(import_id))?;
    parent_cache.forget(import_id).await;

    let import_type = import.import_type()?;
    let destination = import.destination()?;
    let mappings = import.mappings()?;
    validate_mappings(&mappings)?;

    if !BatchRepo::storage_exists(pool).await? {
        return Err(ImporterError::BatchStorageMissing);
    }

    tracing::info!(
        import_id,
        import_type = %import_type,
        destination = destination.type_name(),
        path = %import.path,
        "Import run started",
    );
    events.publish(PipelineEvent::new(EVENT_RUN_STARTED).with_import(import_id));

    let source = Source::open(import_type, Path::new(&import.path))?;

    let mut summary = RunSummary {
        batches_dispatched: 0,
        rows_enqueued: 0,
    };

    for window in chunks(source, CHUNK_SIZE) {
        let payloads: Vec<serde_json::Value> = window
            .into_iter()
            .map(|row| {
                let payload = match row {
                    Ok(row) => RowTaskPayload::Row { row },
                    // Unparseable rows become ordinary row-level failures
                    // inside their batch.
                    Err(e) => RowTaskPayload::Invalid {
                        error: e.to_string(),
                    },
                };
                serde_json::to_value(payload).unwrap_or_else(|_| json!({}))
            })
            .collect();

        let batch_id: BatchId = uuid::Uuid::now_v7();
        BatchRepo::create(pool, batch_id, import_id, payloads.len() as i32).await?;
        ImportRepo::append_batch_id(pool, import_id, batch_id).await?;
        TaskRepo::enqueue_row_imports(pool, import_id, batch_id, &payloads).await?;

        tracing::debug!(
            import_id,
            batch_id = %batch_id,
            tasks = payloads.len(),
            "Batch dispatched",
        );
        events.publish(
            PipelineEvent::new(EVENT_BATCH_DISPATCHED)
                .with_import(import_id)
                .with_batch(batch_id)
                .with_payload(json!({ "tasks": payloads.len() })),
        );

        summary.batches_dispatched += 1;
        summary.rows_enqueued += payloads.len();
    }

    ImportRepo::mark_running(pool, import_id).await?;

    if summary.batches_dispatched == 0 {
        // Nothing to wait for; an empty source completes immediately.
        ImportRepo::complete_empty_run(pool, import_id).await?;
        tracing::info!(import_id, "Source produced no rows; run completed");
    } else {
        // The last batch may have finished while later batches were still
        // being dispatched; their finish callbacks could not complete the
        // run because it was still in 'dispatching'.
        completion::check_and_advance(pool, events, import_id).await?;
    }

    tracing::info!(
        import_id,
        batches = summary.batches_dispatched,
        rows = summary.rows_enqueued,
        "Import run dispatched",
    );

    Ok(summary)
}

//! Run-completion evaluation.
//!
//! Every batch-finished signal (and the orchestrator, once, after
//! dispatch) funnels into [`check_and_advance`]. The state transition is
//! a single guarded UPDATE, so however many batches finish concurrently,
//! exactly one caller advances the run and enqueues finalization.

use serde_json::json;
use stanza_core::import::RunState;
use stanza_core::pipeline_events::{EVENT_RUN_COMPLETED, EVENT_RUN_FINALIZING};
use stanza_core::types::DbId;
use stanza_db::repositories::{ImportRepo, TaskRepo};
use stanza_db::DbPool;
use stanza_events::{EventBus, PipelineEvent};

use crate::error::ImporterError;

/// Evaluate whether every batch of the import's current run has finished
/// and, if so, advance the run's state.
///
/// Entries destinations move to `finalizing` and get a tree-rebuild task;
/// terms and users destinations complete directly and never trigger
/// finalization. Calls that lose the transition race (or find unfinished
/// batches) are no-ops.
pub async fn check_and_advance(
    pool: &DbPool,
    events: &EventBus,
    import_id: DbId,
) -> Result<(), ImporterError> {
    let Some(import) = ImportRepo::find_by_id(pool, import_id).await? else {
        return Ok(());
    };
    let destination = import.destination()?;

    if destination.is_entries() {
        if ImportRepo::try_complete_run(pool, import_id, RunState::Finalizing).await? {
            TaskRepo::enqueue_tree_rebuild(pool, import_id).await?;
            tracing::info!(import_id, "All batches finished; tree rebuild enqueued");
            events.publish(
                PipelineEvent::new(EVENT_RUN_FINALIZING)
                    .with_import(import_id)
                    .with_payload(json!({ "destination": destination.type_name() })),
            );
        }
    } else if ImportRepo::try_complete_run(pool, import_id, RunState::Done).await? {
        tracing::info!(
            import_id,
            destination = destination.type_name(),
            "All batches finished; run completed",
        );
        events.publish(PipelineEvent::new(EVENT_RUN_COMPLETED).with_import(import_id));
    }

    Ok(())
}

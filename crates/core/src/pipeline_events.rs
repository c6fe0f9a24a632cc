//! Event type constants for import-pipeline lifecycle events.
//!
//! Published on the `stanza-events` bus by the orchestrator and the worker
//! runtime; consumed by observers such as the admin API.

/// A run's dispatch phase started (batch ids were reset).
pub const EVENT_RUN_STARTED: &str = "import.run_started";

/// One batch was registered and its tasks enqueued.
pub const EVENT_BATCH_DISPATCHED: &str = "import.batch_dispatched";

/// All tasks of one batch finished (success or failure).
pub const EVENT_BATCH_FINISHED: &str = "import.batch_finished";

/// Every batch of the run finished; tree finalization was enqueued.
pub const EVENT_RUN_FINALIZING: &str = "import.run_finalizing";

/// The run reached its terminal state.
pub const EVENT_RUN_COMPLETED: &str = "import.run_completed";

/// A single row failed to transform or write.
pub const EVENT_ROW_FAILED: &str = "import.row_failed";

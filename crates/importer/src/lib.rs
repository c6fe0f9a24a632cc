//! The Stanza bulk-import pipeline.
//!
//! An import run reads rows lazily from a CSV or XML source, partitions
//! them into fixed-size batches of row-import tasks, and dispatches the
//! batches to the shared task queue. Workers apply the import's field
//! mappings (via the transformer registry) to each row and write exactly
//! one destination record per row. When the last batch of an entries run
//! finishes, a single tree-rebuild task re-sequences the destination
//! collection's hierarchy.
//!
//! - [`orchestrator`] — `run()`: reset, precondition check, chunked dispatch
//! - [`worker`] — per-row mapping/transform/write
//! - [`runtime`] — the polling claim loop executed by worker processes
//! - [`completion`] — all-batches-finished evaluation and state advance
//! - [`finalize`] — collection tree rebuild and the per-import parent cache
//! - [`sources`] — lazy CSV/XML row readers
//! - [`store`] / [`db_store`] — destination write + blueprint interfaces

pub mod completion;
pub mod db_store;
pub mod error;
pub mod finalize;
pub mod orchestrator;
pub mod runtime;
pub mod sources;
pub mod store;
pub mod transformers;
pub mod worker;

pub use error::ImporterError;

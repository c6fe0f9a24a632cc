//! Stanza import-pipeline event bus.
//!
//! Provides [`EventBus`], an in-process publish/subscribe hub backed by
//! `tokio::sync::broadcast`, and [`PipelineEvent`], the envelope for
//! import lifecycle events (see `stanza_core::pipeline_events` for the
//! event type names).

pub mod bus;

pub use bus::{EventBus, PipelineEvent};

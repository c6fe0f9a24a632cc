//! Pure domain logic for the Stanza bulk-import pipeline.
//!
//! This crate has zero internal dependencies (no DB, no async, no I/O).
//! Everything here is constants, types, and pure functions shared by the
//! importer, the worker binary, and the admin API.

pub mod blueprint;
pub mod chunking;
pub mod descriptor;
pub mod error;
pub mod import;
pub mod pipeline_events;
pub mod slug;
pub mod transformer;
pub mod tree;
pub mod types;

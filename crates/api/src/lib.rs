//! Administrative HTTP surface for the import pipeline.
//!
//! Exposes the mapping-descriptor endpoint the admin UI builds its field
//! mapping form from, plus import CRUD/run/show endpoints. The pipeline
//! itself never depends on this crate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

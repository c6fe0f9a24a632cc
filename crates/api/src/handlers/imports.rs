//! Handlers for import records: create, list, show (with per-batch
//! health), and run.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use stanza_core::error::CoreError;
use stanza_core::import::{validate_import_name, validate_mappings};
use stanza_core::types::DbId;
use stanza_db::models::batch::ImportBatch;
use stanza_db::models::import::{CreateImport, Import};
use stanza_db::repositories::{BatchRepo, ImportRepo};
use stanza_importer::orchestrator::{self, RunSummary};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ── Create ───────────────────────────────────────────────────────────

/// POST /api/v1/imports
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateImport>,
) -> AppResult<(StatusCode, Json<DataResponse<Import>>)> {
    validate_import_name(&input.name)?;
    validate_mappings(&input.mappings)?;

    let import = ImportRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(import))))
}

// ── List ─────────────────────────────────────────────────────────────

/// GET /api/v1/imports
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Import>>>> {
    let imports = ImportRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(imports)))
}

// ── Show ─────────────────────────────────────────────────────────────

/// An import with the per-batch counters the operator reads to judge a
/// run's health.
#[derive(Debug, Serialize)]
pub struct ImportDetail {
    #[serde(flatten)]
    pub import: Import,
    pub batches: Vec<ImportBatch>,
}

/// GET /api/v1/imports/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ImportDetail>>> {
    let import = ImportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Import",
            id,
        }))?;
    let batches = BatchRepo::list_by_import(&state.pool, id).await?;

    Ok(Json(DataResponse::new(ImportDetail { import, batches })))
}

// ── Run ──────────────────────────────────────────────────────────────

/// POST /api/v1/imports/{id}/run
///
/// Dispatches the run synchronously (reading and enqueuing is bounded
/// work) and returns once every batch is queued; workers pick the tasks
/// up on their own schedule.
pub async fn run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<RunSummary>>)> {
    let summary =
        orchestrator::run(&state.pool, &state.event_bus, &state.parent_cache, id).await?;
    Ok((StatusCode::ACCEPTED, Json(DataResponse::new(summary))))
}

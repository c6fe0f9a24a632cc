//! The mapping-descriptor endpoint.
//!
//! Given a destination, a source sample, and any in-progress mapping
//! values, returns per-field mapping schemas plus the fields eligible to
//! serve as a de-duplication key. Consumed by the admin mapping UI; the
//! pipeline itself only ever sees the saved mappings.

use std::path::Path;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use stanza_core::blueprint::{unique_key_fields, UniqueKeyField};
use stanza_core::descriptor::{build_mapping_descriptors, FieldMappingDescriptor};
use stanza_core::import::{Destination, ImportType, Mappings};
use stanza_importer::sources::Source;
use stanza_importer::store::BlueprintProvider;
use stanza_importer::ImporterError;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MappingsRequest {
    pub destination: Destination,
    #[serde(rename = "type")]
    pub import_type: ImportType,
    pub path: String,
    /// Previously saved mapping values, echoed back into the schemas.
    #[serde(default)]
    pub mappings: Mappings,
}

#[derive(Debug, Serialize)]
pub struct MappingsResponse {
    pub fields: Vec<FieldMappingDescriptor>,
    pub unique_keys: Vec<UniqueKeyField>,
}

/// POST /api/v1/mappings
pub async fn build(
    State(state): State<AppState>,
    Json(request): Json<MappingsRequest>,
) -> AppResult<Json<DataResponse<MappingsResponse>>> {
    let blueprint = state
        .store
        .blueprint(&request.destination)
        .await
        .map_err(|e| AppError::Importer(e.into()))?;

    // An empty source still yields schemas, just with no column options.
    let sample_row = Source::first_row(request.import_type, Path::new(&request.path))
        .map_err(|e| AppError::Importer(ImporterError::Source(e)))?
        .unwrap_or_default();

    let fields =
        build_mapping_descriptors(&blueprint, &sample_row, &request.mappings, &state.registry);
    let unique_keys = unique_key_fields(&blueprint);

    Ok(Json(DataResponse::new(MappingsResponse {
        fields,
        unique_keys,
    })))
}

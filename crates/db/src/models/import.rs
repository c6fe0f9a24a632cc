//! Import record models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stanza_core::error::CoreError;
use stanza_core::import::{Destination, ImportType, Mappings};
use stanza_core::types::{BatchId, DbId, Timestamp};

/// A row from the `imports` table.
///
/// `destination` and `mappings` are stored as JSONB and parsed on demand
/// into their `stanza-core` types; a row that fails to parse is a
/// configuration error surfaced to the caller.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Import {
    pub id: DbId,
    pub name: String,
    pub import_type: String,
    pub path: String,
    pub destination: serde_json::Value,
    pub mappings: serde_json::Value,
    pub batch_ids: Vec<BatchId>,
    pub run_state: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Import {
    /// Parse the stored import type.
    pub fn import_type(&self) -> Result<ImportType, CoreError> {
        ImportType::from_str(&self.import_type)
    }

    /// Parse the stored destination configuration.
    pub fn destination(&self) -> Result<Destination, CoreError> {
        serde_json::from_value(self.destination.clone()).map_err(|e| {
            CoreError::Validation(format!("Import {} has an invalid destination: {e}", self.id))
        })
    }

    /// Parse the stored field mappings.
    pub fn mappings(&self) -> Result<Mappings, CoreError> {
        serde_json::from_value(self.mappings.clone()).map_err(|e| {
            CoreError::Validation(format!("Import {} has invalid mappings: {e}", self.id))
        })
    }
}

/// DTO for creating a new import record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImport {
    pub name: String,
    pub import_type: ImportType,
    pub path: String,
    pub destination: Destination,
    pub mappings: Mappings,
}

//! Row import: apply an import's field mappings to one source row and
//! write exactly one destination record.
//!
//! A failing row is reported as a failed task within its batch and never
//! affects sibling rows.

use serde::{Deserialize, Serialize};
use serde_json::json;
use stanza_core::blueprint::Blueprint;
use stanza_core::error::CoreError;
use stanza_core::import::{Destination, Mappings};
use stanza_core::transformer::TransformerRegistry;
use stanza_core::types::RowRecord;

use crate::error::ImporterError;
use crate::store::{ContentStore, Payload, RecordHandle};

// ---------------------------------------------------------------------------
// Task payload
// ---------------------------------------------------------------------------

/// The payload of a row-import task.
///
/// Rows that failed to parse at dispatch time are enqueued as `Invalid`
/// so they surface as ordinary row-level failures in their batch instead
/// of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowTaskPayload {
    Row { row: RowRecord },
    Invalid { error: String },
}

// ---------------------------------------------------------------------------
// Field resolution
// ---------------------------------------------------------------------------

/// Resolve one row into a destination payload.
///
/// For every mapped field: read the raw value at the configured source
/// key (absent columns omit the field), then convert it with the
/// fieldtype's transformer if one is registered, else pass the raw value
/// through unchanged. Unmapped destination fields are simply omitted.
pub fn resolve_payload(
    mappings: &Mappings,
    blueprint: &Blueprint,
    registry: &TransformerRegistry,
    row: &RowRecord,
) -> Result<Payload, CoreError> {
    let mut payload = Payload::new();

    for (handle, mapping) in mappings {
        if !mapping.is_mapped() {
            continue;
        }
        // is_mapped() guarantees the key is present and non-empty.
        let key = mapping.key.as_deref().unwrap_or_default();
        let Some(raw) = row.get(key) else {
            continue;
        };

        let transformer = blueprint
            .field(handle)
            .and_then(|field| registry.lookup(&field.field_type));

        let value = match transformer {
            Some(transformer) => transformer.transform(raw, mapping)?,
            None => json!(raw),
        };
        payload.insert(handle.clone(), value);
    }

    Ok(payload)
}

// ---------------------------------------------------------------------------
// Row import
// ---------------------------------------------------------------------------

/// Import one row: resolve its payload and perform the single destination
/// write.
pub async fn import_row(
    destination: &Destination,
    mappings: &Mappings,
    blueprint: &Blueprint,
    registry: &TransformerRegistry,
    store: &dyn ContentStore,
    row: &RowRecord,
) -> Result<RecordHandle, ImporterError> {
    let payload = resolve_payload(mappings, blueprint, registry, row)?;
    let handle = store.write(destination, &payload).await?;
    Ok(handle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

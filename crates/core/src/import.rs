//! Import record domain types: source kind, destination, run state, and
//! per-field mapping configuration.
//!
//! This module has zero external dependencies beyond serde. It provides:
//!
//! - [`ImportType`] and [`Destination`] enums with string conversions
//! - The [`RunState`] machine for one import run
//! - [`FieldMapping`] / [`Mappings`] configuration types
//! - Validation functions for import names and mapping configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an import name.
pub const MAX_IMPORT_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// ImportType
// ---------------------------------------------------------------------------

/// The kind of source file an import reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    Csv,
    Xml,
}

impl ImportType {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            _ => Err(CoreError::Validation(format!(
                "Invalid import type: '{s}'. Must be one of: csv, xml"
            ))),
        }
    }
}

impl std::fmt::Display for ImportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// Where imported rows are written.
///
/// The enum is closed: configuration carrying an unknown `type` tag is
/// rejected at parse time rather than silently producing no destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    /// Entries in a collection, addressed by collection handle.
    Entries { collection: String },
    /// Terms in a taxonomy, addressed by taxonomy handle.
    Terms { taxonomy: String },
    /// User accounts.
    Users,
}

impl Destination {
    /// The destination kind as stored/reported: "entries", "terms", "users".
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Entries { .. } => "entries",
            Self::Terms { .. } => "terms",
            Self::Users => "users",
        }
    }

    /// Only entries destinations have a hierarchical tree to re-sequence
    /// after a run.
    pub fn is_entries(&self) -> bool {
        matches!(self, Self::Entries { .. })
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// State of one import run.
///
/// `dispatching` covers the window in which batches are still being
/// submitted; completion is only evaluated once the run reaches `running`,
/// so a batch finishing mid-dispatch can never be mistaken for the whole
/// run finishing. Terms/users runs skip `finalizing` and go straight to
/// `done`. Cancellation is not modelled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Configured,
    Dispatching,
    Running,
    Finalizing,
    Done,
}

impl RunState {
    /// Return the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Dispatching => "dispatching",
            Self::Running => "running",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        }
    }

    /// Parse a state string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "configured" => Some(Self::Configured),
            "dispatching" => Some(Self::Dispatching),
            "running" => Some(Self::Running),
            "finalizing" => Some(Self::Finalizing),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// All valid state values.
    pub const ALL: &'static [&'static str] =
        &["configured", "dispatching", "running", "finalizing", "done"];
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field mappings
// ---------------------------------------------------------------------------

/// Mapping configuration for one destination field.
///
/// `key` names the source column the field reads from; everything else is
/// transformer-specific extra configuration, kept as-is under its own keys
/// (e.g. `format` for the date transformer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(flatten)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl FieldMapping {
    /// A mapping only participates in row import when a source key is set.
    pub fn is_mapped(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Look up a transformer-specific config value.
    pub fn config_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.config.get(name)
    }

    /// Look up a transformer-specific config value as a string.
    pub fn config_str(&self, name: &str) -> Option<&str> {
        self.config.get(name).and_then(|v| v.as_str())
    }
}

/// All field mappings of an import: destination field handle to its
/// mapping configuration.
pub type Mappings = HashMap<String, FieldMapping>;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an import name.
pub fn validate_import_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Import name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_IMPORT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Import name exceeds maximum length of {MAX_IMPORT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a mappings table.
///
/// Rules:
/// - Field handles must not be empty.
/// - A present `key` must not be the empty string (omit it instead).
pub fn validate_mappings(mappings: &Mappings) -> Result<(), CoreError> {
    for (handle, mapping) in mappings {
        if handle.trim().is_empty() {
            return Err(CoreError::Validation(
                "Mapping field handle must not be empty".to_string(),
            ));
        }
        if let Some(key) = &mapping.key {
            if key.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Mapping for field '{handle}' has an empty source key"
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- ImportType ---------------------------------------------------------

    #[test]
    fn import_type_roundtrip() {
        assert_eq!(ImportType::from_str("csv").unwrap(), ImportType::Csv);
        assert_eq!(ImportType::from_str("xml").unwrap(), ImportType::Xml);
        assert_eq!(ImportType::Csv.as_str(), "csv");
        assert_eq!(ImportType::Xml.as_str(), "xml");
    }

    #[test]
    fn import_type_invalid_rejects() {
        assert!(ImportType::from_str("json").is_err());
        assert!(ImportType::from_str("").is_err());
    }

    // -- Destination --------------------------------------------------------

    #[test]
    fn destination_entries_parses() {
        let dest: Destination =
            serde_json::from_value(json!({ "type": "entries", "collection": "blog" })).unwrap();
        assert_eq!(
            dest,
            Destination::Entries {
                collection: "blog".to_string()
            }
        );
        assert!(dest.is_entries());
        assert_eq!(dest.type_name(), "entries");
    }

    #[test]
    fn destination_terms_parses() {
        let dest: Destination =
            serde_json::from_value(json!({ "type": "terms", "taxonomy": "topics" })).unwrap();
        assert_eq!(dest.type_name(), "terms");
        assert!(!dest.is_entries());
    }

    #[test]
    fn destination_users_parses_without_payload() {
        let dest: Destination = serde_json::from_value(json!({ "type": "users" })).unwrap();
        assert_eq!(dest, Destination::Users);
    }

    #[test]
    fn destination_unknown_type_rejects() {
        // Unknown destination kinds are a configuration error, not a silent
        // empty result.
        let result: Result<Destination, _> =
            serde_json::from_value(json!({ "type": "globals", "set": "footer" }));
        assert!(result.is_err());
    }

    // -- RunState -----------------------------------------------------------

    #[test]
    fn run_state_all_variants_roundtrip() {
        for s in RunState::ALL {
            let state = RunState::from_str(s).unwrap();
            assert_eq!(state.as_str(), *s);
        }
    }

    #[test]
    fn run_state_unknown_is_none() {
        assert!(RunState::from_str("cancelled").is_none());
    }

    // -- FieldMapping -------------------------------------------------------

    #[test]
    fn field_mapping_flattens_extra_config() {
        let mapping: FieldMapping =
            serde_json::from_value(json!({ "key": "Published At", "format": "%Y-%m-%d" }))
                .unwrap();
        assert_eq!(mapping.key.as_deref(), Some("Published At"));
        assert_eq!(mapping.config_str("format"), Some("%Y-%m-%d"));
        assert!(mapping.is_mapped());
    }

    #[test]
    fn field_mapping_without_key_is_unmapped() {
        let mapping: FieldMapping = serde_json::from_value(json!({})).unwrap();
        assert!(!mapping.is_mapped());

        let empty_key: FieldMapping = serde_json::from_value(json!({ "key": "" })).unwrap();
        assert!(!empty_key.is_mapped());
    }

    // -- validate_import_name -----------------------------------------------

    #[test]
    fn valid_import_name() {
        assert!(validate_import_name("Blog posts from WordPress").is_ok());
    }

    #[test]
    fn empty_import_name_rejects() {
        assert!(validate_import_name("").is_err());
        assert!(validate_import_name("   ").is_err());
    }

    #[test]
    fn too_long_import_name_rejects() {
        let long = "a".repeat(MAX_IMPORT_NAME_LENGTH + 1);
        assert!(validate_import_name(&long).is_err());
    }

    // -- validate_mappings --------------------------------------------------

    fn mapping(key: Option<&str>) -> FieldMapping {
        FieldMapping {
            key: key.map(String::from),
            config: serde_json::Map::new(),
        }
    }

    #[test]
    fn valid_mappings() {
        let mut mappings = Mappings::new();
        mappings.insert("title".to_string(), mapping(Some("Title")));
        mappings.insert("author".to_string(), mapping(None));
        assert!(validate_mappings(&mappings).is_ok());
    }

    #[test]
    fn empty_handle_rejects() {
        let mut mappings = Mappings::new();
        mappings.insert("".to_string(), mapping(Some("Title")));
        assert!(validate_mappings(&mappings).is_err());
    }

    #[test]
    fn empty_source_key_rejects() {
        let mut mappings = Mappings::new();
        mappings.insert("title".to_string(), mapping(Some("")));
        assert!(validate_mappings(&mappings).is_err());
    }
}

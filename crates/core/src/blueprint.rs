//! Read-only content-model schema types.
//!
//! Blueprints are owned by the wider platform; the import pipeline only
//! reads them to resolve field types and to build mapping descriptors.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fieldtypes eligible to serve as a de-duplication key for an import.
pub const UNIQUE_KEY_FIELDTYPES: &[&str] = &["text", "integer", "slug"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One field of a destination blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique handle within the blueprint (e.g. "title").
    pub handle: String,
    /// Human-readable label (e.g. "Title").
    pub display: String,
    /// Fieldtype name used to select a transformer (e.g. "text", "date").
    pub field_type: String,
    /// Fieldtype-specific configuration, kept opaque here.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl Field {
    pub fn new(handle: &str, display: &str, field_type: &str) -> Self {
        Self {
            handle: handle.to_string(),
            display: display.to_string(),
            field_type: field_type.to_string(),
            config: serde_json::Value::Null,
        }
    }
}

/// The schema of one destination (collection, taxonomy, or the user store).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub fields: Vec<Field>,
}

impl Blueprint {
    /// Fields deduplicated by handle. Later fields with an already-seen
    /// handle are dropped, not merged.
    pub fn fields_deduped(&self) -> Vec<&Field> {
        let mut seen = std::collections::HashSet::new();
        self.fields
            .iter()
            .filter(|f| seen.insert(f.handle.as_str()))
            .collect()
    }

    /// Find a field by handle (first occurrence).
    pub fn field(&self, handle: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.handle == handle)
    }
}

/// A field eligible to act as an import's de-duplication key.
#[derive(Debug, Clone, Serialize)]
pub struct UniqueKeyField {
    pub handle: String,
    pub display: String,
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// List the fields of a blueprint that can serve as a de-duplication key
/// (text, integer, or slug fieldtypes).
pub fn unique_key_fields(blueprint: &Blueprint) -> Vec<UniqueKeyField> {
    blueprint
        .fields_deduped()
        .into_iter()
        .filter(|f| UNIQUE_KEY_FIELDTYPES.contains(&f.field_type.as_str()))
        .map(|f| UniqueKeyField {
            handle: f.handle.clone(),
            display: f.display.clone(),
        })
        .collect()
}

/// The built-in blueprint for the user store, which has no per-site schema.
pub fn default_user_blueprint() -> Blueprint {
    Blueprint {
        fields: vec![
            Field::new("name", "Name", "text"),
            Field::new("email", "Email Address", "text"),
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> Blueprint {
        Blueprint {
            fields: vec![
                Field::new("title", "Title", "text"),
                Field::new("published_at", "Published At", "date"),
                Field::new("count", "Count", "integer"),
                Field::new("slug", "Slug", "slug"),
                Field::new("body", "Body", "markdown"),
            ],
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let blueprint = Blueprint {
            fields: vec![
                Field::new("title", "Title", "text"),
                Field::new("title", "Title (duplicate)", "markdown"),
                Field::new("body", "Body", "markdown"),
            ],
        };
        let deduped = blueprint.fields_deduped();
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].display, "Title");
        assert_eq!(deduped[0].field_type, "text");
    }

    #[test]
    fn field_lookup_by_handle() {
        let blueprint = sample_blueprint();
        assert_eq!(blueprint.field("count").unwrap().field_type, "integer");
        assert!(blueprint.field("missing").is_none());
    }

    #[test]
    fn unique_keys_filter_by_fieldtype() {
        let keys = unique_key_fields(&sample_blueprint());
        let handles: Vec<&str> = keys.iter().map(|k| k.handle.as_str()).collect();
        assert_eq!(handles, vec!["title", "count", "slug"]);
    }

    #[test]
    fn user_blueprint_has_name_and_email() {
        let blueprint = default_user_blueprint();
        assert!(blueprint.field("name").is_some());
        assert!(blueprint.field("email").is_some());
    }
}

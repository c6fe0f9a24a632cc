//! Mapping descriptor builder.
//!
//! Turns a destination blueprint plus a sampled source row into the
//! per-field mapping schemas the admin UI renders. The pipeline itself
//! never consumes descriptors, only the resulting saved [`Mappings`].

use serde::Serialize;

use crate::blueprint::Blueprint;
use crate::import::Mappings;
use crate::transformer::{ConfigField, SelectOption, TransformerRegistry};
use crate::types::RowRecord;

/// The mapping schema of one destination field.
#[derive(Debug, Serialize)]
pub struct FieldMappingDescriptor {
    /// Destination field handle.
    pub handle: String,
    /// Destination field label.
    pub display: String,
    /// Destination fieldtype name.
    pub field_type: String,
    /// Config fields to render; the first is always the `key` source-column
    /// select.
    pub fields: Vec<ConfigField>,
    /// Previously-saved mapping values for this field, if any.
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// Build one descriptor per blueprint field.
///
/// Fields are deduplicated by handle (first occurrence wins). Each
/// descriptor's schema starts with the `key` select, whose options pair
/// every source column with a preview of its value in the sampled row,
/// followed by whatever extra config fields the field's transformer
/// describes.
pub fn build_mapping_descriptors(
    blueprint: &Blueprint,
    sample_row: &RowRecord,
    saved: &Mappings,
    registry: &TransformerRegistry,
) -> Vec<FieldMappingDescriptor> {
    let key_options = source_key_options(sample_row);

    blueprint
        .fields_deduped()
        .into_iter()
        .map(|field| {
            let mut fields = vec![ConfigField::select(
                "key",
                "Source Column",
                key_options.clone(),
            )];

            if let Some(transformer) = registry.lookup(&field.field_type) {
                fields.extend(transformer.describe_mapping_fields(field));
            }

            let values = saved
                .get(&field.handle)
                .map(|mapping| match serde_json::to_value(mapping) {
                    Ok(serde_json::Value::Object(map)) => map,
                    _ => serde_json::Map::new(),
                })
                .unwrap_or_default();

            FieldMappingDescriptor {
                handle: field.handle.clone(),
                display: field.display.clone(),
                field_type: field.field_type.clone(),
                fields,
                values,
            }
        })
        .collect()
}

/// `(column, "<column>: preview")` options from the first source row,
/// sorted by column name for stable output.
fn source_key_options(sample_row: &RowRecord) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> = sample_row
        .iter()
        .map(|(column, value)| SelectOption {
            key: column.clone(),
            value: format!("<{column}>: {value}"),
        })
        .collect();
    options.sort_by(|a, b| a.key.cmp(&b.key));
    options
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Field;
    use crate::error::CoreError;
    use crate::import::FieldMapping;
    use crate::transformer::Transformer;
    use serde_json::json;
    use std::sync::Arc;

    struct DateStub;

    impl Transformer for DateStub {
        fn describe_mapping_fields(&self, _field: &Field) -> Vec<ConfigField> {
            vec![ConfigField::text("format", "Date Format")]
        }

        fn transform(
            &self,
            raw: &str,
            _mapping: &FieldMapping,
        ) -> Result<serde_json::Value, CoreError> {
            Ok(json!(raw))
        }
    }

    fn sample_row() -> RowRecord {
        RowRecord::from([
            ("Title".to_string(), "Hello World".to_string()),
            ("Date".to_string(), "2024-01-01".to_string()),
        ])
    }

    fn blueprint() -> Blueprint {
        Blueprint {
            fields: vec![
                Field::new("title", "Title", "text"),
                Field::new("published_at", "Published At", "date"),
            ],
        }
    }

    #[test]
    fn key_select_is_always_first() {
        let descriptors = build_mapping_descriptors(
            &blueprint(),
            &sample_row(),
            &Mappings::new(),
            &TransformerRegistry::new(),
        );

        for descriptor in &descriptors {
            let first = &descriptor.fields[0];
            assert_eq!(first.handle, "key");
            assert_eq!(first.field_type, "select");
        }
    }

    #[test]
    fn key_options_pair_column_with_preview() {
        let descriptors = build_mapping_descriptors(
            &blueprint(),
            &sample_row(),
            &Mappings::new(),
            &TransformerRegistry::new(),
        );

        let options = &descriptors[0].fields[0].options;
        assert_eq!(options.len(), 2);
        // Sorted by column name.
        assert_eq!(options[0].key, "Date");
        assert_eq!(options[0].value, "<Date>: 2024-01-01");
        assert_eq!(options[1].key, "Title");
        assert_eq!(options[1].value, "<Title>: Hello World");
    }

    #[test]
    fn transformer_extra_fields_follow_the_key_select() {
        let mut registry = TransformerRegistry::new();
        registry.register("date", Arc::new(DateStub));

        let descriptors =
            build_mapping_descriptors(&blueprint(), &sample_row(), &Mappings::new(), &registry);

        let date_descriptor = descriptors
            .iter()
            .find(|d| d.handle == "published_at")
            .unwrap();
        assert_eq!(date_descriptor.fields.len(), 2);
        assert_eq!(date_descriptor.fields[1].handle, "format");

        // Fields without a transformer only get the key select.
        let text_descriptor = descriptors.iter().find(|d| d.handle == "title").unwrap();
        assert_eq!(text_descriptor.fields.len(), 1);
    }

    #[test]
    fn saved_values_are_populated() {
        let mut saved = Mappings::new();
        saved.insert(
            "title".to_string(),
            serde_json::from_value(json!({ "key": "Title" })).unwrap(),
        );

        let descriptors = build_mapping_descriptors(
            &blueprint(),
            &sample_row(),
            &saved,
            &TransformerRegistry::new(),
        );

        let title = descriptors.iter().find(|d| d.handle == "title").unwrap();
        assert_eq!(title.values.get("key"), Some(&json!("Title")));

        let date = descriptors.iter().find(|d| d.handle == "published_at").unwrap();
        assert!(date.values.is_empty());
    }

    #[test]
    fn duplicate_handles_produce_one_descriptor() {
        let blueprint = Blueprint {
            fields: vec![
                Field::new("title", "Title", "text"),
                Field::new("title", "Shadowed", "markdown"),
            ],
        };
        let descriptors = build_mapping_descriptors(
            &blueprint,
            &sample_row(),
            &Mappings::new(),
            &TransformerRegistry::new(),
        );
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].display, "Title");
    }
}

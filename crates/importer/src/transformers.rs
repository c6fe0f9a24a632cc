//! Built-in field transformers, registered at process startup.
//!
//! Fieldtypes without a registered transformer pass raw values through
//! unchanged, so this set only covers conversions that genuinely change
//! the value's shape.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use stanza_core::blueprint::Field;
use stanza_core::error::CoreError;
use stanza_core::import::FieldMapping;
use stanza_core::transformer::{ConfigField, Transformer, TransformerRegistry};

/// Date format assumed when a mapping does not configure one.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Delimiter assumed when a list mapping does not configure one.
pub const DEFAULT_LIST_DELIMITER: &str = ",";

/// Raw values treated as `true` by the toggle transformer.
const TRUTHY_VALUES: &[&str] = &["1", "true", "yes", "y", "on"];

/// Register all built-in transformers.
pub fn register_defaults(registry: &mut TransformerRegistry) {
    registry.register("date", Arc::new(DateTransformer));
    registry.register("list", Arc::new(ListTransformer));
    registry.register("toggle", Arc::new(ToggleTransformer));
}

// ── date ─────────────────────────────────────────────────────────────

/// Parses the raw value with a configurable `format` string and stores
/// the date in ISO form.
pub struct DateTransformer;

impl Transformer for DateTransformer {
    fn describe_mapping_fields(&self, _field: &Field) -> Vec<ConfigField> {
        vec![ConfigField::text("format", "Date Format")]
    }

    fn transform(
        &self,
        raw: &str,
        mapping: &FieldMapping,
    ) -> Result<serde_json::Value, CoreError> {
        let format = mapping.config_str("format").unwrap_or(DEFAULT_DATE_FORMAT);
        let date = NaiveDate::parse_from_str(raw.trim(), format).map_err(|e| {
            CoreError::Validation(format!("Cannot parse '{raw}' as a date with '{format}': {e}"))
        })?;
        Ok(json!(date.format("%Y-%m-%d").to_string()))
    }
}

// ── list ─────────────────────────────────────────────────────────────

/// Splits the raw value on a configurable `delimiter` into an array of
/// trimmed, non-empty strings.
pub struct ListTransformer;

impl Transformer for ListTransformer {
    fn describe_mapping_fields(&self, _field: &Field) -> Vec<ConfigField> {
        vec![ConfigField::text("delimiter", "Delimiter")]
    }

    fn transform(
        &self,
        raw: &str,
        mapping: &FieldMapping,
    ) -> Result<serde_json::Value, CoreError> {
        let delimiter = mapping
            .config_str("delimiter")
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_LIST_DELIMITER);
        let items: Vec<&str> = raw
            .split(delimiter)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect();
        Ok(json!(items))
    }
}

// ── toggle ───────────────────────────────────────────────────────────

/// Maps truthy strings ("1", "true", "yes", "y", "on") to `true`,
/// everything else to `false`.
pub struct ToggleTransformer;

impl Transformer for ToggleTransformer {
    fn transform(
        &self,
        raw: &str,
        _mapping: &FieldMapping,
    ) -> Result<serde_json::Value, CoreError> {
        let normalized = raw.trim().to_lowercase();
        Ok(json!(TRUTHY_VALUES.contains(&normalized.as_str())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping_with(config: serde_json::Value) -> FieldMapping {
        serde_json::from_value(config).unwrap()
    }

    // -- date ---------------------------------------------------------------

    #[test]
    fn date_default_format() {
        let value = DateTransformer
            .transform("2024-03-09", &FieldMapping::default())
            .unwrap();
        assert_eq!(value, json!("2024-03-09"));
    }

    #[test]
    fn date_custom_format_normalises_to_iso() {
        let mapping = mapping_with(json!({ "key": "Date", "format": "%d/%m/%Y" }));
        let value = DateTransformer.transform("09/03/2024", &mapping).unwrap();
        assert_eq!(value, json!("2024-03-09"));
    }

    #[test]
    fn date_unparseable_value_errors() {
        let result = DateTransformer.transform("not a date", &FieldMapping::default());
        assert!(result.is_err());
    }

    #[test]
    fn date_transform_is_deterministic() {
        let mapping = FieldMapping::default();
        let first = DateTransformer.transform("2024-01-01", &mapping).unwrap();
        let second = DateTransformer.transform("2024-01-01", &mapping).unwrap();
        assert_eq!(first, second);
    }

    // -- list ---------------------------------------------------------------

    #[test]
    fn list_default_delimiter() {
        let value = ListTransformer
            .transform("rust, tokio , sqlx", &FieldMapping::default())
            .unwrap();
        assert_eq!(value, json!(["rust", "tokio", "sqlx"]));
    }

    #[test]
    fn list_custom_delimiter() {
        let mapping = mapping_with(json!({ "key": "Tags", "delimiter": "|" }));
        let value = ListTransformer.transform("a|b|c", &mapping).unwrap();
        assert_eq!(value, json!(["a", "b", "c"]));
    }

    #[test]
    fn list_drops_empty_items() {
        let value = ListTransformer
            .transform(",a,,b,", &FieldMapping::default())
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    // -- toggle -------------------------------------------------------------

    #[test]
    fn toggle_truthy_values() {
        for raw in &["1", "true", "YES", " on ", "y"] {
            let value = ToggleTransformer.transform(raw, &FieldMapping::default()).unwrap();
            assert_eq!(value, json!(true), "raw: {raw}");
        }
    }

    #[test]
    fn toggle_everything_else_is_false() {
        for raw in &["0", "false", "no", "", "maybe"] {
            let value = ToggleTransformer.transform(raw, &FieldMapping::default()).unwrap();
            assert_eq!(value, json!(false), "raw: {raw}");
        }
    }

    // -- registration -------------------------------------------------------

    #[test]
    fn defaults_cover_date_list_and_toggle() {
        let mut registry = TransformerRegistry::new();
        register_defaults(&mut registry);
        assert!(registry.lookup("date").is_some());
        assert!(registry.lookup("list").is_some());
        assert!(registry.lookup("toggle").is_some());
        assert!(registry.lookup("text").is_none());
    }
}

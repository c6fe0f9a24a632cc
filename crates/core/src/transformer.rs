//! Field transformer contract and registry.
//!
//! A transformer converts one raw source value into a destination field's
//! native value, and describes any extra mapping configuration it needs.
//! Transformers are keyed by destination fieldtype name.
//!
//! The registry is built once at process startup, then shared read-only
//! (`Arc<TransformerRegistry>`) with the orchestrator, worker, and the
//! mapping-descriptor builder. There is no ambient global: everything that
//! needs transformers receives the registry explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::blueprint::Field;
use crate::error::CoreError;
use crate::import::FieldMapping;

// ---------------------------------------------------------------------------
// Mapping-schema building blocks
// ---------------------------------------------------------------------------

/// An option of a `select` config field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub key: String,
    pub value: String,
}

/// One configurable sub-field of a mapping schema, rendered by the admin UI.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigField {
    pub handle: String,
    pub display: String,
    pub field_type: String,
    /// Only populated for `select` fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    pub clearable: bool,
}

impl ConfigField {
    /// A plain text config field.
    pub fn text(handle: &str, display: &str) -> Self {
        Self {
            handle: handle.to_string(),
            display: display.to_string(),
            field_type: "text".to_string(),
            options: Vec::new(),
            clearable: false,
        }
    }

    /// A select config field with the given options.
    pub fn select(handle: &str, display: &str, options: Vec<SelectOption>) -> Self {
        Self {
            handle: handle.to_string(),
            display: display.to_string(),
            field_type: "select".to_string(),
            options,
            clearable: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Transformer contract
// ---------------------------------------------------------------------------

/// Strategy converting raw row values into a destination field's value.
///
/// Implementations must be stateless: `transform` is deterministic for a
/// given (raw value, mapping config) pair and must not mutate shared state.
pub trait Transformer: Send + Sync {
    /// Extra mapping-configuration fields the admin UI must collect for
    /// this fieldtype. Defaults to none.
    fn describe_mapping_fields(&self, field: &Field) -> Vec<ConfigField> {
        let _ = field;
        Vec::new()
    }

    /// Convert one raw row value into the destination field's value.
    fn transform(
        &self,
        raw: &str,
        mapping: &FieldMapping,
    ) -> Result<serde_json::Value, CoreError>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Fieldtype name to transformer lookup table.
///
/// Mutated only during startup registration; read-only afterwards, so it is
/// safe to share across tasks without locking.
#[derive(Default)]
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer for a fieldtype.
    ///
    /// Registering the same fieldtype twice silently replaces the earlier
    /// transformer; last registration wins. This is intentional so that
    /// extensions can override built-ins.
    pub fn register(&mut self, fieldtype: impl Into<String>, transformer: Arc<dyn Transformer>) {
        self.transformers.insert(fieldtype.into(), transformer);
    }

    /// Look up the transformer for a fieldtype, if any is registered.
    pub fn lookup(&self, fieldtype: &str) -> Option<Arc<dyn Transformer>> {
        self.transformers.get(fieldtype).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Uppercase;

    impl Transformer for Uppercase {
        fn transform(
            &self,
            raw: &str,
            _mapping: &FieldMapping,
        ) -> Result<serde_json::Value, CoreError> {
            Ok(json!(raw.to_uppercase()))
        }
    }

    struct Reverse;

    impl Transformer for Reverse {
        fn transform(
            &self,
            raw: &str,
            _mapping: &FieldMapping,
        ) -> Result<serde_json::Value, CoreError> {
            Ok(json!(raw.chars().rev().collect::<String>()))
        }
    }

    #[test]
    fn lookup_returns_registered_transformer() {
        let mut registry = TransformerRegistry::new();
        registry.register("text", Arc::new(Uppercase));

        let transformer = registry.lookup("text").expect("registered");
        let value = transformer.transform("hello", &FieldMapping::default()).unwrap();
        assert_eq!(value, json!("HELLO"));
    }

    #[test]
    fn lookup_miss_is_none() {
        let registry = TransformerRegistry::new();
        assert!(registry.lookup("date").is_none());
    }

    #[test]
    fn re_registration_last_wins() {
        let mut registry = TransformerRegistry::new();
        registry.register("text", Arc::new(Uppercase));
        registry.register("text", Arc::new(Reverse));

        let transformer = registry.lookup("text").unwrap();
        let value = transformer.transform("abc", &FieldMapping::default()).unwrap();
        assert_eq!(value, json!("cba"));
    }

    #[test]
    fn transform_is_deterministic() {
        let transformer = Uppercase;
        let mapping = FieldMapping::default();
        let first = transformer.transform("same input", &mapping).unwrap();
        let second = transformer.transform("same input", &mapping).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn default_describe_mapping_fields_is_empty() {
        let field = crate::blueprint::Field::new("title", "Title", "text");
        assert!(Uppercase.describe_mapping_fields(&field).is_empty());
    }
}

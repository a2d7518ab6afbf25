//! Component schemas and the read-only schema store.
//!
//! Validation is shallow: only the presence of `required` top-level keys is
//! checked. Everything else in a declared schema is carried as hints.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::manifest::Manifest;
use crate::types::ComponentMetadata;

/// The declared shape of one component's data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// The declared `required` list.
    pub required_fields: Vec<String>,
    pub properties: IndexMap<String, FieldHint>,
}

/// Hint describing one declared property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldHint {
    /// The declared `type`.
    pub kind: Option<String>,
    pub optional: bool,
    /// The declared `enum` values.
    pub values: Vec<String>,
    pub items: Option<Value>,
}

impl Schema {
    /// Read a schema out of a declared literal.
    ///
    /// Declarations are hand-written, so this is tolerant: entries that do
    /// not fit (a non-string in `required`, a property that is not an object)
    /// are skipped or defaulted instead of rejecting the whole schema.
    pub fn from_value(value: &Value) -> Self {
        let required_fields = value
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let properties = value
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, hint)| (name.clone(), FieldHint::from_value(hint)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            required_fields,
            properties,
        }
    }

    /// First required field for which `has_field` returns false.
    pub fn first_missing<F>(&self, has_field: F) -> Option<&str>
    where
        F: Fn(&str) -> bool,
    {
        self.required_fields
            .iter()
            .map(String::as_str)
            .find(|name| !has_field(name))
    }

    /// Names among the first `limit` declared properties that are not
    /// marked optional.
    pub fn key_properties(&self, limit: usize) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .take(limit)
            .filter(|(_, hint)| !hint.optional)
            .map(|(name, _)| name.as_str())
    }
}

impl FieldHint {
    fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        Self {
            kind: object.get("type").and_then(Value::as_str).map(str::to_string),
            optional: object
                .get("optional")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            values: object
                .get("enum")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            items: object.get("items").cloned(),
        }
    }
}

/// Immutable mapping from component type to its schema.
///
/// Built once from a discovery run and then only read; share it across
/// render calls behind an `Arc` if needed.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    schemas: HashMap<String, Schema>,
}

impl SchemaStore {
    /// Build from a persisted manifest.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        manifest
            .components
            .iter()
            .map(|(kind, entry)| (kind.clone(), Schema::from_value(&entry.schema)))
            .collect()
    }

    /// Build straight from discovered metadata. The first entry for a type wins.
    pub fn from_components<'a>(components: impl IntoIterator<Item = &'a ComponentMetadata>) -> Self {
        let mut schemas = HashMap::new();
        for component in components {
            schemas
                .entry(component.kind.clone())
                .or_insert_with(|| Schema::from_value(&component.schema));
        }
        Self { schemas }
    }

    pub fn get(&self, kind: &str) -> Option<&Schema> {
        self.schemas.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.schemas.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Schema)> for SchemaStore {
    fn from_iter<I: IntoIterator<Item = (String, Schema)>>(iter: I) -> Self {
        Self {
            schemas: iter.into_iter().collect(),
        }
    }
}

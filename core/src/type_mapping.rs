#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts field kinds into Swagger type descriptors.
//! Built-in kinds are pre-registered; consumers may add their own tags.

use crate::error::{SpecError, SpecResult};
use crate::fields::FieldKind;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;

/// Represents the specification-level type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    /// The primary Swagger type (`string`, `integer`, ...).
    #[serde(rename = "type")]
    pub type_: String,
    /// Optional format specifier (e.g., "uuid", "date-time").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TypeDescriptor {
    /// Descriptor without a format.
    pub fn new(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            format: None,
        }
    }

    /// Descriptor with a format.
    pub fn formatted(type_: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            format: Some(format.into()),
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.format {
            Some(format) => write!(f, "{} ({})", self.type_, format),
            None => write!(f, "{}", self.type_),
        }
    }
}

/// Trait for converting field kinds to type descriptors.
pub trait TypeMapper {
    /// Maps a field kind to its descriptor.
    fn resolve(&self, kind: &FieldKind) -> SpecResult<TypeDescriptor>;
}

/// Tag keyed registry of type descriptors.
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    mappings: HashMap<String, TypeDescriptor>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("string", simple("string"));
        registry.register("integer", simple("integer"));
        registry.register("float", simple("number"));
        registry.register("decimal", simple("number"));
        registry.register("boolean", simple("boolean"));
        registry.register("date", formatted("string", "date"));
        registry.register("datetime", formatted("string", "date-time"));
        registry.register("dict", simple("object"));
        // Documented as plain text; items are split at validation time.
        registry.register("csv_list", simple("string"));
        registry
    }
}

impl FieldTypeRegistry {
    /// Registry with the built-in kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no mappings at all.
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Adds or replaces a mapping, returning the previous descriptor.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Option<TypeDescriptor> {
        self.mappings.insert(tag.into(), descriptor)
    }

    /// Whether `tag` has a mapping.
    pub fn contains(&self, tag: &str) -> bool {
        self.mappings.contains_key(tag)
    }
}

impl TypeMapper for FieldTypeRegistry {
    fn resolve(&self, kind: &FieldKind) -> SpecResult<TypeDescriptor> {
        kind.tag()
            .and_then(|tag| self.mappings.get(tag))
            .cloned()
            .ok_or_else(|| SpecError::UnknownFieldKind(kind.to_string()))
    }
}

// Helpers for cleaner construction
fn simple(t: &str) -> TypeDescriptor {
    TypeDescriptor::new(t)
}

fn formatted(t: &str, fmt: &str) -> TypeDescriptor {
    TypeDescriptor::formatted(t, fmt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_primitives() {
        let registry = FieldTypeRegistry::new();
        assert_eq!(registry.resolve(&FieldKind::String).unwrap(), simple("string"));
        assert_eq!(registry.resolve(&FieldKind::Integer).unwrap(), simple("integer"));
        assert_eq!(registry.resolve(&FieldKind::Float).unwrap(), simple("number"));
        assert_eq!(registry.resolve(&FieldKind::Decimal).unwrap(), simple("number"));
        assert_eq!(registry.resolve(&FieldKind::Boolean).unwrap(), simple("boolean"));
        assert_eq!(registry.resolve(&FieldKind::Dict).unwrap(), simple("object"));
    }

    #[test]
    fn test_formats() {
        let registry = FieldTypeRegistry::new();
        assert_eq!(
            registry.resolve(&FieldKind::DateTime).unwrap(),
            formatted("string", "date-time")
        );
        assert_eq!(
            registry.resolve(&FieldKind::Date).unwrap().to_string(),
            "string (date)"
        );
    }

    #[test]
    fn test_csv_list_documents_as_string() {
        let registry = FieldTypeRegistry::new();
        let kind = FieldKind::csv(FieldKind::Integer);
        assert_eq!(registry.resolve(&kind).unwrap(), simple("string"));
    }

    #[test]
    fn test_unknown_custom_kind() {
        let registry = FieldTypeRegistry::new();
        let err = registry.resolve(&FieldKind::custom("money")).unwrap_err();
        assert!(matches!(err, SpecError::UnknownFieldKind(ref k) if k == "money"));
    }

    #[test]
    fn test_structural_kinds_have_no_mapping() {
        let registry = FieldTypeRegistry::new();
        let err = registry
            .resolve(&FieldKind::list(FieldKind::String))
            .unwrap_err();
        assert!(matches!(err, SpecError::UnknownFieldKind(ref k) if k == "list<string>"));
    }

    #[test]
    fn test_register_custom_kind() {
        let mut registry = FieldTypeRegistry::new();
        assert!(!registry.contains("uuid"));
        let previous = registry.register("uuid", formatted("string", "uuid"));
        assert!(previous.is_none());
        assert_eq!(
            registry.resolve(&FieldKind::custom("uuid")).unwrap(),
            formatted("string", "uuid")
        );
    }

    #[test]
    fn test_empty_registry_rejects_builtins() {
        let registry = FieldTypeRegistry::empty();
        assert!(registry.resolve(&FieldKind::String).is_err());
    }
}

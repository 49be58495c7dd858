#![deny(missing_docs)]

//! # Schema Generator
//!
//! Converts field schema declarations into Swagger definitions.
//!
//! Nested schemas become their own definitions and are referenced through
//! `$ref`. Every definition is keyed by a qualified name built from the
//! declaring handler's namespace and the schema's local name, so identically
//! named schemas declared for different handlers never overwrite each other.

use crate::error::{SpecError, SpecResult};
use crate::fields::{FieldKind, SchemaDecl};
use crate::type_mapping::{TypeDescriptor, TypeMapper};
use indexmap::IndexMap;
use serde::Serialize;
use std::any::TypeId;

/// JSON pointer prefix of definition references.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Builds the `$ref` target for a qualified definition name.
pub fn definition_ref(qualified_name: &str) -> String {
    format!("{}{}", DEFINITIONS_PREFIX, qualified_name)
}

/// Joins a namespace and a local schema name.
pub fn qualified_name(namespace: &str, local_name: &str) -> String {
    format!("{}:{}", namespace, local_name)
}

/// A property inside a definition (or a response schema).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertySchema {
    /// Reference to another definition.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Swagger type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// Swagger format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Item schema for arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    /// Field description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertySchema {
    /// A `$ref` to the named definition.
    pub fn reference(qualified_name: &str) -> Self {
        Self {
            reference: Some(definition_ref(qualified_name)),
            ..Self::default()
        }
    }

    /// A scalar property.
    pub fn typed(descriptor: TypeDescriptor) -> Self {
        Self {
            type_: Some(descriptor.type_),
            format: descriptor.format,
            ..Self::default()
        }
    }

    /// An array of `items`.
    pub fn array(items: PropertySchema) -> Self {
        Self {
            type_: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// Qualified name of the referenced definition, if this is a reference.
    pub fn referenced_definition(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITIONS_PREFIX))
    }

    /// All definition names referenced by this schema, including array items.
    pub fn references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.referenced_definition().into_iter().collect();
        if let Some(items) = &self.items {
            out.extend(items.references());
        }
        out
    }
}

/// A named object definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinitionSpec {
    /// Globally unique definition key.
    #[serde(skip)]
    pub qualified_name: String,
    /// Always `object`.
    #[serde(rename = "type")]
    pub type_: String,
    /// Properties in declaration order.
    pub properties: IndexMap<String, PropertySchema>,
    /// Required property names in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl DefinitionSpec {
    /// Names of the definitions this one references directly.
    pub fn references(&self) -> Vec<&str> {
        self.properties
            .values()
            .flat_map(PropertySchema::references)
            .collect()
    }
}

/// A definition together with the schema type that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedDefinition {
    /// Identity of the declaring schema.
    pub schema_id: TypeId,
    /// The generated definition.
    pub spec: DefinitionSpec,
}

/// Result of introspecting one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Introspection {
    /// Qualified name of the root schema.
    pub root: String,
    /// All generated definitions, nested ones first.
    pub definitions: Vec<CollectedDefinition>,
}

impl Introspection {
    /// Finds a generated definition by qualified name.
    pub fn definition(&self, qualified_name: &str) -> Option<&DefinitionSpec> {
        self.definitions
            .iter()
            .map(|c| &c.spec)
            .find(|spec| spec.qualified_name == qualified_name)
    }
}

/// Introspects `decl` under `namespace`, resolving scalar kinds through `types`.
///
/// # Errors
///
/// * `DefinitionNameCollision` when two distinct schemas share a qualified name.
/// * `CyclicSchema` when a schema (transitively) nests itself.
/// * `UnknownFieldKind` when a field kind has no mapping.
pub fn introspect(
    decl: &SchemaDecl,
    namespace: &str,
    types: &dyn TypeMapper,
) -> SpecResult<Introspection> {
    let mut walker = Introspector {
        namespace,
        types,
        collected: Vec::new(),
        stack: Vec::new(),
    };
    let root = walker.visit(decl)?;
    Ok(Introspection {
        root,
        definitions: walker.collected,
    })
}

struct Introspector<'a> {
    namespace: &'a str,
    types: &'a dyn TypeMapper,
    collected: Vec<CollectedDefinition>,
    stack: Vec<SchemaDecl>,
}

impl Introspector<'_> {
    fn visit(&mut self, decl: &SchemaDecl) -> SpecResult<String> {
        let name = qualified_name(self.namespace, decl.name());

        if let Some(pos) = self.stack.iter().position(|d| d == decl) {
            let chain: Vec<&str> = self.stack[pos..]
                .iter()
                .map(SchemaDecl::name)
                .chain(std::iter::once(decl.name()))
                .collect();
            return Err(SpecError::CyclicSchema(chain.join(" -> ")));
        }
        if self
            .stack
            .iter()
            .any(|d| d.name() == decl.name() && d != decl)
        {
            return Err(SpecError::DefinitionNameCollision(name));
        }
        if let Some(existing) = self
            .collected
            .iter()
            .find(|c| c.spec.qualified_name == name)
        {
            return if existing.schema_id == decl.id() {
                Ok(name)
            } else {
                Err(SpecError::DefinitionNameCollision(name))
            };
        }

        self.stack.push(*decl);
        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for field in decl.fields() {
            let mut schema = self.property(&field.kind)?;
            if !field.description.is_empty() {
                schema.description = Some(field.description.clone());
            }
            if field.required && !required.contains(&field.name) {
                required.push(field.name.clone());
            }
            properties.insert(field.name, schema);
        }
        self.stack.pop();

        self.collected.push(CollectedDefinition {
            schema_id: decl.id(),
            spec: DefinitionSpec {
                qualified_name: name.clone(),
                type_: "object".to_string(),
                properties,
                required,
            },
        });
        Ok(name)
    }

    fn property(&mut self, kind: &FieldKind) -> SpecResult<PropertySchema> {
        match kind {
            FieldKind::Nested(inner) => Ok(PropertySchema::reference(&self.visit(inner)?)),
            FieldKind::List(item) => Ok(PropertySchema::array(self.property(item)?)),
            other => Ok(PropertySchema::typed(self.types.resolve(other)?)),
        }
    }
}

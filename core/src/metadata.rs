#![deny(missing_docs)]

//! # Metadata Store
//!
//! Accumulates, per handler, everything wrappers and documentation blocks
//! contribute, together with the definitions their schemas produced.
//!
//! The store is written during the declaration phase only. [`MetadataStore::seal`]
//! freezes it; later writes are rejected.

use crate::docs::DocBlock;
use crate::error::{SpecError, SpecResult};
use crate::fields::{FieldKind, FieldSpec};
use crate::schema_generator::{CollectedDefinition, DefinitionSpec, PropertySchema};
use crate::type_mapping::{TypeDescriptor, TypeMapper};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Builds a [`HandlerId`] for a function in the calling module.
///
/// ```
/// let id = swagplus_core::handler_id!(create_user);
/// assert_eq!(id.name(), "create_user");
/// ```
#[macro_export]
macro_rules! handler_id {
    ($name:ident) => {
        $crate::metadata::HandlerId::new(module_path!(), stringify!($name))
    };
}

/// Identity of a handler: its declaring module plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId {
    module: String,
    name: String,
}

impl HandlerId {
    /// Creates an identity from a module path (e.g. `module_path!()`) and a name.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Declaring module path.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace used to qualify this handler's definitions.
    pub fn namespace(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    /// Grouping tag derived from the declaring module (its last segment).
    pub fn default_tag(&self) -> &str {
        self.module.rsplit("::").next().unwrap_or(&self.module)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    /// Form fields (or a JSON body in their place).
    FormData,
    /// Query string.
    Query,
    /// Path template variable.
    Path,
    /// JSON body fields.
    Body,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::FormData => write!(f, "formData"),
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Path => write!(f, "path"),
            ParamLocation::Body => write!(f, "body"),
        }
    }
}

/// A documented request parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Type and format; absent on body parameters.
    #[serde(flatten)]
    pub type_: Option<TypeDescriptor>,
    /// Item type, for array parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<TypeDescriptor>,
    /// Body schema; only set on body parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PropertySchema>,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Human readable description.
    pub description: String,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

impl ParameterSpec {
    /// Name of the single parameter documenting a JSON body.
    pub const BODY_NAME: &'static str = "payload";

    /// Documents `field` at `location`, resolving its kind through `types`.
    ///
    /// Nested schemas document as `object` and JSON lists as `array`. Path
    /// parameters are always required.
    pub fn from_field(
        field: &FieldSpec,
        location: ParamLocation,
        types: &dyn TypeMapper,
    ) -> SpecResult<Self> {
        let resolve = |kind: &FieldKind| match kind {
            FieldKind::Nested(_) => Ok(TypeDescriptor::new("object")),
            other => types.resolve(other),
        };
        let (type_, items) = match &field.kind {
            FieldKind::List(item) => (TypeDescriptor::new("array"), Some(resolve(item.as_ref())?)),
            kind => (resolve(kind)?, None),
        };
        Ok(Self {
            name: field.name.clone(),
            location,
            type_: Some(type_),
            items,
            schema: None,
            required: field.required || location == ParamLocation::Path,
            description: field.description.clone(),
            default: field.constraints.default.clone(),
            allowed: field.constraints.allowed.clone(),
        })
    }

    /// The `in: body` parameter carrying `schema`.
    pub fn body(schema: PropertySchema, required: bool) -> Self {
        Self {
            name: Self::BODY_NAME.to_string(),
            location: ParamLocation::Body,
            type_: None,
            items: None,
            schema: Some(schema),
            required,
            description: String::new(),
            default: None,
            allowed: None,
        }
    }

    /// Names of the definitions the body schema references.
    pub fn references(&self) -> Vec<&str> {
        self.schema
            .as_ref()
            .map(PropertySchema::references)
            .unwrap_or_default()
    }
}

/// A documented response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSpec {
    /// Status code key (e.g. `"200"`).
    #[serde(skip)]
    pub status: String,
    /// Human readable description.
    pub description: String,
    /// Body schema: a definition reference or an array of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PropertySchema>,
}

impl ResponseSpec {
    /// Response without a body schema.
    pub fn new(status: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            description: description.into(),
            schema: None,
        }
    }

    /// Definition names referenced by the body schema.
    pub fn references(&self) -> Vec<&str> {
        self.schema
            .as_ref()
            .map(PropertySchema::references)
            .unwrap_or_default()
    }
}

/// Everything known about one handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteMetadata {
    /// One line summary.
    pub summary: Option<String>,
    /// Extended description.
    pub description: Option<String>,
    /// Whether the handler opted into the document.
    pub exported: bool,
    /// Parameters in application order.
    pub parameters: Vec<ParameterSpec>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, ResponseSpec>,
    /// Grouping tags.
    pub tags: BTreeSet<String>,
}

impl RouteMetadata {
    /// Fragment contributed by a documentation block.
    pub fn documented(doc: &DocBlock) -> Self {
        Self {
            summary: Some(doc.summary.clone()),
            description: Some(doc.description.clone()),
            exported: doc.exported,
            ..Self::default()
        }
    }

    /// Finds a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Merges `fragment` into `self`.
    ///
    /// Summary and description keep the first value written. Parameters are
    /// appended; responses are keyed by status; tags are united. Nothing is
    /// modified when an error is returned.
    pub fn merge(&mut self, fragment: RouteMetadata, handler: &HandlerId) -> SpecResult<()> {
        let mut seen: BTreeSet<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        for param in &fragment.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(SpecError::DuplicateParameter {
                    handler: handler.namespace(),
                    name: param.name.clone(),
                });
            }
        }
        for (status, response) in &fragment.responses {
            if self.responses.get(status).is_some_and(|r| r != response) {
                return Err(SpecError::ConflictingResponse {
                    handler: handler.namespace(),
                    status: status.clone(),
                });
            }
        }

        if self.summary.is_none() {
            self.summary = fragment.summary;
        }
        if self.description.is_none() {
            self.description = fragment.description;
        }
        self.exported |= fragment.exported;
        self.parameters.extend(fragment.parameters);
        self.responses.extend(fragment.responses);
        self.tags.extend(fragment.tags);
        Ok(())
    }
}

/// Handler metadata plus the definitions referenced by it.
#[derive(Debug, Default)]
pub struct MetadataStore {
    routes: HashMap<HandlerId, RouteMetadata>,
    definitions: BTreeMap<String, CollectedDefinition>,
    sealed: bool,
}

impl MetadataStore {
    /// Creates an empty, writable store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a metadata fragment into the handler's entry.
    pub fn contribute(&mut self, id: &HandlerId, fragment: RouteMetadata) -> SpecResult<()> {
        self.ensure_open(&id.namespace())?;
        self.routes.entry(id.clone()).or_default().merge(fragment, id)
    }

    /// Adds definitions, rejecting distinct schemas that share a qualified name.
    pub fn define(&mut self, definitions: Vec<CollectedDefinition>) -> SpecResult<()> {
        let subject = definitions
            .first()
            .map_or("definitions", |d| d.spec.qualified_name.as_str());
        self.ensure_open(subject)?;
        for def in &definitions {
            let name = &def.spec.qualified_name;
            let clash = self
                .definitions
                .get(name)
                .or_else(|| definitions.iter().find(|d| &d.spec.qualified_name == name))
                .is_some_and(|existing| existing.schema_id != def.schema_id);
            if clash {
                return Err(SpecError::DefinitionNameCollision(name.clone()));
            }
        }
        for def in definitions {
            self.definitions
                .entry(def.spec.qualified_name.clone())
                .or_insert(def);
        }
        Ok(())
    }

    /// Metadata for `id`, or an empty entry when nothing was contributed.
    pub fn lookup(&self, id: &HandlerId) -> Cow<'_, RouteMetadata> {
        match self.routes.get(id) {
            Some(meta) => Cow::Borrowed(meta),
            None => Cow::Owned(RouteMetadata::default()),
        }
    }

    /// Whether anything was contributed for `id`.
    pub fn contains(&self, id: &HandlerId) -> bool {
        self.routes.contains_key(id)
    }

    /// Finds a definition by qualified name.
    pub fn definition(&self, qualified_name: &str) -> Option<&DefinitionSpec> {
        self.definitions.get(qualified_name).map(|c| &c.spec)
    }

    /// All definitions ordered by qualified name.
    pub fn definitions(&self) -> impl Iterator<Item = &DefinitionSpec> {
        self.definitions.values().map(|c| &c.spec)
    }

    /// Number of handlers with metadata.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no handler has metadata.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freezes the store.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the store has been frozen.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn ensure_open(&self, subject: &str) -> SpecResult<()> {
        if self.sealed {
            Err(SpecError::StoreSealed(subject.to_string()))
        } else {
            Ok(())
        }
    }
}

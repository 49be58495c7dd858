#![deny(missing_docs)]

//! # Swagger Document
//!
//! The serializable Swagger 2.0 document and its renderers.

use crate::config::SpecConfig;
use crate::error::SpecResult;
use crate::metadata::{ParameterSpec, ResponseSpec};
use crate::schema_generator::DefinitionSpec;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The only format version produced.
pub const SWAGGER_VERSION: &str = "2.0";

/// Operations of one path, keyed by lower-case method.
pub type PathItem = BTreeMap<String, Operation>;

/// `info` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
}

/// A documented operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// One line summary.
    pub summary: String,
    /// Extended description.
    pub description: String,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Path variables followed by declared parameters.
    pub parameters: Vec<ParameterSpec>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, ResponseSpec>,
    /// Security requirements (always empty).
    pub security: Vec<Value>,
}

/// A complete Swagger 2.0 document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecDocument {
    /// Always `"2.0"`.
    pub swagger: String,
    /// Title and version.
    pub info: Info,
    /// Host serving the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Prefix of every path.
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Operations keyed by documented path.
    pub paths: BTreeMap<String, PathItem>,
    /// Definitions keyed by qualified name.
    pub definitions: BTreeMap<String, DefinitionSpec>,
}

impl SpecDocument {
    /// Empty document carrying the configured header.
    pub fn new(config: &SpecConfig) -> Self {
        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info: Info {
                title: config.title.clone(),
                version: config.version.clone(),
            },
            host: config.host.clone(),
            base_path: config.base_path.clone(),
            paths: BTreeMap::new(),
            definitions: BTreeMap::new(),
        }
    }

    /// Finds the operation for `path` and lower-case `method`.
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    /// Number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(BTreeMap::len).sum()
    }

    /// The document as a JSON value.
    pub fn to_value(&self) -> SpecResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Pretty printed JSON.
    pub fn to_json_pretty(&self) -> SpecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// YAML.
    pub fn to_yaml(&self) -> SpecResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

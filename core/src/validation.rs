#![deny(missing_docs)]

//! # Validation
//!
//! Request input validation (the [`InputValidator`] collaborator and its
//! default [`FieldValidator`]) and response shape checking against
//! generated definitions.

use crate::error::{SpecError, SpecResult};
use crate::fields::{FieldKind, FieldSpec};
use crate::handler::{Request, Response};
use crate::metadata::ParamLocation;
use crate::schema_generator::{DefinitionSpec, PropertySchema};
use http::StatusCode;
use indexmap::IndexMap;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::{json, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Message carried by every 400 response produced by validation.
pub const VALIDATION_MESSAGE: &str = "Input payload validation failed";

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name (dotted for nested input).
    pub field: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl FieldError {
    /// Creates an error for `field`.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// All field errors of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rejected fields in declaration order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Wraps the collected field errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// The `400` response returned instead of calling the handler.
    pub fn into_response(self) -> Response {
        Response::new(
            StatusCode::BAD_REQUEST,
            json!({ "message": VALIDATION_MESSAGE, "errors": self.errors }),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "validation failed: {}", parts.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Validates and coerces request input for a set of fields.
pub trait InputValidator: Send + Sync {
    /// Reads `fields` from `request` at `location`.
    ///
    /// Returns the coerced values in declaration order, or every field error.
    fn validate(
        &self,
        fields: &[FieldSpec],
        location: ParamLocation,
        request: &Request,
    ) -> Result<IndexMap<String, Value>, ValidationError>;
}

/// Default validator driven by field kinds and constraints.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldValidator;

impl InputValidator for FieldValidator {
    fn validate(
        &self,
        fields: &[FieldSpec],
        location: ParamLocation,
        request: &Request,
    ) -> Result<IndexMap<String, Value>, ValidationError> {
        let mut values = IndexMap::new();
        let mut errors = Vec::new();
        for field in fields {
            match field_value(field, &field.name, lookup(request, location, &field.name)) {
                Ok(Some(value)) => {
                    values.insert(field.name.clone(), value);
                }
                Ok(None) => {}
                Err(mut e) => errors.append(&mut e),
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(ValidationError::new(errors))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Raw<'a> {
    Missing,
    Text(&'a str),
    Json(&'a Value),
    Repeated,
}

fn lookup<'a>(request: &'a Request, location: ParamLocation, name: &str) -> Raw<'a> {
    let pairs = match location {
        ParamLocation::Path => return request.path_param(name).map_or(Raw::Missing, Raw::Text),
        ParamLocation::Body => return json_member(request, name),
        ParamLocation::Query => request.query(),
        ParamLocation::FormData => request.form(),
    };
    let mut matches = pairs.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str());
    match (matches.next(), matches.next()) {
        (Some(_), Some(_)) => Raw::Repeated,
        (Some(v), None) => Raw::Text(v),
        // JSON bodies stand in for form posts.
        (None, _) if location == ParamLocation::FormData => json_member(request, name),
        (None, _) => Raw::Missing,
    }
}

fn json_member<'a>(request: &'a Request, name: &str) -> Raw<'a> {
    match request.json().and_then(|body| body.get(name)) {
        None | Some(Value::Null) => Raw::Missing,
        Some(value) => Raw::Json(value),
    }
}

type Checked<T> = Result<T, Vec<FieldError>>;

fn field_value(field: &FieldSpec, path: &str, raw: Raw<'_>) -> Checked<Option<Value>> {
    let raw = match raw {
        Raw::Text(text) if text.trim().is_empty() => Raw::Missing,
        other => other,
    };
    match raw {
        Raw::Missing if field.required => Err(vec![FieldError::new(path, "is required")]),
        Raw::Missing => Ok(field.constraints.default.clone()),
        Raw::Repeated => Err(vec![FieldError::new(path, "must be provided once")]),
        raw => {
            let value = coerce(field, &field.kind, path, raw)?;
            check_constraints(field, path, &value)?;
            Ok(Some(value))
        }
    }
}

fn reject<T>(path: &str, reason: &str) -> Checked<T> {
    Err(vec![FieldError::new(path, reason)])
}

fn coerce(field: &FieldSpec, kind: &FieldKind, path: &str, raw: Raw<'_>) -> Checked<Value> {
    // JSON strings are handled like raw text for every scalar kind.
    let raw = match raw {
        Raw::Json(Value::String(s)) if !matches!(kind, FieldKind::List(_)) => Raw::Text(s),
        other => other,
    };
    match (kind, raw) {
        (FieldKind::String | FieldKind::Date | FieldKind::DateTime, Raw::Text(text)) => {
            let text = if field.constraints.keep_whitespace {
                text
            } else {
                text.trim()
            };
            Ok(Value::String(text.to_string()))
        }
        (FieldKind::Integer, Raw::Text(text)) => match text.trim().parse::<i64>() {
            Ok(n) => Ok(Value::from(n)),
            Err(_) => reject(path, "must be an integer"),
        },
        (FieldKind::Integer, Raw::Json(v)) if v.is_i64() || v.is_u64() => Ok(v.clone()),
        (FieldKind::Float | FieldKind::Decimal, Raw::Text(text)) => {
            match text.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => Ok(Value::Number(n)),
                None => reject(path, "must be a number"),
            }
        }
        (FieldKind::Float | FieldKind::Decimal, Raw::Json(v)) if v.is_number() => Ok(v.clone()),
        (FieldKind::Boolean, Raw::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => reject(path, "must be a boolean"),
        },
        (FieldKind::Boolean, Raw::Json(v)) if v.is_boolean() => Ok(v.clone()),
        (FieldKind::Dict, Raw::Text(text)) => match serde_json::from_str::<Value>(text) {
            Ok(v @ Value::Object(_)) => Ok(v),
            _ => reject(path, "must be an object"),
        },
        (FieldKind::Dict, Raw::Json(v)) if v.is_object() => Ok(v.clone()),
        (FieldKind::CsvList(item), Raw::Text(text)) => {
            let items: Vec<Value> = text
                .split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
                .collect();
            sequence(field, item, path, &items)
        }
        (FieldKind::CsvList(item) | FieldKind::List(item), Raw::Json(Value::Array(items))) => {
            sequence(field, item, path, items)
        }
        (FieldKind::List(item), Raw::Text(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => sequence(field, item, path, &items),
            _ => reject(path, "must be a list"),
        },
        (FieldKind::Nested(decl), Raw::Text(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => nested(&decl.fields(), path, &object),
            _ => reject(path, "must be an object"),
        },
        (FieldKind::Nested(decl), Raw::Json(Value::Object(object))) => {
            nested(&decl.fields(), path, object)
        }
        (FieldKind::Custom(_), Raw::Text(text)) => Ok(Value::String(text.to_string())),
        (FieldKind::Custom(_), Raw::Json(v)) => Ok(v.clone()),
        (kind, _) => reject(path, &format!("must be a valid {}", kind)),
    }
}

fn sequence(field: &FieldSpec, item: &FieldKind, path: &str, items: &[Value]) -> Checked<Value> {
    let mut out = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, value) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path, i);
        let raw = match value {
            Value::Null => Raw::Missing,
            v => Raw::Json(v),
        };
        let checked = match raw {
            Raw::Missing => reject(&item_path, "must not be null"),
            raw => coerce(field, item, &item_path, raw),
        };
        match checked.and_then(|v| check_constraints(field, &item_path, &v).map(|_| v)) {
            Ok(v) => out.push(v),
            Err(mut e) => errors.append(&mut e),
        }
    }
    if errors.is_empty() {
        Ok(Value::Array(out))
    } else {
        Err(errors)
    }
}

fn nested(fields: &[FieldSpec], path: &str, object: &serde_json::Map<String, Value>) -> Checked<Value> {
    let mut out = serde_json::Map::new();
    let mut errors = Vec::new();
    for field in fields {
        let child = format!("{}.{}", path, field.name);
        let raw = match object.get(&field.name) {
            None | Some(Value::Null) => Raw::Missing,
            Some(v) => Raw::Json(v),
        };
        match field_value(field, &child, raw) {
            Ok(Some(v)) => {
                out.insert(field.name.clone(), v);
            }
            Ok(None) => {}
            Err(mut e) => errors.append(&mut e),
        }
    }
    if errors.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errors)
    }
}

fn check_constraints(field: &FieldSpec, path: &str, value: &Value) -> Checked<()> {
    if value.is_array() {
        return Ok(());
    }
    let c = &field.constraints;
    if let Some(allowed) = &c.allowed {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            return reject(path, &format!("must be one of {}", options.join(", ")));
        }
    }
    if let Some(text) = value.as_str() {
        let len = text.chars().count();
        if let Some(min) = c.min_length.filter(|min| len < *min) {
            return reject(path, &format!("must be at least {} characters", min));
        }
        if let Some(max) = c.max_length.filter(|max| len > *max) {
            return reject(path, &format!("must be at most {} characters", max));
        }
    }
    if let Some(n) = value.as_f64() {
        if let Some(min) = c.minimum {
            let below = if c.exclusive_minimum { n <= min } else { n < min };
            if below {
                let op = if c.exclusive_minimum { "greater than" } else { "at least" };
                return reject(path, &format!("must be {} {}", op, min));
            }
        }
        if let Some(max) = c.maximum {
            let above = if c.exclusive_maximum { n >= max } else { n > max };
            if above {
                let op = if c.exclusive_maximum { "less than" } else { "at most" };
                return reject(path, &format!("must be {} {}", op, max));
            }
        }
    }
    Ok(())
}

/// A handler result that does not match its declared response schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseShapeError {
    /// JSON pointer into the body (`/` is the root).
    pub path: String,
    /// What is wrong at that location.
    pub reason: String,
}

impl fmt::Display for ResponseShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response shape mismatch at {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for ResponseShapeError {}

/// A compiled response schema: the declared definitions plus a JSON Schema
/// validator built from them.
///
/// Compiled once when the response is declared, then shared by every
/// invocation of the handler.
pub struct ResponseSchema {
    root: PropertySchema,
    definitions: BTreeMap<String, DefinitionSpec>,
    validator: Validator,
}

impl ResponseSchema {
    /// Compiles `root` against `definitions`, which must contain every
    /// definition `root` reaches.
    pub fn compile(
        root: PropertySchema,
        definitions: BTreeMap<String, DefinitionSpec>,
    ) -> SpecResult<Self> {
        let document = Self::document(&root, &definitions)?;
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| SpecError::InvalidSchema(e.to_string()))?;
        Ok(Self {
            root,
            definitions,
            validator,
        })
    }

    /// `{"definitions": {...}, <root>}` as a standalone schema document.
    fn document(
        root: &PropertySchema,
        definitions: &BTreeMap<String, DefinitionSpec>,
    ) -> SpecResult<Value> {
        let mut document = serde_json::to_value(root)?;
        if let Value::Object(map) = &mut document {
            map.insert("definitions".to_string(), serde_json::to_value(definitions)?);
        }
        Ok(document)
    }

    /// Checks `body`, returning it reduced to the declared properties.
    ///
    /// `null` values count as absent.
    pub fn conform(&self, body: &Value) -> Result<Value, ResponseShapeError> {
        let pruned = prune(body, &self.root, &self.definitions);
        let first = self
            .validator
            .iter_errors(&pruned)
            .next()
            .map(|err| (err.instance_path.to_string(), err.to_string()));
        match first {
            None => Ok(pruned),
            Some((path, reason)) => Err(ResponseShapeError {
                path: if path.is_empty() { "/".to_string() } else { path },
                reason,
            }),
        }
    }
}

impl fmt::Debug for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSchema")
            .field("root", &self.root)
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Drops properties `schema` does not declare, recursing through `$ref`s and arrays.
fn prune(body: &Value, schema: &PropertySchema, definitions: &BTreeMap<String, DefinitionSpec>) -> Value {
    let definition = schema
        .referenced_definition()
        .and_then(|name| definitions.get(name));
    match (definition, body) {
        (Some(definition), Value::Object(object)) => Value::Object(
            definition
                .properties
                .iter()
                .filter_map(|(key, property)| match object.get(key) {
                    None | Some(Value::Null) => None,
                    Some(value) => Some((key.clone(), prune(value, property, definitions))),
                })
                .collect(),
        ),
        (None, Value::Array(items)) => match schema.items.as_deref() {
            Some(item_schema) => Value::Array(
                items
                    .iter()
                    .map(|item| prune(item, item_schema, definitions))
                    .collect(),
            ),
            None => body.clone(),
        },
        _ => body.clone(),
    }
}

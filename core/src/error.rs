//! # Error Handling
//!
//! Provides the unified `SpecError` enum used across the workspace.
//!
//! Declaration-time variants are fatal and surface from
//! [`Declarations::register`](crate::registry::Declarations::register).
//! Request-time variants (`Validation`, `ResponseShape`) are turned into
//! HTTP responses by the wrappers.

use crate::validation::{ResponseShapeError, ValidationError};
use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Only the structured payload variants get a `From` conversion.
#[derive(Debug, Display, From)]
pub enum SpecError {
    /// A field kind tag has no registered type mapping.
    #[from(ignore)]
    #[display("Unknown field kind '{_0}'")]
    UnknownFieldKind(String),

    /// Two distinct schema declarations resolve to the same qualified name.
    #[from(ignore)]
    #[display("Definition name collision: '{_0}' is declared by two distinct schemas")]
    DefinitionNameCollision(String),

    /// A schema references itself, directly or transitively.
    #[from(ignore)]
    #[display("Cyclic schema: {_0}")]
    CyclicSchema(String),

    /// The same parameter name was attached twice to one handler.
    #[from(ignore)]
    #[display("Duplicate parameter '{name}' on handler '{handler}'")]
    DuplicateParameter {
        /// Handler namespace.
        handler: String,
        /// Parameter name.
        name: String,
    },

    /// Two different responses were declared for one status code.
    #[from(ignore)]
    #[display("Conflicting responses for status {status} on handler '{handler}'")]
    ConflictingResponse {
        /// Handler namespace.
        handler: String,
        /// Status code key.
        status: String,
    },

    /// A handler identity was registered twice.
    #[from(ignore)]
    #[display("Handler '{_0}' is already registered")]
    DuplicateHandler(String),

    /// A write was attempted after the metadata store was sealed.
    #[from(ignore)]
    #[display("Metadata store is sealed; rejected write for '{_0}'")]
    StoreSealed(String),

    /// A route path template is malformed or uses an unknown converter.
    #[from(ignore)]
    #[display("Invalid path template: {_0}")]
    PathTemplate(String),

    /// A route points at a handler that was never registered.
    #[from(ignore)]
    #[display("Route '{path}' points at unregistered handler '{handler}'")]
    UnknownHandler {
        /// Route path template.
        path: String,
        /// Handler namespace.
        handler: String,
    },

    /// A declared response schema could not be compiled.
    #[from(ignore)]
    #[display("Invalid response schema: {_0}")]
    InvalidSchema(String),

    /// Request input failed validation.
    #[display("{_0}")]
    Validation(ValidationError),

    /// A handler returned a body that does not match its declared response.
    #[display("{_0}")]
    ResponseShape(ResponseShapeError),

    /// Invalid configuration value.
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Config(String),

    /// JSON rendering or binding failure.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// YAML rendering failure.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for SpecError {}

/// Helper type alias for Result using SpecError.
pub type SpecResult<T> = Result<T, SpecError>;

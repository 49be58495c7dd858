#![deny(missing_docs)]

//! # Swagger Output
//!
//! - **document**: the serializable Swagger 2.0 model and its renderers.
//! - **routes**: assembly of the document from routes and stored metadata.

pub mod document;
pub mod routes;

pub use document::{Info, Operation, PathItem, SpecDocument, SWAGGER_VERSION};
pub use routes::{assemble, default_responses};

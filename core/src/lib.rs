#![deny(missing_docs)]

//! # Swagplus Core
//!
//! Derives a Swagger 2.0 document from handler declarations.
//!
//! Handlers are declared once, together with composable wrappers describing
//! their parameters and responses, and a documentation block. The declarations
//! are sealed into a [`Service`] which dispatches requests and assembles the
//! document on demand.
//!
//! ```
//! use http::Method;
//! use serde_json::json;
//! use swagplus_core::fields::FieldSpec;
//! use swagplus_core::{field_schema, handler_id};
//! use swagplus_core::{Declarations, Endpoint, Parameters, Request, Response, Router, SpecConfig};
//!
//! field_schema! {
//!     pub struct UserForm {
//!         FieldSpec::string("email").required(),
//!     }
//! }
//!
//! let mut declarations = Declarations::new(SpecConfig::default());
//! let id = declarations
//!     .register(
//!         Endpoint::new(handler_id!(create_user), |ctx| {
//!             Response::created(json!({ "email": ctx.str("email") }))
//!         })
//!         .doc("create a new user\n---")
//!         .wrap(Parameters::form_data::<UserForm>()),
//!     )
//!     .unwrap();
//!
//! let service = declarations
//!     .seal(Router::new().route("/users", [Method::POST], id))
//!     .unwrap();
//! let response = service.dispatch(Request::post("/users").with_form("email", "a@b.c"));
//! assert_eq!(response.status, http::StatusCode::CREATED);
//! assert!(service.specification().operation("/users", "post").is_some());
//! ```

/// Document settings.
pub mod config;

/// Documentation block parsing.
pub mod docs;

/// Shared error types.
pub mod error;

/// Field declarations.
pub mod fields;

/// Requests, responses and the per-invocation context.
pub mod handler;

/// Per-handler metadata storage.
pub mod metadata;

/// Swagger document model and assembly.
pub mod oas;

/// Route path templates.
pub mod path_template;

/// Route table, declaration phase and sealed service.
pub mod registry;

/// Definition generation from field schemas.
pub mod schema_generator;

/// Type mapping logic (field kind -> Swagger type).
pub mod type_mapping;

/// Input validation and response shape checks.
pub mod validation;

/// Handler wrappers.
pub mod wrappers;

pub use config::SpecConfig;
pub use docs::DocBlock;
pub use error::{SpecError, SpecResult};
pub use fields::{FieldKind, FieldSchema, FieldSpec, SchemaDecl};
pub use handler::{Endpoint, HandlerFn, Request, RequestContext, Response};
pub use metadata::{HandlerId, MetadataStore, ParamLocation, ParameterSpec, ResponseSpec, RouteMetadata};
pub use oas::{assemble, SpecDocument};
pub use registry::{Declarations, RegisteredRoute, RouteMatch, RouteTable, Router, Service};
pub use schema_generator::{introspect, DefinitionSpec, Introspection, PropertySchema};
pub use type_mapping::{FieldTypeRegistry, TypeDescriptor, TypeMapper};
pub use validation::{
    FieldError, FieldValidator, InputValidator, ResponseSchema, ResponseShapeError, ValidationError,
};
pub use wrappers::{Parameters, Returns, Tags, Wrapped, Wrapper};

//! Parameter wrapper: documents request input and validates it per invocation.

use crate::error::SpecResult;
use crate::fields::{FieldSchema, SchemaDecl};
use crate::handler::handler_fn;
use crate::metadata::{ParamLocation, ParameterSpec, RouteMetadata};
use crate::schema_generator::{introspect, PropertySchema};
use crate::type_mapping::TypeMapper;
use crate::validation::{FieldValidator, InputValidator};
use crate::wrappers::{Wrapped, Wrapper};
use std::sync::Arc;
use tracing::debug;

/// Declares the fields a handler reads from one request location.
#[derive(Clone)]
pub struct Parameters {
    location: ParamLocation,
    decl: SchemaDecl,
    validator: Arc<dyn InputValidator>,
}

impl Parameters {
    /// Parameters of `decl` read from `location`, checked by [`FieldValidator`].
    pub fn new(location: ParamLocation, decl: SchemaDecl) -> Self {
        Self {
            location,
            decl,
            validator: Arc::new(FieldValidator),
        }
    }

    /// Form fields described by `S`.
    pub fn form_data<S: FieldSchema>() -> Self {
        Self::new(ParamLocation::FormData, SchemaDecl::of::<S>())
    }

    /// Query fields described by `S`.
    pub fn query<S: FieldSchema>() -> Self {
        Self::new(ParamLocation::Query, SchemaDecl::of::<S>())
    }

    /// Path variables described by `S`.
    pub fn path<S: FieldSchema>() -> Self {
        Self::new(ParamLocation::Path, SchemaDecl::of::<S>())
    }

    /// JSON body described by `S`, documented as one `in: body` parameter
    /// whose schema references the definition of `S`.
    pub fn body<S: FieldSchema>() -> Self {
        Self::new(ParamLocation::Body, SchemaDecl::of::<S>())
    }

    /// Replaces the input validator.
    pub fn validator(mut self, validator: Arc<dyn InputValidator>) -> Self {
        self.validator = validator;
        self
    }
}

impl Wrapper for Parameters {
    fn apply(&self, mut wrapped: Wrapped, types: &dyn TypeMapper) -> SpecResult<Wrapped> {
        let fields = self.decl.fields();
        let parameters = if self.location == ParamLocation::Body {
            let introspection = introspect(&self.decl, &wrapped.id.namespace(), types)?;
            wrapped.definitions.extend(introspection.definitions);
            let required = fields.iter().any(|field| field.required);
            vec![ParameterSpec::body(
                PropertySchema::reference(&introspection.root),
                required,
            )]
        } else {
            fields
                .iter()
                .map(|field| ParameterSpec::from_field(field, self.location, types))
                .collect::<SpecResult<Vec<_>>>()?
        };
        wrapped.metadata.merge(
            RouteMetadata {
                parameters,
                ..RouteMetadata::default()
            },
            &wrapped.id,
        )?;

        let inner = wrapped.handler;
        let validator = Arc::clone(&self.validator);
        let location = self.location;
        let id = wrapped.id.clone();
        wrapped.handler = handler_fn(move |ctx| {
            match validator.validate(&fields, location, ctx.request()) {
                Ok(values) => {
                    ctx.extend(values);
                    inner(ctx)
                }
                Err(err) => {
                    debug!(handler = %id, %location, %err, "Rejected request input");
                    err.into_response()
                }
            }
        });
        Ok(wrapped)
    }
}

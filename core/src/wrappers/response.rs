//! Response wrapper: documents a response schema and enforces it.

use crate::error::{SpecError, SpecResult};
use crate::fields::{FieldSchema, SchemaDecl};
use crate::handler::{handler_fn, Response};
use crate::metadata::{ResponseSpec, RouteMetadata};
use crate::schema_generator::{introspect, PropertySchema};
use crate::type_mapping::TypeMapper;
use crate::validation::ResponseSchema;
use crate::wrappers::{Wrapped, Wrapper};
use http::StatusCode;
use tracing::error;

/// Description used when none is given.
pub const DEFAULT_DESCRIPTION: &str = "api result";

/// Declares the body a handler returns for one status code.
///
/// When the handler answers with that status, the body is checked against
/// the schema and reduced to the declared properties. A mismatch becomes a
/// `500`. [`Returns::documentation_only`] turns the check off.
#[derive(Debug, Clone)]
pub struct Returns {
    decl: SchemaDecl,
    status: StatusCode,
    description: String,
    many: bool,
    strict: bool,
}

impl Returns {
    /// `200` response whose body is described by `S`.
    pub fn schema<S: FieldSchema>() -> Self {
        Self {
            decl: SchemaDecl::of::<S>(),
            status: StatusCode::OK,
            description: DEFAULT_DESCRIPTION.to_string(),
            many: false,
            strict: true,
        }
    }

    /// Sets the status code.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The body is an array of `S`.
    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    /// Documents the response without checking handler output.
    pub fn documentation_only(mut self) -> Self {
        self.strict = false;
        self
    }
}

impl Wrapper for Returns {
    fn apply(&self, mut wrapped: Wrapped, types: &dyn TypeMapper) -> SpecResult<Wrapped> {
        let introspection = introspect(&self.decl, &wrapped.id.namespace(), types)?;
        let root = PropertySchema::reference(&introspection.root);
        let schema = if self.many {
            PropertySchema::array(root)
        } else {
            root
        };

        let status = self.status.as_str().to_string();
        let mut fragment = RouteMetadata::default();
        fragment.responses.insert(
            status.clone(),
            ResponseSpec {
                status,
                description: self.description.clone(),
                schema: Some(schema.clone()),
            },
        );
        wrapped.metadata.merge(fragment, &wrapped.id)?;
        wrapped
            .definitions
            .extend(introspection.definitions.iter().cloned());

        if !self.strict {
            return Ok(wrapped);
        }

        let definitions = introspection
            .definitions
            .into_iter()
            .map(|c| (c.spec.qualified_name.clone(), c.spec))
            .collect();
        let checker = ResponseSchema::compile(schema, definitions)?;
        let inner = wrapped.handler;
        let declared = self.status;
        let id = wrapped.id.clone();
        wrapped.handler = handler_fn(move |ctx| {
            let response = inner(ctx);
            if response.status != declared {
                return response;
            }
            match checker.conform(&response.body) {
                Ok(body) => Response::new(declared, body),
                Err(err) => {
                    let err = SpecError::from(err);
                    error!(handler = %id, %err, "Handler returned an undeclared response shape");
                    Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
            }
        });
        Ok(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSpec;
    use crate::handler::Request;
    use crate::metadata::HandlerId;
    use crate::type_mapping::FieldTypeRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    crate::field_schema! {
        struct AddressSchema {
            FieldSpec::string("street"),
            FieldSpec::string("state"),
            FieldSpec::string("country"),
        }
    }

    crate::field_schema! {
        struct Other {
            FieldSpec::string("x"),
        }
    }

    fn returning(status: StatusCode, body: Value) -> Wrapped {
        Wrapped::new(
            HandlerId::new("app::users", "create_user"),
            handler_fn(move |_| Response::new(status, body.clone())),
        )
    }

    fn apply(returns: Returns, wrapped: Wrapped) -> SpecResult<Wrapped> {
        returns.apply(wrapped, &FieldTypeRegistry::new())
    }

    #[test]
    fn test_response_is_documented() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>(),
            returning(StatusCode::OK, json!({})),
        )
        .unwrap();
        let response = &wrapped.metadata.responses["200"];
        assert_eq!(response.description, "api result");
        assert_eq!(
            response.references(),
            vec!["app::users::create_user:AddressSchema"]
        );
        assert_eq!(wrapped.definitions.len(), 1);
    }

    #[test]
    fn test_many_documents_an_array() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>().many().status(StatusCode::CREATED),
            returning(StatusCode::CREATED, json!([])),
        )
        .unwrap();
        let schema = wrapped.metadata.responses["201"].schema.clone().unwrap();
        assert_eq!(schema.type_.as_deref(), Some("array"));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "array", "items": {"$ref": "#/definitions/app::users::create_user:AddressSchema"}})
        );
    }

    #[test]
    fn test_strict_output_drops_undeclared_properties() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>(),
            returning(StatusCode::OK, json!({"street": "Main", "secret": "x"})),
        )
        .unwrap();
        let response = wrapped.invoke(&Request::get("/"));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({"street": "Main"}));
    }

    #[test]
    fn test_strict_mismatch_becomes_500() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>(),
            returning(StatusCode::OK, json!({"street": 12})),
        )
        .unwrap();
        let response = wrapped.invoke(&Request::get("/"));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_other_status_passes_through() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>(),
            returning(StatusCode::NOT_FOUND, json!({"message": "missing"})),
        )
        .unwrap();
        let response = wrapped.invoke(&Request::get("/"));
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({"message": "missing"}));
    }

    #[test]
    fn test_documentation_only_passes_through() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>().documentation_only(),
            returning(StatusCode::OK, json!({"street": 12})),
        )
        .unwrap();
        assert_eq!(wrapped.invoke(&Request::get("/")).body, json!({"street": 12}));
    }

    #[test]
    fn test_identical_response_is_idempotent_and_conflict_fails() {
        let wrapped = apply(
            Returns::schema::<AddressSchema>(),
            returning(StatusCode::OK, json!({})),
        )
        .unwrap();
        let wrapped = apply(Returns::schema::<AddressSchema>(), wrapped).unwrap();
        assert_eq!(wrapped.metadata.responses.len(), 1);

        let err = apply(Returns::schema::<Other>(), wrapped).err().unwrap();
        assert!(matches!(err, SpecError::ConflictingResponse { ref status, .. } if status == "200"));
    }
}

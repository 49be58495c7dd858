//! # Demo Service
//!
//! A small users API declared with the core wrappers. Every command runs
//! against it.

use crate::error::CliResult;
use http::{Method, StatusCode};
use serde_json::json;
use swagplus_core::fields::FieldSpec;
use swagplus_core::{
    field_schema, handler_id, Declarations, Endpoint, Response, Router, Service, SpecConfig,
};

/// User endpoints.
pub mod users {
    use super::*;
    use swagplus_core::{Parameters, Returns};

    field_schema! {
        /// Fields accepted when creating a user.
        pub struct UserForm {
            FieldSpec::string("email"),
            FieldSpec::string("name"),
        }
    }

    field_schema! {
        /// Postal address.
        pub struct AddressSchema {
            FieldSpec::string("street"),
            FieldSpec::string("state"),
            FieldSpec::string("country"),
        }
    }

    field_schema! {
        /// A stored user.
        pub struct UserSchema {
            FieldSpec::integer("id").required().describe("user identifier"),
            FieldSpec::string("email").required(),
            FieldSpec::string("name"),
            FieldSpec::nested::<AddressSchema>("address"),
        }
    }

    field_schema! {
        /// Path variables of a single user.
        pub struct UserPath {
            FieldSpec::integer("user_id").required().describe("user identifier").minimum(1.0),
        }
    }

    /// `POST /users`.
    pub fn create_user() -> Endpoint {
        Endpoint::new(handler_id!(create_user), |ctx| {
            Response::ok(json!({
                "street": "1 Infinite Loop",
                "state": "CA",
                "country": "US",
                "email": ctx.str("email"),
            }))
        })
        .doc(
            "create a new user
            Stores the user and returns the address on file.
            ---
            The address is fixed in the demo.",
        )
        .wrap(Parameters::form_data::<UserForm>())
        .wrap(Returns::schema::<AddressSchema>())
    }

    /// `GET /users/<int:user_id>`.
    pub fn get_user() -> Endpoint {
        Endpoint::new(handler_id!(get_user), |ctx| {
            match ctx.get("user_id").and_then(|v| v.as_i64()) {
                Some(1) => Response::ok(json!({
                    "id": 1,
                    "email": "ada@example.com",
                    "name": "Ada",
                    "address": {"street": "12 St James's Square", "country": "UK"},
                })),
                _ => Response::error(StatusCode::NOT_FOUND, "user not found"),
            }
        })
        .doc("fetch a user\n---")
        .wrap(Parameters::path::<UserPath>())
        .wrap(Returns::schema::<UserSchema>().description("the user"))
    }
}

/// `GET /health`; not part of the document.
pub fn health() -> Endpoint {
    Endpoint::new(handler_id!(health), |_ctx| Response::ok(json!({"status": "ok"})))
        .doc("liveness probe used by the load balancer")
}

/// Declares and seals the demo service.
pub fn service(config: SpecConfig) -> CliResult<Service<Router>> {
    let mut declarations = Declarations::new(config);
    let create = declarations.register(users::create_user())?;
    let get = declarations.register(users::get_user())?;
    let health = declarations.register(health())?;

    let service = declarations.seal(
        Router::new()
            .route("/users", [Method::POST], create)
            .route("/users/<int:user_id>", [Method::GET, Method::HEAD], get)
            .route("/health", [Method::GET], health),
    )?;
    Ok(service)
}

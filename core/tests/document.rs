use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swagplus_core::fields::FieldSpec;
use swagplus_core::{
    Declarations, Endpoint, Parameters, Response, Returns, Router, SpecConfig, SpecError, Tags,
};

mod users {
    use super::*;

    swagplus_core::field_schema! {
        pub struct UserForm {
            FieldSpec::string("email"),
            FieldSpec::string("name"),
        }
    }

    swagplus_core::field_schema! {
        pub struct AddressSchema {
            FieldSpec::string("street"),
            FieldSpec::string("state"),
            FieldSpec::string("country"),
        }
    }

    pub fn create_user() -> Endpoint {
        Endpoint::new(swagplus_core::handler_id!(create_user), |_ctx| {
            Response::ok(json!({"street": "1 Main St", "state": "CA", "country": "US"}))
        })
        .doc(
            "create a new user
            ---
            stores the record",
        )
        .wrap(Parameters::form_data::<UserForm>())
        .wrap(Returns::schema::<AddressSchema>())
    }

    pub fn list_users() -> Endpoint {
        Endpoint::new(swagplus_core::handler_id!(list_users), |_ctx| {
            Response::ok(json!([]))
        })
        .doc("---")
    }

    pub fn helper() -> Endpoint {
        Endpoint::new(swagplus_core::handler_id!(helper), |_ctx| {
            Response::ok(Value::Null)
        })
        .doc("internal helper without delimiter")
    }
}

mod billing {
    use super::*;

    swagplus_core::field_schema! {
        pub struct AddressSchema {
            FieldSpec::string("line1").required(),
            FieldSpec::string("postcode"),
        }
    }

    pub fn invoice() -> Endpoint {
        Endpoint::new(swagplus_core::handler_id!(invoice), |_ctx| {
            Response::ok(json!({"line1": "x"}))
        })
        .doc("billing address\n---")
        .wrap(Returns::schema::<AddressSchema>())
    }

    pub fn conflicting() -> Endpoint {
        Endpoint::new(swagplus_core::handler_id!(conflicting), |_ctx| {
            Response::ok(Value::Null)
        })
        .doc("two schemas, one name\n---")
        .wrap(Returns::schema::<AddressSchema>())
        .wrap(Returns::schema::<super::users::AddressSchema>().status(StatusCode::CREATED))
    }
}

fn document_json(endpoints: Vec<Endpoint>, routes: &[(&str, Method)]) -> Value {
    let mut declarations = Declarations::new(SpecConfig::default());
    let ids: Vec<_> = endpoints
        .into_iter()
        .map(|e| declarations.register(e).unwrap())
        .collect();
    let router = routes
        .iter()
        .zip(ids)
        .fold(Router::new(), |router, ((path, method), id)| {
            router.route(*path, [method.clone()], id)
        });
    declarations
        .seal(router)
        .unwrap()
        .specification()
        .to_value()
        .unwrap()
}

#[test]
fn test_end_to_end_sample() {
    let document = document_json(vec![users::create_user()], &[("/users", Method::POST)]);
    let ns = "document::users::create_user";
    assert_eq!(
        document,
        json!({
            "swagger": "2.0",
            "info": {"title": "swagger project", "version": "0.0.1"},
            "paths": {
                "/users": {
                    "post": {
                        "summary": "create a new user",
                        "description": "",
                        "tags": ["users"],
                        "parameters": [
                            {"name": "email", "in": "formData", "type": "string", "required": false, "description": ""},
                            {"name": "name", "in": "formData", "type": "string", "required": false, "description": ""}
                        ],
                        "responses": {
                            "200": {
                                "description": "api result",
                                "schema": {"$ref": format!("#/definitions/{}:AddressSchema", ns)}
                            }
                        },
                        "security": []
                    }
                }
            },
            "definitions": {
                format!("{}:AddressSchema", ns): {
                    "type": "object",
                    "properties": {
                        "street": {"type": "string"},
                        "state": {"type": "string"},
                        "country": {"type": "string"}
                    }
                }
            }
        })
    );
}

#[test]
fn test_same_schema_name_in_two_handlers() {
    let document = document_json(
        vec![users::create_user(), billing::invoice()],
        &[("/users", Method::POST), ("/invoice", Method::GET)],
    );
    let definitions = document["definitions"].as_object().unwrap();
    let names: Vec<&String> = definitions.keys().collect();
    assert_eq!(
        names,
        vec![
            "document::billing::invoice:AddressSchema",
            "document::users::create_user:AddressSchema"
        ]
    );
    assert_eq!(
        definitions["document::billing::invoice:AddressSchema"]["required"],
        json!(["line1"])
    );
}

#[test]
fn test_two_schemas_with_one_name_on_one_handler_fail() {
    let mut declarations = Declarations::new(SpecConfig::default());
    let err = declarations.register(billing::conflicting()).unwrap_err();
    assert!(matches!(err, SpecError::DefinitionNameCollision(_)));
}

#[test]
fn test_unexported_handler_does_not_change_the_document() {
    let with_helper = document_json(
        vec![users::create_user(), users::helper()],
        &[("/users", Method::POST), ("/helper", Method::GET)],
    );
    let without_helper = document_json(vec![users::create_user()], &[("/users", Method::POST)]);
    assert_eq!(with_helper, without_helper);
}

#[test]
fn test_assembly_is_idempotent() {
    let build = || {
        let mut declarations = Declarations::new(SpecConfig::default());
        let a = declarations.register(users::create_user()).unwrap();
        let b = declarations.register(billing::invoice()).unwrap();
        declarations.seal(
            Router::new()
                .route("/users", [Method::POST], a)
                .route("/invoice", [Method::GET, Method::PUT], b),
        )
        .unwrap()
    };
    let first = build().specification().to_json_pretty().unwrap();
    let second = build().specification().to_json_pretty().unwrap();
    assert_eq!(first, second);

    let service = build();
    assert_eq!(
        service.specification().to_yaml().unwrap(),
        service.specification().to_yaml().unwrap()
    );
}

swagplus_core::field_schema! {
    struct Lookup {
        FieldSpec::string("q").required(),
    }
}

swagplus_core::field_schema! {
    struct Hit {
        FieldSpec::string("title").required(),
    }
}

fn search(order_a_first: bool) -> Endpoint {
    let endpoint = Endpoint::new(swagplus_core::handler_id!(search), |_ctx| {
        Response::ok(json!([]))
    })
    .doc("search\n---");
    if order_a_first {
        endpoint
            .wrap(Tags::new(["search"]))
            .wrap(Returns::schema::<Hit>().many())
            .wrap(Parameters::query::<Lookup>())
    } else {
        endpoint
            .wrap(Parameters::query::<Lookup>())
            .wrap(Returns::schema::<Hit>().many())
            .wrap(Tags::new(["search"]))
    }
}

#[test]
fn test_wrapper_order_does_not_change_the_document() {
    let a = document_json(vec![search(true)], &[("/search", Method::GET)]);
    let b = document_json(vec![search(false)], &[("/search", Method::GET)]);
    assert_eq!(a, b);

    let operation = &a["paths"]["/search"]["get"];
    assert_eq!(operation["tags"], json!(["search"]));
    assert_eq!(operation["parameters"][0]["required"], json!(true));
    assert_eq!(
        operation["responses"]["200"]["schema"]["type"],
        json!("array")
    );
}

#[test]
fn test_config_reaches_the_document() {
    let config = SpecConfig {
        title: "Users API".into(),
        version: "3.0.1".into(),
        host: Some("api.example.com".into()),
        base_path: Some("/v1".into()),
    };
    let mut declarations = Declarations::new(config);
    let id = declarations.register(users::create_user()).unwrap();
    let service = declarations
        .seal(Router::new().route("/users", [Method::POST], id))
        .unwrap();
    let document = service.specification().to_value().unwrap();
    assert_eq!(document["info"], json!({"title": "Users API", "version": "3.0.1"}));
    assert_eq!(document["host"], json!("api.example.com"));
    assert_eq!(document["basePath"], json!("/v1"));
}

#[test]
fn test_delimiter_only_doc_is_exported_with_empty_summary() {
    let document = document_json(
        vec![users::list_users(), users::helper()],
        &[("/users", Method::GET), ("/helper", Method::GET)],
    );
    let operation = &document["paths"]["/users"]["get"];
    assert_eq!(operation["summary"], json!(""));
    assert_eq!(operation["description"], json!(""));
    assert_eq!(operation["tags"], json!(["users"]));
    assert_eq!(operation["responses"]["200"]["description"], json!("api result"));
    assert!(document["paths"].get("/helper").is_none());
}

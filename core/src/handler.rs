#![deny(missing_docs)]

//! # Handler Contract
//!
//! The request value handed to a service, the response a handler produces,
//! and the per-invocation [`RequestContext`] through which wrappers pass
//! validated input to the handler.
//!
//! Every invocation owns its own context; there is no shared "current
//! request" state.

use crate::error::SpecResult;
use crate::metadata::HandlerId;
use crate::wrappers::Wrapper;
use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Handler callable shared between the service and its wrappers.
pub type HandlerFn = Arc<dyn Fn(&mut RequestContext<'_>) -> Response + Send + Sync>;

/// Boxes a closure as a [`HandlerFn`].
pub fn handler_fn<F>(f: F) -> HandlerFn
where
    F: Fn(&mut RequestContext<'_>) -> Response + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An incoming request, already split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    path_params: BTreeMap<String, String>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    json: Option<Value>,
}

impl Request {
    /// Request without any input.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: BTreeMap::new(),
            query: Vec::new(),
            form: Vec::new(),
            json: None,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Adds a query pair. Repeating a key keeps every value.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a form pair. Repeating a key keeps every value.
    pub fn with_form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    /// Sets a captured path variable.
    pub fn with_path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    /// Replaces all captured path variables.
    pub fn with_path_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.path_params = params;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Concrete request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Captured path variable.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Query pairs in arrival order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Form pairs in arrival order.
    pub fn form(&self) -> &[(String, String)] {
        &self.form
    }

    /// JSON body, if any.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }
}

/// A handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// JSON body (`null` for none).
    pub body: Value,
}

impl Response {
    /// Response with an explicit status.
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// `200 OK`.
    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// `201 Created`.
    pub fn created(body: Value) -> Self {
        Self::new(StatusCode::CREATED, body)
    }

    /// `204 No Content`.
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, Value::Null)
    }

    /// Serializes `body` with the given status.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> SpecResult<Self> {
        Ok(Self::new(status, serde_json::to_value(body)?))
    }

    /// Error response with a `{"message": ...}` body.
    pub fn error(status: StatusCode, message: impl fmt::Display) -> Self {
        Self::new(status, json!({ "message": message.to_string() }))
    }
}

/// Per-invocation state: the request plus the input validated so far.
#[derive(Debug)]
pub struct RequestContext<'r> {
    request: &'r Request,
    input: IndexMap<String, Value>,
}

impl<'r> RequestContext<'r> {
    /// Fresh context for `request`.
    pub fn new(request: &'r Request) -> Self {
        Self {
            request,
            input: IndexMap::new(),
        }
    }

    /// The underlying request.
    pub fn request(&self) -> &'r Request {
        self.request
    }

    /// Validated value for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.input.get(name)
    }

    /// Validated text value for `name`.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// All validated input in arrival order.
    pub fn input(&self) -> &IndexMap<String, Value> {
        &self.input
    }

    /// Merges validated values; later values replace earlier ones.
    pub fn extend(&mut self, values: IndexMap<String, Value>) {
        self.input.extend(values);
    }

    /// Deserializes the validated input into `T`.
    pub fn bind<T: DeserializeOwned>(&self) -> SpecResult<T> {
        let object: serde_json::Map<String, Value> = self
            .input
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

/// A handler plus everything declared about it, ready for registration.
pub struct Endpoint {
    id: HandlerId,
    handler: HandlerFn,
    doc: Option<String>,
    wrappers: Vec<Box<dyn Wrapper>>,
}

impl Endpoint {
    /// Endpoint for `handler` identified by `id`.
    pub fn new<F>(id: HandlerId, handler: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>) -> Response + Send + Sync + 'static,
    {
        Self {
            id,
            handler: handler_fn(handler),
            doc: None,
            wrappers: Vec::new(),
        }
    }

    /// Attaches the documentation block.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Adds a wrapper. Wrappers apply in the order they are added, the first
    /// one sitting closest to the handler.
    pub fn wrap(mut self, wrapper: impl Wrapper + 'static) -> Self {
        self.wrappers.push(Box::new(wrapper));
        self
    }

    /// Handler identity.
    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    pub(crate) fn into_parts(self) -> (HandlerId, HandlerFn, Option<String>, Vec<Box<dyn Wrapper>>) {
        (self.id, self.handler, self.doc, self.wrappers)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("doc", &self.doc)
            .field("wrappers", &self.wrappers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct NewUser {
        email: String,
        name: Option<String>,
    }

    #[test]
    fn test_request_builder() {
        let request = Request::post("/users")
            .with_form("email", "a@b.c")
            .with_query("page", "2")
            .with_path_param("id", "7");
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.form()[0], ("email".into(), "a@b.c".into()));
        assert_eq!(request.query().len(), 1);
        assert_eq!(request.path_param("id"), Some("7"));
        assert!(request.json().is_none());
    }

    #[test]
    fn test_context_bind() {
        let request = Request::post("/users");
        let mut ctx = RequestContext::new(&request);
        let mut values = IndexMap::new();
        values.insert("email".to_string(), json!("a@b.c"));
        ctx.extend(values);

        assert_eq!(ctx.str("email"), Some("a@b.c"));
        assert!(ctx.get("name").is_none());
        let user: NewUser = ctx.bind().unwrap();
        assert_eq!(
            user,
            NewUser {
                email: "a@b.c".into(),
                name: None
            }
        );
    }

    #[test]
    fn test_bind_reports_missing_fields() {
        let request = Request::get("/");
        let ctx = RequestContext::new(&request);
        assert!(ctx.bind::<NewUser>().is_err());
    }

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::NOT_FOUND, "no route");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({"message": "no route"}));
    }

    #[test]
    fn test_endpoint_invokes_handler() {
        let endpoint = Endpoint::new(HandlerId::new("app", "ping"), |_ctx| {
            Response::ok(json!("pong"))
        })
        .doc("ping\n---");
        assert_eq!(endpoint.id().name(), "ping");

        let (_, handler, doc, wrappers) = endpoint.into_parts();
        assert_eq!(doc.as_deref(), Some("ping\n---"));
        assert!(wrappers.is_empty());
        let request = Request::get("/ping");
        let mut ctx = RequestContext::new(&request);
        assert_eq!(handler(&mut ctx).body, json!("pong"));
    }
}

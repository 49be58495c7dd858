#![deny(missing_docs)]

//! # Registry
//!
//! The two phases of a service's life.
//!
//! 1. [`Declarations`] collects endpoints at startup. Every wrapper and
//!    documentation block is applied once, and any declaration error fails
//!    fast.
//! 2. [`Declarations::seal`] freezes the metadata and yields a [`Service`]
//!    that can be shared across threads. It serves requests and assembles the
//!    document on first use.

use crate::config::SpecConfig;
use crate::docs;
use crate::error::{SpecError, SpecResult};
use crate::handler::{Endpoint, HandlerFn, Request, RequestContext, Response};
use crate::metadata::{HandlerId, MetadataStore, RouteMetadata};
use crate::oas::routes::shadowed_variable;
use crate::oas::{assemble, SpecDocument};
use crate::path_template::PathTemplate;
use crate::type_mapping::{FieldTypeRegistry, TypeDescriptor};
use crate::wrappers::Wrapped;
use http::{Method, StatusCode};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// A route as known to the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredRoute {
    /// Path template.
    pub path: String,
    /// Methods served.
    pub methods: Vec<Method>,
    /// Handler serving the route.
    pub handler: HandlerId,
}

/// A concrete request path resolved to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Handler serving the route.
    pub handler: HandlerId,
    /// Matching template.
    pub template: String,
    /// Captured path variables.
    pub path_params: BTreeMap<String, String>,
}

/// Source of the routes a service exposes.
pub trait RouteTable: Send + Sync {
    /// Every registered route in registration order.
    fn registered_routes(&self) -> Vec<RegisteredRoute>;

    /// First route serving `method` whose template matches `path`.
    fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.registered_routes()
            .into_iter()
            .filter(|route| route.methods.contains(method))
            .find_map(|route| {
                let path_params = PathTemplate::parse(&route.path).ok()?.matches(path)?;
                Some(RouteMatch {
                    handler: route.handler,
                    template: route.path,
                    path_params,
                })
            })
    }

    /// Methods served at `path` by any route.
    fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for route in self.registered_routes() {
            let matched = PathTemplate::parse(&route.path)
                .ok()
                .and_then(|t| t.matches(path))
                .is_some();
            if matched {
                for method in route.methods {
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
            }
        }
        methods
    }
}

/// In-memory route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<RegisteredRoute>,
}

impl Router {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    pub fn route<M>(mut self, path: impl Into<String>, methods: M, handler: HandlerId) -> Self
    where
        M: IntoIterator<Item = Method>,
    {
        self.routes.push(RegisteredRoute {
            path: path.into(),
            methods: methods.into_iter().collect(),
            handler,
        });
        self
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteTable for Router {
    fn registered_routes(&self) -> Vec<RegisteredRoute> {
        self.routes.clone()
    }
}

/// Declaration phase: collects endpoints and their metadata.
#[derive(Default)]
pub struct Declarations {
    config: SpecConfig,
    types: FieldTypeRegistry,
    store: MetadataStore,
    handlers: HashMap<HandlerId, HandlerFn>,
}

impl Declarations {
    /// Starts a declaration phase with the built-in field kinds.
    pub fn new(config: SpecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Maps a custom field kind tag. Returns the mapping it replaced.
    pub fn register_field_kind(
        &mut self,
        tag: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Option<TypeDescriptor> {
        self.types.register(tag, descriptor)
    }

    /// Applies the endpoint's wrappers and documentation, then stores the result.
    ///
    /// # Errors
    ///
    /// Any declaration-time error, or `DuplicateHandler` when the identity is
    /// already registered.
    pub fn register(&mut self, endpoint: Endpoint) -> SpecResult<HandlerId> {
        let (id, handler, doc, wrappers) = endpoint.into_parts();
        if self.handlers.contains_key(&id) {
            return Err(SpecError::DuplicateHandler(id.namespace()));
        }

        let mut wrapped = Wrapped::new(id.clone(), handler);
        for wrapper in &wrappers {
            wrapped = wrapper.apply(wrapped, &self.types)?;
        }

        self.store.define(wrapped.definitions)?;
        if let Some(raw) = doc.as_deref() {
            self.store
                .contribute(&id, RouteMetadata::documented(&docs::parse(raw)))?;
        }
        self.store.contribute(&id, wrapped.metadata)?;

        let metadata = self.store.lookup(&id);
        debug!(
            handler = %id,
            exported = metadata.exported,
            parameters = metadata.parameters.len(),
            responses = metadata.responses.len(),
            "Registered handler"
        );
        self.handlers.insert(id.clone(), wrapped.handler);
        Ok(id)
    }

    /// Whether `id` has been registered.
    pub fn contains(&self, id: &HandlerId) -> bool {
        self.handlers.contains_key(id)
    }

    /// Freezes the declarations and binds them to `routes`.
    ///
    /// # Errors
    ///
    /// `PathTemplate` for a malformed template, `UnknownHandler` for a route
    /// whose handler was never registered, and `DuplicateParameter` when a
    /// template variable is also declared in a non-path location.
    pub fn seal<R: RouteTable>(mut self, routes: R) -> SpecResult<Service<R>> {
        for route in routes.registered_routes() {
            let template = PathTemplate::parse(&route.path)?;
            if !self.handlers.contains_key(&route.handler) {
                return Err(SpecError::UnknownHandler {
                    path: route.path,
                    handler: route.handler.namespace(),
                });
            }
            let metadata = self.store.lookup(&route.handler);
            if let Some(name) = shadowed_variable(&metadata, &template) {
                return Err(SpecError::DuplicateParameter {
                    handler: route.handler.namespace(),
                    name: name.to_string(),
                });
            }
        }
        self.store.seal();
        info!(handlers = self.handlers.len(), "Sealed declarations");
        Ok(Service {
            config: self.config,
            store: self.store,
            handlers: self.handlers,
            routes,
            document: OnceLock::new(),
        })
    }
}

/// A sealed service: immutable metadata plus the wrapped handlers.
pub struct Service<R: RouteTable> {
    config: SpecConfig,
    store: MetadataStore,
    handlers: HashMap<HandlerId, HandlerFn>,
    routes: R,
    document: OnceLock<SpecDocument>,
}

impl<R: RouteTable> Service<R> {
    /// The Swagger document, assembled on first call.
    pub fn specification(&self) -> &SpecDocument {
        self.document
            .get_or_init(|| assemble(&self.routes, &self.store, &self.config))
    }

    /// Runs `handler` with a fresh context. `None` when it is not registered.
    pub fn invoke(&self, handler: &HandlerId, request: &Request) -> Option<Response> {
        let f = self.handlers.get(handler)?;
        let mut ctx = RequestContext::new(request);
        Some(f(&mut ctx))
    }

    /// Resolves `request` through the route table and runs the matching handler.
    pub fn dispatch(&self, request: Request) -> Response {
        match self.routes.resolve(request.method(), request.path()) {
            Some(found) => {
                let request = request.with_path_params(found.path_params);
                self.invoke(&found.handler, &request).unwrap_or_else(|| {
                    warn!(handler = %found.handler, "Route points at an unregistered handler");
                    Response::error(StatusCode::NOT_FOUND, "Not Found")
                })
            }
            None if !self.routes.allowed_methods(request.path()).is_empty() => {
                Response::error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
            }
            None => Response::error(StatusCode::NOT_FOUND, "Not Found"),
        }
    }

    /// Stored metadata for `handler`.
    pub fn metadata(&self, handler: &HandlerId) -> Cow<'_, RouteMetadata> {
        self.store.lookup(handler)
    }

    /// The route table.
    pub fn routes(&self) -> &R {
        &self.routes
    }

    /// Document settings.
    pub fn config(&self) -> &SpecConfig {
        &self.config
    }
}

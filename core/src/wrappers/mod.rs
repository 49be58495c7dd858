#![deny(missing_docs)]

//! # Handler Wrappers
//!
//! Composable decorations attached to an [`Endpoint`](crate::handler::Endpoint).
//!
//! Applying a wrapper is a pure step from (handler, metadata so far) to
//! (wrapped handler, merged metadata). Wrappers run once, at registration,
//! in the order they were attached.

pub mod params;
pub mod response;
pub mod tags;

pub use params::Parameters;
pub use response::Returns;
pub use tags::Tags;

use crate::error::SpecResult;
use crate::handler::{HandlerFn, Request, RequestContext, Response};
use crate::metadata::{HandlerId, RouteMetadata};
use crate::schema_generator::CollectedDefinition;
use crate::type_mapping::TypeMapper;

/// A handler in the middle of being wrapped.
pub struct Wrapped {
    /// Handler identity.
    pub id: HandlerId,
    /// The callable produced so far.
    pub handler: HandlerFn,
    /// Metadata merged so far.
    pub metadata: RouteMetadata,
    /// Definitions generated so far.
    pub definitions: Vec<CollectedDefinition>,
}

impl Wrapped {
    /// Starts wrapping `handler`.
    pub fn new(id: HandlerId, handler: HandlerFn) -> Self {
        Self {
            id,
            handler,
            metadata: RouteMetadata::default(),
            definitions: Vec::new(),
        }
    }

    /// Runs the current handler against `request` with a fresh context.
    pub fn invoke(&self, request: &Request) -> Response {
        let mut ctx = RequestContext::new(request);
        (self.handler)(&mut ctx)
    }
}

/// A declarative decoration of a handler.
pub trait Wrapper: Send + Sync {
    /// Decorates `wrapped`, contributing metadata and possibly replacing its handler.
    ///
    /// # Errors
    ///
    /// Any declaration-time error (unknown kinds, duplicate parameters,
    /// conflicting responses, schema collisions or cycles).
    fn apply(&self, wrapped: Wrapped, types: &dyn TypeMapper) -> SpecResult<Wrapped>;
}

//! Tag wrapper: groups a handler under explicit tags.

use crate::error::SpecResult;
use crate::metadata::RouteMetadata;
use crate::type_mapping::TypeMapper;
use crate::wrappers::{Wrapped, Wrapper};
use std::collections::BTreeSet;

/// Replaces the module-derived tag with the given ones.
#[derive(Debug, Clone, Default)]
pub struct Tags {
    tags: BTreeSet<String>,
}

impl Tags {
    /// Tags from any list of names.
    pub fn new<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl Wrapper for Tags {
    fn apply(&self, mut wrapped: Wrapped, _types: &dyn TypeMapper) -> SpecResult<Wrapped> {
        wrapped.metadata.merge(
            RouteMetadata {
                tags: self.tags.clone(),
                ..RouteMetadata::default()
            },
            &wrapped.id,
        )?;
        Ok(wrapped)
    }
}

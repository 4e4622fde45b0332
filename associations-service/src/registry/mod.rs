//! Closed registry mapping content kinds to the lookups of their owning subsystems.
//!
//! The registry is assembled once at startup with [`ContentRegistryBuilder`] and
//! is immutable afterwards; share it behind an `Arc`.
mod postgres_lookup;

pub use postgres_lookup::PostgresTableLookup;

use crate::errors::{AssociationError, LookupError, ResolveError};
use associations_shared::types::{ContentEntity, ContentKind, ContentRef};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lookup of content entities of a single kind, provided by the owning subsystem.
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// Fetches the entity behind `content_ref`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(entity))` - The entity exists
    /// * `Ok(None)` - No entity has this id
    /// * `Err(LookupError)` - The backend could not answer
    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<ContentEntity>, LookupError>;
}

/// Builder collecting one lookup per content kind.
#[derive(Default)]
pub struct ContentRegistryBuilder {
    lookups: BTreeMap<ContentKind, Arc<dyn ContentLookup>>,
}

impl ContentRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the lookup for a content kind.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the kind is already registered.
    pub fn register(
        &mut self,
        kind: ContentKind,
        lookup: Arc<dyn ContentLookup>,
    ) -> Result<&mut Self, AssociationError> {
        if self.lookups.contains_key(&kind) {
            return Err(AssociationError::validation(format!(
                "content kind {kind} is registered twice"
            )));
        }
        self.lookups.insert(kind, lookup);
        Ok(self)
    }

    pub fn build(self) -> ContentRegistry {
        ContentRegistry {
            lookups: self.lookups,
        }
    }
}

/// Immutable map of registered content kinds.
pub struct ContentRegistry {
    lookups: BTreeMap<ContentKind, Arc<dyn ContentLookup>>,
}

impl ContentRegistry {
    pub fn builder() -> ContentRegistryBuilder {
        ContentRegistryBuilder::new()
    }

    pub fn is_registered(&self, kind: &ContentKind) -> bool {
        self.lookups.contains_key(kind)
    }

    /// Fails with `UnknownKind` if `kind` was not registered.
    pub fn ensure_registered(&self, kind: &ContentKind) -> Result<(), ResolveError> {
        if self.is_registered(kind) {
            Ok(())
        } else {
            Err(ResolveError::UnknownKind(kind.clone()))
        }
    }

    /// Registered kinds in ascending order.
    pub fn kinds(&self) -> impl Iterator<Item = &ContentKind> {
        self.lookups.keys()
    }

    /// Resolves a reference to its entity. Never cached.
    pub async fn resolve(&self, content_ref: &ContentRef) -> Result<ContentEntity, ResolveError> {
        let lookup = self
            .lookups
            .get(&content_ref.content_kind)
            .ok_or_else(|| ResolveError::UnknownKind(content_ref.content_kind.clone()))?;

        match lookup.lookup(content_ref).await {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => Err(ResolveError::NotFound(content_ref.clone())),
            Err(source) => Err(ResolveError::Lookup {
                content_ref: content_ref.clone(),
                source,
            }),
        }
    }
}

//! Persistence collaborators.
//!
//! The pipeline never persists anything itself. Request-level code loads an
//! entity from an [`EntityStore`], runs the pipeline, and saves the entity
//! back. Saves use optimistic locking: the store rejects an entity whose
//! version no longer matches the stored one with
//! [`ConflictError::VersionMismatch`].
//!
//! [`InMemoryStore`] is a thread-safe implementation for tests, tooling and
//! embedding.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{ConflictError, UpdateError, UpdateResult};

/// A versioned, identifiable domain object.
pub trait Entity {
    /// The identifier type.
    type Id: Clone + Eq + Hash + fmt::Display;

    /// Returns the identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the version this copy was loaded at.
    fn version(&self) -> u64;

    /// Sets the version, as assigned by a store.
    fn set_version(&mut self, version: u64);

    /// Records that the entity was modified at `now`.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Loads and saves entities.
pub trait EntityStore<E: Entity> {
    /// Loads the entity with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::NotFound`] if there is no such entity, or
    /// [`UpdateError::Collaborator`] if the store is unavailable.
    fn load(&self, id: &E::Id) -> UpdateResult<E>;

    /// Saves the entity and returns its new version.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::VersionMismatch`] if the stored entity has a
    /// different version than `entity`.
    fn save(&self, entity: &E) -> UpdateResult<u64>;
}

/// An [`EntityStore`] backed by a hash map behind a read-write lock.
///
/// Inserted entities start at version 1. Every successful save increments
/// the version by one.
pub struct InMemoryStore<E: Entity> {
    entities: RwLock<FxHashMap<E::Id, E>>,
}

impl<E: Entity + Clone> InMemoryStore<E> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(FxHashMap::default()),
        }
    }

    /// Inserts (or overwrites) an entity at version 1 and returns its id.
    pub fn insert(&self, mut entity: E) -> E::Id {
        entity.set_version(1);
        let id = entity.id().clone();
        self.entities.write().insert(id.clone(), entity);
        id
    }

    /// Returns a copy of the stored entity.
    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.entities.read().get(id).cloned()
    }

    /// Returns the number of stored entities.
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Returns the first result `function` produces over the stored
    /// entities. Iteration order is unspecified.
    pub fn find_map<R, F>(&self, function: F) -> Option<R>
    where
        F: FnMut(&E) -> Option<R>,
    {
        self.entities.read().values().find_map(function)
    }
}

impl<E: Entity + Clone> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity + Clone> EntityStore<E> for InMemoryStore<E> {
    fn load(&self, id: &E::Id) -> UpdateResult<E> {
        self.get(id).ok_or_else(|| UpdateError::not_found(id))
    }

    fn save(&self, entity: &E) -> UpdateResult<u64> {
        let mut entities = self.entities.write();
        let Some(stored) = entities.get_mut(entity.id()) else {
            return Err(UpdateError::not_found(entity.id()));
        };

        if stored.version() != entity.version() {
            return Err(ConflictError::VersionMismatch {
                expected: entity.version(),
                actual: stored.version(),
            }
            .into());
        }

        let version = entity.version() + 1;
        let mut saved = entity.clone();
        saved.set_version(version);
        *stored = saved;
        Ok(version)
    }
}

impl<E: Entity> fmt::Debug for InMemoryStore<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InMemoryStore")
            .field("len", &self.entities.read().len())
            .finish()
    }
}

//! The updater pipeline.
//!
//! [`run_all`] invokes each updater exactly once, in order, against one
//! exclusively borrowed entity, and reports whether any of them changed it.
//! The first error aborts the run: later updaters are never invoked and
//! changes already applied to the in-memory entity stay applied. Persisting
//! (or discarding) the entity is the caller's job.
//!
//! # Example
//!
//! ```
//! use scim_updater::lens;
//! use scim_updater::pipeline::Pipeline;
//! use scim_updater::updater::Replacer;
//!
//! #[derive(Debug, PartialEq)]
//! struct User { name: String, email: String }
//!
//! let mut user = User { name: "alice".into(), email: "a@x.com".into() };
//!
//! let outcome = Pipeline::new()
//!     .with(Replacer::new("setName", lens!(User, name), "alice".to_string()))
//!     .with(Replacer::new("setEmail", lens!(User, email), "a@y.com".to_string()))
//!     .run(&mut user)
//!     .unwrap();
//!
//! assert!(outcome.modified());
//! assert_eq!(outcome.applied(), ["setEmail"]);
//! assert_eq!(user.email, "a@y.com");
//! ```

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::UpdateResult;
use crate::updater::{BoxedUpdater, Updater, UpdaterId};

/// Identifiers of the updaters that changed the entity, in invocation order.
pub type AppliedUpdaters = SmallVec<[UpdaterId; 4]>;

/// What a pipeline run did to its entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    modified: bool,
    applied: AppliedUpdaters,
}

impl UpdateOutcome {
    /// Returns true if at least one updater changed the entity.
    #[must_use]
    pub const fn modified(&self) -> bool {
        self.modified
    }

    /// Returns the updaters that changed the entity, in invocation order.
    #[must_use]
    pub fn applied(&self) -> &[UpdaterId] {
        &self.applied
    }

    /// Returns true if an updater with this id changed the entity.
    pub fn was_applied(&self, id: impl Into<UpdaterId>) -> bool {
        let id = id.into();
        self.applied.contains(&id)
    }

    fn record(&mut self, id: UpdaterId) {
        self.modified = true;
        self.applied.push(id);
    }
}

impl IntoIterator for UpdateOutcome {
    type Item = UpdaterId;
    type IntoIter = smallvec::IntoIter<[UpdaterId; 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.applied.into_iter()
    }
}

/// Runs every updater once, in order, against `entity`.
///
/// Updaters are pulled from the iterator one at a time, so a lazily built
/// sequence stops being built as soon as one updater fails.
///
/// # Errors
///
/// Returns the first error reported by an updater. Updaters after it are
/// not invoked; mutations made before it are not rolled back.
pub fn run_all<E, I, U>(entity: &mut E, updaters: I) -> UpdateResult<UpdateOutcome>
where
    E: ?Sized,
    I: IntoIterator<Item = U>,
    U: Updater<E>,
{
    let mut outcome = UpdateOutcome::default();

    for (position, mut updater) in updaters.into_iter().enumerate() {
        match updater.attempt_update(entity) {
            Ok(changed) => {
                tracing::debug!(updater = %updater.id(), position, changed, "updater attempted");
                if changed {
                    outcome.record(updater.id().clone());
                }
            }
            Err(error) => {
                tracing::warn!(
                    updater = %updater.id(),
                    position,
                    %error,
                    "updater failed, aborting pipeline"
                );
                return Err(error);
            }
        }
    }

    Ok(outcome)
}

/// An ordered, heterogeneous list of updaters for one entity type.
pub struct Pipeline<'a, E: ?Sized> {
    updaters: Vec<BoxedUpdater<'a, E>>,
}

impl<'a, E: ?Sized> Pipeline<'a, E> {
    /// Creates an empty pipeline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            updaters: Vec::new(),
        }
    }

    /// Appends an updater and returns the pipeline.
    #[must_use]
    pub fn with<U>(mut self, updater: U) -> Self
    where
        U: Updater<E> + 'a,
    {
        self.push(updater);
        self
    }

    /// Appends an updater.
    pub fn push<U>(&mut self, updater: U)
    where
        U: Updater<E> + 'a,
    {
        self.updaters.push(Box::new(updater));
    }

    /// Appends every updater of another pipeline, keeping their order.
    pub fn append(&mut self, other: Self) {
        self.updaters.extend(other.updaters);
    }

    /// Returns the number of updaters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updaters.len()
    }

    /// Returns true if the pipeline has no updaters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updaters.is_empty()
    }

    /// Returns the ids of the updaters, in invocation order.
    pub fn ids(&self) -> impl Iterator<Item = &UpdaterId> {
        self.updaters.iter().map(|updater| updater.id())
    }

    /// Runs the pipeline against `entity`, consuming it.
    ///
    /// # Errors
    ///
    /// See [`run_all`].
    pub fn run(self, entity: &mut E) -> UpdateResult<UpdateOutcome> {
        run_all(entity, self.updaters)
    }
}

impl<E: ?Sized> Default for Pipeline<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: ?Sized> Extend<BoxedUpdater<'a, E>> for Pipeline<'a, E> {
    fn extend<T: IntoIterator<Item = BoxedUpdater<'a, E>>>(&mut self, iter: T) {
        self.updaters.extend(iter);
    }
}

impl<'a, E: ?Sized> FromIterator<BoxedUpdater<'a, E>> for Pipeline<'a, E> {
    fn from_iter<T: IntoIterator<Item = BoxedUpdater<'a, E>>>(iter: T) -> Self {
        Self {
            updaters: iter.into_iter().collect(),
        }
    }
}

impl<E: ?Sized> fmt::Debug for Pipeline<'_, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.ids()).finish()
    }
}

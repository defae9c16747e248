//! Closure-backed updaters.

use std::fmt;

use crate::error::UpdateResult;
use crate::updater::{Updater, UpdaterId};

/// An updater whose logic is a closure.
///
/// Use it when the proposed value and the stored value have different
/// representations, such as a plaintext password against a stored hash.
/// The closure owns its idempotence: a second call after a successful one
/// must return `Ok(false)`.
///
/// # Example
///
/// ```
/// use scim_updater::updater::{FnUpdater, Updater};
///
/// struct Counter { hits: u32 }
///
/// let mut reset = FnUpdater::new("reset", |counter: &mut Counter| {
///     if counter.hits == 0 {
///         return Ok(false);
///     }
///     counter.hits = 0;
///     Ok(true)
/// });
///
/// let mut counter = Counter { hits: 3 };
/// assert!(reset.attempt_update(&mut counter).unwrap());
/// assert!(!reset.attempt_update(&mut counter).unwrap());
/// ```
pub struct FnUpdater<F> {
    id: UpdaterId,
    function: F,
}

impl<F> FnUpdater<F> {
    /// Creates a closure-backed updater.
    pub fn new(id: impl Into<UpdaterId>, function: F) -> Self {
        Self {
            id: id.into(),
            function,
        }
    }
}

impl<E: ?Sized, F> Updater<E> for FnUpdater<F>
where
    F: FnMut(&mut E) -> UpdateResult<bool>,
{
    fn id(&self) -> &UpdaterId {
        &self.id
    }

    fn attempt_update(&mut self, entity: &mut E) -> UpdateResult<bool> {
        (self.function)(entity)
    }
}

impl<F> fmt::Debug for FnUpdater<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FnUpdater")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

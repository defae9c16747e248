//! The updater abstraction and its stock implementations.
//!
//! An [`Updater`] attempts to change one aspect of an entity and reports
//! whether it actually did. Updaters are built fresh for each request, bound
//! to their field and proposed value, run once by the pipeline, and dropped.
//!
//! # Kinds
//!
//! - [`Replacer`]: replaces a single-valued field when the value differs
//! - [`CollectionAdder`]: adds the items a multi-valued field does not hold yet
//! - [`CollectionRemover`]: removes the items a multi-valued field holds
//! - [`FnUpdater`]: closure-backed, for fields whose proposed and stored
//!   representations differ
//!
//! # Invariant
//!
//! Running an updater twice in a row against the same entity returns `true`
//! at most once. The second run finds nothing left to change.
//!
//! ```
//! use scim_updater::lens;
//! use scim_updater::updater::{Replacer, Updater};
//!
//! #[derive(Debug, PartialEq)]
//! struct User { email: String }
//!
//! let mut user = User { email: "a@x.com".to_string() };
//! let mut set_email = Replacer::new("setEmail", lens!(User, email), "a@y.com".to_string());
//!
//! assert!(set_email.attempt_update(&mut user).unwrap());
//! assert!(!set_email.attempt_update(&mut user).unwrap());
//! assert_eq!(user.email, "a@y.com");
//! ```

mod collection;
mod function;
mod replace;
mod types;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, UpdateResult};

pub use collection::{CollectionAdder, CollectionRemover};
pub use function::FnUpdater;
pub use replace::Replacer;
pub use types::UpdaterType;

/// Identifies an updater in outcomes and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdaterId(Cow<'static, str>);

impl UpdaterId {
    /// Creates an id from a static name without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpdaterId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&'static str> for UpdaterId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for UpdaterId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl PartialEq<str> for UpdaterId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for UpdaterId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A unit that conditionally mutates one aspect of an entity.
///
/// `attempt_update` returns `Ok(true)` when it changed the entity,
/// `Ok(false)` when the entity already held the proposed state, and an
/// error when the proposed state is rejected. A rejected attempt leaves the
/// updater's own field untouched.
pub trait Updater<E: ?Sized> {
    /// The identifier reported when this updater changes the entity.
    fn id(&self) -> &UpdaterId;

    /// Applies the change if one is needed and reports whether it did.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UpdateError::Validation`] when the proposed value
    /// violates a domain rule and [`crate::error::UpdateError::Conflict`] when
    /// it collides with another entity's unique attribute.
    fn attempt_update(&mut self, entity: &mut E) -> UpdateResult<bool>;
}

impl<E: ?Sized, U: Updater<E> + ?Sized> Updater<E> for Box<U> {
    fn id(&self) -> &UpdaterId {
        (**self).id()
    }

    fn attempt_update(&mut self, entity: &mut E) -> UpdateResult<bool> {
        (**self).attempt_update(entity)
    }
}

/// Fails with [`ConflictError::AttributeInUse`] when `owner` is some entity
/// other than `entity`.
pub(crate) fn ensure_unbound<Id: PartialEq>(
    attribute: &str,
    value: &impl fmt::Display,
    owner: Option<Id>,
    entity: &Id,
) -> UpdateResult<()> {
    match owner {
        Some(owner) if &owner != entity => {
            Err(ConflictError::attribute_in_use(attribute, value.to_string()).into())
        }
        _ => Ok(()),
    }
}

/// A heap-allocated updater, as held by a [`crate::pipeline::Pipeline`].
pub type BoxedUpdater<'a, E> = Box<dyn Updater<E> + 'a>;

/// A uniqueness or consistency check run before an updater mutates.
///
/// The guard sees the entity being updated and the proposed value.
pub type Guard<'a, E, A> = Box<dyn Fn(&E, &A) -> UpdateResult<()> + 'a>;

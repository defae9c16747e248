//! Replacement of single-valued fields.

use std::fmt;
use std::marker::PhantomData;

use crate::error::UpdateResult;
use crate::optics::Lens;
use crate::updater::{Guard, Updater, UpdaterId};
use crate::validation::Validator;

type ChangePredicate<'a, A> = Box<dyn Fn(&A, &A) -> bool + 'a>;

/// Replaces the field focused by a lens with a proposed value.
///
/// The attempt runs in this order:
///
/// 1. change detection (`current != proposed` unless [`Replacer::changed_when`]
///    overrides it); an unchanged field returns `Ok(false)` without
///    validating anything
/// 2. validators, in registration order
/// 3. guards, in registration order
/// 4. the write
///
/// # Example
///
/// ```
/// use scim_updater::lens;
/// use scim_updater::updater::{Replacer, Updater};
/// use scim_updater::validation::NotBlank;
///
/// struct Group { name: String }
///
/// let mut group = Group { name: "admins".to_string() };
/// let mut rename = Replacer::new("rename", lens!(Group, name), "   ".to_string())
///     .validated_by(NotBlank::new("name"));
///
/// assert!(rename.attempt_update(&mut group).is_err());
/// assert_eq!(group.name, "admins");
/// ```
pub struct Replacer<'a, E, A, L> {
    id: UpdaterId,
    lens: L,
    value: A,
    changed: Option<ChangePredicate<'a, A>>,
    validators: Vec<Box<dyn Validator<A> + 'a>>,
    guards: Vec<Guard<'a, E, A>>,
    _entity: PhantomData<fn(&mut E)>,
}

impl<'a, E, A, L> Replacer<'a, E, A, L>
where
    L: Lens<E, A>,
    A: Clone + PartialEq,
{
    /// Creates a replacer for the field focused by `lens`.
    pub fn new(id: impl Into<UpdaterId>, lens: L, value: A) -> Self {
        Self {
            id: id.into(),
            lens,
            value,
            changed: None,
            validators: Vec::new(),
            guards: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Adds a validator for the proposed value.
    #[must_use]
    pub fn validated_by<V>(mut self, validator: V) -> Self
    where
        V: Validator<A> + 'a,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Adds a guard that sees the entity and the proposed value.
    #[must_use]
    pub fn guarded_by<G>(mut self, guard: G) -> Self
    where
        G: Fn(&E, &A) -> UpdateResult<()> + 'a,
    {
        self.guards.push(Box::new(guard));
        self
    }

    /// Overrides change detection. The predicate receives
    /// `(current, proposed)` and returns true if an update is needed.
    #[must_use]
    pub fn changed_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&A, &A) -> bool + 'a,
    {
        self.changed = Some(Box::new(predicate));
        self
    }

    /// Returns the proposed value.
    pub const fn value(&self) -> &A {
        &self.value
    }

    fn needs_update(&self, current: &A) -> bool {
        self.changed.as_ref().map_or_else(
            || current != &self.value,
            |predicate| predicate(current, &self.value),
        )
    }
}

impl<E, A, L> Updater<E> for Replacer<'_, E, A, L>
where
    L: Lens<E, A>,
    A: Clone + PartialEq,
{
    fn id(&self) -> &UpdaterId {
        &self.id
    }

    fn attempt_update(&mut self, entity: &mut E) -> UpdateResult<bool> {
        if !self.needs_update(self.lens.get(entity)) {
            return Ok(false);
        }

        for validator in &self.validators {
            validator.validate(&self.value)?;
        }
        for guard in &self.guards {
            guard(&*entity, &self.value)?;
        }

        self.lens.set(entity, self.value.clone());
        Ok(true)
    }
}

impl<E, A: fmt::Debug, L> fmt::Debug for Replacer<'_, E, A, L> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Replacer")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("validators", &self.validators.len())
            .field("guards", &self.guards.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConflictError, UpdateError, ValidationError};
    use crate::lens;
    use crate::validation::EmailAddress;
    use rstest::rstest;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        name: String,
        email: String,
    }

    fn contact() -> Contact {
        Contact {
            name: "alice".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[rstest]
    fn replaces_differing_value_once() {
        let mut entity = contact();
        let mut updater = Replacer::new("setEmail", lens!(Contact, email), "a@y.com".to_string());

        assert!(updater.attempt_update(&mut entity).unwrap());
        assert!(!updater.attempt_update(&mut entity).unwrap());
        assert_eq!(entity.email, "a@y.com");
    }

    #[rstest]
    fn equal_value_is_not_an_update() {
        let mut entity = contact();
        let mut updater = Replacer::new("setName", lens!(Contact, name), "alice".to_string());

        assert!(!updater.attempt_update(&mut entity).unwrap());
        assert_eq!(entity, contact());
    }

    #[rstest]
    fn validator_rejection_leaves_field_untouched() {
        let mut entity = contact();
        let mut updater =
            Replacer::new("setEmail", lens!(Contact, email), "bad-email".to_string())
                .validated_by(EmailAddress::new("email"));

        let error = updater.attempt_update(&mut entity).unwrap_err();

        assert!(matches!(
            error,
            UpdateError::Validation(ref inner) if inner.code == "INVALID_EMAIL"
        ));
        assert_eq!(entity.email, "a@x.com");
    }

    #[rstest]
    fn unchanged_value_skips_validation() {
        let mut entity = Contact {
            name: "alice".to_string(),
            email: "legacy".to_string(),
        };
        let mut updater = Replacer::new("setEmail", lens!(Contact, email), "legacy".to_string())
            .validated_by(EmailAddress::new("email"));

        assert!(!updater.attempt_update(&mut entity).unwrap());
    }

    #[rstest]
    fn guard_sees_entity_and_value() {
        let mut entity = contact();
        let mut updater = Replacer::new("setEmail", lens!(Contact, email), "b@x.com".to_string())
            .guarded_by(|current: &Contact, value: &String| {
                if current.name == "alice" && value.starts_with('b') {
                    Err(ConflictError::attribute_in_use("email", value.clone()).into())
                } else {
                    Ok(())
                }
            });

        let error = updater.attempt_update(&mut entity).unwrap_err();

        assert!(matches!(error, UpdateError::Conflict(ConflictError::AttributeInUse { .. })));
        assert_eq!(entity.email, "a@x.com");
    }

    #[rstest]
    fn validators_run_before_guards() {
        let guard_calls = Cell::new(0);
        let mut entity = contact();
        let mut updater = Replacer::new("setEmail", lens!(Contact, email), "nope".to_string())
            .validated_by(|_: &String| -> Result<(), ValidationError> {
                Err(ValidationError::new("email", "REJECTED", "always"))
            })
            .guarded_by(|_: &Contact, _: &String| {
                guard_calls.set(guard_calls.get() + 1);
                Ok(())
            });

        assert!(updater.attempt_update(&mut entity).is_err());
        assert_eq!(guard_calls.get(), 0);
    }

    #[rstest]
    fn custom_change_predicate() {
        let mut entity = contact();
        let mut updater = Replacer::new("setName", lens!(Contact, name), "ALICE".to_string())
            .changed_when(|current: &String, proposed: &String| {
                !current.eq_ignore_ascii_case(proposed)
            });

        assert!(!updater.attempt_update(&mut entity).unwrap());
        assert_eq!(entity.name, "alice");
    }
}

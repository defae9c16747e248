//! Adding to and removing from multi-valued fields.

use std::fmt;
use std::marker::PhantomData;

use crate::error::UpdateResult;
use crate::optics::Lens;
use crate::updater::{Guard, Updater, UpdaterId};
use crate::validation::Validator;

type Matcher<'a, T> = Box<dyn Fn(&T, &T) -> bool + 'a>;

fn is_match<T: PartialEq>(matcher: Option<&Matcher<'_, T>>, stored: &T, proposed: &T) -> bool {
    matcher.map_or_else(|| stored == proposed, |matcher| matcher(stored, proposed))
}

/// Adds proposed items to a `Vec` field, skipping the ones already present.
///
/// Items are checked as a batch: every item that would be added is
/// validated and guarded before the first one is pushed, so a rejected
/// batch leaves the collection untouched. Duplicates within the proposed
/// items are added once.
pub struct CollectionAdder<'a, E, T, L> {
    id: UpdaterId,
    lens: L,
    items: Vec<T>,
    matcher: Option<Matcher<'a, T>>,
    validators: Vec<Box<dyn Validator<T> + 'a>>,
    guards: Vec<Guard<'a, E, T>>,
    _entity: PhantomData<fn(&mut E)>,
}

impl<'a, E, T, L> CollectionAdder<'a, E, T, L>
where
    L: Lens<E, Vec<T>>,
    T: Clone + PartialEq,
{
    /// Creates an adder for the collection focused by `lens`.
    pub fn new(id: impl Into<UpdaterId>, lens: L, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            id: id.into(),
            lens,
            items: items.into_iter().collect(),
            matcher: None,
            validators: Vec::new(),
            guards: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Overrides how a stored item is matched against a proposed one.
    #[must_use]
    pub fn matching<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&T, &T) -> bool + 'a,
    {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Adds a validator run for each item that would be added.
    #[must_use]
    pub fn validated_by<V>(mut self, validator: V) -> Self
    where
        V: Validator<T> + 'a,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Adds a guard run for each item that would be added.
    #[must_use]
    pub fn guarded_by<G>(mut self, guard: G) -> Self
    where
        G: Fn(&E, &T) -> UpdateResult<()> + 'a,
    {
        self.guards.push(Box::new(guard));
        self
    }

    fn pending<'i>(&'i self, stored: &[T]) -> Vec<&'i T> {
        let matcher = self.matcher.as_ref();
        let mut pending: Vec<&T> = Vec::new();
        for item in &self.items {
            let present = stored
                .iter()
                .chain(pending.iter().copied())
                .any(|existing| is_match(matcher, existing, item));
            if !present {
                pending.push(item);
            }
        }
        pending
    }
}

impl<E, T, L> Updater<E> for CollectionAdder<'_, E, T, L>
where
    L: Lens<E, Vec<T>>,
    T: Clone + PartialEq,
{
    fn id(&self) -> &UpdaterId {
        &self.id
    }

    fn attempt_update(&mut self, entity: &mut E) -> UpdateResult<bool> {
        let pending = self.pending(self.lens.get(entity));
        if pending.is_empty() {
            return Ok(false);
        }

        for &item in &pending {
            for validator in &self.validators {
                validator.validate(item)?;
            }
            for guard in &self.guards {
                guard(&*entity, item)?;
            }
        }

        self.lens
            .get_mut(entity)
            .extend(pending.into_iter().cloned());
        Ok(true)
    }
}

impl<E, T: fmt::Debug, L> fmt::Debug for CollectionAdder<'_, E, T, L> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CollectionAdder")
            .field("id", &self.id)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

/// Removes every stored item matching one of the proposed items.
///
/// Removing items that are not present is a no-op and reports `false`.
pub struct CollectionRemover<'a, E, T, L> {
    id: UpdaterId,
    lens: L,
    items: Vec<T>,
    matcher: Option<Matcher<'a, T>>,
    _entity: PhantomData<fn(&mut E)>,
}

impl<'a, E, T, L> CollectionRemover<'a, E, T, L>
where
    L: Lens<E, Vec<T>>,
    T: PartialEq,
{
    /// Creates a remover for the collection focused by `lens`.
    pub fn new(id: impl Into<UpdaterId>, lens: L, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            id: id.into(),
            lens,
            items: items.into_iter().collect(),
            matcher: None,
            _entity: PhantomData,
        }
    }

    /// Overrides how a stored item is matched against a proposed one.
    #[must_use]
    pub fn matching<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&T, &T) -> bool + 'a,
    {
        self.matcher = Some(Box::new(matcher));
        self
    }
}

impl<E, T, L> Updater<E> for CollectionRemover<'_, E, T, L>
where
    L: Lens<E, Vec<T>>,
    T: PartialEq,
{
    fn id(&self) -> &UpdaterId {
        &self.id
    }

    fn attempt_update(&mut self, entity: &mut E) -> UpdateResult<bool> {
        let matcher = self.matcher.as_ref();
        let items = &self.items;
        let stored = self.lens.get_mut(entity);
        let before = stored.len();

        stored.retain(|existing| !items.iter().any(|item| is_match(matcher, existing, item)));

        Ok(stored.len() != before)
    }
}

impl<E, T: fmt::Debug, L> fmt::Debug for CollectionRemover<'_, E, T, L> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CollectionRemover")
            .field("id", &self.id)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConflictError, UpdateError};
    use crate::lens;
    use crate::validation::NotBlank;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Tagged {
        tags: Vec<String>,
    }

    fn tagged(tags: &[&str]) -> Tagged {
        Tagged {
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    fn adder_appends_missing_items_in_order() {
        let mut entity = tagged(&["a"]);
        let mut adder =
            CollectionAdder::new("addTags", lens!(Tagged, tags), strings(&["b", "a", "c"]));

        assert!(adder.attempt_update(&mut entity).unwrap());
        assert_eq!(entity, tagged(&["a", "b", "c"]));
        assert!(!adder.attempt_update(&mut entity).unwrap());
    }

    #[rstest]
    fn adder_with_only_present_items_reports_no_change() {
        let mut entity = tagged(&["a", "b"]);
        let mut adder = CollectionAdder::new("addTags", lens!(Tagged, tags), strings(&["b"]));

        assert!(!adder.attempt_update(&mut entity).unwrap());
    }

    #[rstest]
    fn adder_collapses_proposed_duplicates() {
        let mut entity = tagged(&[]);
        let mut adder = CollectionAdder::new("addTags", lens!(Tagged, tags), strings(&["x", "x"]));

        assert!(adder.attempt_update(&mut entity).unwrap());
        assert_eq!(entity, tagged(&["x"]));
    }

    #[rstest]
    fn adder_rejects_whole_batch_on_invalid_item() {
        let mut entity = tagged(&["a"]);
        let mut adder = CollectionAdder::new("addTags", lens!(Tagged, tags), strings(&["b", " "]))
            .validated_by(NotBlank::new("tags"));

        assert!(matches!(
            adder.attempt_update(&mut entity),
            Err(UpdateError::Validation(_))
        ));
        assert_eq!(entity, tagged(&["a"]));
    }

    #[rstest]
    fn adder_guard_runs_only_for_new_items() {
        let mut entity = tagged(&["taken"]);
        let mut adder =
            CollectionAdder::new("addTags", lens!(Tagged, tags), strings(&["taken", "free"]))
                .guarded_by(|_: &Tagged, item: &String| {
                    if item == "taken" {
                        Err(ConflictError::attribute_in_use("tag", item.clone()).into())
                    } else {
                        Ok(())
                    }
                });

        assert!(adder.attempt_update(&mut entity).unwrap());
        assert_eq!(entity, tagged(&["taken", "free"]));
    }

    #[rstest]
    fn adder_custom_matcher() {
        let mut entity = tagged(&["Admin"]);
        let mut adder = CollectionAdder::new("addTags", lens!(Tagged, tags), strings(&["admin"]))
            .matching(|stored: &String, proposed: &String| stored.eq_ignore_ascii_case(proposed));

        assert!(!adder.attempt_update(&mut entity).unwrap());
    }

    #[rstest]
    #[case(&["a", "b", "c"], &["b"], true, &["a", "c"])]
    #[case(&["a", "b", "c"], &["z"], false, &["a", "b", "c"])]
    #[case(&["a", "b", "a"], &["a"], true, &["b"])]
    #[case(&[], &["a"], false, &[])]
    fn remover_cases(
        #[case] stored: &[&str],
        #[case] removed: &[&str],
        #[case] expected_change: bool,
        #[case] expected: &[&str],
    ) {
        let mut entity = tagged(stored);
        let mut remover =
            CollectionRemover::new("removeTags", lens!(Tagged, tags), strings(removed));

        assert_eq!(remover.attempt_update(&mut entity).unwrap(), expected_change);
        assert_eq!(entity, tagged(expected));
        assert!(!remover.attempt_update(&mut entity).unwrap());
    }
}

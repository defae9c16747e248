//! Lens optics for focusing on struct fields.
//!
//! A Lens provides get/get-mut access to a field within a larger structure.
//! Lenses compose, so an updater can target a deeply nested field as easily
//! as a top-level one.
//!
//! # Examples
//!
//! ```
//! use scim_updater::optics::Lens;
//! use scim_updater::lens;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Point { x: i32, y: i32 }
//!
//! let x_lens = lens!(Point, x);
//!
//! let mut point = Point { x: 10, y: 20 };
//! assert_eq!(*x_lens.get(&point), 10);
//!
//! x_lens.set(&mut point, 100);
//! assert_eq!(point.x, 100);
//! ```

use std::marker::PhantomData;

/// A Lens focuses on a single field within a larger structure.
///
/// # Type Parameters
///
/// - `S`: The source type (the whole structure)
/// - `A`: The target type (the focused field)
///
/// # Laws
///
/// 1. **GetPut Law**: `lens.set(&mut s, lens.get(&s).clone())` leaves `s` unchanged
/// 2. **PutGet Law**: after `lens.set(&mut s, v)`, `lens.get(&s) == &v`
/// 3. **PutPut Law**: `set(v1)` then `set(v2)` is the same as `set(v2)`
pub trait Lens<S, A> {
    /// Gets a reference to the focused field.
    fn get<'a>(&self, source: &'a S) -> &'a A;

    /// Gets a mutable reference to the focused field.
    fn get_mut<'a>(&self, source: &'a mut S) -> &'a mut A;

    /// Sets the focused field to a new value.
    fn set(&self, source: &mut S, value: A) {
        *self.get_mut(source) = value;
    }

    /// Sets the focused field and returns the value it held before.
    fn replace(&self, source: &mut S, value: A) -> A {
        std::mem::replace(self.get_mut(source), value)
    }

    /// Modifies the focused field in place.
    ///
    /// # Example
    ///
    /// ```
    /// use scim_updater::optics::Lens;
    /// use scim_updater::lens;
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Person { name: String, age: u32 }
    ///
    /// let name_lens = lens!(Person, name);
    /// let mut person = Person { name: "alice".to_string(), age: 30 };
    /// name_lens.modify(&mut person, |name| name.make_ascii_uppercase());
    /// assert_eq!(person.name, "ALICE");
    /// ```
    fn modify<F>(&self, source: &mut S, function: F)
    where
        F: FnOnce(&mut A),
    {
        function(self.get_mut(source));
    }

    /// Composes this lens with another lens to focus on a nested field.
    ///
    /// # Example
    ///
    /// ```
    /// use scim_updater::optics::Lens;
    /// use scim_updater::lens;
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Inner { value: i32 }
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Outer { inner: Inner }
    ///
    /// let outer_value = lens!(Outer, inner).compose(lens!(Inner, value));
    ///
    /// let mut data = Outer { inner: Inner { value: 42 } };
    /// assert_eq!(*outer_value.get(&data), 42);
    /// outer_value.set(&mut data, 7);
    /// assert_eq!(data.inner.value, 7);
    /// ```
    fn compose<B, L>(self, other: L) -> ComposedLens<Self, L, A>
    where
        Self: Sized,
        L: Lens<A, B>,
    {
        ComposedLens::new(self, other)
    }
}

/// A lens implemented using a getter and a mutable getter.
///
/// The `lens!` macro and `#[derive(Lenses)]` both generate a `FunctionLens`.
///
/// # Example
///
/// ```
/// use scim_updater::optics::{Lens, FunctionLens};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let x_lens = FunctionLens::new(
///     |point: &Point| &point.x,
///     |point: &mut Point| &mut point.x,
/// );
///
/// let point = Point { x: 10, y: 20 };
/// assert_eq!(*x_lens.get(&point), 10);
/// ```
pub struct FunctionLens<S, A, G, M>
where
    G: Fn(&S) -> &A,
    M: Fn(&mut S) -> &mut A,
{
    getter: G,
    getter_mut: M,
    _marker: PhantomData<fn(S) -> A>,
}

impl<S, A, G, M> FunctionLens<S, A, G, M>
where
    G: Fn(&S) -> &A,
    M: Fn(&mut S) -> &mut A,
{
    /// Creates a new `FunctionLens` from a getter and a mutable getter.
    #[must_use]
    pub const fn new(getter: G, getter_mut: M) -> Self {
        Self {
            getter,
            getter_mut,
            _marker: PhantomData,
        }
    }
}

impl<S, A, G, M> Lens<S, A> for FunctionLens<S, A, G, M>
where
    G: Fn(&S) -> &A,
    M: Fn(&mut S) -> &mut A,
{
    fn get<'a>(&self, source: &'a S) -> &'a A {
        (self.getter)(source)
    }

    fn get_mut<'a>(&self, source: &'a mut S) -> &'a mut A {
        (self.getter_mut)(source)
    }
}

impl<S, A, G, M> Clone for FunctionLens<S, A, G, M>
where
    G: Fn(&S) -> &A + Clone,
    M: Fn(&mut S) -> &mut A + Clone,
{
    fn clone(&self) -> Self {
        Self {
            getter: self.getter.clone(),
            getter_mut: self.getter_mut.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, A, G, M> std::fmt::Debug for FunctionLens<S, A, G, M>
where
    G: Fn(&S) -> &A,
    M: Fn(&mut S) -> &mut A,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FunctionLens")
            .finish_non_exhaustive()
    }
}

/// A lens composed of two lenses.
///
/// - `L1`: The outer lens
/// - `L2`: The inner lens
/// - `A`: The intermediate type (target of `L1`, source of `L2`)
pub struct ComposedLens<L1, L2, A> {
    first: L1,
    second: L2,
    _marker: PhantomData<fn() -> A>,
}

impl<L1, L2, A> ComposedLens<L1, L2, A> {
    /// Creates a new composed lens.
    #[must_use]
    pub const fn new(first: L1, second: L2) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<S, A, B, L1, L2> Lens<S, B> for ComposedLens<L1, L2, A>
where
    L1: Lens<S, A>,
    L2: Lens<A, B>,
    A: 'static,
{
    fn get<'a>(&self, source: &'a S) -> &'a B {
        self.second.get(self.first.get(source))
    }

    fn get_mut<'a>(&self, source: &'a mut S) -> &'a mut B {
        self.second.get_mut(self.first.get_mut(source))
    }
}

impl<L1: Clone, L2: Clone, A> Clone for ComposedLens<L1, L2, A> {
    fn clone(&self) -> Self {
        Self {
            first: self.first.clone(),
            second: self.second.clone(),
            _marker: PhantomData,
        }
    }
}

impl<L1, L2, A> std::fmt::Debug for ComposedLens<L1, L2, A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ComposedLens")
            .finish_non_exhaustive()
    }
}

/// Creates a lens for a struct field.
///
/// # Example
///
/// ```
/// use scim_updater::optics::Lens;
/// use scim_updater::lens;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Group { name: String }
///
/// let name_lens = lens!(Group, name);
/// let mut group = Group { name: "admins".to_string() };
/// name_lens.set(&mut group, "operators".to_string());
/// assert_eq!(group.name, "operators");
/// ```
#[macro_export]
macro_rules! lens {
    ($struct_type:ident, $field:ident) => {
        $crate::optics::FunctionLens::new(
            |source: &$struct_type| &source.$field,
            |source: &mut $struct_type| &mut source.$field,
        )
    };
    ($struct_type:ident < $($generic:tt),+ >, $field:ident) => {
        $crate::optics::FunctionLens::new(
            |source: &$struct_type<$($generic),+>| &source.$field,
            |source: &mut $struct_type<$($generic),+>| &mut source.$field,
        )
    };
    ($struct_type:path, $field:ident) => {
        $crate::optics::FunctionLens::new(
            |source: &$struct_type| &source.$field,
            |source: &mut $struct_type| &mut source.$field,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Clone, PartialEq, Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[rstest]
    fn function_lens_get() {
        let x_lens = FunctionLens::new(|point: &Point| &point.x, |point: &mut Point| &mut point.x);

        let point = Point { x: 10, y: 20 };
        assert_eq!(*x_lens.get(&point), 10);
    }

    #[rstest]
    fn function_lens_set_leaves_other_fields() {
        let x_lens = lens!(Point, x);

        let mut point = Point { x: 10, y: 20 };
        x_lens.set(&mut point, 100);
        assert_eq!(point, Point { x: 100, y: 20 });
    }

    #[rstest]
    fn lens_replace_returns_previous_value() {
        let y_lens = lens!(Point, y);

        let mut point = Point { x: 1, y: 2 };
        let previous = y_lens.replace(&mut point, 5);
        assert_eq!(previous, 2);
        assert_eq!(point.y, 5);
    }

    #[rstest]
    fn lens_modify() {
        let x_lens = lens!(Point, x);
        let mut point = Point { x: 10, y: 20 };
        x_lens.modify(&mut point, |x| *x *= 2);
        assert_eq!(point.x, 20);
    }

    #[rstest]
    fn lens_compose() {
        #[derive(Clone, PartialEq, Debug)]
        struct Inner {
            value: i32,
        }

        #[derive(Clone, PartialEq, Debug)]
        struct Outer {
            inner: Inner,
        }

        let composed = lens!(Outer, inner).compose(lens!(Inner, value));

        let mut data = Outer {
            inner: Inner { value: 42 },
        };

        assert_eq!(*composed.get(&data), 42);

        composed.set(&mut data, 100);
        assert_eq!(data.inner.value, 100);
    }

    #[rstest]
    fn derived_lenses_compose_through_three_levels() {
        use crate::Lenses;

        #[derive(Clone, PartialEq, Debug, Lenses)]
        struct Address {
            city: String,
        }

        #[derive(Clone, PartialEq, Debug, Lenses)]
        struct Contact {
            address: Address,
            phone: String,
        }

        #[derive(Clone, PartialEq, Debug, Lenses)]
        struct Directory {
            owner: Contact,
        }

        let city = Directory::owner_lens()
            .compose(Contact::address_lens())
            .compose(Address::city_lens());
        let mut directory = Directory {
            owner: Contact {
                address: Address {
                    city: "Kyoto".to_string(),
                },
                phone: "075".to_string(),
            },
        };

        assert_eq!(city.get(&directory), "Kyoto");

        let previous = city.replace(&mut directory, "Nara".to_string());
        city.modify(&mut directory, |name| name.push_str("-shi"));

        assert_eq!(previous, "Kyoto");
        assert_eq!(directory.owner.address.city, "Nara-shi");
        assert_eq!(directory.owner.phone, "075");
    }

    #[rstest]
    fn lens_macro_with_generic_struct() {
        #[derive(Clone, PartialEq, Debug)]
        struct Wrapper<T> {
            value: T,
        }

        let value_lens = lens!(Wrapper<u8>, value);
        let mut wrapper = Wrapper { value: 1_u8 };
        value_lens.set(&mut wrapper, 9);
        assert_eq!(wrapper.value, 9);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(-5, 17)]
    #[case(i32::MAX, i32::MIN)]
    fn lens_put_put_law(#[case] first: i32, #[case] second: i32) {
        let x_lens = lens!(Point, x);
        let mut twice = Point { x: 3, y: 4 };
        x_lens.set(&mut twice, first);
        x_lens.set(&mut twice, second);

        let mut once = Point { x: 3, y: 4 };
        x_lens.set(&mut once, second);

        assert_eq!(twice, once);
    }
}

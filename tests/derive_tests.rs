//! Tests for the `Lenses` derive macro.
//!
//! The derive generates one `<field>_lens()` method per named field, except
//! fields marked `#[lenses(skip)]`.

use rstest::rstest;
use scim_updater::Lenses;
use scim_updater::optics::Lens;

// =============================================================================
// Test Structures
// =============================================================================

/// Simple struct with basic field types
#[derive(Clone, PartialEq, Debug, Lenses)]
struct Person {
    name: String,
    age: u32,
}

/// Nested struct for composition testing
#[derive(Clone, PartialEq, Debug, Lenses)]
struct Address {
    street: String,
    city: String,
}

/// Struct with nested field and a skipped field
#[derive(Clone, PartialEq, Debug, Lenses)]
struct Member {
    #[lenses(skip)]
    id: u64,
    person: Person,
    address: Address,
}

/// Struct with generic type parameter
#[derive(Clone, PartialEq, Debug, Lenses)]
struct Container<T> {
    value: T,
    label: String,
}

fn member() -> Member {
    Member {
        id: 7,
        person: Person {
            name: "Alice".to_string(),
            age: 30,
        },
        address: Address {
            street: "Main St".to_string(),
            city: "Tokyo".to_string(),
        },
    }
}

// =============================================================================
// Basic lenses
// =============================================================================

#[rstest]
fn derived_lens_get() {
    let person = member().person;

    assert_eq!(Person::name_lens().get(&person), "Alice");
    assert_eq!(*Person::age_lens().get(&person), 30);
}

#[rstest]
fn derived_lens_set_in_place() {
    let mut person = member().person;

    Person::age_lens().set(&mut person, 31);

    assert_eq!(person.age, 31);
    assert_eq!(person.name, "Alice");
}

#[rstest]
fn derived_lens_replace_returns_previous() {
    let mut person = member().person;

    let previous = Person::name_lens().replace(&mut person, "Alicia".to_string());

    assert_eq!(previous, "Alice");
    assert_eq!(person.name, "Alicia");
}

#[rstest]
fn derived_lens_modify() {
    let mut person = member().person;

    Person::name_lens().modify(&mut person, |name| name.push_str(" Liddell"));

    assert_eq!(person.name, "Alice Liddell");
}

// =============================================================================
// Composition and generics
// =============================================================================

#[rstest]
fn composed_derived_lenses_reach_nested_fields() {
    let mut member = member();
    let city = Member::address_lens().compose(Address::city_lens());

    city.set(&mut member, "Osaka".to_string());

    assert_eq!(city.get(&member), "Osaka");
    assert_eq!(member.address.street, "Main St");
    assert_eq!(member.id, 7);
}

#[rstest]
#[case(1)]
#[case(-5)]
fn generic_struct_lens(#[case] value: i32) {
    let mut container = Container {
        value: 0,
        label: "count".to_string(),
    };

    Container::<i32>::value_lens().set(&mut container, value);

    assert_eq!(container.value, value);
    assert_eq!(Container::<i32>::label_lens().get(&container), "count");
}

#[rstest]
fn derived_lenses_are_clone() {
    let lens = Person::name_lens();
    let copy = lens.clone();
    let person = member().person;

    assert_eq!(lens.get(&person), copy.get(&person));
}

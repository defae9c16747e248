//! Optics for in-place field access.
//!
//! Updaters never know the concrete layout of the entity they reconcile.
//! They reach their field through a [`Lens`], which gives shared and
//! unique access to exactly one field of a larger structure.
//!
//! # Example
//!
//! ```
//! use scim_updater::optics::Lens;
//! use scim_updater::lens;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Address { street: String, city: String }
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Person { name: String, address: Address }
//!
//! let address_lens = lens!(Person, address);
//! let street_lens = lens!(Address, street);
//! let person_street = address_lens.compose(street_lens);
//!
//! let mut person = Person {
//!     name: "Alice".to_string(),
//!     address: Address {
//!         street: "Main St".to_string(),
//!         city: "Tokyo".to_string(),
//!     },
//! };
//!
//! person_street.set(&mut person, "Oak Ave".to_string());
//! assert_eq!(person.address.street, "Oak Ave");
//! assert_eq!(person.address.city, "Tokyo");
//! ```
//!
//! # Lens Laws
//!
//! 1. **GetPut Law**: setting what was read leaves the source unchanged.
//! 2. **PutGet Law**: reading after a set yields the value that was set.
//! 3. **PutPut Law**: of two consecutive sets, the last one wins.

mod lens;

pub use lens::{ComposedLens, FunctionLens, Lens};

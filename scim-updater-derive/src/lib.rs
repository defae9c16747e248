//! Derive macro for scim-updater optics.
//!
//! # Available Derive Macros
//!
//! - [`Lenses`]: Generates an in-place lens accessor for every named field
//!
//! # Example
//!
//! ```rust,ignore
//! use scim_updater::optics::Lens;
//! use scim_updater_derive::Lenses;
//!
//! #[derive(Lenses)]
//! struct Account {
//!     username: String,
//!     email: String,
//! }
//!
//! // Generated methods:
//! // - Account::username_lens() -> impl Lens<Account, String>
//! // - Account::email_lens() -> impl Lens<Account, String>
//!
//! let mut account = Account { username: "alice".into(), email: "a@x.com".into() };
//! Account::email_lens().set(&mut account, "a@y.com".into());
//! assert_eq!(account.email, "a@y.com");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod lenses;

use proc_macro::TokenStream;

/// Derive macro generating a lens accessor per struct field.
///
/// For each field `foo` of type `T`, generates:
///
/// ```rust,ignore
/// impl StructName {
///     pub fn foo_lens() -> impl Lens<StructName, T> + Clone { ... }
/// }
/// ```
///
/// Fields marked `#[lenses(skip)]` get no accessor. Identity and version
/// fields are the usual candidates, since no updater should touch them.
///
/// # Requirements
///
/// - The type must be a struct with named fields
/// - `scim_updater` must be resolvable from the call site
///
/// # Generics
///
/// ```rust,ignore
/// #[derive(Lenses)]
/// struct Labelled<T> {
///     label: String,
///     value: T,
/// }
///
/// let lens = Labelled::<i32>::value_lens();
/// ```
#[proc_macro_derive(Lenses, attributes(lenses))]
pub fn derive_lenses(input: TokenStream) -> TokenStream {
    lenses::derive_lenses_impl(input)
}

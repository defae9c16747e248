//! # scim-updater
//!
//! Conditional, change-detecting updates for SCIM-style provisioning.
//!
//! ## Overview
//!
//! An update request is a list of small [`updater::Updater`]s, each bound to
//! one field of an entity (through a [`optics::Lens`]) and one proposed
//! value. The [`pipeline`] runs them in order against a uniquely borrowed
//! entity and reports whether anything changed and which updaters changed
//! it, so that unchanged entities are never written back.
//!
//! - **Optics**: `Lens` plus `#[derive(Lenses)]` and `lens!` to focus fields
//! - **Updaters**: `Replacer`, `CollectionAdder`, `CollectionRemover`, `FnUpdater`
//! - **Validation**: reusable validators run only when a change would apply
//! - **Pipeline**: ordered, fail-fast execution with an `UpdateOutcome`
//! - **Service**: load, run, touch and save with optimistic versioning
//! - **Accounts and groups**: patch documents turned into ready pipelines
//!
//! ## Example
//!
//! ```rust
//! use scim_updater::prelude::*;
//!
//! #[derive(Debug, Lenses)]
//! struct User {
//!     name: String,
//!     email: String,
//! }
//!
//! let mut user = User { name: "alice".into(), email: "a@x.com".into() };
//!
//! let outcome = Pipeline::new()
//!     .with(Replacer::new("setName", User::name_lens(), "alice".to_string()))
//!     .with(
//!         Replacer::new("setEmail", User::email_lens(), "a@y.com".to_string())
//!             .validated_by(EmailAddress::new("email")),
//!     )
//!     .run(&mut user)
//!     .unwrap();
//!
//! assert!(outcome.modified());
//! assert_eq!(outcome.applied(), ["setEmail"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

// Lets `#[derive(Lenses)]` expand to `::scim_updater::...` paths inside this crate.
extern crate self as scim_updater;

/// Prelude module for convenient imports.
///
/// ```rust
/// use scim_updater::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Lenses;
    pub use crate::error::{ConflictError, UpdateError, UpdateResult, ValidationError};
    pub use crate::lens;
    pub use crate::optics::{FunctionLens, Lens};
    pub use crate::pipeline::{Pipeline, UpdateOutcome, run_all};
    pub use crate::service::{UpdateService, Updated};
    pub use crate::store::{Entity, EntityStore, InMemoryStore};
    pub use crate::updater::{
        CollectionAdder, CollectionRemover, FnUpdater, Replacer, Updater, UpdaterId, UpdaterType,
    };
    pub use crate::validation::{
        EmailAddress, HttpUrl, IfPresent, MaxLength, NotBlank, Pattern, Validator,
    };
}

pub mod account;
pub mod config;
pub mod error;
pub mod group;
pub mod optics;
pub mod patch;
pub mod pipeline;
pub mod service;
pub mod store;
pub mod updater;
pub mod validation;

pub use scim_updater_derive::Lenses;

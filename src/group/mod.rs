//! Groups and their updaters.

mod updaters;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Lenses;
use crate::account::AccountId;
use crate::error::UpdateResult;
use crate::store::{Entity, InMemoryStore};

pub use updaters::{GroupAttributes, GroupPatch, GroupUpdaterFactory};

/// Identifier of a [`Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Generates a random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A named set of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Lenses)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[lenses(skip)]
    id: GroupId,
    #[lenses(skip)]
    version: u64,
    /// Unique group name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Member accounts.
    pub members: Vec<AccountId>,
    #[lenses(skip)]
    created_at: DateTime<Utc>,
    #[lenses(skip)]
    last_update_time: DateTime<Utc>,
}

impl Group {
    /// Creates an empty group with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::generate(),
            version: 0,
            name: name.into(),
            description: None,
            members: Vec::new(),
            created_at: now,
            last_update_time: now,
        }
    }

    /// Returns the group id.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.id
    }

    /// Returns when the group was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the group was last saved with changes.
    #[must_use]
    pub const fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }
}

impl Entity for Group {
    type Id = GroupId;

    fn id(&self) -> &GroupId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_update_time = now;
    }
}

/// Looks up groups by unique attributes.
pub trait GroupDirectory {
    /// Finds the group with this name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UpdateError::Collaborator`] if the lookup fails.
    fn find_by_name(&self, name: &str) -> UpdateResult<Option<GroupId>>;
}

impl GroupDirectory for InMemoryStore<Group> {
    fn find_by_name(&self, name: &str) -> UpdateResult<Option<GroupId>> {
        Ok(self.find_map(|group| (group.name == name).then_some(group.id)))
    }
}

static_assertions::assert_impl_all!(InMemoryStore<Group>: Send, Sync);

//! User accounts and their updaters.
//!
//! [`Account`] is the entity; [`AccountUpdaterFactory`] turns an
//! [`AccountPatch`] into a [`crate::pipeline::Pipeline`] of account
//! updaters. Uniqueness checks go through an [`AccountDirectory`], password
//! hashing through a [`PasswordEncoder`].

mod updaters;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Lenses;
use crate::error::UpdateResult;
use crate::store::{Entity, InMemoryStore};

pub use updaters::{AccountAttributes, AccountPatch, AccountUpdaterFactory};

/// Identifier of an [`Account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// An OpenID Connect identity linked to an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OidcId {
    /// The issuer URL.
    pub issuer: String,
    /// The subject at that issuer.
    pub subject: String,
}

impl OidcId {
    /// Creates an OIDC identity.
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
        }
    }
}

impl fmt::Display for OidcId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}#{}", self.issuer, self.subject)
    }
}

/// An SSH public key. Keys are identified by `value`; the label is free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SshKey {
    /// A human-readable label.
    pub label: String,
    /// The encoded public key.
    pub value: String,
}

impl SshKey {
    /// Creates an SSH key.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Lenses)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[lenses(skip)]
    id: AccountId,
    #[lenses(skip)]
    version: u64,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Optional picture URL.
    pub picture: Option<String>,
    /// Whether the account may log in.
    pub active: bool,
    /// Encoded password, never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Linked OpenID Connect identities.
    pub oidc_ids: Vec<OidcId>,
    /// Registered SSH keys.
    pub ssh_keys: Vec<SshKey>,
    #[lenses(skip)]
    created_at: DateTime<Utc>,
    #[lenses(skip)]
    last_update_time: DateTime<Utc>,
}

impl Account {
    /// Creates an active account with a fresh id and no credentials.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::generate(),
            version: 0,
            username: username.into(),
            email: email.into(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            picture: None,
            active: true,
            password_hash: None,
            oidc_ids: Vec::new(),
            ssh_keys: Vec::new(),
            created_at: now,
            last_update_time: now,
        }
    }

    /// Returns the account id.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.id
    }

    /// Returns when the account was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the account was last saved with changes.
    #[must_use]
    pub const fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &AccountId {
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

/// Looks up which account, if any, holds a unique attribute.
pub trait AccountDirectory {
    /// Finds the account with this username.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UpdateError::Collaborator`] if the lookup fails.
    fn find_by_username(&self, username: &str) -> UpdateResult<Option<AccountId>>;

    /// Finds the account with this email.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UpdateError::Collaborator`] if the lookup fails.
    fn find_by_email(&self, email: &str) -> UpdateResult<Option<AccountId>>;

    /// Finds the account linked to this OIDC identity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UpdateError::Collaborator`] if the lookup fails.
    fn find_by_oidc_id(&self, oidc_id: &OidcId) -> UpdateResult<Option<AccountId>>;

    /// Finds the account holding this SSH key value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UpdateError::Collaborator`] if the lookup fails.
    fn find_by_ssh_key(&self, value: &str) -> UpdateResult<Option<AccountId>>;
}

impl AccountDirectory for InMemoryStore<Account> {
    fn find_by_username(&self, username: &str) -> UpdateResult<Option<AccountId>> {
        Ok(self.find_map(|account| (account.username == username).then_some(account.id)))
    }

    fn find_by_email(&self, email: &str) -> UpdateResult<Option<AccountId>> {
        Ok(self.find_map(|account| (account.email == email).then_some(account.id)))
    }

    fn find_by_oidc_id(&self, oidc_id: &OidcId) -> UpdateResult<Option<AccountId>> {
        Ok(self.find_map(|account| account.oidc_ids.contains(oidc_id).then_some(account.id)))
    }

    fn find_by_ssh_key(&self, value: &str) -> UpdateResult<Option<AccountId>> {
        Ok(self.find_map(|account| {
            account
                .ssh_keys
                .iter()
                .any(|key| key.value == value)
                .then_some(account.id)
        }))
    }
}

/// Encodes passwords and checks raw passwords against encoded ones.
pub trait PasswordEncoder {
    /// Encodes a raw password.
    fn encode(&self, raw: &str) -> String;

    /// Returns true if `raw` encodes to `encoded`.
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

static_assertions::assert_impl_all!(InMemoryStore<Account>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::Lens;
    use rstest::rstest;

    fn directory() -> (InMemoryStore<Account>, AccountId) {
        let store = InMemoryStore::new();
        let mut account = Account::new("alice", "alice@example.org", "Alice", "Liddell");
        account.oidc_ids.push(OidcId::new("https://idp.example.org", "1234"));
        account.ssh_keys.push(SshKey::new("laptop", "ssh-ed25519 AAAA"));
        let id = store.insert(account);
        store.insert(Account::new("bob", "bob@example.org", "Bob", "Builder"));
        (store, id)
    }

    #[rstest]
    fn directory_finds_owner_by_unique_attributes() {
        let (store, alice) = directory();

        assert_eq!(store.find_by_username("alice").unwrap(), Some(alice));
        assert_eq!(store.find_by_email("alice@example.org").unwrap(), Some(alice));
        assert_eq!(
            store
                .find_by_oidc_id(&OidcId::new("https://idp.example.org", "1234"))
                .unwrap(),
            Some(alice)
        );
        assert_eq!(store.find_by_ssh_key("ssh-ed25519 AAAA").unwrap(), Some(alice));
        assert_eq!(store.find_by_username("carol").unwrap(), None);
    }

    #[rstest]
    fn password_hash_is_not_serialized() {
        let mut account = Account::new("alice", "alice@example.org", "Alice", "Liddell");
        account.password_hash = Some("secret-hash".to_string());

        let json = serde_json::to_value(&account).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["givenName"], "Alice");
    }

    #[rstest]
    fn derived_lens_focuses_field() {
        let mut account = Account::new("alice", "alice@example.org", "Alice", "Liddell");
        let lens = Account::email_lens();

        lens.set(&mut account, "a@y.com".to_string());

        assert_eq!(lens.get(&account), "a@y.com");
    }

    #[rstest]
    fn oidc_id_display() {
        assert_eq!(
            OidcId::new("https://idp", "42").to_string(),
            "https://idp#42"
        );
    }
}

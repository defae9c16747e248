//! Names of the account and group updaters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::updater::UpdaterId;

/// The kind of change an account or group updater makes.
///
/// Outcomes, logs and audit records refer to updaters by these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdaterType {
    /// Replaces the account username.
    AccountReplaceUsername,
    /// Replaces the account email.
    AccountReplaceEmail,
    /// Replaces the account given name.
    AccountReplaceGivenName,
    /// Replaces the account family name.
    AccountReplaceFamilyName,
    /// Replaces the account picture URL.
    AccountReplacePicture,
    /// Clears the account picture URL.
    AccountRemovePicture,
    /// Activates or suspends the account.
    AccountReplaceActive,
    /// Replaces the account password.
    AccountReplacePassword,
    /// Links OpenID Connect identities.
    AccountAddOidcId,
    /// Unlinks OpenID Connect identities.
    AccountRemoveOidcId,
    /// Adds SSH public keys.
    AccountAddSshKey,
    /// Removes SSH public keys.
    AccountRemoveSshKey,
    /// Replaces the group name.
    GroupReplaceName,
    /// Replaces the group description.
    GroupReplaceDescription,
    /// Clears the group description.
    GroupRemoveDescription,
    /// Adds group members.
    GroupAddMember,
    /// Removes group members.
    GroupRemoveMember,
}

impl UpdaterType {
    /// Returns the canonical name, e.g. `ACCOUNT_REPLACE_EMAIL`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountReplaceUsername => "ACCOUNT_REPLACE_USERNAME",
            Self::AccountReplaceEmail => "ACCOUNT_REPLACE_EMAIL",
            Self::AccountReplaceGivenName => "ACCOUNT_REPLACE_GIVEN_NAME",
            Self::AccountReplaceFamilyName => "ACCOUNT_REPLACE_FAMILY_NAME",
            Self::AccountReplacePicture => "ACCOUNT_REPLACE_PICTURE",
            Self::AccountRemovePicture => "ACCOUNT_REMOVE_PICTURE",
            Self::AccountReplaceActive => "ACCOUNT_REPLACE_ACTIVE",
            Self::AccountReplacePassword => "ACCOUNT_REPLACE_PASSWORD",
            Self::AccountAddOidcId => "ACCOUNT_ADD_OIDC_ID",
            Self::AccountRemoveOidcId => "ACCOUNT_REMOVE_OIDC_ID",
            Self::AccountAddSshKey => "ACCOUNT_ADD_SSH_KEY",
            Self::AccountRemoveSshKey => "ACCOUNT_REMOVE_SSH_KEY",
            Self::GroupReplaceName => "GROUP_REPLACE_NAME",
            Self::GroupReplaceDescription => "GROUP_REPLACE_DESCRIPTION",
            Self::GroupRemoveDescription => "GROUP_REMOVE_DESCRIPTION",
            Self::GroupAddMember => "GROUP_ADD_MEMBER",
            Self::GroupRemoveMember => "GROUP_REMOVE_MEMBER",
        }
    }
}

impl fmt::Display for UpdaterType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<UpdaterType> for UpdaterId {
    fn from(updater_type: UpdaterType) -> Self {
        Self::from_static(updater_type.as_str())
    }
}

impl PartialEq<UpdaterType> for UpdaterId {
    fn eq(&self, other: &UpdaterType) -> bool {
        self.as_str() == other.as_str()
    }
}

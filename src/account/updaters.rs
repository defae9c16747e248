//! Account patch documents and the updaters built from them.

use serde::{Deserialize, Serialize};

use super::{Account, AccountDirectory, OidcId, PasswordEncoder, SshKey};
use crate::config::UpdaterConfig;
use crate::error::{UpdateError, UpdateResult, ValidationError};
use crate::patch::{Patch, PatchOp, PatchOperation};
use crate::pipeline::Pipeline;
use crate::updater::{
    CollectionAdder, CollectionRemover, FnUpdater, Replacer, UpdaterType, ensure_unbound,
};
use crate::validation::{EmailAddress, HttpUrl, IfPresent, MaxLength, NotBlank, Pattern, Validator};

/// The account attributes a patch operation touches. Absent attributes are
/// left alone.
///
/// For `remove` operations only presence matters: `picture: Some(_)` clears
/// the picture whatever the value, while `oidcIds` and `sshKeys` list the
/// values to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountAttributes {
    /// New username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// New family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// New picture URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// New raw password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// OIDC identities to link or unlink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_ids: Option<Vec<OidcId>>,
    /// SSH keys to add or remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<SshKey>>,
}

/// A patch over account attributes.
pub type AccountPatch = Patch<AccountAttributes>;

fn unsupported(op: PatchOp, attribute: &str) -> UpdateError {
    ValidationError::new(
        attribute,
        "UNSUPPORTED_OPERATION",
        format!("'{op}' is not supported for {attribute}"),
    )
    .into()
}

fn validate_oidc_id(oidc_id: &OidcId) -> Result<(), ValidationError> {
    if oidc_id.issuer.trim().is_empty() || oidc_id.subject.trim().is_empty() {
        return Err(ValidationError::new(
            "oidcIds",
            "BLANK_VALUE",
            "issuer and subject must not be blank",
        ));
    }
    Ok(())
}

fn validate_ssh_key(key: &SshKey) -> Result<(), ValidationError> {
    NotBlank::new("sshKeys").validate(&key.value)
}

fn same_key(stored: &SshKey, proposed: &SshKey) -> bool {
    stored.value == proposed.value
}

/// Builds account pipelines from patches.
///
/// # Example
///
/// ```
/// use scim_updater::account::{
///     Account, AccountAttributes, AccountPatch, AccountUpdaterFactory, PasswordEncoder,
/// };
/// use scim_updater::config::UpdaterConfig;
/// use scim_updater::store::InMemoryStore;
///
/// struct Plain;
///
/// impl PasswordEncoder for Plain {
///     fn encode(&self, raw: &str) -> String { raw.to_string() }
///     fn matches(&self, raw: &str, encoded: &str) -> bool { raw == encoded }
/// }
///
/// let directory = InMemoryStore::<Account>::new();
/// let config = UpdaterConfig::default();
/// let factory = AccountUpdaterFactory::new(&directory, &Plain, &config);
///
/// let patch = AccountPatch::new().replace(AccountAttributes {
///     given_name: Some("Alicia".to_string()),
///     ..AccountAttributes::default()
/// });
///
/// let mut account = Account::new("alice", "a@x.com", "Alice", "Liddell");
/// let outcome = factory.build(&patch).unwrap().run(&mut account).unwrap();
///
/// assert_eq!(outcome.applied(), ["ACCOUNT_REPLACE_GIVEN_NAME"]);
/// ```
#[derive(Debug)]
pub struct AccountUpdaterFactory<'a, D: ?Sized, P: ?Sized> {
    directory: &'a D,
    encoder: &'a P,
    config: &'a UpdaterConfig,
}

impl<'a, D, P> AccountUpdaterFactory<'a, D, P>
where
    D: AccountDirectory + ?Sized,
    P: PasswordEncoder + ?Sized,
{
    /// Creates a factory over its collaborators.
    #[must_use]
    pub const fn new(directory: &'a D, encoder: &'a P, config: &'a UpdaterConfig) -> Self {
        Self {
            directory,
            encoder,
            config,
        }
    }

    /// Builds the updaters for every operation of `patch`, in order.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] with code `UNSUPPORTED_OPERATION` when
    /// an operation targets an attribute it cannot apply to.
    pub fn build(&self, patch: &AccountPatch) -> UpdateResult<Pipeline<'a, Account>> {
        let mut pipeline = Pipeline::new();

        for operation in patch {
            match operation {
                PatchOperation::Add(attributes) => self.add(&mut pipeline, attributes),
                PatchOperation::Replace(attributes) => self.replace(&mut pipeline, attributes)?,
                PatchOperation::Remove(attributes) => self.remove(&mut pipeline, attributes)?,
            }
        }

        tracing::debug!(
            operations = patch.len(),
            updaters = pipeline.len(),
            "account pipeline built"
        );
        Ok(pipeline)
    }

    fn add(&self, pipeline: &mut Pipeline<'a, Account>, attributes: &AccountAttributes) {
        self.push_scalars(pipeline, attributes);

        if let Some(oidc_ids) = &attributes.oidc_ids {
            let directory = self.directory;
            pipeline.push(
                CollectionAdder::new(
                    UpdaterType::AccountAddOidcId,
                    Account::oidc_ids_lens(),
                    oidc_ids.iter().cloned(),
                )
                .validated_by(validate_oidc_id)
                .guarded_by(move |account: &Account, oidc_id: &OidcId| {
                    let owner = directory.find_by_oidc_id(oidc_id)?;
                    ensure_unbound("oidcIds", oidc_id, owner, &account.id)
                }),
            );
        }

        if let Some(ssh_keys) = &attributes.ssh_keys {
            let directory = self.directory;
            pipeline.push(
                CollectionAdder::new(
                    UpdaterType::AccountAddSshKey,
                    Account::ssh_keys_lens(),
                    ssh_keys.iter().cloned(),
                )
                .matching(same_key)
                .validated_by(validate_ssh_key)
                .guarded_by(move |account: &Account, key: &SshKey| {
                    let owner = directory.find_by_ssh_key(&key.value)?;
                    ensure_unbound("sshKeys", &key.value, owner, &account.id)
                }),
            );
        }
    }

    fn replace(
        &self,
        pipeline: &mut Pipeline<'a, Account>,
        attributes: &AccountAttributes,
    ) -> UpdateResult<()> {
        if attributes.oidc_ids.is_some() {
            return Err(unsupported(PatchOp::Replace, "oidcIds"));
        }
        if attributes.ssh_keys.is_some() {
            return Err(unsupported(PatchOp::Replace, "sshKeys"));
        }

        self.push_scalars(pipeline, attributes);
        Ok(())
    }

    fn remove(
        &self,
        pipeline: &mut Pipeline<'a, Account>,
        attributes: &AccountAttributes,
    ) -> UpdateResult<()> {
        let fixed = [
            ("username", attributes.username.is_some()),
            ("email", attributes.email.is_some()),
            ("givenName", attributes.given_name.is_some()),
            ("familyName", attributes.family_name.is_some()),
            ("active", attributes.active.is_some()),
            ("password", attributes.password.is_some()),
        ];
        if let Some((attribute, _)) = fixed.into_iter().find(|(_, present)| *present) {
            return Err(unsupported(PatchOp::Remove, attribute));
        }

        if attributes.picture.is_some() {
            pipeline.push(Replacer::new(
                UpdaterType::AccountRemovePicture,
                Account::picture_lens(),
                None,
            ));
        }

        if let Some(oidc_ids) = &attributes.oidc_ids {
            pipeline.push(CollectionRemover::new(
                UpdaterType::AccountRemoveOidcId,
                Account::oidc_ids_lens(),
                oidc_ids.iter().cloned(),
            ));
        }

        if let Some(ssh_keys) = &attributes.ssh_keys {
            pipeline.push(
                CollectionRemover::new(
                    UpdaterType::AccountRemoveSshKey,
                    Account::ssh_keys_lens(),
                    ssh_keys.iter().cloned(),
                )
                .matching(same_key),
            );
        }

        Ok(())
    }

    fn push_scalars(&self, pipeline: &mut Pipeline<'a, Account>, attributes: &AccountAttributes) {
        let directory = self.directory;
        let max_name_length = self.config.max_name_length;

        if let Some(username) = &attributes.username {
            pipeline.push(
                Replacer::new(
                    UpdaterType::AccountReplaceUsername,
                    Account::username_lens(),
                    username.clone(),
                )
                .validated_by(NotBlank::new("username"))
                .validated_by(Pattern::new("username", self.config.username_pattern.clone()))
                .guarded_by(move |account: &Account, username: &String| {
                    let owner = directory.find_by_username(username)?;
                    ensure_unbound("username", username, owner, &account.id)
                }),
            );
        }

        if let Some(email) = &attributes.email {
            pipeline.push(
                Replacer::new(
                    UpdaterType::AccountReplaceEmail,
                    Account::email_lens(),
                    email.clone(),
                )
                .validated_by(EmailAddress::new("email"))
                .guarded_by(move |account: &Account, email: &String| {
                    let owner = directory.find_by_email(email)?;
                    ensure_unbound("email", email, owner, &account.id)
                }),
            );
        }

        if let Some(given_name) = &attributes.given_name {
            pipeline.push(
                Replacer::new(
                    UpdaterType::AccountReplaceGivenName,
                    Account::given_name_lens(),
                    given_name.clone(),
                )
                .validated_by(NotBlank::new("givenName"))
                .validated_by(MaxLength::new("givenName", max_name_length)),
            );
        }

        if let Some(family_name) = &attributes.family_name {
            pipeline.push(
                Replacer::new(
                    UpdaterType::AccountReplaceFamilyName,
                    Account::family_name_lens(),
                    family_name.clone(),
                )
                .validated_by(NotBlank::new("familyName"))
                .validated_by(MaxLength::new("familyName", max_name_length)),
            );
        }

        if let Some(picture) = &attributes.picture {
            pipeline.push(
                Replacer::new(
                    UpdaterType::AccountReplacePicture,
                    Account::picture_lens(),
                    Some(picture.clone()),
                )
                .validated_by(IfPresent(HttpUrl::new("picture"))),
            );
        }

        if let Some(active) = attributes.active {
            pipeline.push(Replacer::new(
                UpdaterType::AccountReplaceActive,
                Account::active_lens(),
                active,
            ));
        }

        if let Some(password) = &attributes.password {
            let encoder = self.encoder;
            let raw = password.clone();
            pipeline.push(FnUpdater::new(
                UpdaterType::AccountReplacePassword,
                move |account: &mut Account| {
                    let unchanged = account
                        .password_hash
                        .as_deref()
                        .is_some_and(|encoded| encoder.matches(&raw, encoded));
                    if unchanged {
                        return Ok(false);
                    }
                    NotBlank::new("password").validate(&raw)?;
                    account.password_hash = Some(encoder.encode(&raw));
                    Ok(true)
                },
            ));
        }
    }
}

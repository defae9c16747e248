//! Group patch documents and the updaters built from them.

use serde::{Deserialize, Serialize};

use super::{Group, GroupDirectory};
use crate::account::AccountId;
use crate::config::UpdaterConfig;
use crate::error::{UpdateResult, ValidationError};
use crate::patch::{Patch, PatchOperation};
use crate::pipeline::Pipeline;
use crate::updater::{CollectionAdder, CollectionRemover, Replacer, UpdaterType, ensure_unbound};
use crate::validation::{MaxLength, NotBlank};

/// The group attributes a patch operation touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupAttributes {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description; on `remove`, presence clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Members to add or remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<AccountId>>,
}

/// A patch over group attributes.
pub type GroupPatch = Patch<GroupAttributes>;

/// Builds group pipelines from patches.
#[derive(Debug)]
pub struct GroupUpdaterFactory<'a, D: ?Sized> {
    directory: &'a D,
    config: &'a UpdaterConfig,
}

impl<'a, D> GroupUpdaterFactory<'a, D>
where
    D: GroupDirectory + ?Sized,
{
    /// Creates a factory over its collaborators.
    #[must_use]
    pub const fn new(directory: &'a D, config: &'a UpdaterConfig) -> Self {
        Self { directory, config }
    }

    /// Builds the updaters for every operation of `patch`, in order.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] with code `UNSUPPORTED_OPERATION` when
    /// a `remove` targets the group name.
    pub fn build(&self, patch: &GroupPatch) -> UpdateResult<Pipeline<'a, Group>> {
        let mut pipeline = Pipeline::new();

        for operation in patch {
            match operation {
                PatchOperation::Add(attributes) => {
                    self.push_scalars(&mut pipeline, attributes);
                    if let Some(members) = &attributes.members {
                        pipeline.push(CollectionAdder::new(
                            UpdaterType::GroupAddMember,
                            Group::members_lens(),
                            members.iter().copied(),
                        ));
                    }
                }
                PatchOperation::Replace(attributes) => {
                    if attributes.members.is_some() {
                        return Err(ValidationError::new(
                            "members",
                            "UNSUPPORTED_OPERATION",
                            "'replace' is not supported for members",
                        )
                        .into());
                    }
                    self.push_scalars(&mut pipeline, attributes);
                }
                PatchOperation::Remove(attributes) => {
                    if attributes.name.is_some() {
                        return Err(ValidationError::new(
                            "name",
                            "UNSUPPORTED_OPERATION",
                            "'remove' is not supported for name",
                        )
                        .into());
                    }
                    if attributes.description.is_some() {
                        pipeline.push(Replacer::new(
                            UpdaterType::GroupRemoveDescription,
                            Group::description_lens(),
                            None,
                        ));
                    }
                    if let Some(members) = &attributes.members {
                        pipeline.push(CollectionRemover::new(
                            UpdaterType::GroupRemoveMember,
                            Group::members_lens(),
                            members.iter().copied(),
                        ));
                    }
                }
            }
        }

        tracing::debug!(
            operations = patch.len(),
            updaters = pipeline.len(),
            "group pipeline built"
        );
        Ok(pipeline)
    }

    fn push_scalars(&self, pipeline: &mut Pipeline<'a, Group>, attributes: &GroupAttributes) {
        if let Some(name) = &attributes.name {
            let directory = self.directory;
            pipeline.push(
                Replacer::new(UpdaterType::GroupReplaceName, Group::name_lens(), name.clone())
                    .validated_by(NotBlank::new("name"))
                    .validated_by(MaxLength::new("name", self.config.max_name_length))
                    .guarded_by(move |group: &Group, name: &String| {
                        let owner = directory.find_by_name(name)?;
                        ensure_unbound("name", name, owner, &group.id)
                    }),
            );
        }

        if let Some(description) = &attributes.description {
            pipeline.push(Replacer::new(
                UpdaterType::GroupReplaceDescription,
                Group::description_lens(),
                Some(description.clone()),
            ));
        }
    }
}

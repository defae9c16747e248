//! Request-level orchestration: load, reconcile, save.
//!
//! [`UpdateService::update`] is the whole lifecycle of one update request:
//!
//! 1. load the entity from the store
//! 2. build the request's updaters (they may depend on the loaded entity)
//! 3. run the pipeline
//! 4. if anything changed, touch the entity and save it
//!
//! Nothing is saved when the pipeline fails or changes nothing. The service
//! itself never retries; [`UpdateService::update_with_retry`] is an explicit
//! caller-side policy that re-runs the whole request on version conflicts.

use chrono::Utc;

use crate::config::UpdaterConfig;
use crate::error::UpdateResult;
use crate::pipeline::{Pipeline, UpdateOutcome};
use crate::store::{Entity, EntityStore};

/// The entity after a successful update request, with what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated<E> {
    /// The entity as it now stands in the store.
    pub entity: E,
    /// What the pipeline did.
    pub outcome: UpdateOutcome,
}

/// Runs update requests against an [`EntityStore`].
#[derive(Debug)]
pub struct UpdateService<'s, S: ?Sized> {
    store: &'s S,
    audit: bool,
}

impl<'s, S: ?Sized> UpdateService<'s, S> {
    /// Creates a service over `store`.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self {
            store,
            audit: false,
        }
    }

    /// Enables or disables one `info` audit record per applied updater.
    #[must_use]
    pub const fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    /// Applies the settings in `config` that concern the service itself.
    #[must_use]
    pub const fn with_config(self, config: &UpdaterConfig) -> Self {
        self.with_audit(config.audit)
    }

    /// Returns whether audit records are emitted.
    #[must_use]
    pub const fn audit(&self) -> bool {
        self.audit
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &'s S {
        self.store
    }

    /// Loads the entity, runs the updaters `build` produces, and saves the
    /// entity if it changed.
    ///
    /// # Errors
    ///
    /// Returns the first error from loading, building, running or saving.
    /// On error nothing has been saved.
    pub fn update<'u, E, F>(&self, id: &E::Id, build: F) -> UpdateResult<Updated<E>>
    where
        E: Entity + 'u,
        S: EntityStore<E>,
        F: FnOnce(&E) -> UpdateResult<Pipeline<'u, E>>,
    {
        let mut entity = self.store.load(id)?;
        let pipeline = build(&entity)?;
        let outcome = pipeline.run(&mut entity)?;

        if !outcome.modified() {
            tracing::debug!(%id, "no updater changed the entity, skipping save");
            return Ok(Updated { entity, outcome });
        }

        entity.touch(Utc::now());
        let version = self.store.save(&entity)?;
        entity.set_version(version);

        tracing::info!(%id, version, changes = outcome.applied().len(), "entity updated");
        if self.audit {
            for updater in outcome.applied() {
                tracing::info!(target: "scim_updater::audit", %id, %updater, "updater applied");
            }
        }

        Ok(Updated { entity, outcome })
    }

    /// Like [`UpdateService::update`], but re-fetches and re-runs the whole
    /// request when the save hits a version conflict.
    ///
    /// At most `max_attempts` attempts are made (at least one). Errors other
    /// than version conflicts are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns the last error once attempts are exhausted, or the first
    /// non-retryable error.
    pub fn update_with_retry<'u, E, F>(
        &self,
        id: &E::Id,
        max_attempts: u32,
        mut build: F,
    ) -> UpdateResult<Updated<E>>
    where
        E: Entity + 'u,
        S: EntityStore<E>,
        F: FnMut(&E) -> UpdateResult<Pipeline<'u, E>>,
    {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.update(id, &mut build) {
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(%id, attempt, %error, "version conflict, retrying update");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConflictError, UpdateError};
    use crate::lens;
    use crate::store::InMemoryStore;
    use crate::updater::Replacer;
    use chrono::DateTime;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Profile {
        id: u32,
        version: u64,
        nickname: String,
        touched: Option<DateTime<Utc>>,
    }

    impl Entity for Profile {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn version(&self) -> u64 {
            self.version
        }

        fn set_version(&mut self, version: u64) {
            self.version = version;
        }

        fn touch(&mut self, now: DateTime<Utc>) {
            self.touched = Some(now);
        }
    }

    fn store_with_profile() -> InMemoryStore<Profile> {
        let store = InMemoryStore::new();
        store.insert(Profile {
            id: 1,
            version: 0,
            nickname: "ally".to_string(),
            touched: None,
        });
        store
    }

    fn rename(nickname: &str) -> Pipeline<'static, Profile> {
        Pipeline::new().with(Replacer::new(
            "setNickname",
            lens!(Profile, nickname),
            nickname.to_string(),
        ))
    }

    #[rstest]
    fn modified_entity_is_touched_and_saved() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);

        let updated = service.update(&1, |_| Ok(rename("al"))).unwrap();

        assert!(updated.outcome.modified());
        assert_eq!(updated.entity.version, 2);
        assert!(updated.entity.touched.is_some());
        assert_eq!(store.get(&1).unwrap(), updated.entity);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn audit_follows_config(#[case] audit: bool) {
        let store = store_with_profile();
        let config = UpdaterConfig {
            audit,
            ..UpdaterConfig::default()
        };

        let service = UpdateService::new(&store).with_config(&config);

        assert_eq!(service.audit(), audit);
        assert!(service.update(&1, |_| Ok(rename("al"))).is_ok());
    }

    #[rstest]
    fn unmodified_entity_is_not_saved() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);

        let updated = service.update(&1, |_| Ok(rename("ally"))).unwrap();

        assert!(!updated.outcome.modified());
        assert_eq!(store.get(&1).unwrap().version, 1);
        assert!(store.get(&1).unwrap().touched.is_none());
    }

    #[rstest]
    fn build_error_skips_pipeline_and_save() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);

        let result = service.update(&1, |_| -> UpdateResult<Pipeline<'static, Profile>> {
            Err(UpdateError::collaborator("directory offline"))
        });

        assert!(matches!(result, Err(UpdateError::Collaborator(_))));
        assert_eq!(store.get(&1).unwrap().version, 1);
    }

    #[rstest]
    fn concurrent_save_without_retry_is_a_conflict() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);

        let result = service.update(&1, |_| {
            let mut concurrent = store.load(&1)?;
            concurrent.nickname = "other".to_string();
            store.save(&concurrent)?;
            Ok(rename("al"))
        });

        assert!(matches!(
            result,
            Err(UpdateError::Conflict(ConflictError::VersionMismatch { .. }))
        ));
        assert_eq!(store.get(&1).unwrap().nickname, "other");
    }

    #[rstest]
    fn retry_refetches_after_conflict() {
        let store = store_with_profile();
        let service = UpdateService::new(&store).with_audit(true);
        let mut attempts = 0;

        let updated = service
            .update_with_retry(&1, 3, |_| {
                attempts += 1;
                if attempts == 1 {
                    let mut concurrent = store.load(&1)?;
                    concurrent.nickname = "other".to_string();
                    store.save(&concurrent)?;
                }
                Ok(rename("al"))
            })
            .unwrap();

        assert_eq!(attempts, 2);
        assert_eq!(updated.entity.nickname, "al");
        assert_eq!(updated.entity.version, 3);
    }

    #[rstest]
    fn retry_gives_up_after_max_attempts() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);
        let mut attempts = 0;

        let result = service.update_with_retry(&1, 2, |_| {
            attempts += 1;
            let mut concurrent = store.load(&1)?;
            concurrent.nickname = format!("other-{attempts}");
            store.save(&concurrent)?;
            Ok(rename("al"))
        });

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(attempts, 2);
    }

    #[rstest]
    fn zero_attempts_still_makes_one_attempt() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);
        let mut attempts = 0;

        let result = service.update_with_retry(&1, 0, |_| {
            attempts += 1;
            let mut concurrent = store.load(&1)?;
            concurrent.nickname = "other".to_string();
            store.save(&concurrent)?;
            Ok(rename("al"))
        });

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(attempts, 1);
    }

    #[rstest]
    fn missing_entity_is_not_retried() {
        let store = store_with_profile();
        let service = UpdateService::new(&store);
        let mut attempts = 0;

        let result = service.update_with_retry(&42, 5, |_| {
            attempts += 1;
            Ok(rename("al"))
        });

        assert!(matches!(result, Err(UpdateError::NotFound { .. })));
        assert_eq!(attempts, 0);
    }
}

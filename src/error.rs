//! Error taxonomy for update requests.
//!
//! Every failure an updater, a validator or a store can report is an
//! [`UpdateError`]. The variants separate what the caller can fix by
//! correcting input ([`ValidationError`]), what it can fix by re-fetching
//! and retrying ([`ConflictError::VersionMismatch`]), and what it cannot
//! fix at all (collaborator failures).

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// A proposed value violates a domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("invalid {field}: {message} ({code})")]
pub struct ValidationError {
    /// Name of the rejected attribute.
    pub field: String,
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Persisted state collides with the proposed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ConflictError {
    /// A unique attribute is already bound to another entity.
    #[error("{attribute} '{value}' is already in use")]
    AttributeInUse {
        /// The unique attribute, e.g. `email`.
        attribute: String,
        /// The colliding value.
        value: String,
    },
    /// The entity was modified concurrently (optimistic locking failure).
    #[error("concurrent modification: expected version {expected}, actual version {actual}")]
    VersionMismatch {
        /// The version the caller loaded.
        expected: u64,
        /// The version found in the store.
        actual: u64,
    },
}

impl ConflictError {
    /// Creates an [`ConflictError::AttributeInUse`] error.
    #[must_use]
    pub fn attribute_in_use(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeInUse {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Errors raised while reconciling an entity.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A proposed value failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The change collides with persisted state.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The entity to update does not exist.
    #[error("no entity found with id {id}")]
    NotFound {
        /// The requested id, rendered for display.
        id: String,
    },

    /// A collaborator failed for a reason this crate does not classify.
    #[error("collaborator failure: {0}")]
    Collaborator(#[source] Box<dyn StdError + Send + Sync>),
}

impl UpdateError {
    /// Wraps an unclassified collaborator failure.
    pub fn collaborator<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Collaborator(error.into())
    }

    /// Creates a [`UpdateError::NotFound`] error.
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Returns true if re-fetching the entity and re-running the whole
    /// update may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(ConflictError::VersionMismatch { .. }))
    }

    /// Returns the validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the conflict error, if this is one.
    #[must_use]
    pub const fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            Self::Conflict(error) => Some(error),
            _ => None,
        }
    }
}

static_assertions::assert_impl_all!(UpdateError: Send, Sync, StdError);
static_assertions::assert_impl_all!(ValidationError: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn validation_error_display() {
        let error = ValidationError::new("email", "INVALID_EMAIL", "not an email address");

        assert_eq!(
            error.to_string(),
            "invalid email: not an email address (INVALID_EMAIL)"
        );
    }

    #[rstest]
    fn conflict_error_display() {
        let in_use = ConflictError::attribute_in_use("username", "alice");
        let mismatch = ConflictError::VersionMismatch {
            expected: 3,
            actual: 4,
        };

        assert_eq!(in_use.to_string(), "username 'alice' is already in use");
        assert_eq!(
            mismatch.to_string(),
            "concurrent modification: expected version 3, actual version 4"
        );
    }

    #[rstest]
    fn update_error_is_transparent_over_validation() {
        let inner = ValidationError::new("givenName", "BLANK_VALUE", "must not be blank");
        let error = UpdateError::from(inner.clone());

        assert_eq!(error.to_string(), inner.to_string());
        assert_eq!(error.as_validation(), Some(&inner));
        assert!(error.as_conflict().is_none());
    }

    #[rstest]
    #[case(UpdateError::from(ConflictError::VersionMismatch { expected: 1, actual: 2 }), true)]
    #[case(UpdateError::from(ConflictError::attribute_in_use("email", "a@x.com")), false)]
    #[case(UpdateError::from(ValidationError::new("email", "INVALID_EMAIL", "bad")), false)]
    #[case(UpdateError::not_found("42"), false)]
    #[case(UpdateError::collaborator("database unavailable"), false)]
    fn only_version_mismatch_is_retryable(#[case] error: UpdateError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[rstest]
    fn collaborator_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = UpdateError::collaborator(io);

        assert_eq!(error.to_string(), "collaborator failure: refused");
        assert!(error.source().is_some());
    }
}

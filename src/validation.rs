//! Validators for proposed values.
//!
//! A [`Validator`] checks one proposed value against a domain rule. Updaters
//! run their validators only when they are about to change the entity.
//!
//! Any closure `Fn(&T) -> Result<(), ValidationError>` is a validator:
//!
//! ```
//! use scim_updater::error::ValidationError;
//! use scim_updater::validation::Validator;
//!
//! let even = |value: &u32| -> Result<(), ValidationError> {
//!     if value % 2 == 0 {
//!         Ok(())
//!     } else {
//!         Err(ValidationError::new("count", "ODD_VALUE", "must be even"))
//!     }
//! };
//!
//! assert!(even.validate(&4).is_ok());
//! assert!(even.validate(&3).is_err());
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Checks a proposed value against a domain rule.
pub trait Validator<T: ?Sized> {
    /// Returns `Ok(())` if the value is acceptable.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the violated rule.
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

impl<T: ?Sized, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), ValidationError>,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self(value)
    }
}

/// Rejects empty and whitespace-only strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotBlank {
    field: &'static str,
}

impl NotBlank {
    /// Creates the validator for `field`.
    #[must_use]
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl Validator<String> for NotBlank {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(
                self.field,
                "BLANK_VALUE",
                "must not be blank",
            ));
        }
        Ok(())
    }
}

/// Rejects strings longer than `max` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLength {
    field: &'static str,
    max: usize,
}

impl MaxLength {
    /// Creates the validator for `field`.
    #[must_use]
    pub const fn new(field: &'static str, max: usize) -> Self {
        Self { field, max }
    }
}

impl Validator<String> for MaxLength {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        let length = value.chars().count();
        if length > self.max {
            return Err(ValidationError::new(
                self.field,
                "VALUE_TOO_LONG",
                format!("must be at most {} characters, got {length}", self.max),
            ));
        }
        Ok(())
    }
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").unwrap_or_else(|error| unreachable!("{error}"))
});

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/?#]+[^\s]*$").unwrap_or_else(|error| unreachable!("{error}"))
});

/// Accepts `local@domain.tld` addresses without whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailAddress {
    field: &'static str,
}

impl EmailAddress {
    /// Creates the validator for `field`.
    #[must_use]
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl Validator<String> for EmailAddress {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        if EMAIL.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                self.field,
                "INVALID_EMAIL",
                format!("'{value}' is not a valid email address"),
            ))
        }
    }
}

/// Accepts absolute `http` and `https` URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpUrl {
    field: &'static str,
}

impl HttpUrl {
    /// Creates the validator for `field`.
    #[must_use]
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl Validator<String> for HttpUrl {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        if HTTP_URL.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                self.field,
                "INVALID_URL",
                format!("'{value}' is not an http(s) URL"),
            ))
        }
    }
}

/// Requires the whole value to match a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    field: &'static str,
    regex: Regex,
}

impl Pattern {
    /// Creates the validator from an already anchored regex.
    #[must_use]
    pub const fn new(field: &'static str, regex: Regex) -> Self {
        Self { field, regex }
    }

    /// Compiles `pattern` anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error.
    pub fn full_match(field: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(field, anchored(pattern)?))
    }
}

/// Compiles `pattern` so that it only matches whole values.
pub(crate) fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

impl Validator<String> for Pattern {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        if self.regex.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                self.field,
                "PATTERN_MISMATCH",
                format!("'{value}' does not match {}", self.regex.as_str()),
            ))
        }
    }
}

/// Applies the inner validator to `Some` values and accepts `None`.
#[derive(Debug, Clone)]
pub struct IfPresent<V>(pub V);

impl<T, V> Validator<Option<T>> for IfPresent<V>
where
    V: Validator<T>,
{
    fn validate(&self, value: &Option<T>) -> Result<(), ValidationError> {
        value.as_ref().map_or(Ok(()), |inner| self.0.validate(inner))
    }
}

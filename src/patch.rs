//! Patch documents.
//!
//! A patch is an ordered list of operations. Each operation carries one
//! attribute bag `V` whose present fields are the attributes it touches:
//!
//! ```json
//! {"operations": [
//!   {"op": "replace", "value": {"email": "a@y.com"}},
//!   {"op": "add", "value": {"oidcIds": [{"issuer": "https://idp", "subject": "42"}]}}
//! ]}
//! ```
//!
//! Updater factories turn each operation into updaters, in document order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a patch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Add values; on single-valued attributes this replaces.
    Add,
    /// Replace values.
    Replace,
    /// Remove values.
    Remove,
}

impl fmt::Display for PatchOp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        })
    }
}

/// One operation over the attributes present in `V`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "lowercase")]
pub enum PatchOperation<V> {
    /// Add the present attributes.
    Add(V),
    /// Replace the present attributes.
    Replace(V),
    /// Remove the present attributes.
    Remove(V),
}

impl<V> PatchOperation<V> {
    /// Returns the operation kind.
    #[must_use]
    pub const fn op(&self) -> PatchOp {
        match self {
            Self::Add(_) => PatchOp::Add,
            Self::Replace(_) => PatchOp::Replace,
            Self::Remove(_) => PatchOp::Remove,
        }
    }

    /// Returns the attribute bag.
    #[must_use]
    pub const fn value(&self) -> &V {
        match self {
            Self::Add(value) | Self::Replace(value) | Self::Remove(value) => value,
        }
    }
}

/// An ordered list of patch operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch<V> {
    /// The operations, applied in order.
    pub operations: Vec<PatchOperation<V>>,
}

impl<V> Patch<V> {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Appends an `add` operation.
    #[must_use]
    pub fn add(mut self, value: V) -> Self {
        self.operations.push(PatchOperation::Add(value));
        self
    }

    /// Appends a `replace` operation.
    #[must_use]
    pub fn replace(mut self, value: V) -> Self {
        self.operations.push(PatchOperation::Replace(value));
        self
    }

    /// Appends a `remove` operation.
    #[must_use]
    pub fn remove(mut self, value: V) -> Self {
        self.operations.push(PatchOperation::Remove(value));
        self
    }

    /// Iterates over the operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation<V>> {
        self.operations.iter()
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if the patch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl<V> Default for Patch<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p, V> IntoIterator for &'p Patch<V> {
    type Item = &'p PatchOperation<V>;
    type IntoIter = std::slice::Iter<'p, PatchOperation<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

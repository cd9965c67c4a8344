use std::{fmt, slice, vec};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{gvk::ParseGroupVersionError, path::FieldPath, rule::Reason};

/// Possible errors when evaluating constraints on an object
#[derive(Error, Debug)]
pub enum Error {
    /// The object violates one or more constraints
    #[error("object is invalid: {0}")]
    Invalid(#[from] Violations),

    /// A dynamic object carried no `apiVersion` / `kind`
    #[error("object has no apiVersion and kind")]
    MissingTypeMeta,

    /// The `apiVersion` of a dynamic object could not be parsed
    #[error(transparent)]
    ParseGroupVersion(#[from] ParseGroupVersionError),

    /// The body of a dynamic object does not match its declared kind
    #[error("failed to parse object into its declared kind: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// A named rule failed for a field of a record.
///
/// This is the single validation error kind: every failed check produces one,
/// and any one of them rejects the enclosing record.
#[derive(Error, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {}: {detail} ({rule})", .reason.summary())]
pub struct ConstraintViolation {
    /// Name of the violated rule
    pub rule: String,
    /// The field the rule is attached to
    pub field: FieldPath,
    /// Machine-readable failure reason
    pub reason: Reason,
    /// Human-readable description of the failure
    pub detail: String,
}

/// All violations discovered for a single record, in evaluation order.
///
/// Only built by evaluation, so never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<ConstraintViolation>);

impl Violations {
    pub(crate) fn new(violations: Vec<ConstraintViolation>) -> Self {
        Self(violations)
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, as `Violations` are only built from at least one failure
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the violations
    pub fn iter(&self) -> slice::Iter<'_, ConstraintViolation> {
        self.0.iter()
    }

    /// Names of the violated rules, in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.rule.as_str())
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => ", ",
            };
            write!(f, "{prefix}{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<ConstraintViolation> for Violations {
    fn from(violation: ConstraintViolation) -> Self {
        Self(vec![violation])
    }
}

impl IntoIterator for Violations {
    type IntoIter = vec::IntoIter<ConstraintViolation>;
    type Item = ConstraintViolation;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type IntoIter = slice::Iter<'a, ConstraintViolation>;
    type Item = &'a ConstraintViolation;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

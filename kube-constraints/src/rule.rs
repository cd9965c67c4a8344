//! Named predicate rules attached to resource fields
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::ConstraintViolation, path::FieldPath};

/// Reason is a machine-readable value providing more detail about why a field failed the validation.
///
/// Serializes to the `reason` strings used by `StatusCause` in the
/// [api conventions](https://kubernetes.io/docs/tasks/extend-kubernetes/custom-resources/custom-resource-definitions/#field-reason).
#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// FieldValueInvalid is used to report malformed values (e.g. failed regex
    /// match, too long, out of bounds).
    #[default]
    FieldValueInvalid,
    /// FieldValueRequired is used to report required values that are not
    /// provided (e.g. empty strings, null values, or empty arrays).
    FieldValueRequired,
    /// FieldValueDuplicate is used to report collisions of values that must be
    /// unique (e.g. unique IDs).
    FieldValueDuplicate,
    /// FieldValueNotSupported is used to report unknown values for enumerated
    /// fields (e.g. a list of valid values).
    FieldValueNotSupported,
}

impl Reason {
    /// The reason as it appears in a `StatusCause`
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::FieldValueInvalid => "FieldValueInvalid",
            Reason::FieldValueRequired => "FieldValueRequired",
            Reason::FieldValueDuplicate => "FieldValueDuplicate",
            Reason::FieldValueNotSupported => "FieldValueNotSupported",
        }
    }

    /// Short human prefix used in violation messages
    pub fn summary(&self) -> &'static str {
        match self {
            Reason::FieldValueInvalid => "Invalid value",
            Reason::FieldValueRequired => "Required value",
            Reason::FieldValueDuplicate => "Duplicate value",
            Reason::FieldValueNotSupported => "Unsupported value",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed to parse a [`Reason`] from its string form.
#[derive(Debug, thiserror::Error)]
#[error("unknown field reason: {0}")]
pub struct ParseReasonError(pub String);

impl FromStr for Reason {
    type Err = ParseReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FieldValueInvalid" => Ok(Reason::FieldValueInvalid),
            "FieldValueRequired" => Ok(Reason::FieldValueRequired),
            "FieldValueDuplicate" => Ok(Reason::FieldValueDuplicate),
            "FieldValueNotSupported" => Ok(Reason::FieldValueNotSupported),
            other => Err(ParseReasonError(other.to_string())),
        }
    }
}

/// A named, pure predicate over a field value of type `T`.
///
/// Rules hold no state; the same value always yields the same outcome.
///
/// ```rust
/// use kube_constraints::{FieldPath, Reason, Rule};
///
/// fn non_empty(v: &[u8]) -> bool {
///     !v.is_empty()
/// }
///
/// let rule = Rule::new("non_empty", non_empty)
///     .reason(Reason::FieldValueRequired)
///     .message("must not be empty");
/// assert!(rule.check(&[1u8][..], &FieldPath::root()).is_ok());
///
/// let err = rule.check(&[][..], &"data".into()).unwrap_err();
/// assert_eq!(err.rule, "non_empty");
/// assert_eq!(err.field.as_str(), "data");
/// ```
pub struct Rule<T: ?Sized> {
    /// Identifier surfaced in diagnostics
    pub name: &'static str,
    /// Human-readable detail used when the rule fails.
    /// If unset, the message is "failed rule: {name}".
    pub message: Option<&'static str>,
    /// Machine-readable failure reason
    pub reason: Reason,
    predicate: fn(&T) -> bool,
}

impl<T: ?Sized> Rule<T> {
    /// Create a rule from a name and a predicate
    pub const fn new(name: &'static str, predicate: fn(&T) -> bool) -> Self {
        Self {
            name,
            message: None,
            reason: Reason::FieldValueInvalid,
            predicate,
        }
    }

    /// Set the rule message.
    #[must_use]
    pub const fn message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// Set the failure reason.
    #[must_use]
    pub const fn reason(mut self, reason: Reason) -> Self {
        self.reason = reason;
        self
    }

    /// Evaluate the predicate without building a diagnostic
    pub fn holds(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Evaluate the rule against `value` located at `field`
    pub fn check(&self, value: &T, field: &FieldPath) -> Result<(), ConstraintViolation> {
        if self.holds(value) {
            return Ok(());
        }
        let detail = match self.message {
            Some(msg) => msg.to_string(),
            None => format!("failed rule: {}", self.name),
        };
        Err(ConstraintViolation {
            rule: self.name.into(),
            field: field.clone(),
            reason: self.reason,
            detail,
        })
    }
}

impl<T: ?Sized> Clone for Rule<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Rule<T> {}

impl<T: ?Sized> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

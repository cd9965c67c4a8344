//! Kubernetes `Status` style reports for rejected objects.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{dynamic::TypeMeta, error::Violations};

/// An error response in the shape the API server uses for invalid objects.
#[derive(Error, Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[error("{message}: {reason}")]
pub struct ErrorResponse {
    /// The status
    pub status: String,
    /// A message about the error
    #[serde(default)]
    pub message: String,
    /// The reason for the error
    #[serde(default)]
    pub reason: String,
    /// The error code
    pub code: u16,
    /// Extended data associated with the reason.
    pub details: Option<StatusDetails>,
}

/// StatusDetails is a set of additional properties describing the rejected object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    /// The Causes array includes more details associated with the failure.
    pub causes: Option<Vec<StatusCause>>,

    /// The group attribute of the rejected object
    pub group: Option<String>,

    /// The kind attribute of the rejected object
    pub kind: Option<String>,

    /// The name attribute of the rejected object, when it has one
    pub name: Option<String>,
}

/// StatusCause provides more information about a single violation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCause {
    /// The field of the resource that has caused this error, as named by its JSON serialization.
    ///
    /// Examples:
    ///   "spec.ports" - the field "ports" on the spec of the current resource
    ///   "subsets\[0\].ports" - the ports of the first entry in "subsets"
    pub field: Option<String>,

    /// A human-readable description of the cause of the error.
    pub message: Option<String>,

    /// A machine-readable description of the cause of the error.
    pub reason: Option<String>,
}

impl Violations {
    /// Build the `422 Invalid` response describing these violations
    pub fn to_status(&self, types: &TypeMeta, name: Option<&str>) -> ErrorResponse {
        let group = types
            .api_version
            .split_once('/')
            .map(|(group, _)| group.to_string())
            .unwrap_or_default();
        let subject = match name {
            Some(name) => format!("{} {name:?}", types.kind),
            None => types.kind.clone(),
        };
        let causes = self
            .iter()
            .map(|v| StatusCause {
                field: (!v.field.is_root()).then(|| v.field.as_str().to_string()),
                message: Some(format!("{}: {}", v.reason.summary(), v.detail)),
                reason: Some(v.reason.as_str().to_string()),
            })
            .collect();

        ErrorResponse {
            status: "Failure".into(),
            message: format!("{subject} is invalid: {self}"),
            reason: "Invalid".into(),
            code: 422,
            details: Some(StatusDetails {
                causes: Some(causes),
                group: Some(group),
                kind: Some(types.kind.clone()),
                name: name.map(String::from),
            }),
        }
    }
}

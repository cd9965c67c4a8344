//! Options controlling a validation pass
use serde::{Deserialize, Serialize};

/// Common parameters for evaluating constraints on a record.
///
/// Loaders can read these from their own configuration:
///
/// ```rust
/// use kube_constraints::ValidationParams;
///
/// let params: ValidationParams = serde_json::from_str(r#"{"failFast": true}"#)?;
/// assert_eq!(params, ValidationParams::default().fail_fast());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationParams {
    /// Stop at the first violation instead of collecting all of them.
    ///
    /// The record is rejected either way; this only limits the diagnostics.
    pub fail_fast: bool,

    /// Also evaluate format constraints on individual entries.
    ///
    /// These cover port number ranges, protocol enumerations and name formats.
    /// When disabled only the list-level naming rules run.
    pub check_formats: bool,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            fail_fast: false,
            check_formats: true,
        }
    }
}

impl ValidationParams {
    /// Stop at the first violation
    #[must_use]
    pub fn fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Only evaluate the list-level naming rules
    #[must_use]
    pub fn skip_formats(mut self) -> Self {
        self.check_formats = false;
        self
    }
}

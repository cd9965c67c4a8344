//! Field paths used to locate a violation inside a resource.
use std::fmt;

use serde::{Deserialize, Serialize};

/// A path to a field inside a resource, as named by its JSON serialization.
///
/// Follows the apimachinery `field.Path` notation: dotted children and
/// zero-indexed list elements, e.g. `subsets[0].ports[1].name`.
///
/// ```rust
/// use kube_constraints::FieldPath;
///
/// let path = FieldPath::root().child("subsets").index(0).child("ports");
/// assert_eq!(path.to_string(), "subsets[0].ports");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// The path of the object itself
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Descend into a named field
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{name}", self.0))
        }
    }

    /// Descend into a list element
    #[must_use]
    pub fn index(&self, idx: usize) -> Self {
        Self(format!("{}[{idx}]", self.0))
    }

    /// The path in its serialized form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

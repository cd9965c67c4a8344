//! Construction-time validation of records. See [`Validated`].
use std::ops::Deref;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::Violations, evaluator::Evaluator, params::ValidationParams, path::FieldPath};

/// A record carrying constraints on its fields.
///
/// Implementors only describe which checks run where; the outcome is
/// collected by the [`Evaluator`].
pub trait Validate {
    /// Run every check of this record, with `path` pointing at the record itself
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>);

    /// Validate with default parameters
    fn validate(&self) -> Result<(), Violations> {
        self.validate_with(&ValidationParams::default())
    }

    /// Validate with explicit parameters
    fn validate_with(&self, params: &ValidationParams) -> Result<(), Violations> {
        let mut ev = Evaluator::new(params);
        self.validate_into(&FieldPath::root(), &mut ev);
        ev.finish()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        if let Some(inner) = self {
            inner.validate_into(path, ev);
        }
    }
}

/// Validate each element of a list at its indexed path
pub(crate) fn validate_each<T: Validate>(items: Option<&[T]>, path: &FieldPath, ev: &mut Evaluator<'_>) {
    for (i, item) in items.unwrap_or_default().iter().enumerate() {
        if ev.is_done() {
            return;
        }
        item.validate_into(&path.index(i), ev);
    }
}

/// A record that passed validation when it was built.
///
/// There is no way to obtain a `Validated<K>` for a `K` that violates its constraints:
/// both [`Validated::new`] and deserialization evaluate every rule eagerly and reject
/// the whole value on any violation.
///
/// ```rust
/// use k8s_openapi::api::core::v1::Endpoints;
/// use kube_constraints::Validated;
///
/// let ok: Validated<Endpoints> = serde_json::from_str(
///     r#"{"apiVersion":"v1","kind":"Endpoints","metadata":{"name":"web"},
///         "subsets":[{"ports":[{"name":"http","port":80},{"name":"https","port":443}]}]}"#,
/// )?;
/// assert_eq!(ok.metadata.name.as_deref(), Some("web"));
///
/// let err = serde_json::from_str::<Validated<Endpoints>>(
///     r#"{"apiVersion":"v1","kind":"Endpoints","metadata":{"name":"web"},
///         "subsets":[{"ports":[{"name":"http","port":80},{"name":"http","port":443}]}]}"#,
/// )
/// .unwrap_err();
/// assert!(err.to_string().contains("has_unique_port_names"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Validated<K>(K);

impl<K: Validate> Validated<K> {
    /// Validate `inner` with default parameters
    pub fn new(inner: K) -> Result<Self, Violations> {
        Self::with_params(inner, &ValidationParams::default())
    }

    /// Validate `inner` with explicit parameters
    pub fn with_params(inner: K, params: &ValidationParams) -> Result<Self, Violations> {
        inner.validate_with(params)?;
        Ok(Self(inner))
    }
}

impl<K> Validated<K> {
    /// Unwrap the validated record
    pub fn into_inner(self) -> K {
        self.0
    }
}

impl<K> Deref for Validated<K> {
    type Target = K;

    fn deref(&self) -> &K {
        &self.0
    }
}

impl<K> AsRef<K> for Validated<K> {
    fn as_ref(&self) -> &K {
        &self.0
    }
}

impl<K: Serialize> Serialize for Validated<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, K> Deserialize<'de> for Validated<K>
where
    K: Deserialize<'de> + Validate,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = K::deserialize(deserializer)?;
        Validated::new(inner).map_err(de::Error::custom)
    }
}

//! Dispatch of dynamic objects to the constraints of their declared kind.
use std::collections::BTreeMap;

use k8s_openapi::api::{
    core::v1::{Endpoints, Pod, Service},
    discovery::v1::EndpointSlice,
};
use serde::de::DeserializeOwned;

use crate::{
    dynamic::DynamicObject, gvk::GroupVersionKind, params::ValidationParams, validate::Validate, Error, Result,
};

type ValidateFn = fn(&DynamicObject, &ValidationParams) -> Result<()>;

/// Registry of kinds that carry constraints, keyed by [`GroupVersionKind`].
///
/// Kinds that are not registered have no predicate rules and are accepted as-is.
///
/// ```rust
/// use kube_constraints::{Catalog, DynamicObject, Error, TypeMeta, ValidationParams};
/// use k8s_openapi::api::core::v1::Endpoints;
///
/// let catalog = Catalog::builtin();
/// let obj = DynamicObject::new("web", TypeMeta::of::<Endpoints>()).data(serde_json::json!({
///     "subsets": [{ "ports": [{ "name": "a", "port": 80 }, { "name": "a", "port": 81 }] }]
/// }));
/// let err = catalog.validate(&obj, &ValidationParams::default()).unwrap_err();
/// assert!(matches!(err, Error::Invalid(_)));
/// ```
#[derive(Clone, Default)]
pub struct Catalog {
    kinds: BTreeMap<GroupVersionKind, ValidateFn>,
}

impl Catalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with every resource type this crate has constraints for
    pub fn builtin() -> Self {
        Self::new()
            .with::<Endpoints>()
            .with::<Service>()
            .with::<EndpointSlice>()
            .with::<Pod>()
    }

    /// Register a kind
    pub fn register<K>(&mut self)
    where
        K: k8s_openapi::Resource + DeserializeOwned + Validate,
    {
        self.kinds.insert(GroupVersionKind::of::<K>(), validate_as::<K>);
    }

    /// Register a kind, builder style
    #[must_use]
    pub fn with<K>(mut self) -> Self
    where
        K: k8s_openapi::Resource + DeserializeOwned + Validate,
    {
        self.register::<K>();
        self
    }

    /// Whether constraints are registered for `gvk`
    pub fn contains(&self, gvk: &GroupVersionKind) -> bool {
        self.kinds.contains_key(gvk)
    }

    /// Registered kinds, in order
    pub fn kinds(&self) -> impl Iterator<Item = &GroupVersionKind> {
        self.kinds.keys()
    }

    /// Evaluate the constraints of the object's declared kind
    pub fn validate(&self, obj: &DynamicObject, params: &ValidationParams) -> Result<()> {
        let gvk = obj.gvk().ok_or(Error::MissingTypeMeta)??;
        match self.kinds.get(&gvk) {
            Some(validate) => validate(obj, params),
            None => {
                tracing::debug!(%gvk, "no constraints registered for kind");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.kinds.keys()).finish()
    }
}

fn validate_as<K: DeserializeOwned + Validate>(obj: &DynamicObject, params: &ValidationParams) -> Result<()> {
    let typed: K = obj.try_parse().map_err(Error::Deserialize)?;
    typed.validate_with(params)?;
    Ok(())
}

//! Objects whose kind is only known from their `apiVersion` / `kind` fields.
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::gvk::{GroupVersionKind, ParseGroupVersionError};

/// Type information that is flattened into every kubernetes object
#[derive(Deserialize, Serialize, Clone, Default, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// The version of the API
    pub api_version: String,

    /// The name of the API
    pub kind: String,
}

impl TypeMeta {
    /// Type information of a generated k8s-openapi resource
    pub fn of<K: k8s_openapi::Resource>() -> Self {
        Self {
            api_version: K::API_VERSION.into(),
            kind: K::KIND.into(),
        }
    }
}

/// A dynamic representation of a kubernetes object, as handed over by a loader.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DynamicObject {
    /// The type fields, not always present
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// All other keys
    #[serde(flatten)]
    pub data: serde_json::Value,
}

impl DynamicObject {
    /// Create a DynamicObject of the given type with a name set
    #[must_use]
    pub fn new(name: &str, types: TypeMeta) -> Self {
        Self {
            types: Some(types),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: serde_json::Value::Object(Default::default()),
        }
    }

    /// Attach dynamic data to a DynamicObject
    #[must_use]
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// The GroupVersionKind of this object, if it carries type information
    pub fn gvk(&self) -> Option<Result<GroupVersionKind, ParseGroupVersionError>> {
        self.types.as_ref().map(GroupVersionKind::try_from)
    }

    /// Attempt to convert this `DynamicObject` into a typed resource
    pub fn try_parse<K: DeserializeOwned>(&self) -> Result<K, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

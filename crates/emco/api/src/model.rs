use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// The `metadata` block shared by every backend resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_data1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_data2: String,

    /// Fields the console does not model, preserved verbatim.
    #[serde(default, flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// A `{ metadata, spec }` envelope.
///
/// The tree keeps resources untyped (`S = Value`): the server is the
/// authority on their shape. Typed specs are used when building payloads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(bound = "S: JsonSchema + Default")]
pub struct Resource<S = Value> {
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: S,

    #[serde(default, flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl<S> Resource<S> {
    pub fn new(metadata: Metadata, spec: S) -> Self {
        Self {
            metadata,
            spec,
            extra: BTreeMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

impl Resource {
    pub fn typed<S>(&self) -> Result<Resource<S>, ::serde_json::Error>
    where
        S: DeserializeOwned,
    {
        Ok(Resource {
            metadata: self.metadata.clone(),
            spec: ::serde_json::from_value(self.spec.clone())?,
            extra: self.extra.clone(),
        })
    }

    /// Looks up a string field of an untyped spec.
    pub fn spec_str(&self, key: &str) -> Option<&str> {
        self.spec.get(key).and_then(Value::as_str)
    }
}

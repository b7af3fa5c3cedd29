use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    deployment::ProviderPlacement,
    model::{Metadata, Resource},
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompositeAppSpec {
    pub version: String,
}

pub type CompositeApp = Resource<CompositeAppSpec>;

impl CompositeApp {
    pub fn create(metadata: Metadata, version: impl Into<String>) -> Self {
        Self::new(
            metadata,
            CompositeAppSpec {
                version: version.into(),
            },
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompositeProfileSpec {}

pub type CompositeProfile = Resource<CompositeProfileSpec>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileSpec {
    #[serde(rename = "app-name")]
    pub app_name: String,
}

/// The JSON half of a bulk "add service" request; package files travel
/// alongside it as `{app}_file` and `{app}_profile` parts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    pub name: String,
    pub description: String,
    pub spec: ServicePayloadSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayloadSpec {
    pub project_name: String,
    pub apps_data: Vec<ServiceApp>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceApp {
    pub metadata: PackageMetadata,
    pub profile_metadata: PackageMetadata,
    #[serde(default)]
    pub clusters: Vec<ProviderPlacement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub filename: String,
}

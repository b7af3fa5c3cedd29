use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Resource;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenericPlacementIntentSpec {
    #[serde(default, rename = "logical-cloud", skip_serializing_if = "String::is_empty")]
    pub logical_cloud: String,
}

pub type GenericPlacementIntent = Resource<GenericPlacementIntentSpec>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppPlacementIntentSpec {
    #[serde(rename = "app-name")]
    pub app_name: String,
    /// `allOf` / `anyOf` placement rules, entered as free-text JSON.
    pub intent: Value,
}

pub type AppPlacementIntent = Resource<AppPlacementIntentSpec>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkControllerIntentSpec {}

pub type NetworkControllerIntent = Resource<NetworkControllerIntentSpec>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkloadIntentSpec {
    #[serde(rename = "application-name")]
    pub application_name: String,
    #[serde(rename = "workload-resource")]
    pub workload_resource: String,
    #[serde(rename = "type")]
    pub type_: String,
}

pub type WorkloadIntent = Resource<WorkloadIntentSpec>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceSpec {
    pub interface: String,
    /// The network the interface attaches to.
    pub name: String,
    #[serde(default = "InterfaceSpec::default_gateway")]
    pub default_gateway: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
}

impl InterfaceSpec {
    fn default_gateway() -> String {
        "false".into()
    }
}

pub type Interface = Resource<InterfaceSpec>;

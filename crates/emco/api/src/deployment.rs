use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Metadata, Resource};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeploymentIntentGroupSpec {
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "override-values")]
    pub override_values: Vec<OverrideValues>,
    #[serde(default, rename = "logical-cloud", skip_serializing_if = "String::is_empty")]
    pub logical_cloud: String,
}

pub type DeploymentIntentGroup = Resource<DeploymentIntentGroupSpec>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverrideValues {
    #[serde(rename = "app-name")]
    pub app_name: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Intent bindings of a deployment intent group, e.g.
/// `{ "genericPlacementIntent": "gpi", "ovnaction": "nci" }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IntentSpec {
    pub intent: BTreeMap<String, String>,
}

pub type Intent = Resource<IntentSpec>;

/// The single request the creation wizard posts to the middleend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentIntentGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub version: String,
    pub composite_profile: String,
    pub spec: DeploymentIntentGroupRequestSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentIntentGroupRequestSpec {
    pub project_name: String,
    pub apps_data: Vec<AppPlacement>,
    #[serde(
        default,
        rename = "override-values",
        skip_serializing_if = "Option::is_none"
    )]
    pub override_values: Option<Vec<Value>>,
}

/// Where one app of the composite app goes, and with which interfaces.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppPlacement {
    pub metadata: Metadata,
    #[serde(default)]
    pub clusters: Vec<ProviderPlacement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPlacement {
    pub provider: String,
    #[serde(default)]
    pub selected_clusters: Vec<SelectedCluster>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCluster {
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceBinding>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceBinding {
    pub network_name: String,
    #[serde(default)]
    pub ip: String,
    pub subnet: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_wire_format() {
        let request = DeploymentIntentGroupRequest {
            name: "dig".into(),
            description: "d".into(),
            composite_app: "ca".into(),
            composite_app_version: "v1".into(),
            version: "v1".into(),
            composite_profile: "cp".into(),
            spec: DeploymentIntentGroupRequestSpec {
                project_name: "p1".into(),
                apps_data: vec![AppPlacement {
                    metadata: Metadata::new("a1", ""),
                    clusters: vec![ProviderPlacement {
                        provider: "prov".into(),
                        selected_clusters: vec![SelectedCluster {
                            name: "c1".into(),
                            interfaces: vec![InterfaceBinding {
                                network_name: "n1".into(),
                                ip: "10.0.0.2".into(),
                                subnet: "10.0.0.0/24".into(),
                            }],
                        }],
                    }],
                }],
                override_values: None,
            },
        };

        assert_eq!(
            ::serde_json::to_value(&request).unwrap(),
            json!({
                "name": "dig",
                "description": "d",
                "compositeApp": "ca",
                "compositeAppVersion": "v1",
                "version": "v1",
                "compositeProfile": "cp",
                "spec": {
                    "projectName": "p1",
                    "appsData": [{
                        "metadata": { "name": "a1", "description": "" },
                        "clusters": [{
                            "provider": "prov",
                            "selectedClusters": [{
                                "name": "c1",
                                "interfaces": [{
                                    "networkName": "n1",
                                    "ip": "10.0.0.2",
                                    "subnet": "10.0.0.0/24",
                                }],
                            }],
                        }],
                    }],
                },
            }),
        );
    }
}

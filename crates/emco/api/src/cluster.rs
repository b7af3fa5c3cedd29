use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Metadata, Resource};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterProviderSpec {}

pub type ClusterProvider = Resource<ClusterProviderSpec>;

impl ClusterProvider {
    pub fn create(metadata: Metadata) -> Self {
        Self::new(metadata, ClusterProviderSpec::default())
    }
}

/// Labels are the one resource without an envelope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterLabel {
    #[serde(rename = "label-name")]
    pub label_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ipv4Subnet {
    pub name: String,
    pub subnet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,
    #[serde(default, rename = "excludeIps", skip_serializing_if = "String::is_empty")]
    pub exclude_ips: String,
}

/// Shared by networks and provider networks; provider networks add
/// `providerNetType` and `vlan`, kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    pub cni_type: String,
    #[serde(default)]
    pub ipv4_subnets: Vec<Ipv4Subnet>,

    #[serde(default, flatten)]
    pub extra: ::std::collections::BTreeMap<String, Value>,
}

pub type Network = Resource<NetworkSpec>;

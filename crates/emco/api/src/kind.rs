use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Every resource type the console can show, create or delete.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    EnumString,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Project,
    CompositeApp,
    App,
    CompositeProfile,
    Profile,
    GenericPlacementIntent,
    AppPlacementIntent,
    NetworkControllerIntent,
    WorkloadIntent,
    Interface,
    DeploymentIntentGroup,
    Intent,
    ClusterProvider,
    Cluster,
    Label,
    ProviderNetwork,
    Network,
    Controller,
}

/// The backend router a resource lives on.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum Service {
    Orchestrator,
    OvnAction,
    Ncm,
}

impl ResourceKind {
    /// The URL segment naming a collection of this kind.
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::CompositeApp => "composite-apps",
            Self::App => "apps",
            Self::CompositeProfile => "composite-profiles",
            Self::Profile => "profiles",
            Self::GenericPlacementIntent => "generic-placement-intents",
            Self::AppPlacementIntent => "app-intents",
            Self::NetworkControllerIntent => "network-controller-intent",
            Self::WorkloadIntent => "workload-intents",
            Self::Interface => "interfaces",
            Self::DeploymentIntentGroup => "deployment-intent-groups",
            Self::Intent => "intents",
            Self::ClusterProvider => "cluster-providers",
            Self::Cluster => "clusters",
            Self::Label => "labels",
            Self::ProviderNetwork => "provider-networks",
            Self::Network => "networks",
            Self::Controller => "controllers",
        }
    }

    pub const fn service(&self) -> Service {
        match self {
            Self::NetworkControllerIntent | Self::WorkloadIntent | Self::Interface => {
                Service::OvnAction
            }
            Self::ProviderNetwork | Self::Network => Service::Ncm,
            _ => Service::Orchestrator,
        }
    }

    /// The kind a resource of this kind must be nested under, if any.
    pub const fn parent(&self) -> Option<Self> {
        match self {
            Self::Project | Self::ClusterProvider | Self::Controller => None,
            Self::CompositeApp => Some(Self::Project),
            Self::App
            | Self::CompositeProfile
            | Self::GenericPlacementIntent
            | Self::NetworkControllerIntent
            | Self::DeploymentIntentGroup => Some(Self::CompositeApp),
            Self::Profile => Some(Self::CompositeProfile),
            Self::AppPlacementIntent => Some(Self::GenericPlacementIntent),
            Self::WorkloadIntent => Some(Self::NetworkControllerIntent),
            Self::Interface => Some(Self::WorkloadIntent),
            Self::Intent => Some(Self::DeploymentIntentGroup),
            Self::Cluster => Some(Self::ClusterProvider),
            Self::Label | Self::ProviderNetwork | Self::Network => Some(Self::Cluster),
        }
    }

    /// Composite apps are addressed by `{name}/{version}`.
    pub const fn is_versioned(&self) -> bool {
        matches!(self, Self::CompositeApp)
    }
}

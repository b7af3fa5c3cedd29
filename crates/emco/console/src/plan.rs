//! Which collections each view loads when one of its nodes is opened.

use emco_api::kind::ResourceKind;

/// Where a collection hangs relative to the node being expanded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FetchScope {
    /// A collection of the node itself.
    Node,
    /// A collection of every child of the given kind; fetched after that
    /// child collection is known.
    EachChild(ResourceKind),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FetchDescriptor {
    pub kind: ResourceKind,
    pub scope: FetchScope,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchPlan {
    descriptors: Vec<FetchDescriptor>,
}

impl FetchPlan {
    pub fn node(mut self, kind: ResourceKind) -> Self {
        self.descriptors.push(FetchDescriptor {
            kind,
            scope: FetchScope::Node,
        });
        self
    }

    pub fn each_child(mut self, of: ResourceKind, kind: ResourceKind) -> Self {
        self.descriptors.push(FetchDescriptor {
            kind,
            scope: FetchScope::EachChild(of),
        });
        self
    }

    pub fn descriptors(&self) -> &[FetchDescriptor] {
        &self.descriptors
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub(crate) fn node_scoped(&self) -> impl '_ + Iterator<Item = &FetchDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.scope == FetchScope::Node)
    }

    pub(crate) fn child_scoped(
        &self,
    ) -> impl '_ + Iterator<Item = (ResourceKind, &FetchDescriptor)> {
        self.descriptors
            .iter()
            .filter_map(|descriptor| match descriptor.scope {
                FetchScope::Node => None,
                FetchScope::EachChild(of) => Some((of, descriptor)),
            })
    }
}

/// The top-level lists: projects, cluster providers and controllers.
pub fn root() -> FetchPlan {
    FetchPlan::default()
        .node(ResourceKind::Project)
        .node(ResourceKind::ClusterProvider)
        .node(ResourceKind::Controller)
}

pub fn project() -> FetchPlan {
    FetchPlan::default().node(ResourceKind::CompositeApp)
}

/// A cluster provider panel lists its clusters with their labels and
/// networks.
pub fn cluster_provider() -> FetchPlan {
    FetchPlan::default()
        .node(ResourceKind::Cluster)
        .each_child(ResourceKind::Cluster, ResourceKind::Label)
        .each_child(ResourceKind::Cluster, ResourceKind::ProviderNetwork)
        .each_child(ResourceKind::Cluster, ResourceKind::Network)
}

pub fn cluster() -> FetchPlan {
    FetchPlan::default()
        .node(ResourceKind::Label)
        .node(ResourceKind::ProviderNetwork)
        .node(ResourceKind::Network)
}

pub fn composite_app() -> FetchPlan {
    FetchPlan::default()
        .node(ResourceKind::App)
        .node(ResourceKind::CompositeProfile)
        .node(ResourceKind::GenericPlacementIntent)
        .node(ResourceKind::NetworkControllerIntent)
        .node(ResourceKind::DeploymentIntentGroup)
}

pub fn composite_profile() -> FetchPlan {
    FetchPlan::default().node(ResourceKind::Profile)
}

pub fn generic_placement_intent() -> FetchPlan {
    FetchPlan::default().node(ResourceKind::AppPlacementIntent)
}

pub fn network_controller_intent() -> FetchPlan {
    FetchPlan::default()
        .node(ResourceKind::WorkloadIntent)
        .each_child(ResourceKind::WorkloadIntent, ResourceKind::Interface)
}

pub fn workload_intent() -> FetchPlan {
    FetchPlan::default().node(ResourceKind::Interface)
}

pub fn deployment_intent_group() -> FetchPlan {
    FetchPlan::default().node(ResourceKind::Intent)
}

/// The plan a view uses when a node of `kind` is opened; `None` is the
/// synthetic root.
pub fn for_kind(kind: Option<ResourceKind>) -> FetchPlan {
    match kind {
        None => root(),
        Some(ResourceKind::Project) => project(),
        Some(ResourceKind::ClusterProvider) => cluster_provider(),
        Some(ResourceKind::Cluster) => cluster(),
        Some(ResourceKind::CompositeApp) => composite_app(),
        Some(ResourceKind::CompositeProfile) => composite_profile(),
        Some(ResourceKind::GenericPlacementIntent) => generic_placement_intent(),
        Some(ResourceKind::NetworkControllerIntent) => network_controller_intent(),
        Some(ResourceKind::WorkloadIntent) => workload_intent(),
        Some(ResourceKind::DeploymentIntentGroup) => deployment_intent_group(),
        Some(_) => FetchPlan::default(),
    }
}

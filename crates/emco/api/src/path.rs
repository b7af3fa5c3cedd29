use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
    kind::{ResourceKind, Service},
    model::Resource,
};

/// The path prefix a request is routed through.
#[derive(
    Copy, Clone, Debug, Default, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ApiRoot {
    /// Direct resource CRUD.
    #[default]
    V2,
    /// Composite operations fanning out on the server side.
    Middleend,
}

impl ApiRoot {
    const fn prefix(&self) -> &'static str {
        match self {
            Self::V2 => "/v2",
            Self::Middleend => "/middleend",
        }
    }
}

/// Lifecycle actions posted to an existing resource.
#[derive(Copy, Clone, Debug, Display, EnumString, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    Approve,
    Instantiate,
    /// Applies the network configuration of a cluster.
    Apply,
}

impl Action {
    const fn target(&self) -> ResourceKind {
        match self {
            Self::Approve | Self::Instantiate => ResourceKind::DeploymentIntentGroup,
            Self::Apply => ResourceKind::Cluster,
        }
    }

    const fn service(&self) -> Service {
        match self {
            Self::Approve | Self::Instantiate => Service::Orchestrator,
            Self::Apply => Service::Ncm,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("{kind} cannot be nested under {}", describe(.parent))]
    InvalidParent {
        kind: ResourceKind,
        parent: Option<ResourceKind>,
    },
    #[error("composite app {0:?} has no version")]
    MissingVersion(String),
    #[error("{0:?} is not a valid name")]
    InvalidSegment(String),
    #[error("cannot {action} {}", describe(.kind))]
    InvalidAction {
        action: Action,
        kind: Option<ResourceKind>,
    },
}

fn describe(kind: &Option<ResourceKind>) -> String {
    match kind {
        Some(kind) => format!("a {kind}"),
        None => "the root".into(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSegment {
    pub kind: ResourceKind,
    pub name: String,
    pub version: Option<String>,
}

/// Identifies one resource by the chain of its ancestors.
///
/// The empty path is the synthetic root holding projects, cluster providers
/// and controllers.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourcePath {
    segments: Vec<PathSegment>,
}

impl ResourcePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn project(name: impl Into<String>) -> Self {
        Self::root().push(ResourceKind::Project, name.into(), None)
    }

    pub fn cluster_provider(name: impl Into<String>) -> Self {
        Self::root().push(ResourceKind::ClusterProvider, name.into(), None)
    }

    pub fn controller(name: impl Into<String>) -> Self {
        Self::root().push(ResourceKind::Controller, name.into(), None)
    }

    /// Appends a non-versioned child.
    pub fn child(&self, kind: ResourceKind, name: impl Into<String>) -> Result<Self, PathError> {
        let name = name.into();
        if kind.is_versioned() {
            return Err(PathError::MissingVersion(name));
        }
        self.check_parent(kind)?;
        Ok(self.clone().push(kind, check_segment(name)?, None))
    }

    pub fn composite_app(
        &self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, PathError> {
        let kind = ResourceKind::CompositeApp;
        self.check_parent(kind)?;
        let name = check_segment(name.into())?;
        let version = check_segment(version.into())?;
        Ok(self.clone().push(kind, name, Some(version)))
    }

    /// Appends a child addressed the way the backend addresses `resource`.
    pub fn child_for(&self, kind: ResourceKind, resource: &Resource) -> Result<Self, PathError> {
        if kind.is_versioned() {
            match resource.spec_str("version") {
                Some(version) => self.composite_app(resource.name(), version),
                None => Err(PathError::MissingVersion(resource.name().into())),
            }
        } else {
            self.child(kind, resource.name())
        }
    }

    pub fn collection(&self, kind: ResourceKind) -> Result<CollectionPath, PathError> {
        self.check_parent(kind)?;
        Ok(CollectionPath {
            root: ApiRoot::V2,
            parent: self.clone(),
            kind,
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn kind(&self) -> Option<ResourceKind> {
        self.last().map(|segment| segment.kind)
    }

    pub fn name(&self) -> Option<&str> {
        self.last().map(|segment| segment.name.as_str())
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, ancestors) = self.segments.split_last()?;
        Some(Self {
            segments: ancestors.to_vec(),
        })
    }

    /// Every prefix of this path, from the root down to itself.
    pub fn lineage(&self) -> impl '_ + Iterator<Item = Self> {
        (0..=self.segments.len()).map(|len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Whether `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// The root a delete of this resource is sent to. The middleend removes
    /// a composite app or a group together with everything below it.
    pub fn delete_root(&self) -> ApiRoot {
        match self.kind() {
            Some(ResourceKind::CompositeApp | ResourceKind::DeploymentIntentGroup) => {
                ApiRoot::Middleend
            }
            _ => ApiRoot::V2,
        }
    }

    pub fn url(&self, root: ApiRoot) -> String {
        let service = self
            .kind()
            .map(|kind| kind.service())
            .unwrap_or(Service::Orchestrator);
        self.render(root, service)
    }

    pub fn action_url(&self, action: Action) -> Result<String, PathError> {
        if self.kind() != Some(action.target()) {
            return Err(PathError::InvalidAction {
                action,
                kind: self.kind(),
            });
        }
        Ok(format!(
            "{}/{action}",
            self.render(ApiRoot::V2, action.service()),
        ))
    }

    fn check_parent(&self, kind: ResourceKind) -> Result<(), PathError> {
        if kind.parent() == self.kind() {
            Ok(())
        } else {
            Err(PathError::InvalidParent {
                kind,
                parent: self.kind(),
            })
        }
    }

    fn push(mut self, kind: ResourceKind, name: String, version: Option<String>) -> Self {
        self.segments.push(PathSegment {
            kind,
            name,
            version,
        });
        self
    }

    fn render(&self, root: ApiRoot, service: Service) -> String {
        let mut url = root.prefix().to_string();
        for PathSegment {
            kind,
            name,
            version,
        } in &self.segments
        {
            url.push('/');
            url.push_str(render_collection(root, service, *kind));
            url.push('/');
            url.push_str(name);
            if let Some(version) = version {
                url.push('/');
                url.push_str(version);
            }
        }
        url
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for PathSegment {
            kind,
            name,
            version,
        } in &self.segments
        {
            write!(f, "/{kind}/{name}")?;
            if let Some(version) = version {
                write!(f, "@{version}")?;
            }
        }
        Ok(())
    }
}

fn check_segment(segment: String) -> Result<String, PathError> {
    if segment.is_empty() || segment.contains('/') {
        Err(PathError::InvalidSegment(segment))
    } else {
        Ok(segment)
    }
}

fn render_collection(root: ApiRoot, service: Service, kind: ResourceKind) -> &'static str {
    match (root, service, kind) {
        (ApiRoot::Middleend, _, ResourceKind::ClusterProvider) => "clusterproviders",
        (ApiRoot::V2, Service::OvnAction, ResourceKind::Project) => "ovnaction",
        (ApiRoot::V2, Service::Ncm, ResourceKind::ClusterProvider) => "ncm",
        (_, _, kind) => kind.collection(),
    }
}

/// Identifies a collection of `kind` children under `parent`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath {
    pub root: ApiRoot,
    pub parent: ResourcePath,
    pub kind: ResourceKind,
}

impl CollectionPath {
    pub fn projects() -> Self {
        Self::top_level(ResourceKind::Project)
    }

    pub fn cluster_providers() -> Self {
        Self::top_level(ResourceKind::ClusterProvider)
    }

    pub fn controllers() -> Self {
        Self::top_level(ResourceKind::Controller)
    }

    /// Every deployment intent group of a project, across its composite apps.
    pub fn deployment_intent_groups_of(project: impl Into<String>) -> Self {
        Self {
            root: ApiRoot::Middleend,
            parent: ResourcePath::project(project),
            kind: ResourceKind::DeploymentIntentGroup,
        }
    }

    /// Where a cluster is registered; the middleend checks its kubeconfig
    /// before storing it.
    pub fn clusters_of(provider: impl Into<String>) -> Self {
        Self {
            root: ApiRoot::Middleend,
            parent: ResourcePath::cluster_provider(provider),
            kind: ResourceKind::Cluster,
        }
    }

    fn top_level(kind: ResourceKind) -> Self {
        Self {
            root: ApiRoot::V2,
            parent: ResourcePath::root(),
            kind,
        }
    }

    /// Routes this collection through the middleend.
    pub fn via(mut self, root: ApiRoot) -> Self {
        self.root = root;
        self
    }

    pub fn url(&self) -> String {
        let service = self.kind.service();
        format!(
            "{}/{}",
            self.parent.render(self.root, service),
            render_collection(self.root, service, self.kind),
        )
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { root, parent, kind } = self;
        write!(f, "{root}:{parent}[{kind}]")
    }
}

use std::collections::{BTreeMap, BTreeSet};

use emco_api::{
    kind::ResourceKind,
    model::Resource,
    path::{PathSegment, ResourcePath},
};
use tracing::debug;

/// One resource and whichever child collections have been fetched so far.
///
/// A missing key in `children` means the collection was never fetched; an
/// empty vector means it was fetched and is empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceNode {
    pub resource: Resource,
    children: BTreeMap<ResourceKind, Vec<ResourceNode>>,
}

impl ResourceNode {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            children: BTreeMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn children(&self, kind: ResourceKind) -> Option<&[ResourceNode]> {
        self.children.get(&kind).map(Vec::as_slice)
    }

    pub fn is_fetched(&self, kind: ResourceKind) -> bool {
        self.children.contains_key(&kind)
    }

    pub fn has_children_of(&self, kind: ResourceKind) -> bool {
        self.children(kind)
            .map(|children| !children.is_empty())
            .unwrap_or_default()
    }

    /// Kinds of every fetched collection.
    pub fn fetched_kinds(&self) -> impl '_ + Iterator<Item = ResourceKind> {
        self.children.keys().copied()
    }

    pub fn child(&self, segment: &PathSegment) -> Option<&ResourceNode> {
        self.children
            .get(&segment.kind)?
            .iter()
            .find(|node| node.matches(segment))
    }

    fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut ResourceNode> {
        self.children
            .get_mut(&segment.kind)?
            .iter_mut()
            .find(|node| node.matches(segment))
    }

    fn matches(&self, segment: &PathSegment) -> bool {
        self.name() == segment.name
            && segment
                .version
                .as_deref()
                .map(|version| self.resource.spec_str("version") == Some(version))
                .unwrap_or(true)
    }
}

/// The state of one node as a view renders it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeState {
    Collapsed { cached: bool },
    Fetching,
    Expanded,
}

/// Owns every fetched resource, keyed by its path from the synthetic root.
#[derive(Debug, Default)]
pub struct TreeStore {
    root: ResourceNode,
    /// At most one expanded child per collection.
    expanded: BTreeMap<(ResourcePath, ResourceKind), ResourcePath>,
    fetching: BTreeSet<ResourcePath>,
}

impl TreeStore {
    pub fn get(&self, path: &ResourcePath) -> Option<&ResourceNode> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    pub fn get_mut(&mut self, path: &ResourcePath) -> Option<&mut ResourceNode> {
        path.segments()
            .iter()
            .try_fold(&mut self.root, |node, segment| node.child_mut(segment))
    }

    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.get(path).is_some()
    }

    /// Replaces the resource of an existing node, keeping its children.
    pub fn set(&mut self, path: &ResourcePath, resource: Resource) -> bool {
        match self.get_mut(path) {
            Some(node) => {
                node.resource = resource;
                true
            }
            None => {
                debug!("skipping update of a vanished node: {path}");
                false
            }
        }
    }

    /// Stores a freshly fetched collection, replacing the previous one.
    pub fn set_children(
        &mut self,
        parent: &ResourcePath,
        kind: ResourceKind,
        resources: Vec<Resource>,
    ) -> bool {
        match self.get_mut(parent) {
            Some(node) => {
                let children = resources.into_iter().map(ResourceNode::new).collect();
                node.children.insert(kind, children);
                true
            }
            None => {
                debug!("skipping {kind} of a vanished node: {parent}");
                false
            }
        }
    }

    /// Appends a created resource to a fetched collection.
    ///
    /// An unfetched collection stays unfetched so that the next expansion
    /// loads it completely.
    pub fn append_child(
        &mut self,
        parent: &ResourcePath,
        kind: ResourceKind,
        resource: Resource,
    ) -> bool {
        match self
            .get_mut(parent)
            .and_then(|node| node.children.get_mut(&kind))
        {
            Some(children) => {
                children.push(ResourceNode::new(resource));
                true
            }
            None => false,
        }
    }

    /// Removes the node `path` points at, wherever it currently sits.
    pub fn remove(&mut self, path: &ResourcePath) -> Option<ResourceNode> {
        let segment = path.last()?.clone();
        let parent = path.parent()?;
        let siblings = self.get_mut(&parent)?.children.get_mut(&segment.kind)?;
        let index = siblings.iter().position(|node| node.matches(&segment))?;
        let removed = siblings.remove(index);

        self.expanded
            .retain(|(owner, _), expanded| !owner.starts_with(path) && !expanded.starts_with(path));
        self.fetching.retain(|fetching| !fetching.starts_with(path));
        Some(removed)
    }

    /// Forgets every fetched collection of a node so the next expansion
    /// reloads them.
    pub fn invalidate(&mut self, path: &ResourcePath) -> bool {
        match self.get_mut(path) {
            Some(node) => {
                node.children.clear();
                true
            }
            None => false,
        }
    }

    pub fn state(&self, path: &ResourcePath) -> NodeState {
        if self.fetching.contains(path) {
            NodeState::Fetching
        } else if self.is_expanded(path) {
            NodeState::Expanded
        } else {
            NodeState::Collapsed {
                cached: self
                    .get(path)
                    .map(|node| !node.children.is_empty())
                    .unwrap_or_default(),
            }
        }
    }

    pub fn is_expanded(&self, path: &ResourcePath) -> bool {
        match accordion_key(path) {
            Some(key) => self.expanded.get(&key) == Some(path),
            None => true,
        }
    }

    /// Expands a node, collapsing its expanded sibling if any.
    pub fn set_expanded(&mut self, path: &ResourcePath) {
        if let Some(key) = accordion_key(path) {
            self.expanded.insert(key, path.clone());
        }
    }

    pub fn collapse(&mut self, path: &ResourcePath) {
        if let Some(key) = accordion_key(path) {
            if self.expanded.get(&key) == Some(path) {
                self.expanded.remove(&key);
            }
        }
    }

    /// Marks a node as fetching; returns `false` if it already was.
    pub fn begin_fetch(&mut self, path: &ResourcePath) -> bool {
        self.fetching.insert(path.clone())
    }

    pub fn end_fetch(&mut self, path: &ResourcePath) {
        self.fetching.remove(path);
    }
}

fn accordion_key(path: &ResourcePath) -> Option<(ResourcePath, ResourceKind)> {
    Some((path.parent()?, path.kind()?))
}

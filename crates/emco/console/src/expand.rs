use std::sync::Arc;

use emco_api::{
    model::Resource,
    path::{CollectionPath, PathError, ResourcePath},
};
use emco_client::ResourceApi;
use emco_core::signal::ViewSignal;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn, Level};

use crate::{
    error::{ConsoleError, Result},
    plan::{FetchDescriptor, FetchPlan},
    tree::{NodeState, ResourceNode},
    SharedTree,
};

/// What one expansion did on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandReport {
    pub requests: usize,
    pub failures: Vec<CollectionPath>,
}

struct Fetched {
    collection: CollectionPath,
    resources: Vec<Resource>,
}

/// Opens nodes of a resource tree, loading whatever their view shows and
/// nothing already loaded.
#[derive(Clone)]
pub struct ExpansionController {
    api: Arc<dyn ResourceApi>,
    store: SharedTree,
    signal: ViewSignal,
}

impl ExpansionController {
    pub fn new(api: Arc<dyn ResourceApi>, store: SharedTree, signal: ViewSignal) -> Self {
        Self { api, store, signal }
    }

    #[instrument(level = Level::INFO, skip(self, plan))]
    pub async fn expand(&self, path: &ResourcePath, plan: &FetchPlan) -> Result<ExpandReport> {
        let missing = {
            let mut store = self.store.write().await;
            let node = store
                .get(path)
                .ok_or_else(|| ConsoleError::NotFound(path.to_string()))?;

            let missing = plan
                .node_scoped()
                .filter(|descriptor| !node.is_fetched(descriptor.kind))
                .map(|descriptor| collection_of(path, descriptor))
                .collect::<::std::result::Result<Vec<_>, _>>()?;
            if missing.is_empty() && !has_missing_grandchildren(node, plan) {
                debug!("everything is cached");
                store.set_expanded(path);
                return Ok(ExpandReport::default());
            }
            if !store.begin_fetch(path) {
                debug!("already fetching");
                return Ok(ExpandReport::default());
            }
            missing
        };

        let (fetched, report) = self.fetch(path, plan, missing).await;

        let mut store = self.store.write().await;
        store.end_fetch(path);
        if self.signal.keep(()).is_none() {
            return Ok(report);
        }
        for Fetched {
            collection,
            resources,
        } in fetched
        {
            store.set_children(&collection.parent, collection.kind, resources);
        }
        store.set_expanded(path);

        info!(
            "expanded with {} request(s), {} failed",
            report.requests,
            report.failures.len(),
        );
        Ok(report)
    }

    pub async fn collapse(&self, path: &ResourcePath) {
        self.store.write().await.collapse(path)
    }

    pub async fn toggle(&self, path: &ResourcePath, plan: &FetchPlan) -> Result<NodeState> {
        let state = self.store.read().await.state(path);
        match state {
            NodeState::Expanded => self.collapse(path).await,
            NodeState::Fetching => (),
            NodeState::Collapsed { .. } => {
                self.expand(path, plan).await?;
            }
        }
        Ok(self.store.read().await.state(path))
    }

    /// Drops every cached collection of a node and loads them again.
    pub async fn refresh(&self, path: &ResourcePath, plan: &FetchPlan) -> Result<ExpandReport> {
        self.store.write().await.invalidate(path);
        self.expand(path, plan).await
    }

    async fn fetch(
        &self,
        path: &ResourcePath,
        plan: &FetchPlan,
        missing: Vec<CollectionPath>,
    ) -> (Vec<Fetched>, ExpandReport) {
        let mut report = ExpandReport::default();

        let mut fetched = self.fetch_all(missing, &mut report).await;
        if self.signal.is_cancelled() {
            return (fetched, report);
        }

        let dependents = self.dependents_of(path, plan, &fetched).await;
        let mut dependents = self.fetch_all(dependents, &mut report).await;
        fetched.append(&mut dependents);
        (fetched, report)
    }

    /// Requests every collection at once; a failure leaves only its own
    /// collection unset.
    async fn fetch_all(
        &self,
        collections: Vec<CollectionPath>,
        report: &mut ExpandReport,
    ) -> Vec<Fetched> {
        let results = join_all(
            collections
                .iter()
                .map(|collection| self.api.list(collection)),
        )
        .await;
        report.requests += collections.len();

        collections
            .into_iter()
            .zip(results)
            .filter_map(|(collection, result)| match result {
                Ok(resources) => Some(Fetched {
                    collection,
                    resources,
                }),
                Err(error) => {
                    warn!("failed to fetch {collection}: {error}");
                    report.failures.push(collection);
                    None
                }
            })
            .collect()
    }

    /// Collections hanging off the children of `path`, as known after the
    /// first stage.
    async fn dependents_of(
        &self,
        path: &ResourcePath,
        plan: &FetchPlan,
        fetched: &[Fetched],
    ) -> Vec<CollectionPath> {
        let store = self.store.read().await;
        let node = store.get(path);

        let mut dependents = Vec::default();
        for (of, descriptor) in plan.child_scoped() {
            let fresh = fetched
                .iter()
                .find(|fetched| fetched.collection.kind == of);
            let children: Vec<(&Resource, bool)> = match fresh {
                Some(fresh) => fresh
                    .resources
                    .iter()
                    .map(|resource| (resource, false))
                    .collect(),
                None => node
                    .and_then(|node| node.children(of))
                    .unwrap_or_default()
                    .iter()
                    .map(|child| (&child.resource, child.is_fetched(descriptor.kind)))
                    .collect(),
            };

            for (child, cached) in children {
                if cached {
                    continue;
                }
                match path
                    .child_for(of, child)
                    .and_then(|child| collection_of(&child, descriptor))
                {
                    Ok(collection) => dependents.push(collection),
                    Err(error) => warn!("skipping {} of {}: {error}", descriptor.kind, child.name()),
                }
            }
        }
        dependents
    }
}

fn collection_of(
    parent: &ResourcePath,
    descriptor: &FetchDescriptor,
) -> ::std::result::Result<CollectionPath, PathError> {
    parent.collection(descriptor.kind)
}

fn has_missing_grandchildren(node: &ResourceNode, plan: &FetchPlan) -> bool {
    plan.child_scoped().any(|(of, descriptor)| {
        node.children(of)
            .unwrap_or_default()
            .iter()
            .any(|child| !child.is_fetched(descriptor.kind))
    })
}

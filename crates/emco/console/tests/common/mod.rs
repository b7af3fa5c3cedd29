#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use emco_api::{
    kind::ResourceKind,
    model::{Metadata, Resource},
    path::{Action, ApiRoot, CollectionPath, ResourcePath},
};
use emco_client::{ApiError, Payload, ResourceApi};
use emco_console::{notify::Notifications, Console};
use emco_core::signal::ViewSignal;
use serde_json::{json, Value};

/// An in-memory backend keyed by collection URL. Only the routes the
/// middleend registers are answered under `/middleend`.
#[derive(Default)]
pub struct FakeBackend {
    collections: Mutex<BTreeMap<String, Vec<Resource>>>,
    failures: Mutex<BTreeMap<(String, String), (u16, String)>>,
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<(String, Payload)>>,
    cancel_on_list: Mutex<Option<ViewSignal>>,
}

pub fn resource(name: &str) -> Resource {
    Resource::new(Metadata::new(name, ""), json!({}))
}

pub fn composite_app(name: &str, version: &str) -> Resource {
    Resource::new(Metadata::new(name, ""), json!({ "version": version }))
}

pub fn network(name: &str, subnet: &str) -> Resource {
    Resource::new(
        Metadata::new(name, ""),
        json!({
            "cniType": "ovn4nfv",
            "ipv4Subnets": [{ "name": "subnet1", "subnet": subnet }],
        }),
    )
}

pub fn cluster(provider: &str, name: &str) -> ResourcePath {
    ResourcePath::cluster_provider(provider)
        .child(ResourceKind::Cluster, name)
        .unwrap()
}

/// Collections are shared between the `/v2` and `/middleend` routes.
fn key(collection: &CollectionPath) -> String {
    collection.clone().via(ApiRoot::V2).url()
}

fn key_of(path: &ResourcePath) -> String {
    let parent = path.parent().unwrap();
    key(&parent.collection(path.kind().unwrap()).unwrap())
}

/// The handful of routes the middleend serves; everything else there is a 404.
fn middleend_serves(method: &str, kind: ResourceKind, item: bool) -> bool {
    use ResourceKind::{Cluster, CompositeApp, DeploymentIntentGroup};

    matches!(
        (method, kind, item),
        ("POST", CompositeApp | DeploymentIntentGroup | Cluster, false)
            | ("GET", DeploymentIntentGroup, false)
            | ("GET" | "DELETE", CompositeApp, true)
            | ("DELETE", DeploymentIntentGroup, true)
    )
}

fn route(
    root: ApiRoot,
    method: &str,
    kind: ResourceKind,
    item: bool,
    url: &str,
) -> Result<(), ApiError> {
    if root == ApiRoot::Middleend && !middleend_serves(method, kind, item) {
        return Err(ApiError::Status {
            status: 404,
            body: format!("404 page not found: {method} {url}"),
        });
    }
    Ok(())
}

fn route_collection(method: &str, collection: &CollectionPath) -> Result<(), ApiError> {
    route(collection.root, method, collection.kind, false, &collection.url())
}

fn route_item(method: &str, root: ApiRoot, path: &ResourcePath) -> Result<(), ApiError> {
    route(root, method, path.kind().unwrap(), true, &path.url(root))
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    pub fn seed(&self, collection: CollectionPath, resources: Vec<Resource>) {
        self.collections
            .lock()
            .unwrap()
            .insert(key(&collection), resources);
    }

    pub fn seed_names(&self, collection: CollectionPath, names: &[&str]) {
        self.seed(collection, names.iter().map(|name| resource(name)).collect())
    }

    pub fn fail(&self, method: &str, url: impl Into<String>, status: u16, body: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((method.into(), url.into()), (status, body.into()));
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn cancel_on_list(&self, signal: ViewSignal) {
        *self.cancel_on_list.lock().unwrap() = Some(signal);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn payloads(&self) -> Vec<(String, Payload)> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn stored(&self, collection: &CollectionPath) -> Vec<String> {
        self.collections
            .lock()
            .unwrap()
            .get(&key(collection))
            .map(|items| items.iter().map(|item| item.name().to_string()).collect())
            .unwrap_or_default()
    }

    fn record(&self, method: &str, url: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(format!("{method} {url}"));
        match self.failures.lock().unwrap().get(&(method.to_string(), url)) {
            Some((status, body)) => Err(ApiError::Status {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }

    fn not_found(path: &ResourcePath) -> ApiError {
        ApiError::Status {
            status: 404,
            body: format!("{path} not found"),
        }
    }
}

/// What the fake stores: the submitted resource plus server-side fields.
fn canonical(payload: &Payload) -> Resource {
    let value = match payload {
        Payload::Json(value) => value.clone(),
        Payload::Multipart(form) => form
            .field("metadata")
            .and_then(|metadata| ::serde_json::from_str(metadata).ok())
            .unwrap_or(Value::Null),
    };
    let mut resource = match ::serde_json::from_value::<Resource>(value.clone()) {
        Ok(resource) => resource,
        Err(_) => {
            let name = value["name"].as_str().unwrap_or_default();
            Resource::new(Metadata::new(name, ""), value.clone())
        }
    };
    resource.extra.insert("status".into(), json!("created"));
    resource
}

#[async_trait]
impl ResourceApi for FakeBackend {
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Resource>, ApiError> {
        self.record("GET", collection.url())?;
        route_collection("GET", collection)?;
        if let Some(signal) = self.cancel_on_list.lock().unwrap().as_ref() {
            signal.cancel();
        }
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(&key(collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, root: ApiRoot, path: &ResourcePath) -> Result<Resource, ApiError> {
        self.record("GET", path.url(root))?;
        route_item("GET", root, path)?;
        self.collections
            .lock()
            .unwrap()
            .get(&key_of(path))
            .and_then(|items| items.iter().find(|item| Some(item.name()) == path.name()))
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        payload: Payload,
    ) -> Result<Resource, ApiError> {
        self.record("POST", collection.url())?;
        route_collection("POST", collection)?;
        // let concurrent submissions interleave
        ::tokio::task::yield_now().await;

        let created = canonical(&payload);
        self.payloads
            .lock()
            .unwrap()
            .push((collection.url(), payload));
        self.collections
            .lock()
            .unwrap()
            .entry(key(collection))
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        root: ApiRoot,
        path: &ResourcePath,
        payload: Payload,
    ) -> Result<Resource, ApiError> {
        self.record("PUT", path.url(root))?;
        route_item("PUT", root, path)?;
        let updated = canonical(&payload);
        let mut collections = self.collections.lock().unwrap();
        let item = collections
            .get_mut(&key_of(path))
            .and_then(|items| items.iter_mut().find(|item| Some(item.name()) == path.name()))
            .ok_or_else(|| Self::not_found(path))?;
        *item = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, root: ApiRoot, path: &ResourcePath) -> Result<(), ApiError> {
        self.record("DELETE", path.url(root))?;
        route_item("DELETE", root, path)?;
        let mut collections = self.collections.lock().unwrap();
        let items = collections
            .get_mut(&key_of(path))
            .ok_or_else(|| Self::not_found(path))?;
        let before = items.len();
        items.retain(|item| Some(item.name()) != path.name());
        if items.len() == before {
            Err(Self::not_found(path))
        } else {
            Ok(())
        }
    }

    async fn action(&self, path: &ResourcePath, action: Action) -> Result<(), ApiError> {
        self.record("POST", path.action_url(action)?)
    }
}

pub fn console(backend: &Arc<FakeBackend>) -> (Console, Notifications) {
    Console::new(backend.clone())
}

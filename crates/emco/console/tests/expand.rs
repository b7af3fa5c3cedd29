mod common;

use emco_api::{
    kind::ResourceKind,
    path::{CollectionPath, ResourcePath},
};
use emco_console::{plan, tree::NodeState};

use self::common::{cluster, composite_app, console, FakeBackend};

fn seed_provider(backend: &FakeBackend, provider: &str, clusters: &[&str]) {
    let path = ResourcePath::cluster_provider(provider);
    backend.seed_names(
        path.collection(ResourceKind::Cluster).unwrap(),
        clusters,
    );
    for name in clusters {
        let cluster = cluster(provider, name);
        backend.seed_names(
            cluster.collection(ResourceKind::Label).unwrap(),
            &["edge"],
        );
        backend.seed_names(
            cluster.collection(ResourceKind::ProviderNetwork).unwrap(),
            &["pnet"],
        );
        backend.seed_names(cluster.collection(ResourceKind::Network).unwrap(), &[]);
    }
}

#[tokio::test]
async fn expanding_twice_is_free() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["prov"]);
    seed_provider(&backend, "prov", &["c1", "c2"]);

    let (console, _notifications) = console(&backend);
    let expansion = console.expansion();
    let root = ResourcePath::root();
    let provider = ResourcePath::cluster_provider("prov");

    let report = expansion.expand(&root, &plan::root()).await.unwrap();
    assert_eq!(report.requests, 3);

    let report = expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();
    assert_eq!(report.requests, 1 + 2 * 3);
    assert!(report.failures.is_empty());
    assert_eq!(backend.call_count(), 3 + 7);

    expansion.collapse(&provider).await;
    assert_eq!(
        console.store().read().await.state(&provider),
        NodeState::Collapsed { cached: true },
    );

    let report = expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();
    assert_eq!(report.requests, 0);
    assert_eq!(backend.call_count(), 10);
    assert_eq!(
        console.store().read().await.state(&provider),
        NodeState::Expanded,
    );
}

#[tokio::test]
async fn one_failed_cluster_does_not_hide_the_others() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["prov"]);
    seed_provider(&backend, "prov", &["c1", "c2", "c3", "c4", "c5"]);
    let failing = cluster("prov", "c3")
        .collection(ResourceKind::Label)
        .unwrap();
    backend.fail("GET", failing.url(), 500, "boom");

    let (console, _notifications) = console(&backend);
    let expansion = console.expansion();
    let provider = ResourcePath::cluster_provider("prov");
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let report = expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();
    assert_eq!(report.failures, [failing.clone()]);

    {
        let store = console.store().read().await;
        assert!(store.is_expanded(&provider));
        for name in ["c1", "c2", "c4", "c5"] {
            let node = store.get(&cluster("prov", name)).unwrap();
            assert_eq!(node.children(ResourceKind::Label).unwrap().len(), 1);
        }
        let c3 = store.get(&cluster("prov", "c3")).unwrap();
        assert!(!c3.is_fetched(ResourceKind::Label));
        assert!(c3.is_fetched(ResourceKind::ProviderNetwork));
        assert!(c3.is_fetched(ResourceKind::Network));
    }

    // the unset collection is retried on the next expansion, and only it
    backend.heal();
    expansion.collapse(&provider).await;
    let before = backend.call_count();
    let report = expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();
    assert_eq!(report.requests, 1);
    assert_eq!(backend.calls()[before], format!("GET {}", failing.url()));
    assert!(console
        .store()
        .read()
        .await
        .get(&cluster("prov", "c3"))
        .unwrap()
        .is_fetched(ResourceKind::Label));
}

#[tokio::test]
async fn opening_a_provider_closes_its_sibling() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["a", "b"]);
    seed_provider(&backend, "a", &["c1"]);
    seed_provider(&backend, "b", &["c2"]);

    let (console, _notifications) = console(&backend);
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let a = ResourcePath::cluster_provider("a");
    let b = ResourcePath::cluster_provider("b");
    expansion.expand(&a, &plan::cluster_provider()).await.unwrap();
    expansion.expand(&b, &plan::cluster_provider()).await.unwrap();

    let store = console.store().read().await;
    assert!(!store.is_expanded(&a));
    assert!(store.is_expanded(&b));
    assert_eq!(store.state(&a), NodeState::Collapsed { cached: true });
}

#[tokio::test]
async fn toggle_flips_between_states() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    backend.seed_names(
        ResourcePath::project("p1")
            .collection(ResourceKind::CompositeApp)
            .unwrap(),
        &[],
    );

    let (console, _notifications) = console(&backend);
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let project = ResourcePath::project("p1");
    let state = expansion.toggle(&project, &plan::project()).await.unwrap();
    assert_eq!(state, NodeState::Expanded);
    assert_eq!(
        backend.calls().last().unwrap(),
        "GET /v2/projects/p1/composite-apps",
    );

    let state = expansion.toggle(&project, &plan::project()).await.unwrap();
    assert_eq!(state, NodeState::Collapsed { cached: true });
}

#[tokio::test]
async fn composite_apps_open_under_their_project() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let project = ResourcePath::project("p1");
    backend.seed(
        project.collection(ResourceKind::CompositeApp).unwrap(),
        vec![composite_app("ca", "v1")],
    );
    let ca = project.composite_app("ca", "v1").unwrap();
    backend.seed_names(ca.collection(ResourceKind::App).unwrap(), &["a1", "a2"]);

    let (console, mut notifications) = console(&backend);
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let report = expansion.expand(&project, &plan::project()).await.unwrap();
    assert!(report.failures.is_empty());
    let report = expansion.expand(&ca, &plan::composite_app()).await.unwrap();
    assert!(report.failures.is_empty());
    assert!(notifications.drain().is_empty());

    let store = console.store().read().await;
    let apps = store.get(&ca).unwrap().children(ResourceKind::App).unwrap();
    assert_eq!(apps.len(), 2);
    assert!(backend
        .calls()
        .iter()
        .all(|call| call.starts_with("GET /v2/")));
}

#[tokio::test]
async fn closed_view_drops_results() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["prov"]);
    seed_provider(&backend, "prov", &["c1", "c2"]);

    let (console, _notifications) = console(&backend);
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    backend.cancel_on_list(console.signal().clone());
    let provider = ResourcePath::cluster_provider("prov");
    expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();

    let store = console.store().read().await;
    assert!(!store.get(&provider).unwrap().is_fetched(ResourceKind::Cluster));
    assert_eq!(store.state(&provider), NodeState::Collapsed { cached: false });
}

#[tokio::test]
async fn unknown_node_is_an_error() {
    let backend = FakeBackend::new();
    let (console, _notifications) = console(&backend);

    let missing = ResourcePath::project("nope");
    assert!(console
        .expansion()
        .expand(&missing, &plan::project())
        .await
        .is_err());
    assert_eq!(backend.call_count(), 0);
}

mod common;

use emco_api::{
    form::{app_form, cluster_form, CompositeAppRef, Upload},
    kind::ResourceKind,
    model::Metadata,
    path::{Action, CollectionPath, ResourcePath},
    project::Project,
};
use emco_client::Payload;
use emco_console::{
    dialog::{Confirmation, FormDialog},
    error::ConsoleError,
    mutation::{OperationKind, Outcome, PendingOperation},
    notify::Severity,
    plan,
};
use serde_json::json;

use self::common::{cluster, composite_app, console, FakeBackend};

async fn loaded_projects(backend: &std::sync::Arc<FakeBackend>) -> emco_console::Console {
    let (console, _) = console(backend);
    console
        .expansion()
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();
    console
}

fn project_names(store: &emco_console::tree::TreeStore) -> Vec<String> {
    store
        .get(&ResourcePath::root())
        .unwrap()
        .children(ResourceKind::Project)
        .unwrap()
        .iter()
        .map(|node| node.name().to_string())
        .collect()
}

#[tokio::test]
async fn create_appends_the_server_copy() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let (console, mut notifications) = console(&backend);
    console
        .expansion()
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let mut dialog = FormDialog::opened();
    let payload = Payload::json(&Project::create(Metadata::new("p2", "second"))).unwrap();
    let created = console
        .mutation()
        .create(CollectionPath::projects(), payload, &mut dialog)
        .await
        .unwrap()
        .applied()
        .unwrap();
    assert_eq!(created.extra["status"], json!("created"));
    assert!(!dialog.is_open());

    let store = console.store().read().await;
    assert_eq!(project_names(&store), ["p1", "p2"]);
    let node = store.get(&ResourcePath::project("p2")).unwrap();
    assert_eq!(node.resource, created);

    let notification = notifications.drain().pop().unwrap();
    assert_eq!(notification.severity, Severity::Success);
    assert_eq!(notification.message, r#"project "p2" created"#);
}

#[tokio::test]
async fn rejected_create_keeps_the_form_open() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    backend.fail(
        "POST",
        CollectionPath::projects().url(),
        403,
        "project quota exceeded",
    );
    let (console, mut notifications) = console(&backend);
    console
        .expansion()
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let mut dialog = FormDialog::opened();
    let payload = Payload::json(&Project::create(Metadata::new("p2", ""))).unwrap();
    let result = console
        .mutation()
        .create(CollectionPath::projects(), payload, &mut dialog)
        .await;
    assert!(matches!(result, Err(ConsoleError::Api(error)) if error.is_forbidden()));
    assert!(dialog.is_open());
    assert!(!dialog.is_submitting());
    assert_eq!(project_names(&*console.store().read().await), ["p1"]);

    let notification = notifications.drain().pop().unwrap();
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(notification.message, "project quota exceeded");
}

#[tokio::test]
async fn duplicate_submission_is_rejected() {
    let backend = FakeBackend::new();
    let console = loaded_projects(&backend).await;
    let mutation = console.mutation();

    let mut first = FormDialog::opened();
    let mut second = FormDialog::opened();
    let payload = || Payload::json(&Project::create(Metadata::new("p", ""))).unwrap();
    let (a, b) = ::tokio::join!(
        mutation.create(CollectionPath::projects(), payload(), &mut first),
        mutation.create(CollectionPath::projects(), payload(), &mut second),
    );

    assert!(matches!(a, Ok(Outcome::Applied(_))));
    match b {
        Err(ConsoleError::Busy(key)) => assert_eq!(
            key,
            PendingOperation {
                parent: ResourcePath::root(),
                kind: ResourceKind::Project,
                op: OperationKind::Create,
            },
        ),
        other => panic!("expected a busy error, got {other:?}"),
    }
    assert!(second.is_open());
    assert_eq!(backend.stored(&CollectionPath::projects()), ["p"]);

    // the pending entry is released once settled
    let mut third = FormDialog::opened();
    assert!(mutation
        .create(CollectionPath::projects(), payload(), &mut third)
        .await
        .is_ok());
}

#[tokio::test]
async fn multipart_create_posts_every_part() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let ca = ResourcePath::project("p1").composite_app("ca1", "v1").unwrap();
    backend.seed(
        ResourcePath::project("p1")
            .collection(ResourceKind::CompositeApp)
            .unwrap(),
        vec![composite_app("ca1", "v1")],
    );
    backend.seed_names(ca.collection(ResourceKind::App).unwrap(), &[]);

    let console = loaded_projects(&backend).await;
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::project("p1"), &plan::project())
        .await
        .unwrap();
    expansion.expand(&ca, &plan::composite_app()).await.unwrap();

    let form = app_form(
        &CompositeAppRef {
            project: "p1",
            name: "ca1",
            version: "v1",
        },
        &Metadata::new("svc1", "d"),
        Some(Upload::new("svc1.tgz", vec![1; 1024])),
    )
    .unwrap();
    let mut dialog = FormDialog::opened();
    console
        .mutation()
        .create(
            ca.collection(ResourceKind::App).unwrap(),
            form.into(),
            &mut dialog,
        )
        .await
        .unwrap();

    let (url, payload) = backend.payloads().pop().unwrap();
    assert_eq!(url, "/v2/projects/p1/composite-apps/ca1/v1/apps");
    let Payload::Multipart(form) = payload else {
        panic!("expected a multipart payload");
    };
    assert_eq!(form.file_part("file").unwrap().content.len(), 1024);
    assert!(console
        .store()
        .read()
        .await
        .get(&ca.child(ResourceKind::App, "svc1").unwrap())
        .is_some());
}

#[tokio::test]
async fn delete_targets_the_captured_identity() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["prov"]);
    let provider = ResourcePath::cluster_provider("prov");
    let clusters = provider.collection(ResourceKind::Cluster).unwrap();
    backend.seed_names(clusters.clone(), &["c1", "c2", "c3", "c4"]);

    let console = loaded_projects(&backend).await;
    let expansion = console.expansion();
    let plan = plan::cluster_provider();
    expansion.expand(&provider, &plan).await.unwrap();

    let mutation = console.mutation();
    let dialog = mutation.request_delete(cluster("prov", "c3"));

    // a rename lands at the captured index before the user confirms
    backend.seed_names(clusters.clone(), &["c1", "c2", "c9", "c3"]);
    expansion.refresh(&provider, &plan).await.unwrap();

    let deleted = mutation
        .delete(dialog, Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(deleted, Outcome::Applied(cluster("prov", "c3")));
    assert_eq!(backend.stored(&clusters), ["c1", "c2", "c9"]);

    let store = console.store().read().await;
    let names: Vec<_> = store
        .get(&provider)
        .unwrap()
        .children(ResourceKind::Cluster)
        .unwrap()
        .iter()
        .map(|node| node.name().to_string())
        .collect();
    assert_eq!(names, ["c1", "c2", "c9"]);
}

#[tokio::test]
async fn cancelled_delete_sends_nothing() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let console = loaded_projects(&backend).await;
    let before = backend.call_count();

    let mutation = console.mutation();
    let dialog = mutation.request_delete(ResourcePath::project("p1"));
    assert_eq!(dialog.message(), r#"Are you sure you want to delete project "p1"?"#);
    let outcome = mutation
        .delete(dialog, Confirmation::Cancelled)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(backend.call_count(), before);
}

#[tokio::test]
async fn cluster_with_dependents_cannot_be_deleted() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["prov"]);
    let provider = ResourcePath::cluster_provider("prov");
    backend.seed_names(provider.collection(ResourceKind::Cluster).unwrap(), &["c1"]);
    backend.seed_names(
        cluster("prov", "c1").collection(ResourceKind::Label).unwrap(),
        &["edge"],
    );

    let (console, mut notifications) = console(&backend);
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();
    expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();
    let before = backend.call_count();

    let mutation = console.mutation();
    let dialog = mutation.request_delete(cluster("prov", "c1"));
    let result = mutation.delete(dialog, Confirmation::Confirmed).await;
    assert!(matches!(result, Err(ConsoleError::Blocked(_))));
    assert_eq!(backend.call_count(), before);

    let notification = notifications.drain().pop().unwrap();
    assert_eq!(notification.severity, Severity::Warning);
    assert!(notification.message.contains("label"));
}

#[tokio::test]
async fn actions_only_notify() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let (console, mut notifications) = console(&backend);
    console
        .expansion()
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();

    let dig = ResourcePath::project("p1")
        .composite_app("ca1", "v1")
        .unwrap()
        .child(ResourceKind::DeploymentIntentGroup, "dig")
        .unwrap();
    let outcome = console
        .mutation()
        .action(&dig, Action::Approve)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Applied(()));
    assert_eq!(
        backend.calls().last().unwrap(),
        "POST /v2/projects/p1/composite-apps/ca1/v1/deployment-intent-groups/dig/approve",
    );
    assert_eq!(notifications.drain().pop().unwrap().message, r#""dig" approved"#);
}

#[tokio::test]
async fn update_replaces_the_node() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let console = loaded_projects(&backend).await;

    let mut dialog = FormDialog::opened();
    let payload = Payload::json(&Project::create(Metadata::new("p1", "renamed"))).unwrap();
    console
        .mutation()
        .update(&ResourcePath::project("p1"), payload, &mut dialog)
        .await
        .unwrap();

    let store = console.store().read().await;
    let node = store.get(&ResourcePath::project("p1")).unwrap();
    assert_eq!(node.resource.metadata.description, "renamed");
    assert_eq!(node.resource.extra["status"], json!("created"));
    assert!(!dialog.is_open());
}

#[tokio::test]
async fn closed_view_discards_mutations() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let console = loaded_projects(&backend).await;
    console.close();

    let mut dialog = FormDialog::opened();
    let payload = Payload::json(&Project::create(Metadata::new("p2", ""))).unwrap();
    let outcome = console
        .mutation()
        .create(CollectionPath::projects(), payload, &mut dialog)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Discarded);
    assert_eq!(project_names(&*console.store().read().await), ["p1"]);
}

#[tokio::test]
async fn composite_deletes_go_through_the_middleend() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::projects(), &["p1"]);
    let project = ResourcePath::project("p1");
    let apps = project.collection(ResourceKind::CompositeApp).unwrap();
    backend.seed(apps.clone(), vec![composite_app("ca1", "v1")]);
    let ca = project.composite_app("ca1", "v1").unwrap();
    let digs = ca.collection(ResourceKind::DeploymentIntentGroup).unwrap();
    backend.seed_names(digs.clone(), &["dig1"]);

    let console = loaded_projects(&backend).await;
    let expansion = console.expansion();
    expansion.expand(&project, &plan::project()).await.unwrap();
    expansion.expand(&ca, &plan::composite_app()).await.unwrap();

    let mutation = console.mutation();
    let dig = ca
        .child(ResourceKind::DeploymentIntentGroup, "dig1")
        .unwrap();
    mutation
        .delete(mutation.request_delete(dig), Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(
        backend.calls().last().unwrap(),
        "DELETE /middleend/projects/p1/composite-apps/ca1/v1/deployment-intent-groups/dig1",
    );
    assert!(backend.stored(&digs).is_empty());

    mutation
        .delete(mutation.request_delete(ca.clone()), Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(
        backend.calls().last().unwrap(),
        "DELETE /middleend/projects/p1/composite-apps/ca1/v1",
    );
    assert!(backend.stored(&apps).is_empty());
    assert!(!console.store().read().await.contains(&ca));
}

#[tokio::test]
async fn cluster_registration_reports_the_connection_check() {
    let backend = FakeBackend::new();
    backend.seed_names(CollectionPath::cluster_providers(), &["prov"]);
    let provider = ResourcePath::cluster_provider("prov");
    backend.seed_names(provider.collection(ResourceKind::Cluster).unwrap(), &[]);
    backend.fail(
        "POST",
        "/middleend/clusterproviders/prov/clusters",
        403,
        "cluster c1 is unreachable: connection refused",
    );

    let (console, mut notifications) = console(&backend);
    let expansion = console.expansion();
    expansion
        .expand(&ResourcePath::root(), &plan::root())
        .await
        .unwrap();
    expansion
        .expand(&provider, &plan::cluster_provider())
        .await
        .unwrap();

    let register = |console: &emco_console::Console| {
        let form = cluster_form(
            "prov",
            &Metadata::new("c1", ""),
            "",
            Upload::new("c1.conf", b"apiVersion: v1".to_vec()),
        )
        .unwrap();
        let mutation = console.mutation();
        async move {
            let mut dialog = FormDialog::opened();
            let result = mutation
                .create(CollectionPath::clusters_of("prov"), form.into(), &mut dialog)
                .await;
            (result, dialog)
        }
    };

    let (result, dialog) = register(&console).await;
    assert!(matches!(result, Err(ConsoleError::Api(error)) if error.is_forbidden()));
    assert!(dialog.is_open());
    let notification = notifications.drain().pop().unwrap();
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(
        notification.message,
        "cluster c1 is unreachable: connection refused",
    );

    backend.heal();
    let (result, _) = register(&console).await;
    result.unwrap();
    assert_eq!(
        backend.calls().last().unwrap(),
        "POST /middleend/clusterproviders/prov/clusters",
    );
    assert_eq!(
        backend.stored(&provider.collection(ResourceKind::Cluster).unwrap()),
        ["c1"],
    );
    assert!(console
        .store()
        .read()
        .await
        .contains(&cluster("prov", "c1")));
}

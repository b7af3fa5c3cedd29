use std::{
    collections::BTreeSet,
    fmt,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use emco_api::{
    kind::ResourceKind,
    model::Resource,
    path::{Action, ApiRoot, CollectionPath, ResourcePath},
};
use emco_client::{ApiError, Payload, ResourceApi};
use emco_core::signal::ViewSignal;
use itertools::Itertools;
use tracing::{debug, instrument, Level};

use crate::{
    dialog::{ConfirmDialog, Confirmation, FormDialog},
    error::{ConsoleError, Result},
    notify::Notifier,
    tree::{ResourceNode, TreeStore},
    SharedTree,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Action(Action),
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Action(action) => action.fmt(f),
        }
    }
}

/// Identifies one in-flight mutation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PendingOperation {
    pub parent: ResourcePath,
    pub kind: ResourceKind,
    pub op: OperationKind,
}

impl PendingOperation {
    fn of(path: &ResourcePath, op: OperationKind) -> Result<Self> {
        match (path.parent(), path.kind()) {
            (Some(parent), Some(kind)) => Ok(Self { parent, kind, op }),
            _ => Err(ConsoleError::NotFound(path.to_string())),
        }
    }
}

impl fmt::Display for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { parent, kind, op } = self;
        write!(f, "{op} {kind} under {parent}")
    }
}

type PendingSet = Arc<Mutex<BTreeSet<PendingOperation>>>;

/// Holds a pending entry until the operation settles, however it ends.
struct PendingGuard {
    set: PendingSet,
    key: PendingOperation,
}

impl PendingGuard {
    fn try_register(set: &PendingSet, key: PendingOperation) -> Result<Self> {
        let mut pending = set.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.insert(key.clone()) {
            Ok(Self {
                set: set.clone(),
                key,
            })
        } else {
            Err(ConsoleError::Busy(key))
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// How a mutation ended, when it did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    /// The user declined the confirmation.
    Cancelled,
    /// The view closed before the response arrived.
    Discarded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Cancelled | Self::Discarded => None,
        }
    }
}

/// Refuses deletion of a resource while dependents are loaded under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteGuard {
    pub kind: ResourceKind,
    pub dependents: Vec<ResourceKind>,
}

impl DeleteGuard {
    pub fn cluster() -> Self {
        Self {
            kind: ResourceKind::Cluster,
            dependents: vec![
                ResourceKind::Label,
                ResourceKind::ProviderNetwork,
                ResourceKind::Network,
            ],
        }
    }

    fn check(&self, node: &ResourceNode) -> Option<String> {
        let blocking = self
            .dependents
            .iter()
            .filter(|kind| node.has_children_of(**kind))
            .join(", ");
        if blocking.is_empty() {
            None
        } else {
            Some(format!(
                "{} {:?} cannot be deleted while it has: {blocking}",
                self.kind,
                node.name(),
            ))
        }
    }
}

/// Runs every create, update, delete and action of a view through one
/// result-handling path.
#[derive(Clone)]
pub struct MutationHelper {
    api: Arc<dyn ResourceApi>,
    store: SharedTree,
    notifier: Notifier,
    signal: ViewSignal,
    pending: PendingSet,
    guards: Vec<DeleteGuard>,
}

impl MutationHelper {
    pub fn new(
        api: Arc<dyn ResourceApi>,
        store: SharedTree,
        notifier: Notifier,
        signal: ViewSignal,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            signal,
            pending: PendingSet::default(),
            guards: vec![DeleteGuard::cluster()],
        }
    }

    pub fn with_guards(mut self, guards: Vec<DeleteGuard>) -> Self {
        self.guards = guards;
        self
    }

    pub fn api(&self) -> &Arc<dyn ResourceApi> {
        &self.api
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn signal(&self) -> &ViewSignal {
        &self.signal
    }

    pub fn is_pending(&self, key: &PendingOperation) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Registers `key`, awaits `call` and settles its result.
    ///
    /// On success `apply` mutates the tree and a success notification is
    /// raised; on failure an error notification is raised and the tree is
    /// left untouched. A closed view discards the result either way.
    pub async fn submit<T, F>(
        &self,
        key: PendingOperation,
        call: F,
        apply: impl FnOnce(&mut TreeStore, &T),
        success: impl FnOnce(&T) -> String,
    ) -> Result<Outcome<T>>
    where
        F: Future<Output = ::std::result::Result<T, ApiError>>,
    {
        let guard = PendingGuard::try_register(&self.pending, key)?;
        let result = call.await;
        drop(guard);

        if self.signal.is_cancelled() {
            debug!("discarding the result of a closed view");
            return Ok(Outcome::Discarded);
        }
        match result {
            Ok(value) => {
                apply(&mut *self.store.write().await, &value);
                self.notifier.success(success(&value));
                Ok(Outcome::Applied(value))
            }
            Err(error) => {
                self.notifier.error(error.user_message());
                Err(error.into())
            }
        }
    }

    /// Creates a resource and appends what the server returned.
    #[instrument(level = Level::INFO, skip(self, payload, dialog))]
    pub async fn create(
        &self,
        collection: CollectionPath,
        payload: Payload,
        dialog: &mut FormDialog,
    ) -> Result<Outcome<Resource>> {
        let key = PendingOperation {
            parent: collection.parent.clone(),
            kind: collection.kind,
            op: OperationKind::Create,
        };
        if !dialog.begin_submit() {
            return Err(ConsoleError::Busy(key));
        }

        let kind = collection.kind;
        let parent = collection.parent.clone();
        let result = self
            .submit(
                key,
                self.api.create(&collection, payload),
                |store, created| {
                    store.append_child(&parent, kind, created.clone());
                },
                |created| format!("{kind} {:?} created", created.name()),
            )
            .await;
        settle(dialog, &result);
        result
    }

    /// Replaces a resource with what the server stored.
    #[instrument(level = Level::INFO, skip(self, payload, dialog))]
    pub async fn update(
        &self,
        path: &ResourcePath,
        payload: Payload,
        dialog: &mut FormDialog,
    ) -> Result<Outcome<Resource>> {
        let key = PendingOperation::of(path, OperationKind::Update)?;
        if !dialog.begin_submit() {
            return Err(ConsoleError::Busy(key));
        }

        let result = self
            .submit(
                key,
                self.api.update(ApiRoot::V2, path, payload),
                |store, updated| {
                    store.set(path, updated.clone());
                },
                |updated| format!("{} updated", updated.name()),
            )
            .await;
        settle(dialog, &result);
        result
    }

    /// Captures the identity of the resource to delete.
    pub fn request_delete(&self, target: ResourcePath) -> ConfirmDialog {
        ConfirmDialog::new(target)
    }

    /// Deletes the captured target once the user confirmed.
    #[instrument(level = Level::INFO, skip(self, dialog))]
    pub async fn delete(
        &self,
        dialog: ConfirmDialog,
        confirmation: Confirmation,
    ) -> Result<Outcome<ResourcePath>> {
        if confirmation == Confirmation::Cancelled {
            return Ok(Outcome::Cancelled);
        }
        let target = dialog.target().clone();
        let key = PendingOperation::of(&target, OperationKind::Delete)?;

        if let Some(reason) = self.blocked(&target).await {
            self.notifier.warning(&reason);
            return Err(ConsoleError::Blocked(reason));
        }

        self.submit(
            key,
            async {
                self.api.delete(target.delete_root(), &target).await?;
                Ok::<_, ApiError>(target.clone())
            },
            |store, target| {
                if store.remove(target).is_none() {
                    debug!("{target} was already gone");
                }
            },
            |target| match (target.kind(), target.name()) {
                (Some(kind), Some(name)) => format!("{kind} {name:?} deleted"),
                _ => format!("{target} deleted"),
            },
        )
        .await
    }

    /// Posts a lifecycle action; the tree is left as is.
    #[instrument(level = Level::INFO, skip(self))]
    pub async fn action(&self, path: &ResourcePath, action: Action) -> Result<Outcome<()>> {
        let key = PendingOperation::of(path, OperationKind::Action(action))?;

        if action == Action::Apply {
            let store = self.store.read().await;
            if let Some(node) = store.get(path) {
                if node.is_fetched(ResourceKind::Network)
                    && !node.has_children_of(ResourceKind::Network)
                {
                    let reason = format!("{:?} has no network to apply", node.name());
                    self.notifier.warning(&reason);
                    return Err(ConsoleError::Blocked(reason));
                }
            }
        }

        let name = path.name().unwrap_or_default().to_string();
        self.submit(
            key,
            self.api.action(path, action),
            |_, _| (),
            |_| match action {
                Action::Approve => format!("{name:?} approved"),
                Action::Instantiate => format!("{name:?} instantiated"),
                Action::Apply => format!("network configuration of {name:?} applied"),
            },
        )
        .await
    }

    async fn blocked(&self, target: &ResourcePath) -> Option<String> {
        let store = self.store.read().await;
        let node = store.get(target)?;
        self.guards
            .iter()
            .filter(|guard| Some(guard.kind) == target.kind())
            .find_map(|guard| guard.check(node))
    }
}

fn settle<T>(dialog: &mut FormDialog, result: &Result<Outcome<T>>) {
    match result {
        Ok(Outcome::Applied(_)) => dialog.close(),
        Ok(Outcome::Cancelled | Outcome::Discarded) | Err(_) => dialog.fail(),
    }
}

pub mod dialog;
pub mod error;
pub mod expand;
pub mod mutation;
pub mod notify;
pub mod plan;
pub mod tree;
pub mod wizard;

use std::sync::Arc;

use emco_client::ResourceApi;
use emco_core::signal::ViewSignal;
use tokio::sync::RwLock;

use crate::{
    expand::ExpansionController,
    mutation::MutationHelper,
    notify::{Notifications, Notifier},
    tree::TreeStore,
    wizard::DigWizard,
};

pub type SharedTree = Arc<RwLock<TreeStore>>;

/// One open view: its tree, its notifications and its lifetime.
#[derive(Clone)]
pub struct Console {
    api: Arc<dyn ResourceApi>,
    store: SharedTree,
    notifier: Notifier,
    signal: ViewSignal,
    mutation: MutationHelper,
}

impl Console {
    pub fn new(api: Arc<dyn ResourceApi>) -> (Self, Notifications) {
        Self::with_signal(api, ViewSignal::default())
    }

    pub fn with_signal(api: Arc<dyn ResourceApi>, signal: ViewSignal) -> (Self, Notifications) {
        let (notifier, notifications) = Notifier::channel();
        let store = SharedTree::default();
        let mutation =
            MutationHelper::new(api.clone(), store.clone(), notifier.clone(), signal.clone());
        let console = Self {
            api,
            store,
            notifier,
            signal,
            mutation,
        };
        (console, notifications)
    }

    pub fn api(&self) -> &Arc<dyn ResourceApi> {
        &self.api
    }

    pub fn store(&self) -> &SharedTree {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn signal(&self) -> &ViewSignal {
        &self.signal
    }

    pub fn expansion(&self) -> ExpansionController {
        ExpansionController::new(self.api.clone(), self.store.clone(), self.signal.clone())
    }

    /// Mutations of one view share their pending set.
    pub fn mutation(&self) -> MutationHelper {
        self.mutation.clone()
    }

    pub fn dig_wizard(&self, project: impl Into<String>) -> DigWizard {
        DigWizard::new(self.mutation(), project)
    }

    /// Closes the view; results still in flight are dropped.
    pub fn close(&self) {
        self.signal.cancel()
    }
}

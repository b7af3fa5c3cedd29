//! The two-step deployment intent group creation wizard.
//!
//! Step one collects general information and loads the apps of the chosen
//! composite app; step two places every app on clusters and binds network
//! interfaces. The whole group is posted once, at the end.

use std::mem;

use emco_api::{
    cluster::NetworkSpec,
    deployment::{
        AppPlacement, DeploymentIntentGroupRequest, DeploymentIntentGroupRequestSpec,
        InterfaceBinding, ProviderPlacement, SelectedCluster,
    },
    kind::ResourceKind,
    model::{Metadata, Resource},
    path::{ApiRoot, CollectionPath, ResourcePath},
    validate::{ValidationError, Validator},
};
use emco_client::Payload;
use futures::future::join_all;
use serde_json::Value;
use strum::Display;
use tracing::{info, instrument, warn, Level};

use crate::{
    dialog::FormDialog,
    error::{ConsoleError, Result},
    mutation::{MutationHelper, Outcome},
};

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum WizardStep {
    General,
    Intents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneralForm {
    pub name: String,
    pub description: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub version: String,
    pub composite_profile: String,
    /// JSON text: an array of objects, or empty.
    pub override_values: String,
}

impl GeneralForm {
    pub fn validate(&self) -> Result<Option<Vec<Value>>, ValidationError> {
        let mut validator = Validator::default();
        validator.required("name", &self.name);
        validator.required("compositeApp", &self.composite_app);
        validator.required("compositeAppVersion", &self.composite_app_version);
        validator.version("version", &self.version);
        validator.required("compositeProfile", &self.composite_profile);
        let override_values =
            validator.json_array_of_objects("overrideValues", &self.override_values);
        validator.finish(|| override_values)
    }
}

/// Clusters a provider offers for placement.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderClusters {
    pub provider: String,
    pub clusters: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceDraft {
    pub network_name: String,
    pub ip: String,
    pub subnet: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterDraft {
    pub name: String,
    /// Provider networks followed by cluster networks.
    pub networks: Vec<Resource>,
    pub interfaces: Vec<InterfaceDraft>,
}

impl ClusterDraft {
    pub fn available_networks(&self) -> impl '_ + Iterator<Item = &Resource> {
        self.networks.iter().filter(|network| {
            !self
                .interfaces
                .iter()
                .any(|interface| interface.network_name == network.name())
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderDraft {
    pub provider: String,
    pub clusters: Vec<ClusterDraft>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppDraft {
    pub app: Resource,
    pub providers: Vec<ProviderDraft>,
}

impl AppDraft {
    fn new(app: Resource) -> Self {
        Self {
            app,
            providers: Vec::default(),
        }
    }

    fn cluster_mut(&mut self, provider: &str, cluster: &str) -> Option<&mut ClusterDraft> {
        self.providers
            .iter_mut()
            .find(|draft| draft.provider == provider)?
            .clusters
            .iter_mut()
            .find(|draft| draft.name == cluster)
    }

    /// Whether at least one cluster was selected for the app.
    pub fn is_placed(&self) -> bool {
        self.providers
            .iter()
            .any(|provider| !provider.clusters.is_empty())
    }

    pub fn cluster(&self, provider: &str, cluster: &str) -> Option<&ClusterDraft> {
        self.providers
            .iter()
            .find(|draft| draft.provider == provider)?
            .clusters
            .iter()
            .find(|draft| draft.name == cluster)
    }

    fn placement(&self) -> AppPlacement {
        AppPlacement {
            metadata: Metadata::new(self.app.name(), &self.app.metadata.description),
            clusters: self
                .providers
                .iter()
                .map(|provider| ProviderPlacement {
                    provider: provider.provider.clone(),
                    selected_clusters: provider
                        .clusters
                        .iter()
                        .map(|cluster| SelectedCluster {
                            name: cluster.name.clone(),
                            interfaces: cluster
                                .interfaces
                                .iter()
                                .map(|interface| InterfaceBinding {
                                    network_name: interface.network_name.clone(),
                                    ip: interface.ip.clone(),
                                    subnet: interface.subnet.clone(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

pub struct DigWizard {
    helper: MutationHelper,
    project: String,
    step: WizardStep,
    dialog: FormDialog,
    general: GeneralForm,
    override_values: Option<Vec<Value>>,
    apps: Vec<AppDraft>,
    providers: Vec<ProviderClusters>,
}

impl DigWizard {
    pub fn new(helper: MutationHelper, project: impl Into<String>) -> Self {
        Self {
            helper,
            project: project.into(),
            step: WizardStep::General,
            dialog: FormDialog::opened(),
            general: GeneralForm::default(),
            override_values: None,
            apps: Vec::default(),
            providers: Vec::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The general step cannot be revisited once apps are loaded.
    pub fn can_go_back(&self) -> bool {
        false
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    pub fn general(&self) -> &GeneralForm {
        &self.general
    }

    pub fn apps(&self) -> &[AppDraft] {
        &self.apps
    }

    pub fn app(&self, name: &str) -> Option<&AppDraft> {
        self.apps.iter().find(|draft| draft.app.name() == name)
    }

    pub fn providers(&self) -> &[ProviderClusters] {
        &self.providers
    }

    fn composite_app(&self) -> Result<ResourcePath> {
        ResourcePath::project(&self.project)
            .composite_app(
                &self.general.composite_app,
                &self.general.composite_app_version,
            )
            .map_err(Into::into)
    }

    fn app_mut(&mut self, name: &str) -> Result<&mut AppDraft> {
        self.apps
            .iter_mut()
            .find(|draft| draft.app.name() == name)
            .ok_or_else(|| ConsoleError::NotFound(format!("app {name:?}")))
    }

    fn require(&self, step: WizardStep) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(ConsoleError::WrongStep(step))
        }
    }

    /// Validates the general step and loads the apps to place; advances only
    /// when at least one app was loaded.
    #[instrument(level = Level::INFO, skip(self, form))]
    pub async fn submit_general(&mut self, form: GeneralForm) -> Result<()> {
        let notifier = self.helper.notifier().clone();
        let override_values = form.validate().map_err(|error| {
            notifier.error(error.to_string());
            error
        })?;

        let collection = ResourcePath::project(&self.project)
            .composite_app(&form.composite_app, &form.composite_app_version)
            .and_then(|composite_app| composite_app.collection(ResourceKind::App))
            .map_err(|error| {
                notifier.error(error.to_string());
                error
            })?;
        let apps = match self.helper.api().list(&collection).await {
            Ok(apps) => apps,
            Err(error) => {
                notifier.error(format!("failed to load apps: {}", error.user_message()));
                return Err(error.into());
            }
        };
        let Some(apps) = self.helper.signal().keep(apps) else {
            return Ok(());
        };
        if apps.is_empty() {
            let message = format!(
                "composite app {:?} ({}) has no apps to place",
                form.composite_app, form.composite_app_version,
            );
            notifier.error(&message);
            return Err(ConsoleError::Empty(message));
        }

        let mut previous = mem::take(&mut self.apps);
        self.apps = apps
            .into_iter()
            .map(|app| {
                match previous
                    .iter()
                    .position(|draft| draft.app.name() == app.name())
                {
                    Some(index) => AppDraft {
                        app,
                        providers: previous.swap_remove(index).providers,
                    },
                    None => AppDraft::new(app),
                }
            })
            .collect();
        self.general = form;
        self.override_values = override_values;
        self.step = WizardStep::Intents;
        info!("loaded {} app(s)", self.apps.len());
        Ok(())
    }

    /// Loads cluster providers and their clusters; a provider whose clusters
    /// cannot be listed is left out.
    #[instrument(level = Level::INFO, skip(self))]
    pub async fn load_providers(&mut self) -> Result<()> {
        let api = self.helper.api().clone();
        let providers = match api.list(&CollectionPath::cluster_providers()).await {
            Ok(providers) => providers,
            Err(error) => {
                self.helper.notifier().error(format!(
                    "failed to load cluster providers: {}",
                    error.user_message(),
                ));
                return Err(error.into());
            }
        };

        let clusters = join_all(providers.iter().map(|provider| {
            let api = api.clone();
            async move {
                let collection = ResourcePath::cluster_provider(provider.name())
                    .collection(ResourceKind::Cluster)?;
                api.list(&collection).await.map_err(ConsoleError::from)
            }
        }))
        .await;

        let providers = providers
            .iter()
            .zip(clusters)
            .filter_map(|(provider, clusters)| match clusters {
                Ok(clusters) => Some(ProviderClusters {
                    provider: provider.name().into(),
                    clusters: clusters
                        .iter()
                        .map(|cluster| cluster.name().to_string())
                        .collect(),
                }),
                Err(error) => {
                    warn!("failed to load clusters of {}: {error}", provider.name());
                    None
                }
            })
            .collect();
        if let Some(providers) = self.helper.signal().keep(providers) {
            self.providers = providers;
        }
        Ok(())
    }

    /// Places an app on a cluster and loads the networks its interfaces may
    /// bind to: provider networks first, then cluster networks.
    #[instrument(level = Level::INFO, skip(self))]
    pub async fn select_cluster(
        &mut self,
        app: &str,
        provider: &str,
        cluster: &str,
    ) -> Result<Outcome<usize>> {
        self.require(WizardStep::Intents)?;
        self.app_mut(app)?;

        let path = ResourcePath::cluster_provider(provider).child(ResourceKind::Cluster, cluster)?;
        let api = self.helper.api().clone();
        let notifier = self.helper.notifier().clone();

        let mut networks = Vec::default();
        for kind in [ResourceKind::ProviderNetwork, ResourceKind::Network] {
            match api.list(&path.collection(kind)?).await {
                Ok(mut items) => networks.append(&mut items),
                Err(error) => {
                    notifier.error(format!(
                        "failed to load {kind}s of {cluster}: {}",
                        error.user_message(),
                    ));
                    return Err(error.into());
                }
            }
        }
        let Some(networks) = self.helper.signal().keep(networks) else {
            return Ok(Outcome::Discarded);
        };
        if networks.is_empty() {
            notifier.warning("No network available for this cluster");
        }

        let count = networks.len();
        let draft = self.app_mut(app)?;
        let providers = &mut draft.providers;
        let index = match providers.iter().position(|draft| draft.provider == provider) {
            Some(index) => index,
            None => {
                providers.push(ProviderDraft {
                    provider: provider.into(),
                    clusters: Vec::default(),
                });
                providers.len() - 1
            }
        };
        let clusters = &mut providers[index].clusters;
        match clusters.iter_mut().find(|draft| draft.name == cluster) {
            Some(draft) => draft.networks = networks,
            None => clusters.push(ClusterDraft {
                name: cluster.into(),
                networks,
                interfaces: Vec::default(),
            }),
        }
        Ok(Outcome::Applied(count))
    }

    pub fn deselect_cluster(&mut self, app: &str, provider: &str, cluster: &str) -> Result<bool> {
        let draft = self.app_mut(app)?;
        let Some(index) = draft
            .providers
            .iter()
            .position(|draft| draft.provider == provider)
        else {
            return Ok(false);
        };

        let clusters = &mut draft.providers[index].clusters;
        let before = clusters.len();
        clusters.retain(|draft| draft.name != cluster);
        let removed = clusters.len() != before;
        if clusters.is_empty() {
            draft.providers.remove(index);
        }
        Ok(removed)
    }

    /// Networks of a selected cluster not yet bound by one of its interfaces.
    pub fn available_networks(&self, app: &str, provider: &str, cluster: &str) -> Vec<&str> {
        self.app(app)
            .and_then(|draft| draft.cluster(provider, cluster))
            .map(|draft| draft.available_networks().map(Resource::name).collect())
            .unwrap_or_default()
    }

    pub fn add_interface(
        &mut self,
        app: &str,
        provider: &str,
        cluster: &str,
        interface: InterfaceDraft,
    ) -> Result<()> {
        let draft = self
            .app_mut(app)?
            .cluster_mut(provider, cluster)
            .ok_or_else(|| ConsoleError::NotFound(format!("cluster {cluster:?} of {provider:?}")))?;

        let mut validator = Validator::default();
        if validator.required("networkName", &interface.network_name) {
            match draft
                .available_networks()
                .find(|network| network.name() == interface.network_name)
            {
                Some(network) => {
                    let subnets = subnets_of(network);
                    if !interface.subnet.is_empty()
                        && !subnets.is_empty()
                        && !subnets.contains(&interface.subnet)
                    {
                        validator.error(
                            "subnet",
                            format!("{} is not a subnet of {}", interface.subnet, network.name()),
                        );
                    }
                }
                None => validator.error(
                    "networkName",
                    format!("network {:?} is not available", interface.network_name),
                ),
            }
        }
        validator.required("subnet", &interface.subnet);
        validator.ipv4("ip", &interface.ip);
        validator.finish(|| ())?;

        draft.interfaces.push(interface);
        Ok(())
    }

    pub fn remove_interface(
        &mut self,
        app: &str,
        provider: &str,
        cluster: &str,
        network_name: &str,
    ) -> Result<bool> {
        let draft = self
            .app_mut(app)?
            .cluster_mut(provider, cluster)
            .ok_or_else(|| ConsoleError::NotFound(format!("cluster {cluster:?} of {provider:?}")))?;
        let before = draft.interfaces.len();
        draft
            .interfaces
            .retain(|interface| interface.network_name != network_name);
        Ok(draft.interfaces.len() != before)
    }

    /// The single payload the wizard posts.
    pub fn request(&self) -> DeploymentIntentGroupRequest {
        let GeneralForm {
            name,
            description,
            composite_app,
            composite_app_version,
            version,
            composite_profile,
            override_values: _,
        } = self.general.clone();

        DeploymentIntentGroupRequest {
            name,
            description,
            composite_app,
            composite_app_version,
            version,
            composite_profile,
            spec: DeploymentIntentGroupRequestSpec {
                project_name: self.project.clone(),
                apps_data: self.apps.iter().map(AppDraft::placement).collect(),
                override_values: self.override_values.clone(),
            },
        }
    }

    /// Posts the assembled group once every app is placed on a cluster;
    /// closes the wizard on success.
    #[instrument(level = Level::INFO, skip(self))]
    pub async fn submit(&mut self) -> Result<Outcome<Resource>> {
        self.require(WizardStep::Intents)?;

        let mut validator = Validator::default();
        for draft in self.apps.iter().filter(|draft| !draft.is_placed()) {
            validator.error(draft.app.name(), "Select at least one cluster");
        }
        let notifier = self.helper.notifier();
        validator.finish(|| ()).map_err(|error| {
            notifier.error(error.to_string());
            error
        })?;

        let collection = self
            .composite_app()?
            .collection(ResourceKind::DeploymentIntentGroup)?
            .via(ApiRoot::Middleend);
        let payload = Payload::json(&self.request())?;
        self.helper
            .create(collection, payload, &mut self.dialog)
            .await
    }
}

fn subnets_of(network: &Resource) -> Vec<String> {
    network
        .typed::<NetworkSpec>()
        .map(|network| {
            network
                .spec
                .ipv4_subnets
                .into_iter()
                .map(|subnet| subnet.subnet)
                .collect()
        })
        .unwrap_or_default()
}

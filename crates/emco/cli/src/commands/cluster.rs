use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use emco_api::{
    form::{cluster_form, Upload},
    kind::ResourceKind,
    model::Metadata,
    path::{Action, CollectionPath, ResourcePath},
    validate::{LabelForm, MetadataForm, NetworkForm},
};
use emco_client::Payload;
use emco_console::{dialog::FormDialog, Console};
use tokio::fs;
use tracing::{instrument, Level};

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum Command {
    Add(AddArgs),
    Delete(DeleteArgs),
    Apply(ApplyArgs),

    /// Manage the labels of a cluster
    #[command(subcommand)]
    Label(LabelCommand),

    /// Manage the networks of a cluster
    #[command(subcommand)]
    Network(NetworkCommand),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::Add(command) => command.run(console).await,
            Self::Delete(command) => command.run(console).await,
            Self::Apply(command) => command.run(console).await,
            Self::Label(command) => command.run(console).await,
            Self::Network(command) => command.run(console).await,
        }
    }
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct ClusterArgs {
    #[arg(long, env = "EMCO_CLUSTER_PROVIDER", value_name = "NAME")]
    provider: String,

    #[arg(value_name = "CLUSTER")]
    cluster: String,
}

impl ClusterArgs {
    fn path(&self) -> Result<ResourcePath> {
        ResourcePath::cluster_provider(&self.provider)
            .child(ResourceKind::Cluster, &self.cluster)
            .map_err(Into::into)
    }
}

/// Register a cluster with its kubeconfig
#[derive(Clone, Debug, Parser)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    cluster: ClusterArgs,

    #[arg(short = 'D', long, default_value_t)]
    description: String,

    /// Extra metadata as a JSON object
    #[arg(long, default_value_t)]
    user_data: String,

    #[arg(long, value_name = "PATH")]
    kubeconfig: PathBuf,
}

impl AddArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let provider = ResourcePath::cluster_provider(&self.cluster.provider);
        super::open(console, &provider).await?;

        let kubeconfig = Upload::new(
            file_name(&self.kubeconfig),
            fs::read(&self.kubeconfig).await?,
        );
        let metadata = Metadata::new(&self.cluster.cluster, self.description);
        let form = cluster_form(&self.cluster.provider, &metadata, &self.user_data, kubeconfig)?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(
                CollectionPath::clusters_of(&self.cluster.provider),
                form.into(),
                &mut dialog,
            )
            .await?;
        Ok(())
    }
}

/// Delete a cluster without labels or networks
#[derive(Clone, Debug, Parser)]
pub(crate) struct DeleteArgs {
    #[command(flatten)]
    cluster: ClusterArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl DeleteArgs {
    async fn run(self, console: &Console) -> Result<()> {
        super::delete(console, self.cluster.path()?, self.yes).await
    }
}

/// Apply the network configuration of a cluster
#[derive(Clone, Debug, Parser)]
pub(crate) struct ApplyArgs {
    #[command(flatten)]
    cluster: ClusterArgs,
}

impl ApplyArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let path = self.cluster.path()?;
        super::open(console, &path).await?;
        console.mutation().action(&path, Action::Apply).await?;
        Ok(())
    }
}

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum LabelCommand {
    /// Attach a label
    Add {
        #[command(flatten)]
        cluster: ClusterArgs,

        #[arg(long, value_name = "LABEL")]
        label: String,
    },
    /// Detach a label
    Delete {
        #[command(flatten)]
        cluster: ClusterArgs,

        #[arg(long, value_name = "LABEL")]
        label: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl LabelCommand {
    async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::Add { cluster, label } => {
                let path = cluster.path()?;
                super::open(console, &path).await?;

                let label = LabelForm { label_name: label }.validate()?;
                let mut dialog = FormDialog::opened();
                console
                    .mutation()
                    .create(
                        path.collection(ResourceKind::Label)?,
                        Payload::json(&label)?,
                        &mut dialog,
                    )
                    .await?;
                Ok(())
            }
            Self::Delete {
                cluster,
                label,
                yes,
            } => {
                let path = cluster.path()?.child(ResourceKind::Label, label)?;
                super::delete(console, path, yes).await
            }
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum NetworkCommand {
    /// Define a network; the spec is a JSON object
    Add {
        #[command(flatten)]
        cluster: ClusterArgs,

        #[command(flatten)]
        metadata: NetworkMetadata,

        #[arg(long, value_name = "JSON")]
        spec: String,

        /// Define a provider network instead
        #[arg(long)]
        provider_network: bool,
    },
    Delete {
        #[command(flatten)]
        cluster: ClusterArgs,

        #[arg(long, value_name = "NAME")]
        network: String,

        /// Delete a provider network instead
        #[arg(long)]
        provider_network: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct NetworkMetadata {
    #[arg(long = "network", value_name = "NAME")]
    name: String,

    #[arg(short = 'D', long, default_value_t)]
    description: String,
}

const fn network_kind(provider_network: bool) -> ResourceKind {
    if provider_network {
        ResourceKind::ProviderNetwork
    } else {
        ResourceKind::Network
    }
}

impl NetworkCommand {
    async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::Add {
                cluster,
                metadata,
                spec,
                provider_network,
            } => {
                let path = cluster.path()?;
                super::open(console, &path).await?;

                let network = NetworkForm {
                    metadata: MetadataForm {
                        name: metadata.name,
                        description: metadata.description,
                    },
                    spec,
                }
                .validate()?;
                let mut dialog = FormDialog::opened();
                console
                    .mutation()
                    .create(
                        path.collection(network_kind(provider_network))?,
                        Payload::json(&network)?,
                        &mut dialog,
                    )
                    .await?;
                Ok(())
            }
            Self::Delete {
                cluster,
                network,
                provider_network,
                yes,
            } => {
                let path = cluster
                    .path()?
                    .child(network_kind(provider_network), network)?;
                super::delete(console, path, yes).await
            }
        }
    }
}

pub(super) fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".into())
}

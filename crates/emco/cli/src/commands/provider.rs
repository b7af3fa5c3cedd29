use anyhow::Result;
use clap::{Parser, Subcommand};
use emco_api::{
    kind::ResourceKind,
    path::{CollectionPath, ResourcePath},
    validate::MetadataForm,
};
use emco_client::Payload;
use emco_console::{dialog::FormDialog, Console};
use tracing::{instrument, Level};

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum Command {
    /// List every cluster provider
    List,
    Create(CreateArgs),
    Show(ShowArgs),
    Delete(DeleteArgs),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::List => {
                let root = ResourcePath::root();
                super::open(console, &root).await?;
                super::print_children(console, &root, ResourceKind::ClusterProvider).await
            }
            Self::Create(command) => command.run(console).await,
            Self::Show(command) => command.run(console).await,
            Self::Delete(command) => command.run(console).await,
        }
    }
}

/// Register a cluster provider
#[derive(Clone, Debug, Parser)]
pub(crate) struct CreateArgs {
    #[arg(value_name = "NAME")]
    name: String,

    #[arg(short = 'D', long, default_value_t)]
    description: String,
}

impl CreateArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let resource = MetadataForm {
            name: self.name,
            description: self.description,
        }
        .into_resource()?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(
                CollectionPath::cluster_providers(),
                Payload::json(&resource)?,
                &mut dialog,
            )
            .await?;
        Ok(())
    }
}

/// Show the clusters of a provider with their labels and networks
#[derive(Clone, Debug, Parser)]
pub(crate) struct ShowArgs {
    #[arg(value_name = "NAME")]
    name: String,
}

impl ShowArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let path = ResourcePath::cluster_provider(self.name);
        super::open(console, &path).await?;
        super::print_tree(console, &path).await
    }
}

/// Delete a cluster provider
#[derive(Clone, Debug, Parser)]
pub(crate) struct DeleteArgs {
    #[arg(value_name = "NAME")]
    name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl DeleteArgs {
    async fn run(self, console: &Console) -> Result<()> {
        super::delete(console, ResourcePath::cluster_provider(self.name), self.yes).await
    }
}

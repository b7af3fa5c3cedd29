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
    /// List every project
    List,
    Create(CreateArgs),
    Delete(DeleteArgs),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::List => {
                let root = ResourcePath::root();
                super::open(console, &root).await?;
                super::print_children(console, &root, ResourceKind::Project).await
            }
            Self::Create(command) => command.run(console).await,
            Self::Delete(command) => command.run(console).await,
        }
    }
}

/// Create a project
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
            .create(CollectionPath::projects(), Payload::json(&resource)?, &mut dialog)
            .await?;
        Ok(())
    }
}

/// Delete a project
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
        super::delete(console, ResourcePath::project(self.name), self.yes).await
    }
}

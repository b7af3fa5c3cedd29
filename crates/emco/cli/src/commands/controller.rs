use anyhow::Result;
use clap::{Parser, Subcommand};
use emco_api::{
    kind::ResourceKind,
    path::{CollectionPath, ResourcePath},
    validate::{ControllerForm, MetadataForm},
};
use emco_client::Payload;
use emco_console::{dialog::FormDialog, Console};
use tracing::{instrument, Level};

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum Command {
    /// List every registered controller
    List,
    Add(AddArgs),
    Delete(DeleteArgs),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::List => {
                let root = ResourcePath::root();
                super::open(console, &root).await?;
                super::print_children(console, &root, ResourceKind::Controller).await
            }
            Self::Add(command) => command.run(console).await,
            Self::Delete(command) => command.run(console).await,
        }
    }
}

/// Register a controller
#[derive(Clone, Debug, Parser)]
pub(crate) struct AddArgs {
    #[arg(value_name = "NAME")]
    name: String,

    #[arg(short = 'D', long, default_value_t)]
    description: String,

    #[arg(long)]
    host: String,

    #[arg(long)]
    port: String,

    /// Either "placement" or "action"
    #[arg(long = "type", default_value_t)]
    type_: String,

    #[arg(long, default_value_t)]
    priority: String,
}

impl AddArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let root = ResourcePath::root();
        super::open(console, &root).await?;

        let controller = ControllerForm {
            metadata: MetadataForm {
                name: self.name,
                description: self.description,
            },
            host: self.host,
            port: self.port,
            type_: self.type_,
            priority: self.priority,
        }
        .validate()?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(
                CollectionPath::controllers(),
                Payload::json(&controller)?,
                &mut dialog,
            )
            .await?;
        Ok(())
    }
}

/// Delete a controller
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
        super::delete(console, ResourcePath::controller(self.name), self.yes).await
    }
}

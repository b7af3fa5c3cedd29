use anyhow::Result;
use clap::{Parser, Subcommand};
use emco_api::{
    kind::ResourceKind,
    path::ResourcePath,
    validate::{CompositeAppForm, MetadataForm},
};
use emco_client::Payload;
use emco_console::{dialog::FormDialog, Console};
use tracing::{instrument, Level};

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum Command {
    List(ListArgs),
    Create(CreateArgs),
    Show(ShowArgs),
    Delete(DeleteArgs),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::List(command) => command.run(console).await,
            Self::Create(command) => command.run(console).await,
            Self::Show(command) => command.run(console).await,
            Self::Delete(command) => command.run(console).await,
        }
    }
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct ProjectArgs {
    #[arg(short, long, env = "EMCO_PROJECT", value_name = "NAME")]
    pub(super) project: String,
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct CompositeAppArgs {
    #[command(flatten)]
    pub(super) project: ProjectArgs,

    #[arg(value_name = "NAME")]
    pub(super) name: String,

    #[arg(long, value_name = "VERSION")]
    pub(super) version: String,
}

impl CompositeAppArgs {
    pub(super) fn path(&self) -> Result<ResourcePath> {
        ResourcePath::project(&self.project.project)
            .composite_app(&self.name, &self.version)
            .map_err(Into::into)
    }
}

/// List the composite apps of a project
#[derive(Clone, Debug, Parser)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    project: ProjectArgs,
}

impl ListArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let path = ResourcePath::project(self.project.project);
        super::open(console, &path).await?;
        super::print_children(console, &path, ResourceKind::CompositeApp).await
    }
}

/// Create an empty composite app
#[derive(Clone, Debug, Parser)]
pub(crate) struct CreateArgs {
    #[command(flatten)]
    composite_app: CompositeAppArgs,

    #[arg(short = 'D', long, default_value_t)]
    description: String,
}

impl CreateArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let CompositeAppArgs {
            project,
            name,
            version,
        } = self.composite_app;
        let path = ResourcePath::project(project.project);
        super::open(console, &path).await?;

        let composite_app = CompositeAppForm {
            metadata: MetadataForm {
                name,
                description: self.description,
            },
            version,
        }
        .validate()?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(
                path.collection(ResourceKind::CompositeApp)?,
                Payload::json(&composite_app)?,
                &mut dialog,
            )
            .await?;
        Ok(())
    }
}

/// Show the apps, profiles, intents and groups of a composite app
#[derive(Clone, Debug, Parser)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    composite_app: CompositeAppArgs,
}

impl ShowArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let path = self.composite_app.path()?;
        super::open(console, &path).await?;
        super::print_tree(console, &path).await
    }
}

/// Delete a composite app
#[derive(Clone, Debug, Parser)]
pub(crate) struct DeleteArgs {
    #[command(flatten)]
    composite_app: CompositeAppArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl DeleteArgs {
    async fn run(self, console: &Console) -> Result<()> {
        super::delete(console, self.composite_app.path()?, self.yes).await
    }
}

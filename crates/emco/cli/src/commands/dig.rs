use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use emco_api::{
    kind::ResourceKind,
    path::{Action, CollectionPath, ResourcePath},
};
use emco_console::{
    mutation::Outcome,
    wizard::{GeneralForm, InterfaceDraft},
    Console,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::{info, instrument, Level};

use super::composite_app::{CompositeAppArgs, ProjectArgs};

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum Command {
    List(ListArgs),
    Create(CreateArgs),
    Approve(TargetArgs),
    Instantiate(TargetArgs),
    Delete(DeleteArgs),

    /// Print the JSON schema of a group document
    Schema,
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::List(command) => command.run(console).await,
            Self::Create(command) => command.run(console).await,
            Self::Approve(command) => command.run(console, Action::Approve).await,
            Self::Instantiate(command) => command.run(console, Action::Instantiate).await,
            Self::Delete(command) => command.run(console).await,
            Self::Schema => {
                let schema = ::schemars::schema_for!(DigDocument);
                println!("{}", ::serde_json::to_string_pretty(&schema)?);
                Ok(())
            }
        }
    }
}

/// List the deployment intent groups of a project across its composite apps
#[derive(Clone, Debug, Parser)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    project: ProjectArgs,
}

impl ListArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let collection = CollectionPath::deployment_intent_groups_of(self.project.project);
        let groups = console.api().list(&collection).await?;
        for group in &groups {
            println!("{}", crate::render::line(group));
        }
        Ok(())
    }
}

/// A deployment intent group as written by hand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DigDocument {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) composite_app: String,
    pub(crate) composite_app_version: String,
    pub(crate) version: String,
    pub(crate) composite_profile: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) override_values: Vec<Value>,
    #[serde(default)]
    pub(crate) apps: Vec<AppDocument>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppDocument {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) clusters: Vec<ClusterDocument>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterDocument {
    pub(crate) provider: String,
    pub(crate) cluster: String,
    #[serde(default)]
    pub(crate) interfaces: Vec<InterfaceDocument>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InterfaceDocument {
    pub(crate) network_name: String,
    #[serde(default)]
    pub(crate) ip: String,
    pub(crate) subnet: String,
}

impl DigDocument {
    fn general(&self) -> Result<GeneralForm> {
        let override_values = if self.override_values.is_empty() {
            String::default()
        } else {
            ::serde_json::to_string(&self.override_values)?
        };
        Ok(GeneralForm {
            name: self.name.clone(),
            description: self.description.clone(),
            composite_app: self.composite_app.clone(),
            composite_app_version: self.composite_app_version.clone(),
            version: self.version.clone(),
            composite_profile: self.composite_profile.clone(),
            override_values,
        })
    }
}

impl From<InterfaceDocument> for InterfaceDraft {
    fn from(value: InterfaceDocument) -> Self {
        let InterfaceDocument {
            network_name,
            ip,
            subnet,
        } = value;
        Self {
            network_name,
            ip,
            subnet,
        }
    }
}

/// Create a deployment intent group from a YAML document
#[derive(Clone, Debug, Parser)]
pub(crate) struct CreateArgs {
    #[command(flatten)]
    project: ProjectArgs,

    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,
}

impl CreateArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let document: DigDocument = ::serde_yaml::from_slice(&fs::read(&self.file).await?)?;
        let mut wizard = console.dig_wizard(self.project.project);

        wizard.submit_general(document.general()?).await?;
        for app in &document.apps {
            if wizard.app(&app.name).is_none() {
                bail!(
                    "composite app {:?} has no app named {:?}",
                    document.composite_app,
                    app.name,
                );
            }
        }

        wizard.load_providers().await?;
        for app in document.apps {
            for cluster in app.clusters {
                let outcome = wizard
                    .select_cluster(&app.name, &cluster.provider, &cluster.cluster)
                    .await?;
                if outcome == Outcome::Discarded {
                    return Ok(());
                }
                for interface in cluster.interfaces {
                    wizard.add_interface(
                        &app.name,
                        &cluster.provider,
                        &cluster.cluster,
                        interface.into(),
                    )?;
                }
            }
        }

        if let Outcome::Applied(group) = wizard.submit().await? {
            info!("created deployment intent group {}", group.name());
        }
        Ok(())
    }
}

/// Selects one deployment intent group
#[derive(Clone, Debug, Parser)]
pub(crate) struct TargetArgs {
    #[command(flatten)]
    composite_app: CompositeAppArgs,

    #[arg(long = "dig", value_name = "NAME")]
    dig: String,
}

impl TargetArgs {
    fn path(&self) -> Result<ResourcePath> {
        self.composite_app
            .path()?
            .child(ResourceKind::DeploymentIntentGroup, &self.dig)
            .map_err(Into::into)
    }

    async fn run(self, console: &Console, action: Action) -> Result<()> {
        console.mutation().action(&self.path()?, action).await?;
        Ok(())
    }
}

/// Delete a deployment intent group
#[derive(Clone, Debug, Parser)]
pub(crate) struct DeleteArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl DeleteArgs {
    async fn run(self, console: &Console) -> Result<()> {
        super::delete(console, self.target.path()?, self.yes).await
    }
}

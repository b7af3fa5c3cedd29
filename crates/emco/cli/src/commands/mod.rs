mod app;
mod cluster;
mod composite_app;
mod controller;
mod dig;
mod project;
mod provider;

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};
use clap::Subcommand;
use emco_api::{kind::ResourceKind, path::ResourcePath};
use emco_console::{
    dialog::{ConfirmDialog, Confirmation},
    plan, Console,
};
use tracing::{instrument, Level};

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Manage projects
    #[command(subcommand)]
    Projects(self::project::Command),

    /// Manage cluster providers
    #[command(subcommand)]
    Providers(self::provider::Command),

    /// Manage clusters and their labels and networks
    #[command(subcommand)]
    Clusters(self::cluster::Command),

    /// Manage composite apps
    #[command(subcommand)]
    CompositeApps(self::composite_app::Command),

    /// Upload app and profile packages
    #[command(subcommand)]
    Apps(self::app::Command),

    /// Manage deployment intent groups
    #[command(subcommand)]
    Dig(self::dig::Command),

    /// Manage controllers
    #[command(subcommand)]
    Controllers(self::controller::Command),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::Projects(command) => command.run(console).await,
            Self::Providers(command) => command.run(console).await,
            Self::Clusters(command) => command.run(console).await,
            Self::CompositeApps(command) => command.run(console).await,
            Self::Apps(command) => command.run(console).await,
            Self::Dig(command) => command.run(console).await,
            Self::Controllers(command) => command.run(console).await,
        }
    }
}

/// Loads every node from the root down to `path`, the way a user would
/// click through the views.
pub(super) async fn open(console: &Console, path: &ResourcePath) -> Result<()> {
    let expansion = console.expansion();
    for node in path.lineage() {
        let plan = plan::for_kind(node.kind());
        expansion.expand(&node, &plan).await?;
    }
    Ok(())
}

pub(super) async fn print_children(
    console: &Console,
    parent: &ResourcePath,
    kind: ResourceKind,
) -> Result<()> {
    let store = console.store().read().await;
    let node = store
        .get(parent)
        .ok_or_else(|| anyhow!("no such resource: {parent}"))?;
    match node.children(kind) {
        Some(children) => {
            for line in crate::render::list(children) {
                println!("{line}");
            }
            Ok(())
        }
        None => Err(anyhow!("failed to load {kind}s of {parent}")),
    }
}

pub(super) async fn print_tree(console: &Console, path: &ResourcePath) -> Result<()> {
    let store = console.store().read().await;
    print!("{}", crate::render::tree(&store, path));
    Ok(())
}

/// Asks on the terminal unless `yes` was given.
pub(super) fn confirm(dialog: &ConfirmDialog, yes: bool) -> Result<Confirmation> {
    if yes {
        return Ok(Confirmation::Confirmed);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{} [y/N] ", dialog.message())?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(match answer.trim() {
        "y" | "Y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Cancelled,
    })
}

pub(super) async fn delete(console: &Console, path: ResourcePath, yes: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        open(console, &parent).await?;
    }
    let mutation = console.mutation();
    let dialog = mutation.request_delete(path);
    let confirmation = confirm(&dialog, yes)?;
    mutation.delete(dialog, confirmation).await?;
    Ok(())
}

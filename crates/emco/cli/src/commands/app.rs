use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use emco_api::{
    composite_app::{PackageMetadata, ProfileSpec, ServiceApp, ServicePayload, ServicePayloadSpec},
    form::{app_form, profile_form, service_form, CompositeAppRef, Upload},
    kind::ResourceKind,
    model::Metadata,
    path::{ApiRoot, ResourcePath},
};
use emco_console::{dialog::FormDialog, Console};
use tokio::fs;
use tracing::{instrument, Level};

use super::{
    cluster::file_name,
    composite_app::{CompositeAppArgs, ProjectArgs},
};

#[derive(Clone, Debug, Subcommand)]
pub(crate) enum Command {
    Add(AddArgs),
    Profile(ProfileArgs),
    Service(ServiceArgs),
}

impl Command {
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub(crate) async fn run(self, console: &Console) -> Result<()> {
        match self {
            Self::Add(command) => command.run(console).await,
            Self::Profile(command) => command.run(console).await,
            Self::Service(command) => command.run(console).await,
        }
    }
}

async fn upload(path: &Path) -> Result<Upload> {
    Ok(Upload::new(file_name(path), fs::read(path).await?))
}

/// Upload an app package into a composite app
#[derive(Clone, Debug, Parser)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    composite_app: CompositeAppArgs,

    #[arg(long = "app", value_name = "NAME")]
    app: String,

    #[arg(short = 'D', long, default_value_t)]
    description: String,

    /// The helm chart archive; omit to update metadata only
    #[arg(long, value_name = "PATH")]
    package: Option<PathBuf>,
}

impl AddArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let path = self.composite_app.path()?;
        super::open(console, &path).await?;

        let package = match &self.package {
            Some(package) => Some(upload(package).await?),
            None => None,
        };
        let form = app_form(
            &CompositeAppRef {
                project: &self.composite_app.project.project,
                name: &self.composite_app.name,
                version: &self.composite_app.version,
            },
            &Metadata::new(self.app, self.description),
            package,
        )?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(path.collection(ResourceKind::App)?, form.into(), &mut dialog)
            .await?;
        Ok(())
    }
}

/// Upload a profile package for one app
#[derive(Clone, Debug, Parser)]
pub(crate) struct ProfileArgs {
    #[command(flatten)]
    composite_app: CompositeAppArgs,

    #[arg(long, value_name = "NAME")]
    composite_profile: String,

    #[arg(long = "profile", value_name = "NAME")]
    profile: String,

    #[arg(long = "app", value_name = "NAME")]
    app: String,

    #[arg(long, value_name = "PATH")]
    package: PathBuf,
}

impl ProfileArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let composite_profile = self
            .composite_app
            .path()?
            .child(ResourceKind::CompositeProfile, &self.composite_profile)?;
        super::open(console, &composite_profile).await?;

        let form = profile_form(
            &CompositeAppRef {
                project: &self.composite_app.project.project,
                name: &self.composite_app.name,
                version: &self.composite_app.version,
            },
            &self.composite_profile,
            &Metadata::new(self.profile, String::default()),
            &ProfileSpec { app_name: self.app },
            upload(&self.package).await?,
        )?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(
                composite_profile.collection(ResourceKind::Profile)?,
                form.into(),
                &mut dialog,
            )
            .await?;
        Ok(())
    }
}

/// One `NAME=PACKAGE,PROFILE` triple of a service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServiceAppArg {
    name: String,
    package: PathBuf,
    profile: PathBuf,
}

fn parse_service_app(value: &str) -> Result<ServiceAppArg> {
    let (name, files) = value
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=PACKAGE,PROFILE: {value}"))?;
    let (package, profile) = files
        .split_once(',')
        .ok_or_else(|| anyhow!("expected NAME=PACKAGE,PROFILE: {value}"))?;
    if name.is_empty() || package.is_empty() || profile.is_empty() {
        return Err(anyhow!("expected NAME=PACKAGE,PROFILE: {value}"));
    }
    Ok(ServiceAppArg {
        name: name.into(),
        package: package.into(),
        profile: profile.into(),
    })
}

/// Create a composite app with all of its apps in one request
#[derive(Clone, Debug, Parser)]
pub(crate) struct ServiceArgs {
    #[command(flatten)]
    project: ProjectArgs,

    #[arg(value_name = "NAME")]
    name: String,

    #[arg(short = 'D', long, default_value_t)]
    description: String,

    #[arg(long = "app", value_name = "NAME=PACKAGE,PROFILE", value_parser = parse_service_app, required = true)]
    apps: Vec<ServiceAppArg>,
}

impl ServiceArgs {
    async fn run(self, console: &Console) -> Result<()> {
        let project = ResourcePath::project(&self.project.project);
        super::open(console, &project).await?;

        let mut apps_data = Vec::with_capacity(self.apps.len());
        let mut packages = Vec::with_capacity(self.apps.len());
        for app in &self.apps {
            let package = upload(&app.package).await?;
            let profile = upload(&app.profile).await?;
            apps_data.push(ServiceApp {
                metadata: PackageMetadata {
                    name: app.name.clone(),
                    description: String::default(),
                    filename: package.filename.clone(),
                },
                profile_metadata: PackageMetadata {
                    name: format!("{}-profile", app.name),
                    description: String::default(),
                    filename: profile.filename.clone(),
                },
                clusters: Vec::default(),
            });
            packages.push((app.name.clone(), package, profile));
        }

        let payload = ServicePayload {
            name: self.name,
            description: self.description,
            spec: ServicePayloadSpec {
                project_name: self.project.project,
                apps_data,
            },
        };
        let form = service_form(&payload, packages)?;

        let mut dialog = FormDialog::opened();
        console
            .mutation()
            .create(
                project
                    .collection(ResourceKind::CompositeApp)?
                    .via(ApiRoot::Middleend),
                form.into(),
                &mut dialog,
            )
            .await?;
        Ok(())
    }
}

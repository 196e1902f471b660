//! Release CLI commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use super::app::parse_providers;
use super::output::Output;
use crate::domain::{diff, DeploymentPath, StageKind};
use crate::storage::{load_release_file, Workspace};

#[derive(Subcommand)]
pub enum ReleaseCommands {
    /// Commit release metadata into a deployment's stage record
    ///
    /// Examples:
    ///   flotilla release commit api
    ///   flotilla release commit api --stage build --file build-release.yml
    Commit {
        /// Deployment path, colon-separated for nested dependencies
        path: String,

        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Stage to commit into
        #[arg(long, short = 's', default_value = "deploy")]
        stage: StageKind,

        /// Release metadata file (defaults to the configured release file)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Resolve and bind providers for every interface a release consumes
    ///
    /// Examples:
    ///   flotilla release configure api
    ///   flotilla release configure api -p kubernetes=k8s-prod -p db=postgres
    Configure {
        /// Deployment path, colon-separated for nested dependencies
        path: String,

        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Stage whose provider bindings are configured
        #[arg(long, short = 's', default_value = "deploy")]
        stage: StageKind,

        /// Release metadata file (defaults to the configured release file)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Provider binding as key=deployment
        #[arg(long, short = 'p')]
        provider: Vec<String>,
    },

    /// Compare two release metadata files field by field
    Diff {
        /// Previous release metadata file
        old_file: PathBuf,

        /// Current release metadata file
        new_file: PathBuf,
    },
}

pub fn run(cmd: ReleaseCommands, output: &Output) -> Result<()> {
    match cmd {
        ReleaseCommands::Commit {
            path,
            env,
            stage,
            file,
        } => commit_release(output, &path, env.as_deref(), stage, file.as_deref()),
        ReleaseCommands::Configure {
            path,
            env,
            stage,
            file,
            provider,
        } => configure_release(output, &path, env.as_deref(), stage, file.as_deref(), &provider),
        ReleaseCommands::Diff { old_file, new_file } => diff_releases(output, &old_file, &new_file),
    }
}

fn commit_release(
    output: &Output,
    path_str: &str,
    env: Option<&str>,
    stage: StageKind,
    file: Option<&Path>,
) -> Result<()> {
    let path: DeploymentPath = path_str.parse()?;

    let workspace = Workspace::open_current()?;
    let release_path = file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| workspace.release_path());
    let metadata = load_release_file(&release_path)?;
    output.verbose_ctx(
        "release",
        &format!("Loaded release metadata from {}", release_path.display()),
    );

    let mut state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    {
        let environment = state.environment_or_create(env_name)?;
        let deployment = environment.resolve_path_or_create(stage, &path)?;
        deployment.commit_version(stage, &metadata);
    }
    workspace.save_state(&state)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "environment": env_name,
            "path": path.to_string(),
            "stage": stage,
            "release": metadata.qualified_name(),
            "version": metadata.version,
        }));
    } else {
        output.success(&format!(
            "Committed {} to {} ({} stage)",
            metadata.release_id(),
            path,
            stage
        ));
    }

    Ok(())
}

fn configure_release(
    output: &Output,
    path_str: &str,
    env: Option<&str>,
    stage: StageKind,
    file: Option<&Path>,
    raw_providers: &[String],
) -> Result<()> {
    let extra = parse_providers(raw_providers)?;
    let path: DeploymentPath = path_str.parse()?;

    let workspace = Workspace::open_current()?;
    let release_path = file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| workspace.release_path());
    let metadata = load_release_file(&release_path)?;

    let mut state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    {
        let environment = state.environment_or_create(env_name)?;
        environment.resolve_path_or_create(stage, &path)?;
        environment.configure_providers(stage, &path, stage, &metadata, &extra)?;
    }
    workspace.save_state(&state)?;

    let providers = state
        .lookup_environment(env_name)?
        .resolve_path(stage, &path)?
        .stage_providers(stage);

    if output.is_json() {
        output.data(&serde_json::json!({
            "environment": env_name,
            "path": path.to_string(),
            "stage": stage,
            "providers": providers,
        }));
    } else if providers.is_empty() {
        output.success(&format!("No consumed interfaces to configure for {}", path));
    } else {
        output.success(&format!("Configured providers for {}", path));
        for (key, provider) in &providers {
            println!("  {} -> {}", key, provider);
        }
    }

    Ok(())
}

fn diff_releases(output: &Output, old_file: &Path, new_file: &Path) -> Result<()> {
    let old = load_release_file(old_file)?;
    let new = load_release_file(new_file)?;

    let changes = diff(&old, &new);

    if output.is_json() {
        output.data(&changes);
    } else if changes.is_empty() {
        println!("No changes between {} and {}", old.release_id(), new.release_id());
    } else {
        println!("Changes from {} to {}:", old.release_id(), new.release_id());
        for change in &changes {
            println!("  {}", change);
        }
    }

    Ok(())
}

//! Main CLI application structure

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{deployment, environment, plan, release_cmd};
use crate::domain::StageKind;
use crate::storage::{Config, Workspace};

#[derive(Parser)]
#[command(name = "flotilla")]
#[command(author, version, about = "Local-first deployment state and dependency resolution")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new flotilla workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage environments
    #[command(subcommand)]
    Env(environment::EnvCommands),

    /// Manage deployments in an environment
    #[command(subcommand)]
    Deployment(deployment::DeploymentCommands),

    /// Commit, configure and compare releases
    #[command(subcommand)]
    Release(release_cmd::ReleaseCommands),

    /// Show the dependency-ordered deployment plan for an environment
    Plan {
        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Stage to plan
        #[arg(long, short = 's', default_value = "deploy")]
        stage: StageKind,
    },

    /// Show the effective inputs a deployment would run with
    Inputs {
        /// Deployment path, colon-separated for nested dependencies
        path: String,

        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Stage whose inputs are resolved
        #[arg(long, short = 's', default_value = "deploy")]
        stage: StageKind,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("Flotilla starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
            let workspace = Workspace::init(&path)?;
            output.success(&format!(
                "Initialized flotilla workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Env(cmd) => environment::run(cmd, &output)?,
        Commands::Deployment(cmd) => deployment::run(cmd, &output)?,
        Commands::Release(cmd) => release_cmd::run(cmd, &output)?,

        Commands::Plan { env, stage } => plan::plan(&output, env.as_deref(), stage)?,
        Commands::Inputs { path, env, stage } => {
            plan::inputs(&output, &path, env.as_deref(), stage)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Splits a repeated `key=value` argument list into a map, parsing each
/// value as JSON when it parses and keeping it as a string otherwise
pub(super) fn parse_inputs(raw: &[String]) -> Result<BTreeMap<String, serde_json::Value>> {
    raw.iter()
        .map(|entry| {
            let (key, value) = split_key_value(entry)?;
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            Ok((key.to_string(), value))
        })
        .collect()
}

/// Splits a repeated `key=deployment` argument list into a map
pub(super) fn parse_providers(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|entry| {
            let (key, value) = split_key_value(entry)?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

fn split_key_value(entry: &str) -> Result<(&str, &str)> {
    entry
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", entry))
}

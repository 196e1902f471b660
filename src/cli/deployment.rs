//! Deployment CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::app::parse_inputs;
use super::output::Output;
use crate::domain::{DeploymentPath, DeploymentState, StageKind};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum DeploymentCommands {
    /// List root deployments in an environment
    List {
        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Only show deployments holding a record for this stage
        #[arg(long, short = 's')]
        stage: Option<StageKind>,
    },

    /// Create a deployment record, or a nested dependency record
    ///
    /// Examples:
    ///   flotilla deployment create api
    ///   flotilla deployment create api:migrator --stage build
    ///   flotilla deployment create api -i replicas=3
    Create {
        /// Deployment path, colon-separated for nested dependencies
        path: String,

        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Stage under which nested path segments live
        #[arg(long, short = 's', default_value = "deploy")]
        stage: StageKind,

        /// Deployment-level input as key=value (value parsed as JSON if possible)
        #[arg(long, short = 'i')]
        input: Vec<String>,
    },

    /// Show one deployment's state
    Show {
        /// Deployment path, colon-separated for nested dependencies
        path: String,

        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Stage under which nested path segments live
        #[arg(long, short = 's', default_value = "deploy")]
        stage: StageKind,
    },

    /// List which deployments provide each interface type
    Providers {
        /// Restrict to one interface type
        interface: Option<String>,

        /// Environment name (defaults to the configured environment)
        #[arg(long, short = 'e')]
        env: Option<String>,
    },
}

pub fn run(cmd: DeploymentCommands, output: &Output) -> Result<()> {
    match cmd {
        DeploymentCommands::List { env, stage } => list_deployments(output, env.as_deref(), stage),
        DeploymentCommands::Create {
            path,
            env,
            stage,
            input,
        } => create_deployment(output, &path, env.as_deref(), stage, &input),
        DeploymentCommands::Show { path, env, stage } => {
            show_deployment(output, &path, env.as_deref(), stage)
        }
        DeploymentCommands::Providers { interface, env } => {
            list_providers(output, interface.as_deref(), env.as_deref())
        }
    }
}

fn stage_version(deployment: &DeploymentState, kind: StageKind) -> String {
    deployment
        .stage(kind)
        .filter(|record| record.is_committed())
        .map(|record| record.version.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn list_deployments(output: &Output, env: Option<&str>, stage: Option<StageKind>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    let environment = state.lookup_environment(env_name)?;
    let deployments: Vec<&DeploymentState> = environment
        .deployments
        .values()
        .filter(|d| stage.map_or(true, |s| d.stage(s).is_some()))
        .collect();

    if output.is_json() {
        let items: Vec<_> = deployments
            .iter()
            .map(|d| {
                serde_json::json!({
                    "name": d.name,
                    "release": d.release,
                    "build": d.stage(StageKind::Build).map(|s| s.version.clone()),
                    "deploy": d.stage(StageKind::Deploy).map(|s| s.version.clone()),
                })
            })
            .collect();
        output.data(&items);
    } else if deployments.is_empty() {
        match stage {
            Some(stage) => println!(
                "No deployments with a {} stage in environment '{}'",
                stage, env_name
            ),
            None => println!("No deployments in environment '{}'", env_name),
        }
    } else {
        output.row(&[20, 24, 10], &["NAME", "RELEASE", "BUILD", "DEPLOY"]);
        output.rule(64);

        for deployment in deployments {
            let build = stage_version(deployment, StageKind::Build);
            let deploy = stage_version(deployment, StageKind::Deploy);
            output.row(
                &[20, 24, 10],
                &[
                    &deployment.name,
                    deployment.release.as_deref().unwrap_or("-"),
                    &build,
                    &deploy,
                ],
            );
        }
    }

    Ok(())
}

fn create_deployment(
    output: &Output,
    path_str: &str,
    env: Option<&str>,
    stage: StageKind,
    raw_inputs: &[String],
) -> Result<()> {
    let inputs = parse_inputs(raw_inputs)?;
    let path: DeploymentPath = path_str.parse()?;

    let workspace = Workspace::open_current()?;
    let mut state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    let existed;
    {
        let environment = state.environment_or_create(env_name)?;
        existed = environment.resolve_path(stage, &path).is_ok();
        let deployment = environment.resolve_path_or_create(stage, &path)?;
        deployment.inputs.extend(inputs);
    }
    workspace.save_state(&state)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "environment": env_name,
            "path": path.to_string(),
            "stage": stage,
            "created": !existed,
        }));
    } else if existed {
        output.success(&format!("Deployment '{}' already exists", path));
    } else {
        output.success(&format!("Created deployment: {}", path));
    }

    Ok(())
}

fn show_deployment(
    output: &Output,
    path_str: &str,
    env: Option<&str>,
    stage: StageKind,
) -> Result<()> {
    let path: DeploymentPath = path_str.parse()?;

    let workspace = Workspace::open_current()?;
    let state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    let environment = state.lookup_environment(env_name)?;
    let deployment = environment.resolve_path(stage, &path)?;
    let effective = environment.effective_providers(stage, &path, stage)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "environment": env_name,
            "path": path.to_string(),
            "deployment": deployment,
            "effective_providers": effective,
        }));
        return Ok(());
    }

    println!("Deployment: {}", deployment.name);
    if let Some(release) = &deployment.release {
        println!("Release:    {}", release);
    }
    if !deployment.inputs.is_empty() {
        println!("Inputs:");
        for (key, value) in &deployment.inputs {
            println!("  {} = {}", key, value);
        }
    }

    for (kind, record) in &deployment.stages {
        println!();
        println!("Stage {}:", kind);
        if record.is_committed() {
            println!("  Version:   {}", record.version);
        } else {
            println!("  Version:   (not committed)");
        }
        if let Some(at) = record.committed_at {
            println!("  Committed: {}", at.to_rfc3339());
        }
        if !record.provides.is_empty() {
            println!("  Provides:  {}", record.provides.join(", "));
        }
        if !record.providers.is_empty() {
            println!("  Providers:");
            for (key, provider) in &record.providers {
                println!("    {} -> {}", key, provider);
            }
        }
        if !record.deployments.is_empty() {
            let nested: Vec<&str> = record.deployments.keys().map(String::as_str).collect();
            println!("  Nested:    {}", nested.join(", "));
        }
    }

    if !effective.is_empty() {
        println!();
        println!("Effective providers ({}):", stage);
        for (key, provider) in &effective {
            println!("  {} -> {}", key, provider);
        }
    }

    Ok(())
}

fn list_providers(output: &Output, interface: Option<&str>, env: Option<&str>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    let environment = state.lookup_environment(env_name)?;

    if let Some(interface) = interface {
        let providers = environment.providers_of_type(interface);

        if output.is_json() {
            output.data(&serde_json::json!({
                "interface": interface,
                "providers": providers,
            }));
        } else if providers.is_empty() {
            println!("No deployments provide '{}'", interface);
        } else {
            println!("{}: {}", interface, providers.join(", "));
        }
        return Ok(());
    }

    let index = environment.providers();

    if output.is_json() {
        output.data(&index);
    } else if index.is_empty() {
        println!("No providers in environment '{}'", env_name);
    } else {
        output.row(&[24], &["INTERFACE", "PROVIDERS"]);
        output.rule(56);

        for (interface, providers) in &index {
            output.row(&[24], &[interface, &providers.join(", ")]);
        }
    }

    Ok(())
}

//! Environment CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::app::parse_inputs;
use super::output::Output;
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum EnvCommands {
    /// List environments
    List,

    /// Create an environment
    ///
    /// Examples:
    ///   flotilla env create dev
    ///   flotilla env create prod -i region=eu-west-1 -i replicas=3
    Create {
        /// Environment name
        name: String,

        /// Environment-level input as key=value (value parsed as JSON if possible)
        #[arg(long, short = 'i')]
        input: Vec<String>,
    },
}

pub fn run(cmd: EnvCommands, output: &Output) -> Result<()> {
    match cmd {
        EnvCommands::List => list_environments(output),
        EnvCommands::Create { name, input } => create_environment(output, &name, &input),
    }
}

fn list_environments(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let state = workspace.load_state()?;

    if output.is_json() {
        let items: Vec<_> = state
            .environments
            .values()
            .map(|env| {
                serde_json::json!({
                    "name": env.name,
                    "deployments": env.deployments.len(),
                    "inputs": env.inputs,
                })
            })
            .collect();
        output.data(&items);
    } else if state.environments.is_empty() {
        println!("No environments");
    } else {
        output.row(&[20], &["NAME", "DEPLOYMENTS"]);
        output.rule(40);

        for env in state.environments.values() {
            output.row(&[20], &[&env.name, &env.deployments.len().to_string()]);
        }
    }

    Ok(())
}

fn create_environment(output: &Output, name: &str, raw_inputs: &[String]) -> Result<()> {
    let inputs = parse_inputs(raw_inputs)?;

    let workspace = Workspace::open_current()?;
    let mut state = workspace.load_state()?;

    let existed = state.environment(name).is_some();
    {
        let env = state.environment_or_create(name)?;
        env.inputs.extend(inputs);
    }
    workspace.save_state(&state)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": name,
            "created": !existed,
        }));
    } else if existed {
        output.success(&format!("Environment '{}' already exists", name));
    } else {
        output.success(&format!("Created environment: {}", name));
    }

    Ok(())
}

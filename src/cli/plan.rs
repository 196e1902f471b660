//! Plan and input queries
//!
//! Read-only views over the state document: the dependency-ordered
//! deployment plan for an environment, and the effective inputs one
//! deployment would run with.

use anyhow::Result;

use super::output::Output;
use crate::domain::{DeploymentPath, StageKind};
use crate::storage::Workspace;

/// Show the deployment order for an environment
pub fn plan(output: &Output, env: Option<&str>, stage: StageKind) -> Result<()> {
    let workspace = Workspace::open_current()?;
    output.verbose_ctx(
        "plan",
        &format!("Opened workspace at: {}", workspace.root().display()),
    );

    let state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());
    let environment = state.lookup_environment(env_name)?;

    let graph = environment.deployment_graph(stage)?;
    let order = graph.deployment_order()?;
    output.verbose_ctx(
        "plan",
        &format!("Graph has {} deployments, {} roots", graph.len(), graph.roots().len()),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "environment": env_name,
            "stage": stage,
            "roots": graph.roots(),
            "order": order,
        }));
    } else if order.is_empty() {
        println!(
            "No deployments with a {} stage in environment '{}'",
            stage, env_name
        );
    } else {
        println!("Deployment order for '{}' ({} stage):", env_name, stage);
        println!("{}", "-".repeat(48));

        for (position, name) in order.iter().enumerate() {
            let dependencies = graph.dependencies(name);
            if dependencies.is_empty() {
                println!("{:>3}. {} (root)", position + 1, name);
            } else {
                println!(
                    "{:>3}. {} (after {})",
                    position + 1,
                    name,
                    dependencies.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Show the effective inputs for one deployment
pub fn inputs(output: &Output, path_str: &str, env: Option<&str>, stage: StageKind) -> Result<()> {
    let path: DeploymentPath = path_str.parse()?;

    let workspace = Workspace::open_current()?;
    let state = workspace.load_state()?;
    let env_name = env.unwrap_or_else(|| workspace.default_environment());

    let resolved = state.pre_step_inputs(env_name, stage, &path, stage)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "environment": env_name,
            "path": path.to_string(),
            "stage": stage,
            "inputs": resolved,
        }));
    } else if resolved.is_empty() {
        println!("No inputs for '{}' in environment '{}'", path, env_name);
    } else {
        println!("Inputs for '{}' ({} stage):", path, stage);
        for (key, value) in &resolved {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

//! Project state: the root of the state document
//!
//! A project owns its environments and the project-level input defaults that
//! sit at the bottom of the input inheritance stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::environment::{EnvironmentState, StateError};
use super::name::{validate_environment_name, NameError};
use super::path::DeploymentPath;
use super::stage::StageKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default)]
    pub name: String,

    /// Project-level input defaults, overridden by every other layer
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, serde_json::Value>,

    /// Environments by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, EnvironmentState>,
}

impl ProjectState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Pure lookup of an environment
    pub fn environment(&self, name: &str) -> Option<&EnvironmentState> {
        self.environments.get(name)
    }

    pub fn lookup_environment(&self, name: &str) -> Result<&EnvironmentState, StateError> {
        self.environments
            .get(name)
            .ok_or_else(|| StateError::EnvironmentDoesNotExist(name.to_string()))
    }

    pub fn environment_mut(&mut self, name: &str) -> Option<&mut EnvironmentState> {
        self.environments.get_mut(name)
    }

    /// Creates an empty environment on first reference
    pub fn environment_or_create(
        &mut self,
        name: &str,
    ) -> Result<&mut EnvironmentState, NameError> {
        validate_environment_name(name)?;
        Ok(self
            .environments
            .entry(name.to_string())
            .or_insert_with(|| EnvironmentState {
                name: name.to_string(),
                ..EnvironmentState::default()
            }))
    }

    /// Effective input variables for one deployment and stage: project
    /// defaults underneath the environment's layering
    pub fn pre_step_inputs(
        &self,
        environment: &str,
        nested_under: StageKind,
        path: &DeploymentPath,
        stage: StageKind,
    ) -> Result<BTreeMap<String, serde_json::Value>, StateError> {
        let env = self.lookup_environment(environment)?;
        let mut inputs = self.inputs.clone();
        inputs.extend(env.pre_step_inputs(nested_under, path, stage)?);
        Ok(inputs)
    }

    /// Repairs a freshly deserialized document: every environment (and the
    /// deployment trees below) gets its name from its map key, validated
    pub fn validate_and_fix(&mut self) -> Result<(), NameError> {
        for (env_name, env) in self.environments.iter_mut() {
            env.validate_and_fix(env_name)?;
        }
        Ok(())
    }
}

//! Environment state: root deployments, provider resolution, addressing
//!
//! An environment owns its root deployments; nested dependency deployments
//! hang off their parent's stage records. All operations address deployments
//! top-down through a [`DeploymentPath`] plus the stage kind the nesting was
//! created under, so no record needs a pointer back to its owner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::deployment::DeploymentState;
use super::name::{validate_deployment_name, validate_environment_name, NameError};
use super::path::DeploymentPath;
use super::release::ReleaseMetadata;
use super::stage::StageKind;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Deployment '{0}' does not exist")]
    DeploymentDoesNotExist(String),

    #[error("Environment '{0}' does not exist")]
    EnvironmentDoesNotExist(String),

    #[error("Failed to resolve '{path}' for stage '{stage}': deployment '{segment}' was not created under this stage")]
    PathResolve {
        stage: StageKind,
        path: String,
        segment: String,
    },

    #[error("Missing provider of type '{interface}'. This can be configured using the -p / --provider flag.")]
    MissingProvider { interface: String },

    #[error("Missing provider '{name}' of type '{interface}'. This can be configured using the -p / --provider flag.")]
    MissingNamedProvider { name: String, interface: String },

    #[error(transparent)]
    Name(#[from] NameError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Matches the key under which this environment is stored
    #[serde(default)]
    pub name: String,

    /// Environment-level input defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, serde_json::Value>,

    /// Root deployments by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployments: BTreeMap<String, DeploymentState>,
}

impl EnvironmentState {
    pub fn new(name: &str) -> Result<Self, NameError> {
        validate_environment_name(name)?;
        Ok(Self {
            name: name.to_string(),
            ..Self::default()
        })
    }

    /// Pure lookup of a root deployment
    pub fn deployment(&self, name: &str) -> Option<&DeploymentState> {
        self.deployments.get(name)
    }

    /// Lookup that reports absence as an error
    pub fn lookup_deployment(&self, name: &str) -> Result<&DeploymentState, StateError> {
        self.deployments
            .get(name)
            .ok_or_else(|| StateError::DeploymentDoesNotExist(name.to_string()))
    }

    /// Creates an empty root deployment on first reference
    pub fn deployment_or_create(&mut self, name: &str) -> Result<&mut DeploymentState, NameError> {
        validate_deployment_name(name)?;
        Ok(self
            .deployments
            .entry(name.to_string())
            .or_insert_with(|| DeploymentState {
                name: name.to_string(),
                ..DeploymentState::default()
            }))
    }

    /// Resolves a path without creating anything. The root segment is looked
    /// up directly; every later segment must have been nested under `stage`.
    pub fn resolve_path(
        &self,
        stage: StageKind,
        path: &DeploymentPath,
    ) -> Result<&DeploymentState, StateError> {
        let mut current = self.lookup_deployment(path.root_name())?;
        for segment in &path.segments()[1..] {
            current = current
                .dependency(stage, segment)
                .ok_or_else(|| StateError::PathResolve {
                    stage,
                    path: path.to_string(),
                    segment: segment.clone(),
                })?;
        }
        Ok(current)
    }

    fn resolve_path_mut(
        &mut self,
        stage: StageKind,
        path: &DeploymentPath,
    ) -> Result<&mut DeploymentState, StateError> {
        let mut current = self
            .deployments
            .get_mut(path.root_name())
            .ok_or_else(|| StateError::DeploymentDoesNotExist(path.root_name().to_string()))?;
        for segment in &path.segments()[1..] {
            current = current
                .stage_mut(stage)
                .and_then(|s| s.deployments.get_mut(segment.as_str()))
                .ok_or_else(|| StateError::PathResolve {
                    stage,
                    path: path.to_string(),
                    segment: segment.clone(),
                })?;
        }
        Ok(current)
    }

    /// Mutating twin of [`resolve_path`]: creates every missing deployment
    /// along the way, nesting each one under `stage`.
    pub fn resolve_path_or_create(
        &mut self,
        stage: StageKind,
        path: &DeploymentPath,
    ) -> Result<&mut DeploymentState, NameError> {
        let mut current = self.deployment_or_create(path.root_name())?;
        for segment in &path.segments()[1..] {
            current = current.dependency_or_create(stage, segment)?;
        }
        Ok(current)
    }

    /// The effective provider map of the deployment at `path`: its own
    /// bindings for `stage`, with the parent's bindings for the stage of
    /// nesting filled in underneath. The parent only ever supplies defaults;
    /// it never overrides a binding the deployment holds itself. A deployment
    /// nested under a parent's build stage sees that build context whichever
    /// stage is queried.
    pub fn effective_providers(
        &self,
        nested_under: StageKind,
        path: &DeploymentPath,
        stage: StageKind,
    ) -> Result<BTreeMap<String, String>, StateError> {
        let deployment = self.resolve_path(nested_under, path)?;
        let mut providers = match path.parent() {
            Some(parent_path) => self
                .resolve_path(nested_under, &parent_path)?
                .stage_providers(nested_under),
            None => BTreeMap::new(),
        };
        providers.extend(deployment.stage_providers(stage));
        Ok(providers)
    }

    /// Populates the stage's provider bindings for every interface the given
    /// release consumes. Per binding key the first match wins: an existing
    /// binding, then `extra`, then a binding inherited from the nesting
    /// parent, then a root deployment named like the key itself. The last
    /// fallback never binds a root deployment to itself.
    ///
    /// All keys are resolved before the stage is touched; on error the
    /// document is left unchanged. Keys no longer consumed by the release are
    /// dropped in the same step.
    pub fn configure_providers(
        &mut self,
        nested_under: StageKind,
        path: &DeploymentPath,
        stage: StageKind,
        metadata: &ReleaseMetadata,
        extra: &BTreeMap<String, String>,
    ) -> Result<(), StateError> {
        let own = self.resolve_path(nested_under, path)?.stage_providers(stage);
        let inherited = match path.parent() {
            Some(parent_path) => self
                .resolve_path(nested_under, &parent_path)?
                .stage_providers(nested_under),
            None => BTreeMap::new(),
        };

        let mut resolved = BTreeMap::new();
        for consumed in &metadata.consumes {
            let key = consumed.binding_key();
            let self_named = path.is_root() && path.root_name() == key;
            let binding = if let Some(existing) = own.get(key) {
                existing.clone()
            } else if let Some(supplied) = extra.get(key) {
                supplied.clone()
            } else if let Some(default) = inherited.get(key) {
                default.clone()
            } else if self.deployments.contains_key(key) && !self_named {
                key.to_string()
            } else {
                return Err(match consumed.alias() {
                    Some(alias) => StateError::MissingNamedProvider {
                        name: alias.to_string(),
                        interface: consumed.interface().to_string(),
                    },
                    None => StateError::MissingProvider {
                        interface: consumed.interface().to_string(),
                    },
                });
            };
            resolved.insert(key.to_string(), binding);
        }

        let deployment = self.resolve_path_mut(nested_under, path)?;
        deployment.stage_or_create(stage).providers = resolved;
        Ok(())
    }

    /// Effective input variables for the deployment at `path`, without the
    /// project-level defaults (the project owner layers those underneath).
    /// Lowest to highest: environment inputs, the deployment's own inputs,
    /// each ancestor's build-stage inputs from the root down, and finally the
    /// queried stage's own input overrides. Nested dependencies thereby see
    /// the variable values their ancestors computed at build time, whichever
    /// stage is being queried.
    pub fn pre_step_inputs(
        &self,
        nested_under: StageKind,
        path: &DeploymentPath,
        stage: StageKind,
    ) -> Result<BTreeMap<String, serde_json::Value>, StateError> {
        let mut chain = Vec::with_capacity(path.depth());
        let mut current = self.lookup_deployment(path.root_name())?;
        chain.push(current);
        for segment in &path.segments()[1..] {
            current = current
                .dependency(nested_under, segment)
                .ok_or_else(|| StateError::PathResolve {
                    stage: nested_under,
                    path: path.to_string(),
                    segment: segment.clone(),
                })?;
            chain.push(current);
        }

        let target = chain[chain.len() - 1];
        let mut inputs = self.inputs.clone();
        inputs.extend(target.inputs.clone());
        for ancestor in &chain[..chain.len() - 1] {
            if let Some(build) = ancestor.stage(StageKind::Build) {
                inputs.extend(build.inputs.clone());
            }
        }
        if let Some(record) = target.stage(stage) {
            inputs.extend(record.inputs.clone());
        }
        Ok(inputs)
    }

    /// Interface type to the root deployments whose committed deploy stage
    /// provides it, names sorted
    pub fn providers(&self) -> BTreeMap<String, Vec<String>> {
        let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, deployment) in &self.deployments {
            if let Some(stage) = deployment.stage(StageKind::Deploy) {
                for interface in &stage.provides {
                    result.entry(interface.clone()).or_default().push(name.clone());
                }
            }
        }
        result
    }

    pub fn providers_of_type(&self, interface: &str) -> Vec<String> {
        self.providers().remove(interface).unwrap_or_default()
    }

    /// Repairs a freshly deserialized record; map keys are authoritative
    pub fn validate_and_fix(&mut self, name_from_key: &str) -> Result<(), NameError> {
        validate_environment_name(name_from_key)?;
        self.name = name_from_key.to_string();
        for (deployment_name, deployment) in self.deployments.iter_mut() {
            deployment.validate_and_fix(deployment_name)?;
        }
        Ok(())
    }
}

//! Deployment state: one named instance of a releasable unit
//!
//! Deployments live either at the root of an environment or nested under a
//! parent deployment's stage as dependency deployments. The tree is owned
//! strictly top-down; a deployment never points back at its parent, it is
//! addressed by environment name, path and stage instead.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::name::{validate_deployment_name, NameError};
use super::release::ReleaseMetadata;
use super::stage::{StageKind, StageState};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    /// Matches the key under which this deployment is stored
    #[serde(default)]
    pub name: String,

    /// Qualified name of the last committed release, `{project}/{name}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// Deployment-level input overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, serde_json::Value>,

    /// Stage records, at most one per stage kind
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stages: BTreeMap<StageKind, StageState>,
}

impl DeploymentState {
    pub fn new(name: &str) -> Result<Self, NameError> {
        validate_deployment_name(name)?;
        Ok(Self {
            name: name.to_string(),
            ..Self::default()
        })
    }

    /// Pure lookup of a stage record
    pub fn stage(&self, kind: StageKind) -> Option<&StageState> {
        self.stages.get(&kind)
    }

    pub fn stage_mut(&mut self, kind: StageKind) -> Option<&mut StageState> {
        self.stages.get_mut(&kind)
    }

    /// Creates an empty stage record on first use
    pub fn stage_or_create(&mut self, kind: StageKind) -> &mut StageState {
        self.stages.entry(kind).or_default()
    }

    /// Pure lookup of a dependency deployment nested under `kind`
    pub fn dependency(&self, kind: StageKind, name: &str) -> Option<&DeploymentState> {
        self.stage(kind)?.deployments.get(name)
    }

    /// Creates the stage record and the named dependency deployment as needed
    pub fn dependency_or_create(
        &mut self,
        kind: StageKind,
        name: &str,
    ) -> Result<&mut DeploymentState, NameError> {
        validate_deployment_name(name)?;
        let stage = self.stage_or_create(kind);
        Ok(stage
            .deployments
            .entry(name.to_string())
            .or_insert_with(|| DeploymentState {
                name: name.to_string(),
                ..DeploymentState::default()
            }))
    }

    /// Records a committed release into the stage: version, provided
    /// interfaces and the release identity. Until this runs, the stage
    /// provides nothing and cannot satisfy any consumer.
    pub fn commit_version(&mut self, kind: StageKind, metadata: &ReleaseMetadata) {
        self.release = Some(metadata.qualified_name());
        let stage = self.stage_or_create(kind);
        stage.version = metadata.version.clone();
        stage.provides = metadata.provides.clone();
        stage.committed_at = Some(Utc::now());
    }

    /// The deployment's own provider bindings for a stage; empty when the
    /// stage record is absent. Inherited bindings are resolved one level up,
    /// where the nesting context is known.
    pub fn stage_providers(&self, kind: StageKind) -> BTreeMap<String, String> {
        self.stage(kind)
            .map(|s| s.providers.clone())
            .unwrap_or_default()
    }

    /// Repairs a freshly deserialized record: the map key is authoritative
    /// for the name, and every name in the subtree must be valid.
    pub fn validate_and_fix(&mut self, name_from_key: &str) -> Result<(), NameError> {
        validate_deployment_name(name_from_key)?;
        self.name = name_from_key.to_string();
        for stage in self.stages.values_mut() {
            for (child_name, child) in stage.deployments.iter_mut() {
                child.validate_and_fix(child_name)?;
            }
        }
        Ok(())
    }
}

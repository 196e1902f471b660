//! Per-deployment, per-stage state
//!
//! A deployment runs in two stages, `build` and `deploy`. Each stage record
//! carries the committed release version, the interfaces that release
//! provides, the provider bindings for the interfaces it consumes, stage
//! input overrides, and the dependency deployments nested under the stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::deployment::DeploymentState;

#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("Invalid stage '{0}'. Expected 'build' or 'deploy'")]
    InvalidStage(String),
}

/// The two phases a deployment goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Build,
    Deploy,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Build => "build",
            StageKind::Deploy => "deploy",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "build" => Ok(StageKind::Build),
            "deploy" => Ok(StageKind::Deploy),
            other => Err(StageError::InvalidStage(other.to_string())),
        }
    }
}

/// State of one stage of one deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    /// Committed release version; empty until a release is committed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Interface types the committed release provides, verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,

    /// Binding key (alias or interface type) to provider deployment name.
    /// These entries are the dependency edges of the environment graph.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, String>,

    /// Stage-level input overrides; the highest-precedence input layer
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, serde_json::Value>,

    /// Dependency deployments created under this stage, by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployments: BTreeMap<String, DeploymentState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<DateTime<Utc>>,
}

impl StageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a release version has been committed into this stage
    pub fn is_committed(&self) -> bool {
        !self.version.is_empty()
    }

    /// True if the committed release provides the given interface type
    pub fn provides_interface(&self, interface: &str) -> bool {
        self.provides.iter().any(|p| p == interface)
    }
}

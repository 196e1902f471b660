//! Release metadata: the unit a deployment commits and consumes from
//!
//! A release is identified by `{project}/{name}` where `_` is the default
//! project namespace. Its `provides` list names the interface types the
//! release exposes; its `consumes` list names the interface types it needs,
//! each optionally renamed with `type as alias`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Project namespace used when a release does not declare one
pub const DEFAULT_PROJECT: &str = "_";

#[derive(Debug, Error, PartialEq)]
pub enum ReleaseError {
    #[error("Missing name field in release metadata")]
    MissingName,

    #[error("Missing version field in release metadata")]
    MissingVersion,

    #[error("Invalid consumed interface '{0}'. Expected 'type' or 'type as alias'")]
    InvalidConsumedInterface(String),
}

/// One consumed-interface declaration: an interface type plus an optional
/// alias under which the provider is bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConsumedInterface {
    interface: String,
    alias: Option<String>,
}

impl ConsumedInterface {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            alias: None,
        }
    }

    pub fn with_alias(interface: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The key under which a provider is looked up and stored: the alias if
    /// declared, the interface type otherwise
    pub fn binding_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.interface)
    }
}

impl fmt::Display for ConsumedInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} as {}", self.interface, alias),
            None => write!(f, "{}", self.interface),
        }
    }
}

impl FromStr for ConsumedInterface {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [interface] => Ok(Self::new(*interface)),
            [interface, "as", alias] => Ok(Self::with_alias(*interface, *alias)),
            _ => Err(ReleaseError::InvalidConsumedInterface(s.to_string())),
        }
    }
}

impl TryFrom<String> for ConsumedInterface {
    type Error = ReleaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConsumedInterface> for String {
    fn from(c: ConsumedInterface) -> Self {
        c.to_string()
    }
}

/// Read-only description of a release, as committed into a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    #[serde(default = "default_project")]
    pub project: String,

    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<ConsumedInterface>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

impl ReleaseMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: default_project(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            provides: Vec::new(),
            consumes: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// `{project}/{name}`, e.g. `_/archive` for the default namespace
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.project, self.name)
    }

    /// `{project}/{name}-v{version}`
    pub fn release_id(&self) -> String {
        format!("{}/{}-v{}", self.project, self.name, self.version)
    }

    /// Rejects metadata missing its identifying fields. Deserialized
    /// documents must pass through here before being committed.
    pub fn validate(&self) -> Result<(), ReleaseError> {
        if self.name.is_empty() {
            return Err(ReleaseError::MissingName);
        }
        if self.version.is_empty() {
            return Err(ReleaseError::MissingVersion);
        }
        Ok(())
    }
}

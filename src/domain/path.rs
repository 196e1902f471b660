//! Colon-delimited addresses for nested deployments
//!
//! `gateway:redis` names the deployment `redis` nested under the root
//! deployment `gateway`. The stage under which nesting happened is not part
//! of the path; lookups carry it separately.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::name::{validate_deployment_name, NameError};

/// Path from a root deployment down to a nested deployment. Always holds at
/// least one segment; every segment is a valid deployment name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeploymentPath {
    segments: Vec<String>,
}

impl DeploymentPath {
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, NameError> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(NameError::InvalidDeploymentName(String::new()));
        }
        for segment in &segments {
            validate_deployment_name(segment)?;
        }
        Ok(Self { segments })
    }

    pub fn root_name(&self) -> &str {
        &self.segments[0]
    }

    /// The final segment: the deployment the path addresses
    pub fn leaf_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the path addresses a root deployment directly
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path to the enclosing deployment, or None for a root path
    pub fn parent(&self) -> Option<DeploymentPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for DeploymentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(":"))
    }
}

impl FromStr for DeploymentPath {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim().split(':'))
    }
}

impl TryFrom<String> for DeploymentPath {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeploymentPath> for String {
    fn from(path: DeploymentPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_segment() {
        let path: DeploymentPath = "archive-release".parse().unwrap();
        assert!(path.is_root());
        assert_eq!(path.root_name(), "archive-release");
        assert_eq!(path.leaf_name(), "archive-release");
        assert_eq!(path.depth(), 1);
        assert!(path.parent().is_none());
    }

    #[test]
    fn parses_nested_segments() {
        let path: DeploymentPath = "a:b:c".parse().unwrap();
        assert_eq!(path.segments(), &["a", "b", "c"]);
        assert_eq!(path.root_name(), "a");
        assert_eq!(path.leaf_name(), "c");
        assert_eq!(path.parent().unwrap().to_string(), "a:b");
    }

    #[test]
    fn rejects_empty_and_invalid_segments() {
        assert!("".parse::<DeploymentPath>().is_err());
        assert!("a::b".parse::<DeploymentPath>().is_err());
        assert!("a:".parse::<DeploymentPath>().is_err());
        assert!("a:b c".parse::<DeploymentPath>().is_err());
        assert!("$:b".parse::<DeploymentPath>().is_err());
    }

    #[test]
    fn display_roundtrip() {
        for s in ["x", "a:b", "a:b:c"] {
            let path: DeploymentPath = s.parse().unwrap();
            assert_eq!(path.to_string(), s);
        }
    }

    #[test]
    fn serde_uses_string_form() {
        let path: DeploymentPath = "a:b".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"a:b\"");
        let back: DeploymentPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}

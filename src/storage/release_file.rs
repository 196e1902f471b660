//! Release metadata files
//!
//! A release is described by a small YAML or JSON document at the workspace
//! root (`release.yml` by default). The format is picked by file extension.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::ReleaseMetadata;

#[derive(Debug, Error)]
pub enum ReleaseFileError {
    #[error("Unsupported release file extension '{0}'. Expected .yml, .yaml or .json")]
    UnsupportedExtension(String),
}

/// Reads and validates release metadata from `path`
pub fn load_release_file(path: &Path) -> Result<ReleaseMetadata> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read release file: {}", path.display()))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let metadata: ReleaseMetadata = match extension {
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse release file: {}", path.display()))?,
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse release file: {}", path.display()))?,
        other => return Err(ReleaseFileError::UnsupportedExtension(other.to_string()).into()),
    };

    metadata
        .validate()
        .with_context(|| format!("Invalid release file: {}", path.display()))?;

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_yaml_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.yml");
        fs::write(
            &path,
            r#"
name: archive
version: "0.1"
provides:
  - archive
consumes:
  - kubernetes
  - postgres as db
"#,
        )
        .unwrap();

        let metadata = load_release_file(&path).unwrap();
        assert_eq!(metadata.name, "archive");
        assert_eq!(metadata.version, "0.1");
        assert_eq!(metadata.provides, vec!["archive"]);
        assert_eq!(metadata.consumes[1].binding_key(), "db");
    }

    #[test]
    fn loads_json_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.json");
        fs::write(
            &path,
            r#"{"project": "prj", "name": "archive", "version": "0.1"}"#,
        )
        .unwrap();

        let metadata = load_release_file(&path).unwrap();
        assert_eq!(metadata.qualified_name(), "prj/archive");
    }

    #[test]
    fn rejects_metadata_without_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.yml");
        fs::write(&path, "name: archive\n").unwrap();

        let err = load_release_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid release file"));
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.toml");
        fs::write(&path, "name = \"archive\"\n").unwrap();

        let err = load_release_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported release file extension"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.yml");

        let err = load_release_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read release file"));
    }
}

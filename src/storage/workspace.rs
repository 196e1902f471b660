//! Workspace management
//!
//! Handles workspace initialization and provides access to the state store
//! and configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::{ProjectState, DEFAULT_PROJECT};

use super::{Config, StateStore};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a flotilla workspace. Run 'flotilla init' first.")]
    NotInWorkspace,
}

/// A Flotilla workspace: the directory tree holding one project's state
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let flotilla_dir = root.join(".flotilla");

        if !flotilla_dir.is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a new workspace at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let flotilla_dir = root.join(".flotilla");

        fs::create_dir_all(&flotilla_dir).with_context(|| {
            format!(
                "Failed to create .flotilla directory: {}",
                flotilla_dir.display()
            )
        })?;

        // Default config, with the project named after the directory
        let config_path = flotilla_dir.join("config.toml");
        if !config_path.exists() {
            let canonical = root.canonicalize().unwrap_or_else(|_| root.clone());
            let project_name = canonical
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(DEFAULT_PROJECT);

            let default_config = format!(
                r#"# Flotilla configuration

[project]
name = "{}"
default_environment = "dev"

[release]
file = "release.yml"
"#,
                project_name
            );
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for .flotilla
        let gitignore_path = flotilla_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Ignore in-flight write buffers\n*.tmp\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let workspace = Self::open(root)?;

        // Seed an empty state document so the first command finds one
        let store = workspace.state_store();
        if !store.path().exists() {
            store.save(&ProjectState::new(workspace.project_name()))?;
        }

        Ok(workspace)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .flotilla directory path
    pub fn flotilla_dir(&self) -> PathBuf {
        self.root.join(".flotilla")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the configured project name
    pub fn project_name(&self) -> &str {
        &self.config.workspace.project.name
    }

    /// Returns the environment used when no `--environment` flag is given
    pub fn default_environment(&self) -> &str {
        &self.config.workspace.project.default_environment
    }

    /// Returns the configured release metadata path
    pub fn release_path(&self) -> PathBuf {
        self.root.join(&self.config.workspace.release.file)
    }

    /// Returns the state store
    pub fn state_store(&self) -> StateStore {
        StateStore::for_workspace(&self.root)
    }

    /// Reads the state document, starting a fresh one when absent
    pub fn load_state(&self) -> Result<ProjectState> {
        self.state_store().load_or_new(self.project_name())
    }

    /// Writes the state document
    pub fn save_state(&self, state: &ProjectState) -> Result<()> {
        self.state_store().save(state)
    }
}

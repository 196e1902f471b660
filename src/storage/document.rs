//! JSON document storage for the deployment state tree
//!
//! The whole project state lives in `.flotilla/state.json` as one
//! pretty-printed JSON document. Uses file locking for concurrent access
//! safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::ProjectState;

/// Store for the project state document
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a new state store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a workspace
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(".flotilla").join("state.json"))
    }

    /// Returns the path to the state document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the state document, or `None` when no document exists yet.
    /// Names in the loaded tree are reconciled against their map keys
    /// before the state is handed out.
    pub fn load(&self) -> Result<Option<ProjectState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open state document: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on state document")?;

        let reader = BufReader::new(&file);
        let mut state: ProjectState = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse state document: {}", self.path.display()))?;

        state
            .validate_and_fix()
            .with_context(|| format!("Invalid state document: {}", self.path.display()))?;

        // Lock is released when file is dropped
        Ok(Some(state))
    }

    /// Reads the state document, or starts a fresh one named `project_name`
    pub fn load_or_new(&self, project_name: &str) -> Result<ProjectState> {
        Ok(self
            .load()?
            .unwrap_or_else(|| ProjectState::new(project_name)))
    }

    /// Writes the state document (full rewrite)
    pub fn save(&self, state: &ProjectState) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on state document")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, state)
                .context("Failed to serialize state document")?;
            writeln!(writer).context("Failed to write state document")?;

            writer.flush().context("Failed to flush state document")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

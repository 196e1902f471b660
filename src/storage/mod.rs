//! # Storage Layer
//!
//! Persistence layer for Flotilla with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Deployment state | Pretty-printed JSON | `.flotilla/state.json` |
//! | Config | TOML | `.flotilla/config.toml` |
//! | Release metadata | YAML or JSON | `release.yml` (configurable) |
//!
//! ## Concurrency Safety
//!
//! - [`StateStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Workspace Structure
//!
//! ```text
//! .flotilla/
//! ├── state.json            # Deployment state tree for every environment
//! ├── config.toml           # Workspace configuration
//! └── .gitignore            # Ignores in-flight write buffers
//! release.yml               # Release metadata for this workspace
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a Flotilla workspace
//! - [`StateStore`] - Read/write the deployment state document
//! - [`Config`] - Workspace and global configuration

mod config;
mod document;
mod release_file;
mod workspace;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, WorkspaceConfig};
pub use document::StateStore;
pub use release_file::{load_release_file, ReleaseFileError};
pub use workspace::{Workspace, WorkspaceError};

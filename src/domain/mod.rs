//! Domain models for Flotilla
//!
//! Contains the deployment state tree and dependency resolution logic
//! without any I/O concerns.

mod deployment;
mod diff;
mod environment;
mod graph;
mod name;
mod path;
mod project;
mod release;
mod stage;

pub use deployment::DeploymentState;
pub use diff::{diff, Change, ChangeKind};
pub use environment::{EnvironmentState, StateError};
pub use graph::{DeploymentGraph, GraphError};
pub use name::{validate_deployment_name, validate_environment_name, NameError};
pub use path::DeploymentPath;
pub use project::ProjectState;
pub use release::{ConsumedInterface, ReleaseError, ReleaseMetadata, DEFAULT_PROJECT};
pub use stage::{StageError, StageKind, StageState};

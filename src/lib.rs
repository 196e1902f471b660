//! Flotilla - A local-first deployment state and dependency resolution tool
//!
//! Flotilla tracks what is deployed where: per environment, a tree of
//! deployments with build and deploy stage records, provider bindings
//! between them, and layered input variables. A dependency graph over the
//! provider bindings yields the order deployments must run in.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{
    DeploymentGraph, DeploymentPath, DeploymentState, EnvironmentState, ProjectState,
    ReleaseMetadata, StageKind,
};

//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace management | `init` |
//! | Env | Environment lifecycle | `env list`, `env create` |
//! | Deployment | Deployment records | `deployment create`, `deployment show` |
//! | Release | Release metadata | `release commit`, `release configure`, `release diff` |
//! | Query | Graph and input queries | `plan`, `inputs` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! flotilla --verbose plan
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod deployment;
mod environment;
mod output;
mod plan;
mod release_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};

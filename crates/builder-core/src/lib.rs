//! Builder Core - build, validation and release pipeline for turbobuilder projects
//!
//! A project is described by its `turbobuilder.json` setup file. The library
//! turns a [`RunRequest`] into an ordered [`Plan`] and executes each step
//! sequentially, shelling out to external tools through the
//! [`runtime::ProcessRunner`] seam.
//!
//! # Architecture
//!
//! - **setup**: typed setup models, release overrides, wildcard tables
//! - **templates**: template retrieval and copying for `--generate`
//! - **validate**: structure, setup and file content rules
//! - **runtime**: process execution and tool detection
//! - **steps**: build, minify, release extras, sync, test, docker, clean
//! - **pipeline**: planning and execution
//!
//! # Example Usage
//!
//! ```ignore
//! use builder_core::{run, RunOptions, RunRequest, SystemRunner};
//!
//! let request = RunRequest { build: true, ..RunRequest::default() };
//! let options = RunOptions::new(".", "0.1.0");
//! run(&request, &options, &SystemRunner).await?;
//! ```

pub mod error;
pub mod fsutil;
pub mod pipeline;
pub mod project;
pub mod runtime;
pub mod setup;
pub mod steps;
pub mod templates;
pub mod validate;

pub use error::BuildError;
pub use pipeline::{run, Plan, ProjectContext, RunOptions, RunRequest, RunSummary, Step};
pub use project::{ProjectLayout, ProjectType};
pub use runtime::{ProcessRunner, SystemRunner};
pub use setup::BuilderSetup;

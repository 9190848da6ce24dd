//! Process execution and external tool management
//!
//! This module provides:
//! - The `ProcessRunner` seam and its real implementation
//! - Detection of the build tools the pipeline shells out to

pub mod exec;
pub mod tools;

#[cfg(test)]
pub mod testing;

pub use exec::{run_checked, CommandSpec, ProcessOutput, ProcessRunner, SystemRunner};
pub use tools::{build_number, require_tools, Tool, ToolInfo};

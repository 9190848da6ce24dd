//! Typed failure classes reported by the pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a turbobuilder run
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{} setup file not found in {}", .file, .dir.display())]
    SetupNotFound { file: &'static str, dir: PathBuf },

    #[error("Invalid setup file {}: {message}", .path.display())]
    InvalidSetup { path: PathBuf, message: String },

    #[error("Missing required tools:\n{}", format_list(.0))]
    MissingTools(Vec<String>),

    #[error("Command failed ({}): {command}{}", describe_code(.code), indent_output(.stderr))]
    ToolFailed {
        command: String,
        code: Option<i32>,
        /// Captured error output, empty when the output was streamed
        stderr: String,
    },

    #[error("Validation failed with {} error(s):\n{}", .0.len(), format_list(.0))]
    Validation(Vec<String>),

    #[error("Failed tests:\n{}", format_list(.0))]
    TestsFailed(Vec<String>),

    #[error("{0}")]
    InvalidRequest(String),
}

fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_output(output: &str) -> String {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("\n    {}", line.trim_end()))
        .collect()
}

pub(crate) fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

//! Recording process runner for tests

use super::exec::{CommandSpec, ProcessOutput, ProcessRunner};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Records every command instead of running it.
///
/// All programs are "installed" unless marked missing, and succeed unless
/// marked failing.
#[derive(Debug, Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<CommandSpec>>,
    missing: Vec<String>,
    failing: Vec<String>,
    stdout: HashMap<String, String>,
    stderr: HashMap<String, String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn failing(mut self, program: &str) -> Self {
        self.failing.push(program.to_string());
        self
    }

    /// Canned stdout for a program
    pub fn with_stdout(mut self, program: &str, stdout: &str) -> Self {
        self.stdout.insert(program.to_string(), stdout.to_string());
        self
    }

    /// Canned stderr for a program
    pub fn with_stderr(mut self, program: &str, stderr: &str) -> Self {
        self.stderr.insert(program.to_string(), stderr.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines, rendered as strings
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

impl ProcessRunner for FakeRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        self.calls.lock().unwrap().push(command.clone());

        if self.missing.contains(&command.program) {
            anyhow::bail!("Failed to start {}", command.program);
        }

        let success = !self.failing.contains(&command.program);
        Ok(ProcessOutput {
            code: Some(if success { 0 } else { 1 }),
            success,
            stdout: self
                .stdout
                .get(&command.program)
                .cloned()
                .unwrap_or_default(),
            stderr: self
                .stderr
                .get(&command.program)
                .cloned()
                .unwrap_or_default(),
        })
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.missing.iter().any(|m| m == program) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(program))
        }
    }
}

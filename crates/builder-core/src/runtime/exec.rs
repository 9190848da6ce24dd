//! External process execution
//!
//! Every build tool is reached through the `ProcessRunner` trait so the
//! pipeline can be exercised without the tools installed.

use crate::error::BuildError;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Extra environment variables, never echoed to the console
    pub envs: Vec<(String, String)>,
    /// Collect output instead of streaming it to the console
    pub capture: bool,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            capture: false,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of a finished process
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub code: Option<i32>,
    pub success: bool,
    /// Captured stdout (empty when the output was streamed)
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the pipeline and the operating system
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<ProcessOutput>> + Send;

    /// Resolve a program in PATH
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    async fn run_captured(command: &CommandSpec, mut cmd: TokioCommand) -> Result<ProcessOutput> {
        let child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", command.program))?;

        let output = match command.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    anyhow::anyhow!(
                        "{} did not finish within {} seconds",
                        command,
                        limit.as_secs()
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(ProcessOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Stream stdout/stderr line by line while the child runs
    async fn run_streamed(command: &CommandSpec, mut cmd: TokioCommand) -> Result<ProcessOutput> {
        println!("{} {}", "Running:".dimmed(), command.to_string().yellow());

        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", command.program))?;

        let stdout = child
            .stdout
            .take()
            .context("Failed to capture stdout")?;
        let stderr = child
            .stderr
            .take()
            .context("Failed to capture stderr")?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        let output_task = async {
            let mut stdout_open = true;
            let mut stderr_open = true;
            while stdout_open || stderr_open {
                tokio::select! {
                    line = stdout_reader.next_line(), if stdout_open => {
                        match line {
                            Ok(Some(line)) => println!("  {}", line),
                            Ok(None) => stdout_open = false,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stdout:".red(), e);
                                stdout_open = false;
                            }
                        }
                    }
                    line = stderr_reader.next_line(), if stderr_open => {
                        match line {
                            Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                            Ok(None) => stderr_open = false,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stderr:".red(), e);
                                stderr_open = false;
                            }
                        }
                    }
                }
            }
        };

        if let Some(limit) = command.timeout {
            if timeout(limit, output_task).await.is_err() {
                let _ = child.kill().await;
                anyhow::bail!(
                    "{} did not finish within {} seconds",
                    command,
                    limit.as_secs()
                );
            }
        } else {
            output_task.await;
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for {}", command.program))?;

        Ok(ProcessOutput {
            code: status.code(),
            success: status.success(),
            ..ProcessOutput::default()
        })
    }
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        let program = self
            .locate(&command.program)
            .unwrap_or_else(|| PathBuf::from(&command.program));

        let mut cmd = TokioCommand::new(program);
        cmd.args(&command.args);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.envs {
            cmd.env(key, value);
        }

        if command.capture {
            Self::run_captured(command, cmd).await
        } else {
            Self::run_streamed(command, cmd).await
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Run a command and turn a non-zero exit into `BuildError::ToolFailed`,
/// carrying the captured stderr along
pub async fn run_checked<R: ProcessRunner>(
    runner: &R,
    command: &CommandSpec,
) -> Result<ProcessOutput> {
    let output = runner.run(command).await?;
    if !output.success {
        return Err(BuildError::ToolFailed {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr,
        }
        .into());
    }
    Ok(output)
}

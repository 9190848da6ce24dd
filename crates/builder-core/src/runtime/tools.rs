//! External build tools and their availability

use super::exec::{CommandSpec, ProcessRunner};
use crate::error::BuildError;
use anyhow::Result;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// How long a `--version` probe may take
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tools the pipeline shells out to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Git,
    Npm,
    Tsc,
    Webpack,
    Uglify,
    CleanCss,
    Imagemin,
    PhpDoc,
    PhpUnit,
    Jasmine,
    Angular,
    Docker,
    Lftp,
}

impl Tool {
    /// Binary name looked up in PATH
    pub fn program(&self) -> &'static str {
        match self {
            Tool::Git => "git",
            Tool::Npm => "npm",
            Tool::Tsc => "tsc",
            Tool::Webpack => "webpack",
            Tool::Uglify => "uglifyjs",
            Tool::CleanCss => "cleancss",
            Tool::Imagemin => "imagemin",
            Tool::PhpDoc => "phpdoc",
            Tool::PhpUnit => "phpunit",
            Tool::Jasmine => "jasmine",
            Tool::Angular => "ng",
            Tool::Docker => "docker",
            Tool::Lftp => "lftp",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Git => "Git",
            Tool::Npm => "npm",
            Tool::Tsc => "TypeScript compiler",
            Tool::Webpack => "webpack",
            Tool::Uglify => "UglifyJS",
            Tool::CleanCss => "clean-css",
            Tool::Imagemin => "imagemin",
            Tool::PhpDoc => "phpDocumentor",
            Tool::PhpUnit => "PHPUnit",
            Tool::Jasmine => "Jasmine",
            Tool::Angular => "Angular CLI",
            Tool::Docker => "Docker",
            Tool::Lftp => "lftp",
        }
    }

    /// Where to get the tool when it is missing
    pub fn install_hint(&self) -> &'static str {
        match self {
            Tool::Git => "install from https://git-scm.com",
            Tool::Npm => "install from https://nodejs.org",
            Tool::Tsc => "npm install -g typescript",
            Tool::Webpack => "npm install -g webpack webpack-cli",
            Tool::Uglify => "npm install -g uglify-js",
            Tool::CleanCss => "npm install -g clean-css-cli",
            Tool::Imagemin => "npm install -g imagemin-cli",
            Tool::PhpDoc => "install from https://phpdoc.org",
            Tool::PhpUnit => "install from https://phpunit.de",
            Tool::Jasmine => "npm install -g jasmine",
            Tool::Angular => "npm install -g @angular/cli",
            Tool::Docker => "install from https://docs.docker.com/get-docker",
            Tool::Lftp => "install lftp with your system package manager",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool: Tool,
    pub available: bool,
}

/// Check whether a single tool is installed
pub fn check_tool<R: ProcessRunner>(runner: &R, tool: Tool) -> ToolInfo {
    ToolInfo {
        tool,
        available: runner.locate(tool.program()).is_some(),
    }
}

/// Check every tool and fail listing all missing ones at once
pub fn require_tools<R: ProcessRunner>(runner: &R, tools: &[Tool]) -> Result<Vec<ToolInfo>> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    for tool in tools {
        if results.iter().any(|r: &ToolInfo| r.tool == *tool) {
            continue;
        }
        let info = check_tool(runner, *tool);
        if !info.available {
            missing.push(format!(
                "{} (`{}`: {})",
                tool.display_name(),
                tool.program(),
                tool.install_hint()
            ));
        }
        results.push(info);
    }

    if !missing.is_empty() {
        return Err(BuildError::MissingTools(missing).into());
    }

    Ok(results)
}

/// Build number of the project: the commit count of the current git branch.
///
/// Projects outside a git repository (or without git installed) get 0.
pub async fn build_number<R: ProcessRunner>(runner: &R, root: &Path) -> u64 {
    if runner.locate(Tool::Git.program()).is_none() {
        return 0;
    }

    let command = CommandSpec::new(Tool::Git.program())
        .args(["rev-list", "--count", "HEAD"])
        .current_dir(root)
        .captured()
        .with_timeout(PROBE_TIMEOUT);

    match runner.run(&command).await {
        Ok(out) if out.success => out.stdout.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::FakeRunner;

    #[test]
    fn test_require_tools_lists_all_missing() {
        let runner = FakeRunner::new().missing("tsc").missing("webpack");
        let err = require_tools(&runner, &[Tool::Tsc, Tool::Git, Tool::Webpack]).unwrap_err();
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::MissingTools(missing)) => {
                assert_eq!(missing.len(), 2);
                assert!(missing[0].contains("npm install -g typescript"));
                assert!(missing[1].contains("`webpack`"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_require_tools_deduplicates() {
        let runner = FakeRunner::new();
        let found = require_tools(&runner, &[Tool::Git, Tool::Git, Tool::PhpUnit]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.available));
    }

    #[tokio::test]
    async fn test_build_number_from_git() {
        let runner = FakeRunner::new().with_stdout("git", "42\n");
        assert_eq!(build_number(&runner, Path::new("/work")).await, 42);
        assert_eq!(
            runner.command_lines(),
            vec!["git rev-list --count HEAD".to_string()]
        );
    }

    #[tokio::test]
    async fn test_build_number_without_git_is_zero() {
        let runner = FakeRunner::new().missing("git");
        assert_eq!(build_number(&runner, Path::new("/work")).await, 0);
        assert!(runner.calls().is_empty());

        let broken = FakeRunner::new().failing("git");
        assert_eq!(build_number(&broken, Path::new("/work")).await, 0);
    }
}

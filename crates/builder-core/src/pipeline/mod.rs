//! Request → plan → sequential step execution
//!
//! The first failing step aborts the run.

pub mod context;
pub mod plan;

pub use context::{ProjectContext, RunOptions};
pub use plan::{Plan, RunRequest, Step};

use crate::fsutil;
use crate::runtime::{build_number, ProcessRunner, Tool};
use crate::setup::load_setup;
use crate::steps;
use crate::validate::validate_project;
use anyhow::Result;

/// What a finished run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: Vec<Step>,
    pub warnings: Vec<String>,
}

impl RunSummary {
    fn warn(&mut self, message: String) -> Result<()> {
        cliclack::log::warning(&message)?;
        self.warnings.push(message);
        Ok(())
    }
}

/// Execute everything the request asks for, in plan order
pub async fn run<R: ProcessRunner>(
    request: &RunRequest,
    options: &RunOptions,
    runner: &R,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    if let Some(project_type) = request.generate {
        let plan = Plan::new(request, None)?;
        let step = plan.steps[0];
        cliclack::log::step(step.to_string())?;
        let generated = steps::generate::run(project_type, options).await?;
        cliclack::log::success(format!(
            "Created {} files from the {} template in {}",
            generated.files.len(),
            generated.template,
            options.root.display()
        ))?;
        summary.completed.push(step);
        return Ok(summary);
    }

    let setup = if request.needs_setup() {
        Some(load_setup(&options.root, request.release)?)
    } else {
        None
    };

    let plan = Plan::new(request, setup.as_ref())?;
    for warning in &plan.warnings {
        summary.warn(warning.clone())?;
    }

    let context = match setup {
        Some(setup) => {
            let builds = plan.steps.contains(&Step::Build);
            if builds && !plan.release && runner.locate(Tool::Git.program()).is_none() {
                summary.warn("Git not found, build number set to 0".to_string())?;
            }
            let number = if builds && !plan.release {
                build_number(runner, &options.root).await
            } else {
                0
            };
            Some(ProjectContext::new(setup, plan.release, number, runner, options))
        }
        None => None,
    };

    for step in &plan.steps {
        cliclack::log::step(step.to_string())?;
        let message = match (step, &context) {
            (Step::Clean, _) => {
                if steps::clean::run(&options.root)? {
                    "Deleted target folder".to_string()
                } else {
                    "Nothing to clean".to_string()
                }
            }
            (step, Some(ctx)) => execute(*step, ctx, &mut summary).await?,
            (step, None) => anyhow::bail!("{} needs a loaded turbobuilder.json", step),
        };
        cliclack::log::success(message)?;
        summary.completed.push(*step);
    }

    Ok(summary)
}

async fn execute<R: ProcessRunner>(
    step: Step,
    ctx: &ProjectContext<'_, R>,
    summary: &mut RunSummary,
) -> Result<String> {
    let message = match step {
        Step::Validate => {
            let report = validate_project(
                ctx.root(),
                &ctx.setup,
                ctx.release,
                &ctx.options.cli_version,
            )?;
            for warning in report.into_result()? {
                summary.warn(warning)?;
            }
            "Validation passed".to_string()
        }
        Step::Build => {
            let files = steps::build::run(ctx).await?;
            format!(
                "Built {} {} ({} files) into {}",
                ctx.setup.metadata.name,
                ctx.version,
                files,
                fsutil::display_relative(&ctx.layout.dist(), ctx.root())
            )
        }
        Step::Minify => {
            let minified = steps::minify::run(ctx).await?;
            format!(
                "Minified {} JavaScript and {} CSS files",
                minified.js, minified.css
            )
        }
        Step::OptimizePictures => {
            let count = steps::release::optimize_pictures(ctx).await?;
            format!("Optimized {} pictures", count)
        }
        Step::CodeDocs => {
            steps::release::generate_code_docs(ctx).await?;
            format!(
                "Documentation written to {}",
                fsutil::display_relative(&ctx.layout.docs(), ctx.root())
            )
        }
        Step::PrintTodo => {
            steps::release::print_todo(ctx.root())?;
            "TODO checked".to_string()
        }
        Step::Sync => {
            let synced = steps::sync::run(ctx).await?;
            format!(
                "Synced ({} copied, {} unchanged, {} deleted)",
                synced.copied, synced.unchanged, synced.deleted
            )
        }
        Step::Test => {
            let suites = steps::test::run(ctx).await?;
            format!("{} test suites passed", suites)
        }
        Step::DockerUp => {
            let urls = steps::docker::up(ctx).await?;
            if urls.is_empty() {
                "Containers started".to_string()
            } else {
                format!("Containers started: {}", urls.join(", "))
            }
        }
        Step::DockerDown => {
            let stopped = steps::docker::down(ctx).await?;
            format!("Stopped {} container setups", stopped)
        }
        Step::Clean | Step::Generate(_) => {
            anyhow::bail!("{} cannot run against a loaded project", step)
        }
    };
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::runtime::testing::FakeRunner;
    use crate::validate::test_support::{put, valid_lib_js};

    #[tokio::test]
    async fn test_clean_build_runs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        put(dir.path(), "target/stale.txt", "old");
        let runner = FakeRunner::new().with_stdout("git", "7\n");
        let options = RunOptions::new(dir.path(), "0.1.0");
        let request = RunRequest {
            build: true,
            clean: true,
            ..RunRequest::default()
        };

        let summary = run(&request, &options, &runner).await.unwrap();

        assert_eq!(
            summary.completed,
            vec![Step::Clean, Step::Validate, Step::Build]
        );
        assert!(!dir.path().join("target/stale.txt").exists());
        assert!(dir.path().join("target/demo/dist/js/index.js").is_file());
        assert_eq!(runner.programs(), vec!["git"]);
    }

    #[tokio::test]
    async fn test_validation_failure_stops_before_build() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        std::fs::remove_file(dir.path().join("README.md")).unwrap();
        let runner = FakeRunner::new();
        let options = RunOptions::new(dir.path(), "0.1.0");
        let request = RunRequest {
            build: true,
            ..RunRequest::default()
        };

        let err = run(&request, &options, &runner).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Validation(_))
        ));
        assert!(!dir.path().join("target").exists());
    }

    #[tokio::test]
    async fn test_missing_setup_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new();
        let options = RunOptions::new(dir.path(), "0.1.0");
        let request = RunRequest {
            lint: true,
            ..RunRequest::default()
        };

        let err = run(&request, &options, &runner).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::SetupNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_release_uses_plain_version_and_skips_git() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        put(
            dir.path(),
            "turbobuilder.release.json",
            r#"{ "release": { "minifyJs": false, "minifyCss": false, "optimizePictures": false, "printTodoFile": false } }"#,
        );
        let runner = FakeRunner::new();
        let options = RunOptions::new(dir.path(), "0.1.0");
        let request = RunRequest {
            release: true,
            ..RunRequest::default()
        };

        let summary = run(&request, &options, &runner).await.unwrap();

        assert_eq!(summary.completed, vec![Step::Validate, Step::Build]);
        assert!(dir.path().join("target/demo-1.0.0/dist/js/index.js").is_file());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_build_without_git_warns() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        let runner = FakeRunner::new().missing("git");
        let options = RunOptions::new(dir.path(), "0.1.0");
        let request = RunRequest {
            build: true,
            ..RunRequest::default()
        };

        let summary = run(&request, &options, &runner).await.unwrap();
        assert!(summary.warnings.iter().any(|w| w.contains("Git not found")));
    }

    #[tokio::test]
    async fn test_build_output_stays_inside_target() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        put(
            &root,
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "../.." },
                 "validate": { "runBeforeBuild": false },
                 "build": { "projectType": "lib_php" } }"#,
        );
        put(&root, "src/main/index.php", "<?php");
        put(&root, "target/keep.txt", "");
        put(dir.path(), "dist/precious.txt", "keep");
        let runner = FakeRunner::new();
        let options = RunOptions::new(&root, "0.1.0");
        let request = RunRequest {
            build: true,
            ..RunRequest::default()
        };

        let err = run(&request, &options, &runner).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidSetup { .. })
        ));
        assert!(dir.path().join("dist/precious.txt").is_file());
    }
}

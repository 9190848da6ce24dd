//! Turning requested options into an ordered list of steps

use crate::error::BuildError;
use crate::project::ProjectType;
use crate::setup::BuilderSetup;
use anyhow::Result;
use std::fmt;

/// What the user asked for on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub generate: Option<ProjectType>,
    pub clean: bool,
    pub lint: bool,
    pub build: bool,
    pub release: bool,
    pub sync: bool,
    pub test: bool,
    pub docker_up: bool,
    pub docker_down: bool,
}

impl RunRequest {
    fn selected_count(&self) -> usize {
        [
            self.generate.is_some(),
            self.clean,
            self.lint,
            self.build,
            self.release,
            self.sync,
            self.test,
            self.docker_up,
            self.docker_down,
        ]
        .iter()
        .filter(|selected| **selected)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_count() == 0
    }

    /// Whether `turbobuilder.json` must be loaded to honour the request
    pub fn needs_setup(&self) -> bool {
        self.lint
            || self.build
            || self.release
            || self.sync
            || self.test
            || self.docker_up
            || self.docker_down
    }
}

/// A single unit of work, executed in plan order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Generate(ProjectType),
    DockerDown,
    Clean,
    Validate,
    Build,
    Minify,
    OptimizePictures,
    CodeDocs,
    PrintTodo,
    Sync,
    Test,
    DockerUp,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Generate(t) => write!(f, "Generate {}", t.display_name()),
            Step::DockerDown => write!(f, "Stop containers"),
            Step::Clean => write!(f, "Clean"),
            Step::Validate => write!(f, "Validate"),
            Step::Build => write!(f, "Build"),
            Step::Minify => write!(f, "Minify"),
            Step::OptimizePictures => write!(f, "Optimize pictures"),
            Step::CodeDocs => write!(f, "Code documentation"),
            Step::PrintTodo => write!(f, "TODO"),
            Step::Sync => write!(f, "Sync"),
            Step::Test => write!(f, "Test"),
            Step::DockerUp => write!(f, "Start containers"),
        }
    }
}

/// Ordered steps for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
    /// Build output goes to the release folder and release extras run
    pub release: bool,
    pub warnings: Vec<String>,
}

impl Plan {
    /// Order the requested steps.
    ///
    /// The order never depends on the order of the flags:
    /// down → clean → validate → build → minify → pictures → docs → todo →
    /// sync → test → up.
    pub fn new(request: &RunRequest, setup: Option<&BuilderSetup>) -> Result<Self> {
        if request.is_empty() {
            return Err(BuildError::InvalidRequest(
                "No option specified. Run turbobuilder --help to see the available options"
                    .to_string(),
            )
            .into());
        }

        if let Some(project_type) = request.generate {
            if request.selected_count() > 1 {
                return Err(BuildError::InvalidRequest(
                    "--generate cannot be combined with other options".to_string(),
                )
                .into());
            }
            return Ok(Self {
                steps: vec![Step::Generate(project_type)],
                release: false,
                warnings: Vec::new(),
            });
        }

        if request.docker_up && request.docker_down {
            return Err(BuildError::InvalidRequest(
                "--up and --down cannot be used together".to_string(),
            )
            .into());
        }

        let setup = match (request.needs_setup(), setup) {
            (true, None) => {
                return Err(BuildError::InvalidRequest(
                    "The requested options need a turbobuilder.json setup".to_string(),
                )
                .into())
            }
            (_, setup) => setup,
        };

        let mut warnings = Vec::new();
        if request.build && request.release {
            warnings.push("--build is ignored because --release also builds".to_string());
        }

        let release = request.release;
        let builds = request.build || request.release;
        let mut steps = Vec::new();

        if request.docker_down {
            steps.push(Step::DockerDown);
        }
        if request.clean {
            steps.push(Step::Clean);
        }

        if let Some(setup) = setup {
            if request.lint || (builds && setup.validate.run_before_build) {
                steps.push(Step::Validate);
            }
            if builds {
                steps.push(Step::Build);
            }
            if release {
                let extras = &setup.release;
                if extras.minify_js || extras.minify_css {
                    steps.push(Step::Minify);
                }
                if extras.optimize_pictures {
                    steps.push(Step::OptimizePictures);
                }
                if extras.generate_code_documentation {
                    if setup.project_type().is_php() {
                        steps.push(Step::CodeDocs);
                    } else {
                        warnings.push(format!(
                            "Code documentation is only generated for PHP projects, skipping for {}",
                            setup.project_type()
                        ));
                    }
                }
                if extras.print_todo_file {
                    steps.push(Step::PrintTodo);
                }
            }
            if request.sync {
                if setup.sync.is_none() {
                    return Err(BuildError::InvalidRequest(
                        "--sync needs a sync section in turbobuilder.json".to_string(),
                    )
                    .into());
                }
                steps.push(Step::Sync);
            }
            if request.test {
                steps.push(Step::Test);
            }
            if request.docker_up {
                if setup.containers.docker.is_empty() {
                    return Err(BuildError::InvalidRequest(
                        "--up needs containers.docker entries in turbobuilder.json".to_string(),
                    )
                    .into());
                }
                steps.push(Step::DockerUp);
            }
        }

        Ok(Self {
            steps,
            release,
            warnings,
        })
    }
}

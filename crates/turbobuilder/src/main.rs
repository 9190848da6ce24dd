//! turbobuilder CLI - generate, build, validate and release projects

use anyhow::Result;
use builder_core::{ProjectType, RunOptions, RunRequest, SystemRunner};
use clap::Parser;
use std::path::PathBuf;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "turbobuilder")]
#[command(about = "Generate, build, validate and release turbobuilder projects")]
#[command(version)]
pub struct Args {
    /// Generate a new project of the given type in the project folder
    #[arg(short, long, value_enum, value_name = "TYPE")]
    pub generate: Option<ProjectType>,

    /// Build the project into target/<name>/dist
    #[arg(short, long)]
    pub build: bool,

    /// Build a release into target/<name>-<version>/dist
    #[arg(short, long)]
    pub release: bool,

    /// Run the configured tests
    #[arg(short, long)]
    pub test: bool,

    /// Delete the target folder
    #[arg(short, long)]
    pub clean: bool,

    /// Publish the built output to the configured destination
    #[arg(short, long)]
    pub sync: bool,

    /// Validate project structure, setup and file contents
    #[arg(short, long)]
    pub lint: bool,

    /// Start the project's docker containers
    #[arg(short, long)]
    pub up: bool,

    /// Stop the project's docker containers
    #[arg(short, long)]
    pub down: bool,

    /// Project root folder
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir", value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Open the container URLs in a browser after --up
    #[arg(long)]
    pub open: bool,
}

impl Args {
    fn request(&self) -> RunRequest {
        RunRequest {
            generate: self.generate,
            clean: self.clean,
            lint: self.lint,
            build: self.build,
            release: self.release,
            sync: self.sync,
            test: self.test,
            docker_up: self.up,
            docker_down: self.down,
        }
    }

    fn options(&self) -> RunOptions {
        let mut options = RunOptions::new(&self.project, CLI_VERSION);
        options.yes = self.yes;
        options.template_dir = self.template_dir.clone();
        options.open_browser = self.open;
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    cliclack::intro(format!("turbobuilder {}", CLI_VERSION))?;
    let result = builder_core::run(&args.request(), &args.options(), &SystemRunner).await;
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(summary) => {
            let outro = if summary.warnings.is_empty() {
                "Done".to_string()
            } else {
                format!("Done with {} warning(s)", summary.warnings.len())
            };
            cliclack::outro(outro)?;
            Ok(())
        }
        Err(e) => {
            cliclack::log::error(format!("{:#}", e))?;
            cliclack::outro_cancel("Failed")?;
            std::process::exit(1);
        }
    }
}

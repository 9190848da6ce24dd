//! Everything a step needs to know about the project being processed

use crate::project::ProjectLayout;
use crate::runtime::ProcessRunner;
use crate::setup::{BuilderSetup, WildcardTable};
use std::path::{Path, PathBuf};

/// Options that do not come from the setup file
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root: PathBuf,
    /// Auto-confirm all prompts
    pub yes: bool,
    pub template_dir: Option<PathBuf>,
    /// Open container URLs in the browser after `--up`
    pub open_browser: bool,
    pub cli_version: String,
}

impl RunOptions {
    pub fn new(root: impl Into<PathBuf>, cli_version: &str) -> Self {
        Self {
            root: root.into(),
            yes: false,
            template_dir: None,
            open_browser: false,
            cli_version: cli_version.to_string(),
        }
    }
}

/// A loaded project ready to be built
pub struct ProjectContext<'a, R: ProcessRunner> {
    pub setup: BuilderSetup,
    pub layout: ProjectLayout,
    pub release: bool,
    /// Version written into built files: `x.y.z` on release, `x.y.z+<build>` otherwise
    pub version: String,
    pub wildcards: WildcardTable,
    pub runner: &'a R,
    pub options: &'a RunOptions,
}

impl<'a, R: ProcessRunner> ProjectContext<'a, R> {
    pub fn new(
        setup: BuilderSetup,
        release: bool,
        build_number: u64,
        runner: &'a R,
        options: &'a RunOptions,
    ) -> Self {
        let version = if release {
            setup.version().to_string()
        } else {
            format!("{}+{}", setup.version(), build_number)
        };
        let layout = ProjectLayout::new(&options.root, &setup.metadata.name, &version, release);
        let wildcards = WildcardTable::from_setup(&setup.wild_cards, &version, release);

        Self {
            setup,
            layout,
            release,
            version,
            wildcards,
            runner,
            options,
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Project source folder
    pub fn src(&self) -> PathBuf {
        self.root().join(&self.setup.build.src_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::FakeRunner;

    fn setup() -> BuilderSetup {
        serde_json::from_str(
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "demo", "version": "1.4.0" },
                 "build": { "projectType": "lib_js", "srcPath": "source" } }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_version_carries_build_number() {
        let runner = FakeRunner::new();
        let options = RunOptions::new("/work/demo", "0.1.0");
        let ctx = ProjectContext::new(setup(), false, 12, &runner, &options);
        assert_eq!(ctx.version, "1.4.0+12");
        assert_eq!(ctx.layout.dist(), Path::new("/work/demo/target/demo/dist"));
        assert_eq!(ctx.src(), Path::new("/work/demo/source"));
        assert_eq!(ctx.wildcards.apply_str("@@--build-version--@@"), "1.4.0+12");
    }

    #[test]
    fn test_release_version_is_plain() {
        let runner = FakeRunner::new();
        let options = RunOptions::new("/work/demo", "0.1.0");
        let ctx = ProjectContext::new(setup(), true, 12, &runner, &options);
        assert_eq!(ctx.version, "1.4.0");
        assert_eq!(
            ctx.layout.dist(),
            Path::new("/work/demo/target/demo-1.4.0/dist")
        );
    }
}

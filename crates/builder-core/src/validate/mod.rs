//! Project validation (`--lint`, and before builds when enabled)
//!
//! Every rule runs and records its violations; the run fails once at the end
//! listing all of them.

pub mod content;
pub mod setup;
pub mod structure;

use crate::error::BuildError;
use crate::setup::BuilderSetup;
use anyhow::Result;
use std::path::Path;

/// Violations and warnings collected while validating
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail with every collected error, or hand back the warnings
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(BuildError::Validation(self.errors).into())
        }
    }
}

/// Run all validation rules against a project
pub fn validate_project(
    root: &Path,
    setup: &BuilderSetup,
    release: bool,
    cli_version: &str,
) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    setup::check(root, setup, release, cli_version, &mut report)?;
    structure::check(root, setup, &mut report)?;
    content::check(root, setup, &mut report)?;

    Ok(report)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    /// Write a file, creating parent folders
    pub fn put(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// A lib_js project satisfying the default structure rules
    pub fn valid_lib_js(root: &Path) {
        put(
            root,
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "demo", "version": "1.0.0" },
                 "build": { "projectType": "lib_js" } }"#,
        );
        put(root, "README.md", "# demo");
        put(root, "CHANGELOG.md", "# changes");
        put(root, ".gitignore", "target/\nnode_modules/\n");
        put(root, "src/main/js/index.js", "export const a = 1;\n");
    }
}

//! Project folder structure rules

use super::ValidationReport;
use crate::project::TARGET_DIR;
use crate::setup::BuilderSetup;
use anyhow::{Context, Result};
use std::path::Path;

pub fn check(root: &Path, setup: &BuilderSetup, report: &mut ValidationReport) -> Result<()> {
    let rules = &setup.validate.project_structure;

    if !root.join(&setup.build.src_path).is_dir() {
        report.error(format!(
            "Source folder not found: {}",
            setup.build.src_path
        ));
    }

    if rules.readme_file_mandatory && !root.join("README.md").is_file() {
        report.error("README.md file is mandatory");
    }

    if rules.change_log_file_mandatory && !root.join("CHANGELOG.md").is_file() {
        report.error("CHANGELOG.md file is mandatory");
    }

    if rules.tests_folder_mandatory && !root.join("src/test").is_dir() {
        report.error("src/test folder is mandatory");
    }

    if rules.extras_folder_mandatory && !root.join("extras").is_dir() {
        report.error("extras folder is mandatory");
    }

    if rules.git_ignore_target {
        check_git_ignore(root, report)?;
    }

    for file in setup.project_type().required_files() {
        if !root.join(file).is_file() {
            report.error(format!(
                "{} is required for {} projects",
                file,
                setup.project_type()
            ));
        }
    }

    Ok(())
}

fn check_git_ignore(root: &Path, report: &mut ValidationReport) -> Result<()> {
    let path = root.join(".gitignore");
    if !path.is_file() {
        report.error(".gitignore file is mandatory");
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let ignores_target = content
        .lines()
        .map(|line| line.trim().trim_start_matches('/').trim_end_matches('/'))
        .any(|line| line == TARGET_DIR);

    if !ignores_target {
        report.error(format!(".gitignore must ignore the {}/ folder", TARGET_DIR));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::load_setup;
    use crate::validate::test_support::*;

    fn run(root: &Path) -> ValidationReport {
        let setup = load_setup(root, false).unwrap();
        let mut report = ValidationReport::default();
        check(root, &setup, &mut report).unwrap();
        report
    }

    #[test]
    fn test_git_ignore_variants_accepted() {
        for line in ["target", "target/", "/target/", "  /target  "] {
            let dir = tempfile::tempdir().unwrap();
            valid_lib_js(dir.path());
            put(dir.path(), ".gitignore", &format!("node_modules\n{}\n", line));
            assert!(run(dir.path()).is_ok(), "rejected {:?}", line);
        }
    }

    #[test]
    fn test_git_ignore_without_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        put(dir.path(), ".gitignore", "targets/\n");
        let report = run(dir.path());
        assert_eq!(report.errors, vec![".gitignore must ignore the target/ folder"]);
    }

    #[test]
    fn test_optional_folders_follow_rules() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        put(
            dir.path(),
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "demo" },
                 "validate": { "projectStructure": {
                     "testsFolderMandatory": true, "extrasFolderMandatory": true,
                     "readmeFileMandatory": false } },
                 "build": { "projectType": "lib_ts" } }"#,
        );
        std::fs::remove_file(dir.path().join("README.md")).unwrap();

        let report = run(dir.path());
        assert_eq!(
            report.errors,
            vec![
                "src/test folder is mandatory",
                "extras folder is mandatory",
                "tsconfig.json is required for lib_ts projects",
            ]
        );
    }

    #[test]
    fn test_missing_source_folder() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        std::fs::remove_dir_all(dir.path().join("src")).unwrap();
        let report = run(dir.path());
        assert_eq!(report.errors, vec!["Source folder not found: src/main"]);
    }
}

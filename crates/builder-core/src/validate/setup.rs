//! Semantic checks on the parsed setup and its companion files

use super::ValidationReport;
use crate::error::BuildError;
use crate::project::ProjectType;
use crate::setup::model::{SyncType, TestKind};
use crate::setup::site::{DepotSetup, SiteSetup, DEPOT_SETUP_STEM, SITE_SETUP_STEM};
use crate::setup::{load_layered, merge, parse_setup, BuilderSetup};
use crate::templates::version::{check_compatibility, parse_version};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::path::Path;

pub fn check(
    root: &Path,
    setup: &BuilderSetup,
    release: bool,
    cli_version: &str,
    report: &mut ValidationReport,
) -> Result<()> {
    if let Some(warning) = check_compatibility(cli_version, &setup.metadata.builder_version) {
        report.warning(warning);
    }
    if parse_version(&setup.metadata.builder_version).is_err() {
        report.error(format!(
            "metadata.builderVersion '{}' is not a valid version",
            setup.metadata.builder_version
        ));
    }

    if let Some(version) = &setup.metadata.version {
        if parse_version(version).is_err() {
            report.error(format!("metadata.version '{}' is not a valid version", version));
        }
    }

    check_companion::<SiteSetup>(root, SITE_SETUP_STEM, release, report)?;
    check_companion::<DepotSetup>(root, DEPOT_SETUP_STEM, release, report)?;

    if setup.project_type() != ProjectType::SitePhp
        && merge::base_path(root, SITE_SETUP_STEM).is_file()
    {
        report.warning(format!(
            "turbosite.json is only used by {} projects",
            ProjectType::SitePhp
        ));
    }

    if let Some(sync) = &setup.sync {
        if sync.remote_path.trim().is_empty() {
            report.error("sync.remotePath must not be empty");
        }
        if sync.sync_type == SyncType::Ftp && sync.host.as_deref().unwrap_or("").is_empty() {
            report.error("sync.host is required for ftp synchronization");
        }
    }

    for (i, test) in setup.test.enabled_tests.iter().enumerate() {
        if test.kind == TestKind::Command && test.command.is_empty() {
            report.error(format!("test.enabledTests[{}]: command tests need a command", i));
        }
    }

    for header in &setup.validate.files_content.copyright_headers {
        if !root.join(&header.path).is_file() {
            report.error(format!("Copyright header file not found: {}", header.path));
        }
    }

    for container in &setup.containers.docker {
        if !root.join(&container.compose_file).is_file() {
            report.error(format!(
                "Docker compose file not found: {}",
                container.compose_file
            ));
        }
    }

    Ok(())
}

/// Parse a companion setup (merged for release) into its model
fn check_companion<T: DeserializeOwned>(
    root: &Path,
    stem: &str,
    release: bool,
    report: &mut ValidationReport,
) -> Result<()> {
    let value = match load_layered(root, stem, release) {
        Ok(Some(value)) => value,
        Ok(None) => return Ok(()),
        Err(e) => match e.downcast::<BuildError>() {
            Ok(err) => {
                report.error(err.to_string());
                return Ok(());
            }
            Err(other) => return Err(other),
        },
    };

    if let Err(e) = parse_setup::<T>(&merge::base_path(root, stem), value) {
        report.error(e.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::load_setup;
    use crate::validate::test_support::*;

    fn run(root: &Path, release: bool, cli_version: &str) -> ValidationReport {
        let setup = load_setup(root, release).unwrap();
        let mut report = ValidationReport::default();
        check(root, &setup, release, cli_version, &mut report).unwrap();
        report
    }

    #[test]
    fn test_newer_builder_version_warns() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        let report = run(dir.path(), false, "0.0.9");
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("0.1.0 or newer"));
    }

    #[test]
    fn test_bad_metadata_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        put(
            dir.path(),
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "one", "name": "demo", "version": "x" },
                 "build": { "projectType": "lib_js" } }"#,
        );
        let report = run(dir.path(), false, "0.1.0");
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
    }

    #[test]
    fn test_release_override_of_turbosite_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        put(
            dir.path(),
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "site" },
                 "build": { "projectType": "site_php" } }"#,
        );
        put(dir.path(), "turbosite.json", r#"{ "homeView": "home", "baseURL": "" }"#);
        put(dir.path(), "turbosite.release.json", r#"{ "homeView": 7 }"#);

        assert!(run(dir.path(), false, "0.1.0").is_ok());
        let report = run(dir.path(), true, "0.1.0");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("turbosite.json"));
    }

    #[test]
    fn test_broken_companion_json_is_an_error_not_a_crash() {
        let dir = tempfile::tempdir().unwrap();
        valid_lib_js(dir.path());
        put(dir.path(), "turbodepot.json", "{ broken");
        let report = run(dir.path(), false, "0.1.0");
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_sync_tests_and_containers_are_checked() {
        let dir = tempfile::tempdir().unwrap();
        put(
            dir.path(),
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "demo" },
                 "build": { "projectType": "lib_php" },
                 "containers": { "docker": [ { "composeFile": "docker/compose.yml" } ] },
                 "sync": { "type": "ftp", "remotePath": "/www" },
                 "test": { "enabledTests": [ { "type": "command" } ] } }"#,
        );
        let report = run(dir.path(), false, "0.1.0");
        assert_eq!(report.errors.len(), 3, "{:?}", report.errors);
        assert!(report.errors.iter().any(|e| e.contains("sync.host")));
        assert!(report.errors.iter().any(|e| e.contains("docker/compose.yml")));
    }
}

//! Setup files: loading, release overrides and wildcard substitution
//!
//! This module provides:
//! - The typed `turbobuilder.json` model (`BuilderSetup`)
//! - Layered loading of `<stem>.json` + `<stem>.release.json`
//! - Wildcard tables applied to setup values and built files
//! - Models for the `turbosite.json` / `turbodepot.json` companions

pub mod merge;
pub mod model;
pub mod site;
pub mod wildcards;

use crate::error::BuildError;
use crate::project::{is_folder_name, SETUP_FILE};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

pub use merge::{load_layered, merge_override};
pub use model::BuilderSetup;
pub use site::{DepotSetup, SiteSetup, DEPOT_SETUP_STEM, SITE_SETUP_STEM};
pub use wildcards::WildcardTable;

const SETUP_STEM: &str = "turbobuilder";

/// Load `turbobuilder.json` from a project root, applying
/// `turbobuilder.release.json` on top when `release` is set.
pub fn load_setup(root: &Path, release: bool) -> Result<BuilderSetup> {
    let value = load_layered(root, SETUP_STEM, release)?.ok_or_else(|| {
        BuildError::SetupNotFound {
            file: SETUP_FILE,
            dir: root.to_path_buf(),
        }
    })?;
    let path = root.join(SETUP_FILE);
    let setup: BuilderSetup = parse_setup(&path, value)?;
    check_output_names(&path, &setup)?;
    Ok(setup)
}

/// Name and version become the build folder `target/<name>[-<version>]`
fn check_output_names(path: &Path, setup: &BuilderSetup) -> Result<()> {
    let fields = [
        ("metadata.name", Some(setup.metadata.name.as_str())),
        ("metadata.version", setup.metadata.version.as_deref()),
    ];
    for (field, value) in fields {
        if let Some(value) = value.filter(|v| !is_folder_name(v)) {
            return Err(BuildError::InvalidSetup {
                path: path.to_path_buf(),
                message: format!("{} '{}' cannot be used as a folder name", field, value),
            }
            .into());
        }
    }
    Ok(())
}

/// Deserialize a merged setup value into its typed model
pub fn parse_setup<T: DeserializeOwned>(path: &Path, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        BuildError::InvalidSetup {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Produce the shipped version of a companion setup file: base merged with
/// its release override (on release) and wildcards applied to every string.
///
/// Returns `Ok(None)` when the project has no such file.
pub fn render_layered(
    dir: &Path,
    stem: &str,
    release: bool,
    wildcards: &WildcardTable,
) -> Result<Option<Value>> {
    let Some(mut value) = load_layered(dir, stem, release)? else {
        return Ok(None);
    };
    wildcards.apply_value(&mut value);
    Ok(Some(value))
}

/// Write a setup value as pretty JSON
pub fn write_setup(path: &Path, value: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize setup")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectType;
    use std::collections::BTreeMap;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_missing_setup_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_setup(dir.path(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::SetupNotFound { .. })
        ));
        assert!(err.to_string().contains("turbobuilder.json setup file not found"));
    }

    #[test]
    fn test_release_override_changes_typed_setup() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "turbobuilder.json",
            r#"{
                "metadata": { "builderVersion": "0.1.0", "name": "demo", "version": "1.0.0" },
                "build": { "projectType": "lib_js" },
                "release": { "minifyJs": true }
            }"#,
        );
        write(
            dir.path(),
            "turbobuilder.release.json",
            r#"{ "release": { "minifyJs": false } }"#,
        );

        let build = load_setup(dir.path(), false).unwrap();
        assert!(build.release.minify_js);
        assert_eq!(build.project_type(), ProjectType::LibJs);

        let release = load_setup(dir.path(), true).unwrap();
        assert!(!release.release.minify_js);
        assert_eq!(release.metadata.name, "demo");
    }

    #[test]
    fn test_override_producing_invalid_setup_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "demo" }, "build": { "projectType": "lib_js" } }"#,
        );
        write(
            dir.path(),
            "turbobuilder.release.json",
            r#"{ "build": { "projectType": "lib_cobol" } }"#,
        );

        assert!(load_setup(dir.path(), false).is_ok());
        let err = load_setup(dir.path(), true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidSetup { .. })
        ));
    }

    #[test]
    fn test_names_escaping_target_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for metadata in [
            r#""name": "../..""#,
            r#""name": """#,
            r#""name": "demo", "version": "1.0/../../x""#,
        ] {
            write(
                dir.path(),
                "turbobuilder.json",
                &format!(
                    r#"{{ "metadata": {{ "builderVersion": "0.1.0", {} }}, "build": {{ "projectType": "lib_js" }} }}"#,
                    metadata
                ),
            );
            let err = load_setup(dir.path(), false).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<BuildError>(),
                Some(BuildError::InvalidSetup { .. })
            ));
            assert!(err.to_string().contains("cannot be used as a folder name"));
        }
    }

    #[test]
    fn test_release_override_cannot_rename_outside_target() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "turbobuilder.json",
            r#"{ "metadata": { "builderVersion": "0.1.0", "name": "demo" }, "build": { "projectType": "lib_js" } }"#,
        );
        write(
            dir.path(),
            "turbobuilder.release.json",
            r#"{ "metadata": { "version": ".." } }"#,
        );
        assert!(load_setup(dir.path(), false).is_ok());
        assert!(load_setup(dir.path(), true).is_err());
    }

    #[test]
    fn test_render_layered_merges_then_substitutes() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "turbosite.json",
            r#"{ "homeView": "home", "baseURL": "$baseUrl", "version": "@@--build-version--@@" }"#,
        );
        write(
            dir.path(),
            "turbosite.release.json",
            r#"{ "baseURL": "https://$domain" }"#,
        );

        let mut replacements = BTreeMap::new();
        replacements.insert("$baseUrl".to_string(), "http://localhost".to_string());
        replacements.insert("$domain".to_string(), "example.invalid".to_string());
        replacements.insert("@@--build-version--@@".to_string(), "3.1.0".to_string());
        let table = WildcardTable::new(replacements, Vec::new());

        let build = render_layered(dir.path(), SITE_SETUP_STEM, false, &table)
            .unwrap()
            .unwrap();
        assert_eq!(build["baseURL"], "http://localhost");
        assert_eq!(build["version"], "3.1.0");

        let release = render_layered(dir.path(), SITE_SETUP_STEM, true, &table)
            .unwrap()
            .unwrap();
        assert_eq!(release["baseURL"], "https://example.invalid");
    }
}

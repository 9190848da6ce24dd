//! Layered setup files: a base `<stem>.json` plus an optional
//! `<stem>.release.json` override applied on release builds

use crate::error::BuildError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Path of the base setup file for a stem (`turbosite` → `turbosite.json`)
pub fn base_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.json", stem))
}

/// Path of the release override for a stem (`turbosite.release.json`)
pub fn release_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.release.json", stem))
}

/// Merge `overrides` into `base`.
///
/// Objects are merged key by key, recursively. Any other value (arrays
/// included) found in `overrides` replaces the base value as a whole.
pub fn merge_override(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_override(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

/// Read and parse a JSON file
pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| {
        BuildError::InvalidSetup {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Load `<stem>.json` from `dir`, merging `<stem>.release.json` on top of it
/// when `release` is set and the override exists.
///
/// Returns `Ok(None)` when the base file does not exist.
pub fn load_layered(dir: &Path, stem: &str, release: bool) -> Result<Option<Value>> {
    let base = base_path(dir, stem);
    if !base.is_file() {
        return Ok(None);
    }

    let mut value = read_json(&base)?;

    if release {
        let overrides = release_path(dir, stem);
        if overrides.is_file() {
            let override_value = read_json(&overrides)?;
            merge_override(&mut value, &override_value);
        }
    }

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_merge_recursively() {
        let mut base = json!({
            "metadata": { "name": "demo", "description": "base" },
            "release": { "minifyJs": true, "minifyCss": true }
        });
        merge_override(
            &mut base,
            &json!({ "release": { "minifyCss": false }, "metadata": { "description": "prod" } }),
        );

        assert_eq!(
            base,
            json!({
                "metadata": { "name": "demo", "description": "prod" },
                "release": { "minifyJs": true, "minifyCss": false }
            })
        );
    }

    #[test]
    fn test_arrays_and_scalars_are_replaced() {
        let mut base = json!({ "globalCss": ["a.css", "b.css"], "cacheViews": false });
        merge_override(&mut base, &json!({ "globalCss": ["c.css"], "cacheViews": true }));
        assert_eq!(base, json!({ "globalCss": ["c.css"], "cacheViews": true }));
    }

    #[test]
    fn test_new_keys_are_added_and_type_changes_replace() {
        let mut base = json!({ "api": "none" });
        merge_override(&mut base, &json!({ "api": { "url": "/api" }, "extra": 1 }));
        assert_eq!(base, json!({ "api": { "url": "/api" }, "extra": 1 }));
    }

    #[test]
    fn test_load_layered_applies_override_only_on_release() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            base_path(dir.path(), "turbosite"),
            r#"{ "baseURL": "http://localhost", "homeView": "home" }"#,
        )
        .unwrap();
        std::fs::write(
            release_path(dir.path(), "turbosite"),
            r#"{ "baseURL": "https://example.invalid" }"#,
        )
        .unwrap();

        let build = load_layered(dir.path(), "turbosite", false).unwrap().unwrap();
        assert_eq!(build["baseURL"], "http://localhost");

        let release = load_layered(dir.path(), "turbosite", true).unwrap().unwrap();
        assert_eq!(release["baseURL"], "https://example.invalid");
        assert_eq!(release["homeView"], "home");
    }

    #[test]
    fn test_load_layered_missing_base_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_layered(dir.path(), "turbodepot", true).unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_reports_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(base_path(dir.path(), "turbosite"), "{ not json").unwrap();
        let err = load_layered(dir.path(), "turbosite", false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidSetup { .. })
        ));
    }
}

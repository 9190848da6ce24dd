//! Wildcard substitution for setup values and built files

use super::model::WildCardsSetup;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Token → value replacements applied during a build or release
#[derive(Debug, Clone, Default)]
pub struct WildcardTable {
    /// Sorted longest token first, so `$api` never clobbers `$apiUrl`
    entries: Vec<(String, String)>,
    extensions: Vec<String>,
}

impl WildcardTable {
    pub fn new(replacements: BTreeMap<String, String>, extensions: Vec<String>) -> Self {
        let mut entries: Vec<(String, String)> = replacements
            .into_iter()
            .filter(|(token, _)| !token.is_empty())
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        Self {
            entries,
            extensions,
        }
    }

    /// Table for a build or release: the version wildcard plus the configured
    /// replacements, with release values overriding build values.
    pub fn from_setup(setup: &WildCardsSetup, version: &str, release: bool) -> Self {
        let mut replacements = setup.build.clone();
        if release {
            for (token, value) in &setup.release {
                replacements.insert(token.clone(), value.clone());
            }
        }
        replacements.insert(setup.version_wild_card.clone(), version.to_string());

        Self::new(replacements, setup.affected_extensions.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply_str(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (token, value) in &self.entries {
            if result.contains(token.as_str()) {
                result = result.replace(token.as_str(), value);
            }
        }
        result
    }

    /// Replace wildcards in every string of a JSON document. Keys are left untouched.
    pub fn apply_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                let replaced = self.apply_str(s);
                if replaced != *s {
                    *s = replaced;
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.apply_value(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.apply_value(item)),
            _ => {}
        }
    }

    /// Whether a file's contents receive wildcard replacement
    pub fn affects(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// Replace wildcards in all affected text files under `dir`.
    /// Returns the number of files that were rewritten.
    pub fn apply_to_tree(&self, dir: &Path) -> Result<usize> {
        if self.is_empty() || !dir.exists() {
            return Ok(0);
        }

        let mut changed = 0;
        for entry in WalkDir::new(dir) {
            let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !self.affects(path) {
                continue;
            }

            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            // Binary or non-UTF-8 content is left alone
            let Ok(text) = String::from_utf8(bytes) else {
                continue;
            };

            let replaced = self.apply_str(&text);
            if replaced != text {
                std::fs::write(path, replaced)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                changed += 1;
            }
        }

        Ok(changed)
    }
}

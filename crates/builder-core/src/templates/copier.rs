//! Template file copying with placeholder substitution

use crate::setup::WildcardTable;
use crate::templates::fetcher::TemplateFetcher;
use crate::templates::manifest::TemplateManifest;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// Values substituted into generated files
#[derive(Debug, Clone)]
pub struct ProjectValues {
    pub name: String,
    pub description: String,
    pub builder_version: String,
}

impl ProjectValues {
    fn table(&self, manifest: &TemplateManifest) -> WildcardTable {
        let mut replacements = BTreeMap::new();
        replacements.insert("$projectName".to_string(), self.name.clone());
        replacements.insert("$projectDescription".to_string(), self.description.clone());
        replacements.insert("$builderVersion".to_string(), self.builder_version.clone());
        WildcardTable::new(replacements, manifest.text_extensions.clone())
    }
}

/// Copy every template file to the target directory.
/// Returns the relative paths written.
pub async fn copy_template(
    fetcher: &mut TemplateFetcher,
    template_name: &str,
    manifest: &TemplateManifest,
    target_dir: &Path,
    values: &ProjectValues,
) -> Result<Vec<String>> {
    fs::create_dir_all(target_dir)
        .await
        .context("Failed to create target directory")?;

    let table = values.table(manifest);
    let mut copied_files = Vec::new();

    for file_path in &manifest.files {
        let target_path = target_dir.join(file_path);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = fetcher.fetch_file_bytes(template_name, file_path).await?;
        let content = if table.affects(&target_path) || is_dotfile(file_path) {
            match String::from_utf8(content) {
                Ok(text) => table.apply_str(&text).into_bytes(),
                Err(e) => e.into_bytes(),
            }
        } else {
            content
        };

        fs::write(&target_path, &content)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        copied_files.push(file_path.clone());
    }

    Ok(copied_files)
}

/// Extension-less dot files (`.gitignore`, `.editorconfig`) are text
fn is_dotfile(file_path: &str) -> bool {
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    name.starts_with('.') && !name[1..].contains('.')
}

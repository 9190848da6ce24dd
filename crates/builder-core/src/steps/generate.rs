//! Creating a new project from a template (`--generate`)

use crate::error::BuildError;
use crate::pipeline::RunOptions;
use crate::project::{ProjectType, SETUP_FILE};
use crate::templates::{
    check_compatibility, copy_template, ProjectValues, TemplateFetcher, TemplateSource,
};
use anyhow::Result;
use std::path::Path;

/// What a generate run produced
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    pub template: String,
    pub files: Vec<String>,
}

/// Check the project folder can receive a new project.
///
/// Returns how many entries it already holds (`.git` not counted).
pub fn existing_entries(root: &Path) -> Result<usize> {
    if root.join(SETUP_FILE).exists() {
        return Err(BuildError::InvalidRequest(format!(
            "{} already exists in {}. Generate only works on new projects",
            SETUP_FILE,
            root.display()
        ))
        .into());
    }
    if !root.exists() {
        return Ok(0);
    }

    let count = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name() != ".git")
        .count();
    Ok(count)
}

/// Project name derived from the folder it lives in
pub fn project_name(root: &Path) -> String {
    std::fs::canonicalize(root)
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "project".to_string())
}

/// Generate a `project_type` skeleton in the project folder
pub async fn run(project_type: ProjectType, options: &RunOptions) -> Result<GenerateSummary> {
    let root = &options.root;

    let existing = existing_entries(root)?;
    if existing > 0 {
        cliclack::log::warning(format!("Directory has {} existing items", existing))?;
        let confirm = if options.yes {
            true
        } else {
            cliclack::confirm("Continue anyway?")
                .initial_value(false)
                .interact()?
        };
        if !confirm {
            anyhow::bail!("Generate cancelled.");
        }
    }

    let source = TemplateSource::resolve(options.template_dir.as_deref())?;
    match &source {
        TemplateSource::Local(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?
        }
        TemplateSource::Remote(url) => cliclack::log::info(format!("Using templates from {}", url))?,
    }
    let mut fetcher = TemplateFetcher::new(source);

    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");

    let root_manifest = match fetcher.fetch_root_manifest().await {
        Ok(manifest) => manifest,
        Err(e) => {
            spinner.error("Failed to load templates");
            return Err(e);
        }
    };
    let Some(template) = root_manifest.template_for(project_type).map(str::to_string) else {
        spinner.error("Failed to load templates");
        anyhow::bail!(
            "No template for {}. Available templates: {}",
            project_type,
            root_manifest.templates.join(", ")
        );
    };

    let manifest = match fetcher.fetch_template_manifest(&template).await {
        Ok(manifest) => manifest,
        Err(e) => {
            spinner.error("Failed to load templates");
            return Err(e);
        }
    };
    if manifest.project_type != project_type {
        spinner.error("Failed to load templates");
        anyhow::bail!(
            "Template '{}' generates {} projects, not {}",
            template,
            manifest.project_type,
            project_type
        );
    }
    spinner.stop(format!("Template: {} - {}", manifest.name, manifest.description));

    if let Some(warning) = check_compatibility(&options.cli_version, &manifest.version) {
        cliclack::log::warning(warning)?;
    }

    let values = ProjectValues {
        name: project_name(root),
        description: manifest.description.clone(),
        builder_version: options.cli_version.clone(),
    };
    let files = copy_template(&mut fetcher, &template, &manifest, root, &values).await?;

    Ok(GenerateSummary { template, files })
}

//! Template manifest types and parsing

use crate::project::ProjectType;
use serde::{Deserialize, Serialize};

/// A file from the root templates directory that gets bundled into every template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// Source path relative to the templates directory
    pub source: String,

    /// Destination path in each template (defaults to source if not specified)
    #[serde(default)]
    pub dest: Option<String>,
}

impl SharedFile {
    /// Get the destination path (falls back to source if dest not specified)
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.source)
    }
}

/// Root template manifest (templates/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// Template directory names, one per project type
    pub templates: Vec<String>,

    /// Shared files from the root templates directory to include in every template
    #[serde(default)]
    pub shared_files: Vec<SharedFile>,
}

impl RootManifest {
    /// Directory name of the template generating `project_type`
    pub fn template_for(&self, project_type: ProjectType) -> Option<&str> {
        self.templates
            .iter()
            .map(String::as_str)
            .find(|name| *name == project_type.id())
    }
}

/// Per-template manifest (templates/<name>/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub name: String,

    pub description: String,

    /// Minimum turbobuilder version able to build the generated project
    pub version: String,

    pub project_type: ProjectType,

    /// Explicit list of files to copy
    pub files: Vec<String>,

    /// Extensions of files receiving `$projectName`-style substitutions
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,
}

fn default_text_extensions() -> Vec<String> {
    [
        "json", "md", "php", "js", "ts", "html", "css", "scss", "xml", "yml", "yaml", "txt",
    ]
    .iter()
    .map(|e| e.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_manifest_finds_template_by_type() {
        let root: RootManifest = serde_yaml::from_str(
            "templates: [site_php, lib_ts]\nshared_files:\n  - source: shared/gitignore\n    dest: .gitignore\n",
        )
        .unwrap();
        assert_eq!(root.template_for(ProjectType::LibTs), Some("lib_ts"));
        assert_eq!(root.template_for(ProjectType::AppAngular), None);
        assert_eq!(root.shared_files[0].destination(), ".gitignore");
    }

    #[test]
    fn test_template_manifest_defaults_text_extensions() {
        let manifest: TemplateManifest = serde_yaml::from_str(
            "name: PHP library\ndescription: A library\nversion: 0.1.0\nproject_type: lib_php\nfiles: [turbobuilder.json]\n",
        )
        .unwrap();
        assert_eq!(manifest.project_type, ProjectType::LibPhp);
        assert!(manifest.text_extensions.contains(&"php".to_string()));
    }
}

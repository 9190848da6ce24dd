//! Typed model of `turbobuilder.json`
//!
//! The model doubles as the setup schema: unknown keys are rejected so that a
//! misspelled option is reported instead of silently ignored.

use crate::project::ProjectType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default token replaced by the project version
pub const DEFAULT_VERSION_WILDCARD: &str = "@@--build-version--@@";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuilderSetup {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub metadata: Metadata,

    #[serde(default)]
    pub containers: Containers,

    #[serde(default)]
    pub validate: ValidateSetup,

    pub build: BuildSetup,

    #[serde(default)]
    pub release: ReleaseSetup,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncSetup>,

    #[serde(default)]
    pub test: TestSetup,

    #[serde(default)]
    pub wild_cards: WildCardsSetup,
}

impl BuilderSetup {
    pub fn project_type(&self) -> ProjectType {
        self.build.project_type
    }

    /// Declared project version, `0.0.0` when the setup has none
    pub fn version(&self) -> &str {
        self.metadata.version.as_deref().unwrap_or("0.0.0")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Metadata {
    /// Minimum turbobuilder version this setup was written for
    pub builder_version: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Containers {
    #[serde(default)]
    pub docker: Vec<DockerContainer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DockerContainer {
    #[serde(default = "default_compose_file")]
    pub compose_file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Address where the running application can be reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_compose_file() -> String {
    "docker-compose.yml".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidateSetup {
    #[serde(default = "yes")]
    pub run_before_build: bool,

    #[serde(default)]
    pub project_structure: ProjectStructureRules,

    #[serde(default)]
    pub files_content: FilesContentRules,

    #[serde(default)]
    pub style_sheets: StyleSheetRules,
}

impl Default for ValidateSetup {
    fn default() -> Self {
        Self {
            run_before_build: true,
            project_structure: ProjectStructureRules::default(),
            files_content: FilesContentRules::default(),
            style_sheets: StyleSheetRules::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectStructureRules {
    #[serde(default = "yes")]
    pub readme_file_mandatory: bool,

    #[serde(default = "yes")]
    pub change_log_file_mandatory: bool,

    #[serde(default)]
    pub tests_folder_mandatory: bool,

    #[serde(default)]
    pub extras_folder_mandatory: bool,

    /// `.gitignore` must exist and ignore the target folder
    #[serde(default = "yes")]
    pub git_ignore_target: bool,
}

impl Default for ProjectStructureRules {
    fn default() -> Self {
        Self {
            readme_file_mandatory: true,
            change_log_file_mandatory: true,
            tests_folder_mandatory: false,
            extras_folder_mandatory: false,
            git_ignore_target: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilesContentRules {
    #[serde(default)]
    pub tabs_forbidden: TabsForbidden,

    #[serde(default)]
    pub copyright_headers: Vec<CopyrightHeader>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TabsForbidden {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_affected_paths")]
    pub affected_paths: Vec<String>,

    /// File name patterns skipped by the check (`*.svg`, `Makefile`, `vendor*`)
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl Default for TabsForbidden {
    fn default() -> Self {
        Self {
            enabled: false,
            affected_paths: default_affected_paths(),
            excludes: Vec::new(),
        }
    }
}

fn default_affected_paths() -> Vec<String> {
    vec!["src".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CopyrightHeader {
    /// File (relative to project root) holding the expected header text
    pub path: String,

    #[serde(default = "default_affected_paths")]
    pub affected_paths: Vec<String>,

    /// File name patterns the header applies to
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleSheetRules {
    #[serde(default)]
    pub only_scss: bool,

    #[serde(default)]
    pub no_css_hardcoded_colors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildSetup {
    pub project_type: ProjectType,

    #[serde(default = "default_src_path")]
    pub src_path: String,

    #[serde(default = "default_tsconfig")]
    pub tsconfig: String,

    /// Name of the single bundle produced with webpack (JS/TS libraries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_file: Option<String>,

    /// Emit `.d.ts` declarations when compiling TypeScript
    #[serde(default)]
    pub declarations: bool,
}

fn default_src_path() -> String {
    "src/main".to_string()
}

fn default_tsconfig() -> String {
    "tsconfig.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReleaseSetup {
    #[serde(default = "yes")]
    pub print_todo_file: bool,

    #[serde(default = "yes")]
    pub minify_js: bool,

    #[serde(default = "yes")]
    pub minify_css: bool,

    #[serde(default = "yes")]
    pub optimize_pictures: bool,

    #[serde(default)]
    pub generate_code_documentation: bool,
}

impl Default for ReleaseSetup {
    fn default() -> Self {
        Self {
            print_todo_file: true,
            minify_js: true,
            minify_css: true,
            optimize_pictures: true,
            generate_code_documentation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Filesystem,
    Ftp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncSetup {
    #[serde(rename = "type")]
    pub sync_type: SyncType,

    /// Folder to publish, relative to the project root. Defaults to the dist
    /// folder of the current build or release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    pub remote_path: String,

    #[serde(default)]
    pub delete_destination_files: bool,

    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestSetup {
    #[serde(default)]
    pub enabled_tests: Vec<TestEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestKind {
    PhpUnit,
    Jasmine,
    Npm,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestEntry {
    #[serde(rename = "type")]
    pub kind: TestKind,

    /// Configuration file passed to the test runner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    /// Program and arguments for `command` tests
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WildCardsSetup {
    #[serde(default = "default_version_wildcard")]
    pub version_wild_card: String,

    /// File extensions (without dot) whose contents receive wildcard replacement
    #[serde(default = "default_affected_extensions")]
    pub affected_extensions: Vec<String>,

    /// Token → value replacements for builds
    #[serde(default)]
    pub build: BTreeMap<String, String>,

    /// Token → value replacements for releases (overlaid on `build`)
    #[serde(default)]
    pub release: BTreeMap<String, String>,
}

impl Default for WildCardsSetup {
    fn default() -> Self {
        Self {
            version_wild_card: default_version_wildcard(),
            affected_extensions: default_affected_extensions(),
            build: BTreeMap::new(),
            release: BTreeMap::new(),
        }
    }
}

fn default_version_wildcard() -> String {
    DEFAULT_VERSION_WILDCARD.to_string()
}

fn default_affected_extensions() -> Vec<String> {
    ["php", "js", "ts", "json", "html", "css", "scss", "md", "txt", "xml"]
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn yes() -> bool {
    true
}

//! Project types and the on-disk layout of build output

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Main setup file name
pub const SETUP_FILE: &str = "turbobuilder.json";

/// Folder (relative to the project root) receiving every build artifact
pub const TARGET_DIR: &str = "target";

/// Kinds of project that can be generated and built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ProjectType {
    SitePhp,
    LibPhp,
    LibJs,
    LibTs,
    AppAngular,
    AppNodeCli,
}

impl ProjectType {
    pub fn id(&self) -> &'static str {
        match self {
            ProjectType::SitePhp => "site_php",
            ProjectType::LibPhp => "lib_php",
            ProjectType::LibJs => "lib_js",
            ProjectType::LibTs => "lib_ts",
            ProjectType::AppAngular => "app_angular",
            ProjectType::AppNodeCli => "app_node_cli",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectType::SitePhp => "PHP site",
            ProjectType::LibPhp => "PHP library",
            ProjectType::LibJs => "JavaScript library",
            ProjectType::LibTs => "TypeScript library",
            ProjectType::AppAngular => "Angular application",
            ProjectType::AppNodeCli => "Node.js command line application",
        }
    }

    /// Whether sources of this project type are PHP
    pub fn is_php(&self) -> bool {
        matches!(self, ProjectType::SitePhp | ProjectType::LibPhp)
    }

    /// Files (relative to the project root) that must exist for this type
    pub fn required_files(&self) -> &'static [&'static str] {
        match self {
            ProjectType::SitePhp => &["turbosite.json"],
            ProjectType::LibPhp | ProjectType::LibJs => &[],
            ProjectType::LibTs => &["tsconfig.json"],
            ProjectType::AppAngular => &["angular.json", "package.json"],
            ProjectType::AppNodeCli => &["tsconfig.json", "package.json"],
        }
    }

    /// Look up a project type by its identifier (e.g. `lib_ts`)
    pub fn from_id(id: &str) -> Option<Self> {
        Self::value_variants()
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Whether `value` can name a single folder under `target/`
pub fn is_folder_name(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != "." && trimmed != ".." && !value.contains(['/', '\\', ':'])
}

/// Resolved paths for a project build
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    output: PathBuf,
}

impl ProjectLayout {
    /// Layout for a build (`target/<name>`) or release (`target/<name>-<version>`)
    pub fn new(root: &Path, name: &str, version: &str, release: bool) -> Self {
        let folder = if release {
            format!("{}-{}", name, version)
        } else {
            name.to_string()
        };
        Self {
            root: root.to_path_buf(),
            output: root.join(TARGET_DIR).join(folder),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target(&self) -> PathBuf {
        self.root.join(TARGET_DIR)
    }

    /// Folder holding everything produced for this build
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Distributable files
    pub fn dist(&self) -> PathBuf {
        self.output.join("dist")
    }

    /// Generated code documentation
    pub fn docs(&self) -> PathBuf {
        self.output.join("docs")
    }

    pub fn setup_file(&self) -> PathBuf {
        self.root.join(SETUP_FILE)
    }
}

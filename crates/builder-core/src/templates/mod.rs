//! Project templates used by `--generate`
//!
//! This module provides:
//! - Template manifest types (RootManifest, TemplateManifest)
//! - Template fetching from a local folder or remote archives
//! - Template copying with project placeholders substituted
//! - Version compatibility checking

pub mod copier;
pub mod fetcher;
pub mod manifest;
pub mod version;

pub use copier::{copy_template, ProjectValues};
pub use fetcher::{TemplateFetcher, TemplateSource};
pub use manifest::{RootManifest, SharedFile, TemplateManifest};
pub use version::check_compatibility;

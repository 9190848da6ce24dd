//! Template retrieval from a local templates folder or a remote URL
//!
//! Both sources go through zip archives: remote templates are published as
//! `<template>.zip`, local ones are packed in memory from their folder (shared
//! files included). Generation therefore behaves the same for both.

use super::manifest::{RootManifest, SharedFile, TemplateManifest};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use url::Url;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Environment variable pointing at a local templates folder
pub const TEMPLATE_DIR_ENV: &str = "TURBOBUILDER_TEMPLATE_DIR";

/// Environment variable overriding the remote templates URL
pub const TEMPLATE_URL_ENV: &str = "TURBOBUILDER_TEMPLATE_URL";

/// Remote location of the published template archives
pub const DEFAULT_TEMPLATE_URL: &str =
    "https://raw.githubusercontent.com/turbobuilder/turbobuilder/main/templates";

const MANIFEST_FILE: &str = "template.yaml";

/// Template source - either remote URL or local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// Pick the source: explicit folder, then `TURBOBUILDER_TEMPLATE_DIR`,
    /// then the remote URL (`TURBOBUILDER_TEMPLATE_URL` or the default)
    pub fn resolve(template_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = template_dir {
            return Ok(Self::Local(dir.to_path_buf()));
        }
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(Self::Local(PathBuf::from(dir)));
            }
        }
        let url_str =
            std::env::var(TEMPLATE_URL_ENV).unwrap_or_else(|_| DEFAULT_TEMPLATE_URL.to_string());
        Self::remote(&url_str)
    }

    pub fn remote(url_str: &str) -> Result<Self> {
        let url =
            Url::parse(url_str).with_context(|| format!("Invalid template URL: {}", url_str))?;
        Ok(Self::Remote(url))
    }
}

/// Template contents extracted from its archive
#[derive(Debug, Clone)]
struct CachedTemplate {
    manifest: TemplateManifest,
    files: HashMap<String, Vec<u8>>,
}

/// Retrieves templates and caches their extracted contents
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
    cache: HashMap<String, CachedTemplate>,
}

impl TemplateFetcher {
    pub fn new(source: TemplateSource) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(concat!("turbobuilder/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            cache: HashMap::new(),
        }
    }

    /// Build a URL by appending a path segment, preserving query parameters
    fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .push(path_segment);
        Ok(url)
    }

    async fn download(&self, url: Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch the root manifest listing available templates
    pub async fn fetch_root_manifest(&self) -> Result<RootManifest> {
        let content = match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::build_url(base_url, MANIFEST_FILE)?;
                String::from_utf8(self.download(url).await?)
                    .context("Root template manifest is not valid UTF-8")?
            }
            TemplateSource::Local(path) => read_root_manifest_text(path)?,
        };
        serde_yaml::from_str(&content).context("Failed to parse root template manifest")
    }

    /// Pack a local template folder into a zip, shared files included.
    /// The packed manifest lists the shared file destinations as well.
    pub fn build_local_zip(
        templates_dir: &Path,
        template_name: &str,
        shared_files: &[SharedFile],
    ) -> Result<Vec<u8>> {
        let template_path = templates_dir.join(template_name);
        let manifest_path = template_path.join(MANIFEST_FILE);

        let manifest_content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let mut manifest: TemplateManifest = serde_yaml::from_str(&manifest_content)
            .with_context(|| format!("Failed to parse template '{}' manifest", template_name))?;

        let own_files = manifest.files.clone();
        for shared in shared_files {
            let dest = shared.destination().to_string();
            if !manifest.files.contains(&dest) {
                manifest.files.push(dest);
            }
        }
        let manifest_content =
            serde_yaml::to_string(&manifest).context("Failed to serialize template manifest")?;

        let mut zip_buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            zip.start_file(format!("{}/{}", template_name, MANIFEST_FILE), options)?;
            zip.write_all(manifest_content.as_bytes())?;

            let mut written: HashSet<String> = HashSet::new();
            for file_path in &own_files {
                let full_path = template_path.join(file_path);
                let content = std::fs::read(&full_path).with_context(|| {
                    format!(
                        "File '{}' listed in {} not found",
                        file_path,
                        manifest_path.display()
                    )
                })?;
                zip.start_file(format!("{}/{}", template_name, file_path), options)?;
                zip.write_all(&content)?;
                written.insert(file_path.clone());
            }

            // Template files win over shared files with the same destination
            for shared in shared_files {
                let dest = shared.destination();
                if written.contains(dest) {
                    continue;
                }
                let source_path = templates_dir.join(&shared.source);
                let content = std::fs::read(&source_path).with_context(|| {
                    format!("Failed to read shared file {}", source_path.display())
                })?;
                zip.start_file(format!("{}/{}", template_name, dest), options)?;
                zip.write_all(&content)?;
                written.insert(dest.to_string());
            }

            zip.finish()?;
        }

        Ok(zip_buffer)
    }

    /// Extract a template archive, stripping the `<template>/` prefix
    fn extract_zip(zip_bytes: &[u8], template_name: &str) -> Result<CachedTemplate> {
        let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).with_context(|| {
            format!("Failed to read zip archive for template '{}'", template_name)
        })?;

        let prefix = format!("{}/", template_name);
        let mut files: HashMap<String, Vec<u8>> = HashMap::new();
        let mut manifest: Option<TemplateManifest> = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let full_path = file.name().to_string();
            let relative_path = full_path
                .strip_prefix(&prefix)
                .unwrap_or(&full_path)
                .to_string();

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;

            if relative_path == MANIFEST_FILE {
                manifest = Some(serde_yaml::from_slice(&contents).with_context(|| {
                    format!("Failed to parse template '{}' manifest", template_name)
                })?);
                continue;
            }

            files.insert(relative_path, contents);
        }

        let manifest = manifest.ok_or_else(|| {
            anyhow::anyhow!("Template '{}' archive has no {}", template_name, MANIFEST_FILE)
        })?;

        Ok(CachedTemplate { manifest, files })
    }

    async fn load(&mut self, template_name: &str) -> Result<&CachedTemplate> {
        if !self.cache.contains_key(template_name) {
            let zip_bytes = match &self.source {
                TemplateSource::Remote(base_url) => {
                    let url = Self::build_url(base_url, &format!("{}.zip", template_name))?;
                    self.download(url)
                        .await
                        .with_context(|| format!("Failed to fetch template '{}'", template_name))?
                }
                TemplateSource::Local(path) => {
                    let root: RootManifest = serde_yaml::from_str(&read_root_manifest_text(path)?)
                        .context("Failed to parse root template manifest")?;
                    Self::build_local_zip(path, template_name, &root.shared_files)?
                }
            };
            let cached = Self::extract_zip(&zip_bytes, template_name)?;
            self.cache.insert(template_name.to_string(), cached);
        }

        self.cache
            .get(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found in cache", template_name))
    }

    pub async fn fetch_template_manifest(&mut self, template_name: &str) -> Result<TemplateManifest> {
        Ok(self.load(template_name).await?.manifest.clone())
    }

    /// Fetch a file of a template as bytes
    pub async fn fetch_file_bytes(&mut self, template_name: &str, file_path: &str) -> Result<Vec<u8>> {
        let cached = self.load(template_name).await?;
        cached.files.get(file_path).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "File '{}' not found in template '{}'",
                file_path,
                template_name
            )
        })
    }
}

fn read_root_manifest_text(dir: &Path) -> Result<String> {
    let manifest_path = dir.join(MANIFEST_FILE);
    std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))
}

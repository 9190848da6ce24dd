//! Publishing build output to a filesystem folder or an FTP server

use crate::error::BuildError;
use crate::fsutil;
use crate::pipeline::ProjectContext;
use crate::runtime::{require_tools, run_checked, CommandSpec, ProcessRunner, Tool};
use crate::setup::model::{SyncSetup, SyncType};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable lftp reads the password from
const LFTP_PASSWORD_ENV: &str = "LFTP_PASSWORD";

/// Outcome of a filesystem sync
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub copied: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

/// Folder published by a sync: `sourcePath` when set, the dist folder otherwise
pub fn source_dir<R: ProcessRunner>(ctx: &ProjectContext<'_, R>, sync: &SyncSetup) -> PathBuf {
    match &sync.source_path {
        Some(path) => ctx.root().join(path),
        None => ctx.layout.dist(),
    }
}

/// Publish the build output as configured by the `sync` section
pub async fn run<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<SyncSummary> {
    let Some(sync) = &ctx.setup.sync else {
        anyhow::bail!("No sync section in turbobuilder.json");
    };

    let source = source_dir(ctx, sync);
    if !source.is_dir() {
        anyhow::bail!(
            "Nothing to sync: {} does not exist. Build the project first",
            source.display()
        );
    }

    match sync.sync_type {
        SyncType::Filesystem => {
            let destination = ctx.root().join(&sync.remote_path);
            check_destination(ctx.root(), &source, &destination)?;
            mirror(&source, &destination, sync)
        }
        SyncType::Ftp => {
            require_tools(ctx.runner, &[Tool::Lftp])?;
            run_checked(ctx.runner, &ftp_command(&source, sync)?).await?;
            Ok(SyncSummary::default())
        }
    }
}

/// A filesystem sync destination must not overlap the project or the synced folder
pub fn check_destination(root: &Path, source: &Path, destination: &Path) -> Result<()> {
    let root = fsutil::resolve(root)?;
    let source = fsutil::resolve(source)?;
    let resolved = fsutil::resolve(destination)?;

    let problem = if resolved == root {
        Some("is the project root")
    } else if source.starts_with(&resolved) {
        Some("contains the folder being synced")
    } else if resolved.starts_with(&source) {
        Some("is inside the folder being synced")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(BuildError::InvalidRequest(format!(
            "Refusing to sync into {}: the destination {}",
            destination.display(),
            problem
        ))
        .into()),
        None => Ok(()),
    }
}

fn is_excluded(relative: &Path, excludes: &[String]) -> bool {
    relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|name| fsutil::matches_any(name, excludes))
            .unwrap_or(false)
    })
}

/// Make `destination` hold the same files as `source`.
///
/// Files are only written when their contents differ. Excluded files are
/// neither copied nor deleted.
pub fn mirror(source: &Path, destination: &Path, sync: &SyncSetup) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();
    let mut expected = HashSet::new();

    for file in fsutil::list_files(source)? {
        let relative = file
            .strip_prefix(source)
            .with_context(|| format!("{} is outside {}", file.display(), source.display()))?
            .to_path_buf();
        if is_excluded(&relative, &sync.excludes) {
            continue;
        }

        let target = destination.join(&relative);
        let content =
            std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
        expected.insert(relative);

        if std::fs::read(&target).ok().as_deref() == Some(content.as_slice()) {
            summary.unchanged += 1;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&target, &content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        summary.copied += 1;
    }

    if sync.delete_destination_files {
        for file in fsutil::list_files(destination)? {
            let Ok(relative) = file.strip_prefix(destination) else {
                continue;
            };
            if expected.contains(relative) || is_excluded(relative, &sync.excludes) {
                continue;
            }
            std::fs::remove_file(&file)
                .with_context(|| format!("Failed to delete {}", file.display()))?;
            summary.deleted += 1;
        }
    }

    Ok(summary)
}

/// `lftp` invocation mirroring `source` to the remote path.
/// The password travels through the environment, never the command line.
pub fn ftp_command(source: &Path, sync: &SyncSetup) -> Result<CommandSpec> {
    let host = sync
        .host
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .context("FTP sync needs a host")?;

    let mut open = String::from("open");
    if let Some(user) = &sync.user {
        open.push_str(&format!(" --env-password -u {}", quote(user)));
    }
    open.push(' ');
    open.push_str(&quote(host));

    let mut transfer = String::from("mirror -R --verbose");
    if sync.delete_destination_files {
        transfer.push_str(" --delete");
    }
    for exclude in &sync.excludes {
        transfer.push_str(&format!(" --exclude-glob {}", quote(exclude)));
    }
    transfer.push_str(&format!(
        " {} {}",
        quote(&source.display().to_string()),
        quote(&sync.remote_path)
    ));

    let mut command = CommandSpec::new(Tool::Lftp.program())
        .arg("-c")
        .arg(format!("{}; {}; bye", open, transfer));
    if sync.user.is_some() {
        command = command.env(LFTP_PASSWORD_ENV, sync.password.clone().unwrap_or_default());
    }
    Ok(command)
}

/// Quote a value for an lftp script
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

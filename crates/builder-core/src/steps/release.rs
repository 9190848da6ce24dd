//! Release-only extras: picture optimization, code docs and the TODO reminder

use crate::fsutil;
use crate::pipeline::ProjectContext;
use crate::runtime::{require_tools, run_checked, CommandSpec, ProcessRunner, Tool};
use anyhow::{Context, Result};
use std::path::Path;

const PICTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg"];

const TODO_FILE: &str = "TODO.md";

/// Optimize every picture of the dist folder in place.
/// Returns the number of pictures processed.
pub async fn optimize_pictures<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<usize> {
    let pictures = fsutil::files_with_extensions(&ctx.layout.dist(), PICTURE_EXTENSIONS)?;
    if pictures.is_empty() {
        return Ok(0);
    }
    require_tools(ctx.runner, &[Tool::Imagemin])?;

    let progress = cliclack::progress_bar(pictures.len() as u64);
    progress.start("Optimizing pictures...");

    for picture in &pictures {
        let Some(parent) = picture.parent() else {
            continue;
        };
        let command = CommandSpec::new(Tool::Imagemin.program())
            .path_arg(picture)
            .arg(format!("--out-dir={}", parent.display()))
            .captured();
        if let Err(e) = run_checked(ctx.runner, &command).await {
            progress.error(format!("Failed to optimize {}", fsutil::file_name(picture)));
            return Err(e);
        }
        progress.inc(1);
    }

    progress.stop("Pictures optimized");

    Ok(pictures.len())
}

/// Generate PHP code documentation into the docs folder of the release
pub async fn generate_code_docs<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<()> {
    require_tools(ctx.runner, &[Tool::PhpDoc])?;

    let docs = ctx.layout.docs();
    fsutil::recreate_dir(&docs)?;

    let command = CommandSpec::new(Tool::PhpDoc.program())
        .arg("-d")
        .path_arg(&ctx.src())
        .arg("-t")
        .path_arg(&docs)
        .arg("--title")
        .arg(ctx.setup.metadata.name.clone())
        .current_dir(ctx.root());
    run_checked(ctx.runner, &command).await?;
    Ok(())
}

/// Pending tasks listed in the project's TODO.md, if it has any
pub fn todo_contents(root: &Path) -> Result<Option<String>> {
    let path = root.join(TODO_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let trimmed = content.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Remind the user of pending tasks before a release is shipped
pub fn print_todo(root: &Path) -> Result<()> {
    if let Some(todo) = todo_contents(root)? {
        cliclack::note("Pending TODO", todo)?;
    }
    Ok(())
}

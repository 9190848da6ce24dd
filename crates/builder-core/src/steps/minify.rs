//! In-place minification of release output

use crate::fsutil;
use crate::pipeline::ProjectContext;
use crate::project::ProjectType;
use crate::runtime::{require_tools, run_checked, CommandSpec, ProcessRunner, Tool};
use anyhow::Result;
use std::path::PathBuf;

/// Files touched by a minify run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MinifySummary {
    pub js: usize,
    pub css: usize,
}

/// Files already minified are left alone
fn is_minified(path: &std::path::Path) -> bool {
    let name = fsutil::file_name(path);
    name.ends_with(".min.js") || name.ends_with(".min.css")
}

fn targets(dist: &std::path::Path, extension: &str) -> Result<Vec<PathBuf>> {
    Ok(fsutil::files_with_extensions(dist, &[extension])?
        .into_iter()
        .filter(|path| !is_minified(path))
        .collect())
}

/// Minify every JavaScript and CSS file of the dist folder.
///
/// Angular builds are already optimized by the Angular CLI and are skipped.
pub async fn run<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<MinifySummary> {
    let mut summary = MinifySummary::default();
    if ctx.setup.project_type() == ProjectType::AppAngular {
        return Ok(summary);
    }

    let dist = ctx.layout.dist();
    let release = &ctx.setup.release;
    let js = if release.minify_js { targets(&dist, "js")? } else { Vec::new() };
    let css = if release.minify_css { targets(&dist, "css")? } else { Vec::new() };

    let mut tools = Vec::new();
    if !js.is_empty() {
        tools.push(Tool::Uglify);
    }
    if !css.is_empty() {
        tools.push(Tool::CleanCss);
    }
    require_tools(ctx.runner, &tools)?;

    if js.is_empty() && css.is_empty() {
        return Ok(summary);
    }

    let progress = cliclack::progress_bar((js.len() + css.len()) as u64);
    progress.start("Minifying...");

    for file in &js {
        let command = CommandSpec::new(Tool::Uglify.program())
            .path_arg(file)
            .arg("-o")
            .path_arg(file)
            .args(["--compress", "--mangle"])
            .captured();
        if let Err(e) = run_checked(ctx.runner, &command).await {
            progress.error(format!("Failed to minify {}", fsutil::file_name(file)));
            return Err(e);
        }
        summary.js += 1;
        progress.inc(1);
    }

    for file in &css {
        let command = CommandSpec::new(Tool::CleanCss.program())
            .arg("-o")
            .path_arg(file)
            .path_arg(file)
            .captured();
        if let Err(e) = run_checked(ctx.runner, &command).await {
            progress.error(format!("Failed to minify {}", fsutil::file_name(file)));
            return Err(e);
        }
        summary.css += 1;
        progress.inc(1);
    }

    progress.stop("Minified");
    Ok(summary)
}

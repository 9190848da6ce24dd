//! Building a project into its dist folder

use crate::fsutil;
use crate::pipeline::ProjectContext;
use crate::project::ProjectType;
use crate::runtime::{require_tools, run_checked, CommandSpec, ProcessRunner, Tool};
use crate::setup::{self, DEPOT_SETUP_STEM, SITE_SETUP_STEM};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Tools a build of this setup shells out to
pub fn required_tools(project_type: ProjectType, merged_file: bool) -> Vec<Tool> {
    let mut tools = match project_type {
        ProjectType::SitePhp | ProjectType::LibPhp | ProjectType::LibJs => Vec::new(),
        ProjectType::LibTs | ProjectType::AppNodeCli => vec![Tool::Tsc],
        ProjectType::AppAngular => vec![Tool::Angular],
    };
    if merged_file && matches!(project_type, ProjectType::LibJs | ProjectType::LibTs) {
        tools.push(Tool::Webpack);
    }
    tools
}

/// Build the project. Returns the number of files in the dist folder.
pub async fn run<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<usize> {
    let build = &ctx.setup.build;
    require_tools(
        ctx.runner,
        &required_tools(build.project_type, build.merged_file.is_some()),
    )?;

    let src = ctx.src();
    if !src.is_dir() {
        anyhow::bail!("Source folder not found: {}", src.display());
    }

    let dist = ctx.layout.dist();
    fsutil::recreate_dir(&dist)?;

    match build.project_type {
        ProjectType::SitePhp => build_site(ctx, &src, &dist)?,
        ProjectType::LibPhp => {
            copy_sources(ctx, &src, &dist)?;
        }
        ProjectType::LibJs => {
            copy_sources(ctx, &src, &dist)?;
            if let Some(merged) = &build.merged_file {
                bundle(ctx, &entry_point(&dist)?, &dist, merged).await?;
            }
        }
        ProjectType::LibTs => {
            let out = dist.join("ts");
            compile_typescript(ctx, &out).await?;
            if let Some(merged) = &build.merged_file {
                bundle(ctx, &out.join("index.js"), &dist.join("js"), merged).await?;
            }
        }
        ProjectType::AppNodeCli => {
            compile_typescript(ctx, &dist).await?;
            let package = ctx.root().join("package.json");
            if package.is_file() {
                std::fs::copy(&package, dist.join("package.json"))
                    .context("Failed to copy package.json")?;
            }
        }
        ProjectType::AppAngular => build_angular(ctx, &dist).await?,
    }

    ctx.wildcards.apply_to_tree(&dist)?;

    Ok(fsutil::list_files(&dist)?.len())
}

/// Copy the sources, leaving out `target/` when the sources contain it
fn copy_sources<R: ProcessRunner>(ctx: &ProjectContext<'_, R>, src: &Path, dst: &Path) -> Result<usize> {
    let target = fsutil::resolve(&ctx.layout.target())?;
    let skip: Vec<PathBuf> = target
        .strip_prefix(fsutil::resolve(src)?)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .into_iter()
        .collect();
    fsutil::copy_dir(src, dst, &[], &skip)
}

/// Copy the site and ship its setup files merged for this build
fn build_site<R: ProcessRunner>(ctx: &ProjectContext<'_, R>, src: &Path, dist: &Path) -> Result<()> {
    let site = dist.join("site");
    copy_sources(ctx, src, &site)?;

    for stem in [SITE_SETUP_STEM, DEPOT_SETUP_STEM] {
        // Overrides never ship, whether they live next to the sources or not
        let stale_override = setup::merge::release_path(&site, stem);
        if stale_override.is_file() {
            std::fs::remove_file(&stale_override)
                .with_context(|| format!("Failed to delete {}", stale_override.display()))?;
        }

        if let Some(value) =
            setup::render_layered(ctx.root(), stem, ctx.release, &ctx.wildcards)?
        {
            setup::write_setup(&setup::merge::base_path(&site, stem), &value)?;
        }
    }

    Ok(())
}

async fn compile_typescript<R: ProcessRunner>(ctx: &ProjectContext<'_, R>, out: &Path) -> Result<()> {
    let mut command = CommandSpec::new(Tool::Tsc.program())
        .arg("-p")
        .path_arg(&ctx.root().join(&ctx.setup.build.tsconfig))
        .arg("--outDir")
        .path_arg(out)
        .current_dir(ctx.root());
    if ctx.setup.build.declarations {
        command = command.arg("--declaration");
    }
    run_checked(ctx.runner, &command).await?;
    Ok(())
}

/// Entry module of a copied library: `index.js` at its top or in `js/`
fn entry_point(dir: &Path) -> Result<std::path::PathBuf> {
    [dir.join("index.js"), dir.join("js").join("index.js")]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .with_context(|| format!("No index.js entry point found in {}", dir.display()))
}

/// Merge a library into a single file with webpack
async fn bundle<R: ProcessRunner>(
    ctx: &ProjectContext<'_, R>,
    entry: &Path,
    out_dir: &Path,
    name: &str,
) -> Result<()> {
    let mode = if ctx.release { "production" } else { "development" };
    let command = CommandSpec::new(Tool::Webpack.program())
        .arg("--entry")
        .path_arg(entry)
        .arg("--output-path")
        .path_arg(out_dir)
        .arg("--output-filename")
        .arg(format!("{}.js", name.trim_end_matches(".js")))
        .arg("--mode")
        .arg(mode)
        .current_dir(ctx.root());
    run_checked(ctx.runner, &command).await?;
    Ok(())
}

async fn build_angular<R: ProcessRunner>(ctx: &ProjectContext<'_, R>, dist: &Path) -> Result<()> {
    let mut command = CommandSpec::new(Tool::Angular.program())
        .arg("build")
        .arg("--output-path")
        .path_arg(dist)
        .current_dir(ctx.root());
    command = if ctx.release {
        command.args(["--configuration", "production"])
    } else {
        command.args(["--configuration", "development"])
    };
    run_checked(ctx.runner, &command).await?;
    Ok(())
}

//! Starting and stopping the project's docker containers

use crate::pipeline::ProjectContext;
use crate::runtime::{require_tools, run_checked, CommandSpec, ProcessRunner, Tool};
use crate::setup::model::DockerContainer;
use anyhow::{Context, Result};

fn compose(container: &DockerContainer, ctx_root: &std::path::Path) -> CommandSpec {
    let mut command = CommandSpec::new(Tool::Docker.program())
        .arg("compose")
        .arg("-f")
        .path_arg(&ctx_root.join(&container.compose_file))
        .current_dir(ctx_root);
    if let Some(name) = &container.project_name {
        command = command.arg("-p").arg(name.clone());
    }
    command
}

/// Start every configured container. Returns the URLs they serve.
pub async fn up<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<Vec<String>> {
    let containers = &ctx.setup.containers.docker;
    require_tools(ctx.runner, &[Tool::Docker])?;

    let mut urls = Vec::new();
    for container in containers {
        let command = compose(container, ctx.root()).args(["up", "-d", "--build"]);
        run_checked(ctx.runner, &command).await?;
        if let Some(url) = &container.url {
            urls.push(url.clone());
        }
    }

    if ctx.options.open_browser {
        for url in &urls {
            open::that(url).with_context(|| format!("Failed to open {}", url))?;
        }
    }

    Ok(urls)
}

/// Stop every configured container. Projects without containers do nothing.
pub async fn down<R: ProcessRunner>(ctx: &ProjectContext<'_, R>) -> Result<usize> {
    let containers = &ctx.setup.containers.docker;
    if containers.is_empty() {
        return Ok(0);
    }
    require_tools(ctx.runner, &[Tool::Docker])?;

    for container in containers {
        run_checked(ctx.runner, &compose(container, ctx.root()).arg("down")).await?;
    }
    Ok(containers.len())
}

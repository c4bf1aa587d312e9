use std::path::Path;
use std::process::Command;

use anyhow::Context;

use crate::template::FetchedTemplate;

pub trait PostInitRunner {
    fn run(
        &self,
        template: &FetchedTemplate,
        script: &str,
        project_root: &Path,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct ScriptRunner;

impl PostInitRunner for ScriptRunner {
    fn run(
        &self,
        template: &FetchedTemplate,
        script: &str,
        project_root: &Path,
    ) -> anyhow::Result<()> {
        execute_post_init_script(template, script, project_root)
    }
}

/// Runs `script` from the fetched template inside the new project.
pub fn execute_post_init_script(
    template: &FetchedTemplate,
    script: &str,
    project_root: &Path,
) -> anyhow::Result<()> {
    let path = template.resolve(script)?;
    anyhow::ensure!(
        path.is_file(),
        "Post init script \"{}\" not found in {}",
        script,
        template.identifier()
    );

    tracing::info!(script, "executing post init script");

    let status = Command::new(&path)
        .current_dir(project_root)
        .status()
        .with_context(|| format!("Cannot execute post init script {:?}", path))?;

    anyhow::ensure!(
        status.success(),
        "Post init script \"{}\" exited with {}",
        script,
        status
    );
    Ok(())
}
